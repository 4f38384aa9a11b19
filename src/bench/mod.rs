//! Benchmark harness: timed trials, summaries and CSV output
//!
//! The kernels know nothing about timing. [`run_trials`] calls a kernel
//! closure repeatedly, recording wall-clock time and the net change in
//! live heap bytes around each call.

pub mod memory;
pub mod report;
pub mod stats;

pub use report::CsvReport;
pub use stats::{Summary, Trial};

use std::fmt;
use std::time::Instant;

use log::{debug, info};

use crate::error::{MatbenchError, Result};

/// Every strategy the driver can time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Basic,
    CacheFriendly,
    /// Tiled with the given block size
    Tiled(usize),
    Vectorized,
    /// Fixed pool with the given worker count
    Threaded(usize),
    DataParallel,
    SparseCsr,
    Distributed,
}

impl Algorithm {
    /// Stable name used in CSV output
    pub fn label(&self) -> String {
        match self {
            Algorithm::Basic => "basic".to_string(),
            Algorithm::CacheFriendly => "cache".to_string(),
            Algorithm::Tiled(bs) => format!("tiled{}", bs),
            Algorithm::Vectorized => "vectorized".to_string(),
            Algorithm::Threaded(w) => format!("threaded{}", w),
            Algorithm::DataParallel => "parallel_stream".to_string(),
            Algorithm::SparseCsr => "sparse_csr".to_string(),
            Algorithm::Distributed => "distributed".to_string(),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Summary of one algorithm at one size
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    pub algorithm: Algorithm,
    /// Matrix side length (or row count for sparse inputs)
    pub size: usize,
    pub summary: Summary,
}

/// Runs `kernel` `runs` times, timing each call.
///
/// The memory delta is taken while the kernel's output is still alive, so
/// it reflects the result allocation plus anything leaked. The first
/// kernel error aborts the series.
pub fn run_trials<T, F>(runs: usize, mut kernel: F) -> Result<Vec<Trial>>
where
    F: FnMut() -> Result<T>,
{
    let mut trials = Vec::with_capacity(runs);
    for run in 0..runs {
        let before = memory::allocated_bytes();
        let start = Instant::now();
        let output = kernel()?;
        let elapsed = start.elapsed();
        let after = memory::allocated_bytes();
        drop(output);

        let trial = Trial {
            elapsed,
            memory_delta: memory::delta(before, after),
        };
        debug!(
            "run {}/{}: {:.6} s, {} bytes",
            run + 1,
            runs,
            trial.elapsed.as_secs_f64(),
            trial.memory_delta
        );
        trials.push(trial);
    }
    Ok(trials)
}

/// Times `kernel` and summarizes it as a [`BenchResult`]
pub fn benchmark<T, F>(
    algorithm: Algorithm,
    size: usize,
    runs: usize,
    kernel: F,
) -> Result<BenchResult>
where
    F: FnMut() -> Result<T>,
{
    let trials = run_trials(runs, kernel)?;
    let summary = Summary::from_trials(&trials).ok_or_else(|| {
        MatbenchError::InvalidArgument("at least one run is required".to_string())
    })?;
    info!(
        "[{}] n={} runs={} mean={:.6}s best={:.6}s worst={:.6}s",
        algorithm, size, summary.runs, summary.mean, summary.best, summary.worst
    );
    Ok(BenchResult {
        algorithm,
        size,
        summary,
    })
}
