//! # Multi-threaded dense kernels
//!
//! Both kernels split the output rows into disjoint ranges and let each
//! worker own its range exclusively for the duration of the call. The
//! output buffer is carved into non-overlapping `&mut` slices before any
//! thread starts, so no locking is needed and no partial result is
//! observable: the call returns only after every worker has finished.

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use log::debug;
use rayon::prelude::*;

use crate::error::{panic_message, MatbenchError, Result};
use crate::kernels::{basic_rows, check_operands};
use crate::matrix::DenseMatrix;

/// Splits `0..n` into `workers` contiguous ranges of `ceil(n / workers)` rows.
///
/// The last ranges may be shorter, or empty when `workers > n`. Together
/// the ranges cover every row exactly once.
pub fn partition_rows(n: usize, workers: usize) -> Vec<Range<usize>> {
    if workers == 0 {
        return Vec::new();
    }
    let chunk = n.div_ceil(workers);
    (0..workers)
        .map(|t| {
            let start = (t * chunk).min(n);
            let end = (start + chunk).min(n);
            start..end
        })
        .collect()
}

/// Runs `f(worker, rows, block)` on one thread per worker, where `block`
/// is the exclusive row-major slice of `out` holding `rows`.
///
/// Blocks until every worker has returned. A worker that panics is
/// reported as `ComputationFailure`; a worker that returns an error has
/// that error propagated. When several workers fail the lowest worker
/// index wins.
pub fn for_each_row_block<F>(out: &mut DenseMatrix, workers: usize, f: F) -> Result<()>
where
    F: Fn(usize, Range<usize>, &mut [f64]) -> Result<()> + Sync,
{
    if workers == 0 {
        return Err(MatbenchError::InvalidArgument(
            "worker count must be positive".to_string(),
        ));
    }

    let n = out.size();
    let ranges = partition_rows(n, workers);
    debug!("partitioned {} rows across {} workers: {:?}", n, workers, ranges);

    // Carve the buffer into disjoint blocks up front
    let mut rest = out.as_mut_slice();
    let mut blocks = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * n);
        blocks.push((range, head));
        rest = tail;
    }

    let f = &f;
    thread::scope(|scope| {
        let handles: Vec<_> = blocks
            .into_iter()
            .enumerate()
            .map(|(worker, (range, block))| scope.spawn(move || f(worker, range, block)))
            .collect();

        let mut first_error = None;
        for (worker, handle) in handles.into_iter().enumerate() {
            let outcome = match handle.join() {
                Ok(result) => result,
                Err(payload) => Err(MatbenchError::ComputationFailure {
                    worker,
                    message: panic_message(payload.as_ref()),
                }),
            };
            if let Err(e) = outcome {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    })
}

/// Row-partitioned i-j-k multiplication on `workers` dedicated threads.
///
/// Rows are split with [`partition_rows`]; each thread computes its block
/// with the basic kernel. Produces exactly the same values as
/// [`multiply_basic`](crate::kernels::multiply_basic).
pub fn multiply_threaded(a: &DenseMatrix, b: &DenseMatrix, workers: usize) -> Result<DenseMatrix> {
    let n = check_operands(a, b)?;
    let mut c = DenseMatrix::zeros(n);
    for_each_row_block(&mut c, workers, |_, rows, block| {
        basic_rows(a, b, rows, block);
        Ok(())
    })?;
    Ok(c)
}

/// Row-parallel i-j-k multiplication scheduled by rayon's work-stealing pool.
///
/// Each output row is an independent `&mut` chunk; rayon decides how rows
/// are grouped onto threads. Values are identical to the basic kernel.
pub fn multiply_data_parallel(a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix> {
    let n = check_operands(a, b)?;
    let mut c = DenseMatrix::zeros(n);
    if n == 0 {
        return Ok(c);
    }

    let out = c.as_mut_slice();
    panic::catch_unwind(AssertUnwindSafe(|| {
        out.par_chunks_mut(n)
            .enumerate()
            .for_each(|(i, row)| basic_rows(a, b, i..i + 1, row));
    }))
    // rayon does not report which worker panicked
    .map_err(|payload| MatbenchError::ComputationFailure {
        worker: 0,
        message: panic_message(payload.as_ref()),
    })?;

    Ok(c)
}
