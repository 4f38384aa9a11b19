//! Configuration and system parameters for the kernels and the benchmark driver

use std::path::PathBuf;

/// System parameters for performance tuning
#[derive(Debug, Clone)]
pub struct SystemParameters {
    /// Size of cache line in bytes
    pub cache_line_size: usize,
    /// Size of L2 cache in bytes
    pub l2_cache_size: usize,
    /// Number of threads to use
    pub n_threads: usize,
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self {
            cache_line_size: 64,        // Common cache line size
            l2_cache_size: 256_000,     // 256KB L2 cache (conservative default)
            n_threads: num_cpus::get(), // Use all available cores
        }
    }
}

impl SystemParameters {
    /// Largest square tile edge such that three `f64` tiles fit in L2
    pub fn l2_block_size(&self) -> usize {
        let per_tile = self.l2_cache_size / (3 * std::mem::size_of::<f64>());
        let edge = (per_tile as f64).sqrt() as usize;
        // Round down to a whole number of cache lines
        let per_line = self.cache_line_size / std::mem::size_of::<f64>();
        (edge / per_line.max(1) * per_line).max(1)
    }
}

/// Kernel parameters swept by the benchmark driver
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// System parameters for performance tuning
    pub system_params: SystemParameters,

    /// Tile edges tried by the tiled kernel
    pub block_sizes: Vec<usize>,

    /// Worker counts tried by the threaded kernel
    pub worker_counts: Vec<usize>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            system_params: SystemParameters::default(),
            block_sizes: vec![16, 32, 64],
            worker_counts: vec![2, 4, 8],
        }
    }
}

/// Which group of kernels a benchmark run exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchMode {
    /// Basic, cache-friendly and tiled kernels
    Dense,
    /// Threaded, data-parallel and unrolled kernels against the basic baseline
    Parallel,
    /// CSR matrix-vector product on a loaded or generated sparse matrix
    Sparse,
    /// Row tasks dispatched through an executor
    Distributed,
    /// Every group in sequence
    All,
}

impl BenchMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dense" => Some(BenchMode::Dense),
            "parallel" => Some(BenchMode::Parallel),
            "sparse" => Some(BenchMode::Sparse),
            "distributed" => Some(BenchMode::Distributed),
            "all" => Some(BenchMode::All),
            _ => None,
        }
    }

    pub fn includes(self, other: BenchMode) -> bool {
        self == BenchMode::All || self == other
    }
}

/// Configuration of a single benchmark invocation
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub mode: BenchMode,
    /// Dense matrix side lengths
    pub sizes: Vec<usize>,
    /// Trials per algorithm and size
    pub runs: usize,
    /// Seed for the matrix generator
    pub seed: u64,
    /// CSV file results are appended to
    pub output: PathBuf,
    /// Matrix Market file for the sparse benchmark; a random matrix is used when absent
    pub matrix_market: Option<PathBuf>,
    /// Density of the generated sparse matrix
    pub sparse_density: f64,
    pub kernels: KernelConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            mode: BenchMode::All,
            sizes: vec![200],
            runs: 3,
            seed: 42,
            output: PathBuf::from("results/benchmark_results.csv"),
            matrix_market: None,
            sparse_density: 0.01,
            kernels: KernelConfig::default(),
        }
    }
}
