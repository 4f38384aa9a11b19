//! # matbench: matrix multiplication strategies side by side
//!
//! A small kernel library for comparing how memory-access order and
//! concurrency affect the cost of a matrix product.
//!
//! ## Overview
//!
//! - **Dense kernels** ([`kernels`]): naive i-j-k, cache-friendly
//!   (transpose + i-k-j), tiled, unrolled-by-four, a fixed worker pool
//!   over row blocks, and a rayon data-parallel variant.
//! - **Sparse** ([`CsrMatrix`]): compressed-sparse-row storage and the
//!   sparse matrix × dense vector product, loaded from Matrix Market files
//!   by [`matrix_market::load_csr`].
//! - **Row tasks** ([`distributed`]): one self-contained task per output
//!   row, dispatched through any [`RowExecutor`].
//! - **Harness** ([`bench`]): timing, memory deltas, statistics and CSV.
//!
//! All kernels take their operands by reference, allocate a fresh result
//! and return a [`Result`], so dimension errors and worker faults are
//! reported the same way everywhere.
//!
//! ## Usage
//!
//! ```
//! use matbench::{DenseMatrix, multiply_basic, multiply_tiled};
//!
//! let a = DenseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
//! let b = DenseMatrix::from_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();
//!
//! let c = multiply_basic(&a, &b).unwrap();
//! assert_eq!(c.to_rows(), vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
//! assert_eq!(multiply_tiled(&a, &b, 32).unwrap(), c);
//! ```
//!
//! Sparse matrix-vector product:
//!
//! ```
//! use matbench::CsrMatrix;
//!
//! let m = CsrMatrix::from_triplets(2, 2, &[(0, 0, 5.0), (1, 1, 7.0)]).unwrap();
//! assert_eq!(m.multiply(&[1.0, 1.0]).unwrap(), vec![5.0, 7.0]);
//! ```

pub mod bench;
pub mod distributed;
pub mod error;
pub mod generator;
pub mod kernels;
pub mod matrix;
pub mod matrix_market;
pub mod utils;

// Re-export primary components
pub use distributed::{multiply_distributed, LocalExecutor, PendingRow, RowExecutor, RowTask};
pub use error::{MatbenchError, Result};
pub use generator::MatrixGenerator;
pub use kernels::{
    multiply_basic, multiply_cache_friendly, multiply_data_parallel, multiply_threaded,
    multiply_tiled, multiply_vectorized, partition_rows, transpose,
};
pub use matrix::{BenchConfig, BenchMode, CsrMatrix, DenseMatrix, KernelConfig, SystemParameters};
pub use matrix_market::{load_csr, write_csr};

/// Version information for the matbench library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
