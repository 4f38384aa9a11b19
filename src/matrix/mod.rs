// Matrix data structures and configuration

pub mod config;
pub mod csr;
pub mod dense;

pub use config::{BenchConfig, BenchMode, KernelConfig, SystemParameters};
pub use csr::CsrMatrix;
pub use dense::DenseMatrix;
