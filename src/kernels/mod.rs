//! Dense matrix multiplication kernels
//!
//! Every kernel computes `C = A × B` for two square matrices of the same
//! side length and returns a freshly allocated result. They differ only in
//! memory-access order and in how the work is spread across threads:
//!
//! - [`multiply_basic`]: textbook i-j-k loop
//! - [`multiply_cache_friendly`]: transposes B, then walks i-k-j
//! - [`multiply_tiled`]: same as cache-friendly over square tiles
//! - [`multiply_vectorized`]: i-j-k with the k loop unrolled by four
//! - [`multiply_threaded`]: basic kernel over row blocks on a fixed number of threads
//! - [`multiply_data_parallel`]: basic kernel over rows on the rayon pool

pub mod dense;
pub mod parallel;
pub mod vectorized;

pub use dense::{multiply_basic, multiply_cache_friendly, multiply_tiled, transpose};
pub use parallel::{
    for_each_row_block, multiply_data_parallel, multiply_threaded, partition_rows,
};
pub use vectorized::multiply_vectorized;

use crate::error::{MatbenchError, Result};
use crate::matrix::DenseMatrix;

/// Checks that both operands have the same side length.
pub(crate) fn check_operands(a: &DenseMatrix, b: &DenseMatrix) -> Result<usize> {
    if a.size() != b.size() {
        return Err(MatbenchError::DimensionMismatch(format!(
            "cannot multiply {}x{} by {}x{}",
            a.size(),
            a.size(),
            b.size(),
            b.size()
        )));
    }
    Ok(a.size())
}

/// Computes rows `rows` of `A × B` with the i-j-k order into `out`,
/// which holds exactly those rows.
pub(crate) fn basic_rows(
    a: &DenseMatrix,
    b: &DenseMatrix,
    rows: std::ops::Range<usize>,
    out: &mut [f64],
) {
    let n = a.size();
    let a = a.as_slice();
    let b = b.as_slice();
    for (local, i) in rows.enumerate() {
        for j in 0..n {
            let mut sum = 0.0;
            for k in 0..n {
                sum += a[i * n + k] * b[k * n + j];
            }
            out[local * n + j] = sum;
        }
    }
}
