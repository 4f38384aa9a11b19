//! Single-threaded dense kernels: basic, cache-friendly and tiled.

use crate::error::{MatbenchError, Result};
use crate::kernels::{basic_rows, check_operands};
use crate::matrix::DenseMatrix;

/// Naive matrix multiplication using i-j-k loop order.
///
/// The innermost loop walks B with stride `n`, so every step lands on a
/// new cache line for large matrices. This is the correctness baseline.
pub fn multiply_basic(a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix> {
    let n = check_operands(a, b)?;
    let mut c = DenseMatrix::zeros(n);
    basic_rows(a, b, 0..n, c.as_mut_slice());
    Ok(c)
}

/// Cache-friendly multiplication with a pre-transposed B and i-k-j order.
///
/// Computes `Bᵗ` first, then accumulates `C[i][j] += A[i][k] * Bᵗ[j][k]`.
/// Each `C[i][j]` receives its terms in increasing k, the same order as
/// [`multiply_basic`], so results agree exactly on integer-valued input.
pub fn multiply_cache_friendly(a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix> {
    let n = check_operands(a, b)?;
    let bt = transpose(b);
    let mut c = DenseMatrix::zeros(n);

    let a = a.as_slice();
    let bt = bt.as_slice();
    let out = c.as_mut_slice();

    for i in 0..n {
        for k in 0..n {
            let aik = a[i * n + k];
            for j in 0..n {
                out[i * n + j] += aik * bt[j * n + k];
            }
        }
    }

    Ok(c)
}

/// Blocked (tiled) multiplication over `block_size`-edged tiles.
///
/// Tiles are visited ii-kk-jj; inside a tile the loops are i-k-j with
/// bounds clipped to `n`. For any fixed cell the kk tiles are visited in
/// increasing order and k increases inside each tile, so every `C[i][j]`
/// accumulates its terms in exactly the same k order as
/// [`multiply_cache_friendly`] and the result is bit-identical to it for
/// every block size.
///
/// # Errors
///
/// `DimensionMismatch` if the operands differ in size, `InvalidArgument`
/// if `block_size` is zero.
pub fn multiply_tiled(a: &DenseMatrix, b: &DenseMatrix, block_size: usize) -> Result<DenseMatrix> {
    let n = check_operands(a, b)?;
    if block_size == 0 {
        return Err(MatbenchError::InvalidArgument(
            "block size must be positive".to_string(),
        ));
    }

    let bt = transpose(b);
    let mut c = DenseMatrix::zeros(n);

    let a = a.as_slice();
    let bt = bt.as_slice();
    let out = c.as_mut_slice();

    for ii in (0..n).step_by(block_size) {
        let i_max = (ii + block_size).min(n);
        for kk in (0..n).step_by(block_size) {
            let k_max = (kk + block_size).min(n);
            for jj in (0..n).step_by(block_size) {
                let j_max = (jj + block_size).min(n);

                for i in ii..i_max {
                    for k in kk..k_max {
                        let aik = a[i * n + k];
                        for j in jj..j_max {
                            out[i * n + j] += aik * bt[j * n + k];
                        }
                    }
                }
            }
        }
    }

    Ok(c)
}

/// Transpose a matrix: `Mᵗ[j][i] = M[i][j]`
pub fn transpose(m: &DenseMatrix) -> DenseMatrix {
    let n = m.size();
    let src = m.as_slice();
    let mut t = DenseMatrix::zeros(n);
    let dst = t.as_mut_slice();
    for i in 0..n {
        for j in 0..n {
            dst[j * n + i] = src[i * n + j];
        }
    }
    t
}
