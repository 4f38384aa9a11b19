//! i-j-k multiplication with the inner product unrolled by four.

use crate::error::Result;
use crate::kernels::check_operands;
use crate::matrix::DenseMatrix;

/// Number of k terms handled per unrolled iteration
pub const UNROLL: usize = 4;

/// Same product as [`multiply_basic`](crate::kernels::multiply_basic), with
/// the k loop processing `k..k + 4` in one body and a scalar tail for the
/// last `n % 4` terms.
///
/// The four products are added to the running sum one after another, so
/// the accumulation order matches the basic kernel; only the instruction
/// grouping differs. Compare against it with a tolerance anyway since the
/// compiler is free to schedule the unrolled body differently.
pub fn multiply_vectorized(a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix> {
    let n = check_operands(a, b)?;
    let mut c = DenseMatrix::zeros(n);

    let a = a.as_slice();
    let b = b.as_slice();
    let out = c.as_mut_slice();

    // Largest multiple of UNROLL that fits in n
    let main = n - n % UNROLL;

    for i in 0..n {
        let a_row = &a[i * n..(i + 1) * n];
        for j in 0..n {
            let mut sum = 0.0;
            let mut k = 0;

            while k < main {
                sum += a_row[k] * b[k * n + j];
                sum += a_row[k + 1] * b[(k + 1) * n + j];
                sum += a_row[k + 2] * b[(k + 2) * n + j];
                sum += a_row[k + 3] * b[(k + 3) * n + j];
                k += UNROLL;
            }

            // Remainder when n is not a multiple of 4
            while k < n {
                sum += a_row[k] * b[k * n + j];
                k += 1;
            }

            out[i * n + j] = sum;
        }
    }

    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::multiply_basic;

    #[test]
    fn test_2x2() {
        let a = DenseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let b = DenseMatrix::from_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();
        let c = multiply_vectorized(&a, &b).unwrap();
        assert_eq!(c.to_rows(), vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
    }

    #[test]
    fn test_remainder_sizes() {
        // Exercise every n % 4 residue, including n < 4
        for n in 1..=9 {
            let data: Vec<f64> = (0..n * n).map(|x| (x % 7) as f64 - 3.0).collect();
            let a = DenseMatrix::from_vec(n, data.clone()).unwrap();
            let b = DenseMatrix::from_vec(n, data.into_iter().rev().collect()).unwrap();
            let expected = multiply_basic(&a, &b).unwrap();
            let actual = multiply_vectorized(&a, &b).unwrap();
            assert!(actual.approx_eq(&expected, 1e-12), "n = {}", n);
        }
    }

    #[test]
    fn test_mismatch() {
        assert!(multiply_vectorized(&DenseMatrix::zeros(4), &DenseMatrix::zeros(5)).is_err());
    }
}
