//! Utilities for converting between our matrix formats and external libraries

use ndarray::Array2;
use sprs::{CsMat, TriMat};

use crate::error::{MatbenchError, Result};
use crate::matrix::{CsrMatrix, DenseMatrix};

/// Converts our CSR matrix to sprs CsMat (CSR storage).
///
/// sprs requires sorted, duplicate-free rows, so the conversion goes
/// through a triplet matrix which sorts columns and sums duplicates.
pub fn to_sprs_csr(matrix: &CsrMatrix) -> CsMat<f64> {
    let mut tri = TriMat::with_capacity((matrix.n_rows(), matrix.n_cols()), matrix.nnz());
    for i in 0..matrix.n_rows() {
        for (j, val) in matrix.row_iter(i) {
            tri.add_triplet(i, j, val);
        }
    }
    tri.to_csr()
}

/// Converts sprs CsMat to our CsrMatrix format
pub fn from_sprs_csr(matrix: CsMat<f64>) -> Result<CsrMatrix> {
    // Ensure matrix is in CSR format
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };

    let shape = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();

    CsrMatrix::new(shape.0, shape.1, indptr, indices, data)
}

/// Copies a dense matrix into an ndarray `Array2`
pub fn to_ndarray(matrix: &DenseMatrix) -> Array2<f64> {
    let n = matrix.size();
    Array2::from_shape_fn((n, n), |(i, j)| matrix.get(i, j))
}

/// Copies a square `Array2` into a dense matrix, whatever its memory layout
pub fn from_ndarray(array: &Array2<f64>) -> Result<DenseMatrix> {
    let (rows, cols) = array.dim();
    if rows != cols {
        return Err(MatbenchError::DimensionMismatch(format!(
            "expected a square array, got {}x{}",
            rows, cols
        )));
    }
    // Logical iteration order is row-major regardless of strides
    DenseMatrix::from_vec(rows, array.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::multiply_basic;

    #[test]
    fn test_csr_roundtrip_sorts_rows() {
        // Row 0 stored out of column order
        let original = CsrMatrix::new(
            3,
            3,
            vec![0, 2, 3, 5],
            vec![1, 0, 1, 0, 2],
            vec![2.0, 1.0, 3.0, 4.0, 5.0],
        )
        .unwrap();

        let roundtrip = from_sprs_csr(to_sprs_csr(&original)).unwrap();

        assert_eq!(roundtrip.row_ptr(), original.row_ptr());
        assert_eq!(roundtrip.col_idx(), vec![0, 1, 1, 0, 2]);
        assert_eq!(roundtrip.values(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(roundtrip.to_dense().unwrap(), original.to_dense().unwrap());
    }

    #[test]
    fn test_duplicates_are_summed() {
        let csr = CsrMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (0, 0, 2.5)]).unwrap();
        let sprs_mat = to_sprs_csr(&csr);
        assert_eq!(sprs_mat.nnz(), 1);
        assert_eq!(sprs_mat.get(0, 0), Some(&3.5));
    }

    #[test]
    fn test_ndarray_roundtrip() {
        let m = DenseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let array = to_ndarray(&m);
        assert_eq!(array[[1, 0]], 3.0);
        assert_eq!(from_ndarray(&array).unwrap(), m);

        // Transposed view has column-major strides
        let t = array.t().to_owned();
        assert_eq!(from_ndarray(&t).unwrap().to_rows(), vec![vec![1.0, 3.0], vec![2.0, 4.0]]);
    }

    #[test]
    fn test_ndarray_dot_agrees() {
        let a = DenseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let b = DenseMatrix::from_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();
        let expected = from_ndarray(&to_ndarray(&a).dot(&to_ndarray(&b))).unwrap();
        assert_eq!(multiply_basic(&a, &b).unwrap(), expected);
    }

    #[test]
    fn test_non_square_array() {
        let array = Array2::<f64>::zeros((2, 3));
        assert!(from_ndarray(&array).is_err());
    }
}
