//! Compressed Sparse Row (CSR) matrix format implementation

use std::collections::TryReserveError;
use std::fmt;

use crate::error::{MatbenchError, Result};
use crate::matrix::DenseMatrix;
use crate::utils::exclusive_scan;

/// A sparse matrix in Compressed Sparse Row (CSR) format
///
/// The CSR format stores a sparse matrix using three arrays:
/// - row_ptr: Array of size n_rows + 1 containing indices into col_idx and values arrays
/// - col_idx: Array of size nnz containing column indices of non-zero elements
/// - values: Array of size nnz containing the non-zero values
///
/// Entries inside a row are kept in the order they were inserted and are
/// not required to be sorted by column.
///
/// The arrays are fixed once constructed; they can be read but not edited:
///
/// ```compile_fail
/// let mut m = matbench::CsrMatrix::identity(2);
/// m.values[0] = 5.0;
/// ```
///
/// ```
/// let m = matbench::CsrMatrix::identity(2);
/// assert_eq!(m.values(), &[1.0, 1.0]);
/// ```
#[derive(Clone, PartialEq)]
pub struct CsrMatrix {
    /// Number of rows in the matrix
    n_rows: usize,

    /// Number of columns in the matrix
    n_cols: usize,

    /// Row pointers (size: n_rows + 1)
    /// row_ptr[i] is the index in col_idx and values where row i starts
    /// row_ptr[n_rows] is equal to nnz
    row_ptr: Vec<usize>,

    /// Column indices (size: nnz)
    col_idx: Vec<usize>,

    /// Non-zero values (size: nnz)
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Creates a new CSR matrix with the given dimensions and data
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the input arrays are inconsistent:
    /// - row_ptr.len() must be n_rows + 1, starting at 0 and non-decreasing
    /// - col_idx.len() must equal values.len()
    /// - row_ptr[n_rows] must equal col_idx.len()
    /// - every column index must be below n_cols
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self> {
        let invalid = |msg: String| Err(MatbenchError::DimensionMismatch(msg));

        if n_rows.checked_add(1) != Some(row_ptr.len()) {
            return invalid(format!(
                "row_ptr.len() must be n_rows + 1 ({} != {} + 1)",
                row_ptr.len(),
                n_rows
            ));
        }
        if col_idx.len() != values.len() {
            return invalid(format!(
                "col_idx.len() must equal values.len() ({} != {})",
                col_idx.len(),
                values.len()
            ));
        }
        if row_ptr[0] != 0 || row_ptr[n_rows] != col_idx.len() {
            return invalid(format!(
                "row_ptr must span 0..{} but spans {}..{}",
                col_idx.len(),
                row_ptr[0],
                row_ptr[n_rows]
            ));
        }
        if row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return invalid("row_ptr must be non-decreasing".to_string());
        }
        if let Some(&col) = col_idx.iter().find(|&&c| c >= n_cols) {
            return invalid(format!(
                "Column index {} out of bounds (n_cols = {})",
                col, n_cols
            ));
        }

        Ok(Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Builds a CSR matrix from 0-based `(row, col, value)` triplets.
    ///
    /// Two passes: the first counts entries per row and prefix-sums the
    /// counts into `row_ptr`, the second scatters every triplet to
    /// `row_ptr[row] + filled[row]`. Entries of a row keep the order in
    /// which they appear in `triplets`; duplicates are kept as separate
    /// entries.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if an entry lies outside the matrix or the row
    /// pointers for `n_rows` cannot be allocated.
    pub fn from_triplets(
        n_rows: usize,
        n_cols: usize,
        triplets: &[(usize, usize, f64)],
    ) -> Result<Self> {
        let mut row_count = Self::row_counts(n_rows)
            .map_err(|e| MatbenchError::DimensionMismatch(e.to_string()))?;
        for &(row, col, _) in triplets {
            if row >= n_rows || col >= n_cols {
                return Err(MatbenchError::DimensionMismatch(format!(
                    "entry ({}, {}) outside a {}x{} matrix",
                    row, col, n_rows, n_cols
                )));
            }
            row_count[row] += 1;
        }

        Self::from_row_counts(n_cols, row_count, triplets)
    }

    /// Allocates one zeroed counter per row, failing instead of aborting
    /// when `n_rows` is too large to hold.
    pub(crate) fn row_counts(
        n_rows: usize,
    ) -> std::result::Result<Vec<usize>, TryReserveError> {
        let mut row_count = Vec::new();
        row_count.try_reserve_exact(n_rows)?;
        row_count.resize(n_rows, 0);
        Ok(row_count)
    }

    /// Second pass of [`from_triplets`](Self::from_triplets).
    ///
    /// `row_count[i]` must be the number of triplets in row `i`, and every
    /// triplet must already lie inside `row_count.len() × n_cols`.
    pub(crate) fn from_row_counts(
        n_cols: usize,
        mut row_count: Vec<usize>,
        triplets: &[(usize, usize, f64)],
    ) -> Result<Self> {
        let n_rows = row_count.len();
        let row_ptr = exclusive_scan(&row_count).map_err(|e| {
            MatbenchError::DimensionMismatch(format!(
                "cannot allocate {} row pointers: {}",
                n_rows, e
            ))
        })?;

        let nnz = triplets.len();
        let mut values = vec![0.0; nnz];
        let mut col_idx = vec![0usize; nnz];

        // Counts are in row_ptr now; reuse the buffer as the fill cursor
        row_count.fill(0);
        let filled = &mut row_count;

        for &(row, col, val) in triplets {
            let dest = row_ptr[row] + filled[row];
            values[dest] = val;
            col_idx[dest] = col;
            filled[row] += 1;
        }

        Ok(Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Row offsets into [`col_idx`](Self::col_idx) and [`values`](Self::values)
    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Takes the matrix apart into `(n_rows, n_cols, row_ptr, col_idx, values)`
    pub fn into_raw_parts(self) -> (usize, usize, Vec<usize>, Vec<usize>, Vec<f64>) {
        (self.n_rows, self.n_cols, self.row_ptr, self.col_idx, self.values)
    }

    /// Returns the number of non-zero elements in the matrix
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns an iterator over the non-zero elements in row i
    ///
    /// Each item is a tuple (col_idx, value) representing a non-zero element
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        assert!(i < self.n_rows, "Row index out of bounds");

        let start = self.row_ptr[i];
        let end = self.row_ptr[i + 1];

        self.col_idx[start..end]
            .iter()
            .zip(&self.values[start..end])
            .map(|(&col, &val)| (col, val))
    }

    /// Sparse matrix-vector product `y = A * x`.
    ///
    /// `y[i]` sums `values[k] * x[col_idx[k]]` over row i's entries in
    /// storage order. The only allocation is the output vector.
    pub fn multiply(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.n_cols {
            return Err(MatbenchError::DimensionMismatch(format!(
                "vector of length {} cannot multiply a {}x{} matrix",
                x.len(),
                self.n_rows,
                self.n_cols
            )));
        }

        let mut y = vec![0.0; self.n_rows];
        for (i, out) in y.iter_mut().enumerate() {
            let mut sum = 0.0;
            for k in self.row_ptr[i]..self.row_ptr[i + 1] {
                sum += self.values[k] * x[self.col_idx[k]];
            }
            *out = sum;
        }

        Ok(y)
    }

    /// Expands a square CSR matrix into a dense one, summing duplicates
    pub fn to_dense(&self) -> Result<DenseMatrix> {
        if self.n_rows != self.n_cols {
            return Err(MatbenchError::DimensionMismatch(format!(
                "only square matrices can be densified, got {}x{}",
                self.n_rows, self.n_cols
            )));
        }
        let mut dense = DenseMatrix::zeros(self.n_rows);
        for i in 0..self.n_rows {
            for (j, val) in self.row_iter(i) {
                dense.set(i, j, dense.get(i, j) + val);
            }
        }
        Ok(dense)
    }

    /// Creates an empty matrix with the given dimensions
    pub fn zeros(n_rows: usize, n_cols: usize) -> Result<Self> {
        let len = n_rows.checked_add(1).ok_or_else(|| {
            MatbenchError::DimensionMismatch(format!("{} rows cannot be indexed", n_rows))
        })?;
        Ok(Self {
            n_rows,
            n_cols,
            row_ptr: vec![0; len],
            col_idx: Vec::new(),
            values: Vec::new(),
        })
    }

    /// Creates an identity matrix of the given size
    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![1.0; n],
        }
    }
}

impl fmt::Debug for CsrMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CsrMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  nnz: {}", self.nnz())?;

        // Print a sample of the matrix content
        let max_rows_to_print = 5.min(self.n_rows);

        if max_rows_to_print > 0 {
            writeln!(f, "  content sample:")?;

            for i in 0..max_rows_to_print {
                write!(f, "    row {}: ", i)?;
                let start = self.row_ptr[i];
                let end = self.row_ptr[i + 1];

                if start == end {
                    writeln!(f, "(empty)")?;
                } else {
                    let max_elements = 5.min(end - start);

                    for j in start..(start + max_elements) {
                        write!(f, "({}, {:?}) ", self.col_idx[j], self.values[j])?;
                    }

                    if end - start > max_elements {
                        write!(f, "... ({} more)", end - start - max_elements)?;
                    }

                    writeln!(f)?;
                }
            }

            if self.n_rows > max_rows_to_print {
                writeln!(f, "    ... ({} more rows)", self.n_rows - max_rows_to_print)?;
            }
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrMatrix {
        // [1 2 0]
        // [0 3 0]
        // [4 0 5]
        CsrMatrix::new(
            3,
            3,
            vec![0, 2, 3, 5],
            vec![0, 1, 1, 0, 2],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .unwrap()
    }

    #[test]
    fn test_new_matrix() {
        let matrix = sample();
        assert_eq!(matrix.n_rows(), 3);
        assert_eq!(matrix.n_cols(), 3);
        assert_eq!(matrix.nnz(), 5);
    }

    #[test]
    fn test_row_iter() {
        let matrix = sample();

        let row0: Vec<_> = matrix.row_iter(0).collect();
        assert_eq!(row0, vec![(0, 1.0), (1, 2.0)]);

        let row1: Vec<_> = matrix.row_iter(1).collect();
        assert_eq!(row1, vec![(1, 3.0)]);

        let row2: Vec<_> = matrix.row_iter(2).collect();
        assert_eq!(row2, vec![(0, 4.0), (2, 5.0)]);
    }

    #[test]
    fn test_multiply() {
        let y = sample().multiply(&[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(y, vec![3.0, 3.0, 9.0]);

        let y = sample().multiply(&[1.0, 0.0, 2.0]).unwrap();
        assert_eq!(y, vec![1.0, 0.0, 14.0]);
    }

    #[test]
    fn test_multiply_wrong_length() {
        let err = sample().multiply(&[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, MatbenchError::DimensionMismatch(_)));
    }

    #[test]
    fn test_identity() {
        let identity = CsrMatrix::identity(3);

        assert_eq!(identity.nnz(), 3);
        assert_eq!(identity.row_ptr(), vec![0, 1, 2, 3]);
        assert_eq!(identity.col_idx(), vec![0, 1, 2]);
        assert_eq!(identity.multiply(&[4.0, 5.0, 6.0]).unwrap(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_from_triplets_groups_rows() {
        // Rows interleaved in the input
        let triplets = [(2, 2, 5.0), (0, 1, 2.0), (2, 0, 4.0), (0, 0, 1.0), (1, 1, 3.0)];
        let matrix = CsrMatrix::from_triplets(3, 3, &triplets).unwrap();

        assert_eq!(matrix.row_ptr(), vec![0, 2, 3, 5]);
        // Within a row, entries keep their input order
        assert_eq!(matrix.col_idx(), vec![1, 0, 1, 2, 0]);
        assert_eq!(matrix.values(), vec![2.0, 1.0, 3.0, 5.0, 4.0]);
        assert_eq!(matrix.to_dense().unwrap(), sample().to_dense().unwrap());
    }

    #[test]
    fn test_from_triplets_empty_rows() {
        let matrix = CsrMatrix::from_triplets(4, 2, &[(3, 1, 1.5)]).unwrap();
        assert_eq!(matrix.row_ptr(), vec![0, 0, 0, 0, 1]);
        assert_eq!(matrix.multiply(&[0.0, 2.0]).unwrap(), vec![0.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_from_triplets_out_of_range() {
        assert!(CsrMatrix::from_triplets(2, 2, &[(2, 0, 1.0)]).is_err());
        assert!(CsrMatrix::from_triplets(2, 2, &[(0, 2, 1.0)]).is_err());
    }

    #[test]
    fn test_invalid_row_ptr() {
        let err = CsrMatrix::new(
            3,
            3,
            vec![0, 2, 3], // Missing last element
            vec![0, 1, 1, 0, 2],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .unwrap_err();
        assert!(err.to_string().contains("row_ptr.len() must be n_rows + 1"));
    }

    #[test]
    fn test_inconsistent_lengths() {
        let err = CsrMatrix::new(
            3,
            3,
            vec![0, 2, 3, 5],
            vec![0, 1, 1, 0, 2],
            vec![1.0, 2.0, 3.0, 4.0], // Missing last element
        )
        .unwrap_err();
        assert!(err.to_string().contains("col_idx.len() must equal values.len()"));
    }

    #[test]
    fn test_decreasing_row_ptr() {
        let result = CsrMatrix::new(2, 2, vec![0, 2, 1], vec![0], vec![1.0]);
        assert!(result.is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_oversized_row_count() {
        // n_rows + 1 overflows
        assert!(CsrMatrix::new(usize::MAX, 1, vec![0], vec![], vec![]).is_err());
        assert!(CsrMatrix::zeros(usize::MAX, 1).is_err());
        // 2^61 counters need 2^64 bytes
        let err = CsrMatrix::from_triplets(1 << 61, 1, &[]).unwrap_err();
        assert!(matches!(err, MatbenchError::DimensionMismatch(_)));
    }

    #[test]
    fn test_zeros() {
        let m = CsrMatrix::zeros(3, 2).unwrap();
        assert_eq!(m.row_ptr(), &[0, 0, 0, 0]);
        assert_eq!(m.multiply(&[1.0, 1.0]).unwrap(), vec![0.0; 3]);
    }

    #[test]
    fn test_column_out_of_bounds() {
        let result = CsrMatrix::new(1, 2, vec![0, 1], vec![2], vec![1.0]);
        assert!(result.is_err());
    }
}
