//! Square dense matrix stored row-major in a single contiguous buffer

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MatbenchError, Result};

/// A square `n × n` matrix of `f64` values in row-major order.
///
/// Element `(i, j)` lives at `data[i * n + j]`. Every dense kernel takes
/// two of these and returns a freshly allocated result; nothing mutates
/// an operand after construction.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DenseParts")]
pub struct DenseMatrix {
    /// Side length
    n: usize,
    /// Row-major values (length n * n)
    data: Vec<f64>,
}

/// Unvalidated wire form, checked on deserialization.
#[derive(Deserialize)]
struct DenseParts {
    n: usize,
    data: Vec<f64>,
}

impl TryFrom<DenseParts> for DenseMatrix {
    type Error = MatbenchError;

    fn try_from(parts: DenseParts) -> Result<Self> {
        DenseMatrix::from_vec(parts.n, parts.data)
    }
}

impl DenseMatrix {
    /// Creates an `n × n` matrix of zeros
    ///
    /// # Panics
    ///
    /// Panics if `n * n` overflows `usize`, like any oversized allocation.
    pub fn zeros(n: usize) -> Self {
        // An overflowing side becomes an impossible allocation, never a wrapped length
        let len = n.checked_mul(n).unwrap_or(usize::MAX);
        Self {
            n,
            data: vec![0.0; len],
        }
    }

    /// Creates the `n × n` identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Wraps a row-major buffer of length `n * n`.
    pub fn from_vec(n: usize, data: Vec<f64>) -> Result<Self> {
        if n.checked_mul(n) != Some(data.len()) {
            return Err(MatbenchError::DimensionMismatch(format!(
                "buffer of length {} cannot hold a {}x{} matrix",
                data.len(),
                n,
                n
            )));
        }
        Ok(Self { n, data })
    }

    /// Builds a matrix from nested rows.
    ///
    /// Every row must have exactly as many entries as there are rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n {
                return Err(MatbenchError::DimensionMismatch(format!(
                    "row {} has {} entries, expected {} for a square matrix",
                    i,
                    row.len(),
                    n
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { n, data })
    }

    /// Side length of the matrix
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] = value;
    }

    /// Returns row `i` as a slice
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Iterates over the rows in order
    pub fn rows_iter(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.n.max(1))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Converts to nested rows
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows_iter().map(|r| r.to_vec()).collect()
    }

    /// Largest absolute element-wise difference between two equally sized matrices
    pub fn max_abs_diff(&self, other: &DenseMatrix) -> Result<f64> {
        if self.n != other.n {
            return Err(MatbenchError::DimensionMismatch(format!(
                "cannot compare {}x{} with {}x{}",
                self.n, self.n, other.n, other.n
            )));
        }
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max))
    }

    /// Element-wise comparison within an absolute tolerance
    pub fn approx_eq(&self, other: &DenseMatrix, tolerance: f64) -> bool {
        self.max_abs_diff(other)
            .map(|diff| diff <= tolerance)
            .unwrap_or(false)
    }
}

impl fmt::Debug for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DenseMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n, self.n)?;

        let max_rows_to_print = 5.min(self.n);
        for i in 0..max_rows_to_print {
            let row = self.row(i);
            let shown = 5.min(row.len());
            write!(f, "    row {}: {:?}", i, &row[..shown])?;
            if row.len() > shown {
                write!(f, " ... ({} more)", row.len() - shown)?;
            }
            writeln!(f)?;
        }
        if self.n > max_rows_to_print {
            writeln!(f, "    ... ({} more rows)", self.n - max_rows_to_print)?;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let m = DenseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert_eq!(m.size(), 2);
        assert_eq!(m.get(1, 0), 3.0);
        assert_eq!(m.row(0), &[1.0, 2.0]);
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        let err = DenseMatrix::from_rows(&rows).unwrap_err();
        assert!(matches!(err, MatbenchError::DimensionMismatch(_)));
    }

    #[test]
    fn test_from_rows_rejects_non_square() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert!(DenseMatrix::from_rows(&rows).is_err());
    }

    #[test]
    fn test_from_vec_length() {
        assert!(DenseMatrix::from_vec(3, vec![0.0; 9]).is_ok());
        assert!(DenseMatrix::from_vec(3, vec![0.0; 8]).is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_from_vec_side_overflow() {
        // 2^32 squared wraps to 0 on 64-bit targets
        let err = DenseMatrix::from_vec(1 << 32, Vec::new()).unwrap_err();
        assert!(matches!(err, MatbenchError::DimensionMismatch(_)));
        assert!(DenseMatrix::from_vec(usize::MAX, vec![0.0]).is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "capacity overflow")]
    fn test_zeros_side_overflow() {
        DenseMatrix::zeros(1 << 32);
    }

    #[test]
    fn test_identity_and_empty() {
        let id = DenseMatrix::identity(3);
        assert_eq!(id.get(2, 2), 1.0);
        assert_eq!(id.get(0, 2), 0.0);

        let empty = DenseMatrix::zeros(0);
        assert_eq!(empty.rows_iter().count(), 0);
    }

    #[test]
    fn test_approx_eq() {
        let a = DenseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let mut b = a.clone();
        b.set(1, 1, 4.0 + 1e-12);
        assert!(a.approx_eq(&b, 1e-9));
        assert!(!a.approx_eq(&b, 0.0));
        assert!(!a.approx_eq(&DenseMatrix::zeros(3), 1.0));
    }
}
