//! Self-contained unit of work computing one output row

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{MatbenchError, Result};
use crate::matrix::DenseMatrix;

/// One row of A paired with the whole of B.
///
/// Locally, B is shared between tasks through an `Arc`; serializing a task
/// copies B by value so the task can be shipped to another process with
/// no outside references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowTask {
    /// Index of this row in the output
    row_index: usize,
    /// Row of A
    row: Vec<f64>,
    /// Right-hand operand
    matrix_b: Arc<DenseMatrix>,
}

impl RowTask {
    pub fn new(row_index: usize, row: Vec<f64>, matrix_b: Arc<DenseMatrix>) -> Self {
        Self {
            row_index,
            row,
            matrix_b,
        }
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// Computes `row × B`, one dot product per column of B.
    pub fn run(&self) -> Result<Vec<f64>> {
        let b = &self.matrix_b;
        let n = b.size();
        if self.row.len() != n {
            return Err(MatbenchError::DimensionMismatch(format!(
                "row {} has {} entries but B is {}x{}",
                self.row_index,
                self.row.len(),
                n,
                n
            )));
        }

        let mut result = vec![0.0; n];
        for (j, out) in result.iter_mut().enumerate() {
            for (k, &a) in self.row.iter().enumerate() {
                *out += a * b.get(k, j);
            }
        }
        Ok(result)
    }
}
