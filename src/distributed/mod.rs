//! # Row-task dispatch
//!
//! The product is split into one [`RowTask`] per output row. Every task is
//! submitted to a [`RowExecutor`] before any result is collected; results
//! are then gathered in row order. There are no retries and no fallback
//! to local computation: a rejected submission aborts the call and a
//! failed row is reported with its index.

pub mod executor;
pub mod task;

pub use executor::{LocalExecutor, PendingRow, RowExecutor};
pub use task::RowTask;

use std::sync::Arc;

use log::{debug, warn};

use crate::error::{MatbenchError, Result};
use crate::kernels::check_operands;
use crate::matrix::DenseMatrix;

/// Computes `A × B` by dispatching one [`RowTask`] per row of A.
///
/// # Errors
///
/// - `DimensionMismatch` if the operands differ in size
/// - whatever `submit` returned (typically `ResourceUnavailable`) if a
///   submission is rejected
/// - `RowFailure` for the lowest-indexed row whose task failed, after all
///   submitted rows have been waited on
pub fn multiply_distributed<E>(
    a: &DenseMatrix,
    b: &DenseMatrix,
    executor: &E,
) -> Result<DenseMatrix>
where
    E: RowExecutor + ?Sized,
{
    let n = check_operands(a, b)?;
    let shared_b = Arc::new(b.clone());

    // Submit phase
    let mut pending = Vec::with_capacity(n);
    for (i, row) in a.rows_iter().enumerate() {
        let task = RowTask::new(i, row.to_vec(), Arc::clone(&shared_b));
        pending.push(executor.submit(task)?);
    }
    debug!("submitted {} row tasks", pending.len());

    // Collect phase
    let mut data = Vec::with_capacity(n * n);
    let mut first_failure = None;
    for (i, handle) in pending.into_iter().enumerate() {
        let outcome = handle.wait().and_then(|row| {
            if row.len() == n {
                Ok(row)
            } else {
                Err(MatbenchError::DimensionMismatch(format!(
                    "executor returned {} entries, expected {}",
                    row.len(),
                    n
                )))
            }
        });
        match outcome {
            Ok(row) => data.extend(row),
            Err(e) => {
                warn!("row {} failed: {}", i, e);
                first_failure.get_or_insert(MatbenchError::RowFailure {
                    row: i,
                    source: Box::new(e),
                });
            }
        }
    }

    match first_failure {
        Some(e) => Err(e),
        None => DenseMatrix::from_vec(n, data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::multiply_basic;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Runs tasks inline, failing the chosen rows
    struct FlakyExecutor {
        failing_rows: Vec<usize>,
        submitted: AtomicUsize,
    }

    impl RowExecutor for FlakyExecutor {
        fn submit(&self, task: RowTask) -> Result<PendingRow> {
            self.submitted.fetch_add(1, Ordering::SeqCst);
            let i = task.row_index();
            let result = if self.failing_rows.contains(&i) {
                Err(MatbenchError::ComputationFailure {
                    worker: 0,
                    message: format!("row {} exploded", i),
                })
            } else {
                task.run()
            };
            Ok(PendingRow::ready(i, result))
        }
    }

    /// Accepts a fixed number of tasks, then refuses
    struct LimitedExecutor {
        capacity: usize,
        submitted: AtomicUsize,
    }

    impl RowExecutor for LimitedExecutor {
        fn submit(&self, task: RowTask) -> Result<PendingRow> {
            if self.submitted.fetch_add(1, Ordering::SeqCst) >= self.capacity {
                return Err(MatbenchError::ResourceUnavailable("queue full".to_string()));
            }
            Ok(PendingRow::ready(task.row_index(), task.run()))
        }
    }

    fn sample(n: usize) -> DenseMatrix {
        let data = (0..n * n).map(|x| (x % 5) as f64 - 1.5).collect();
        DenseMatrix::from_vec(n, data).unwrap()
    }

    #[test]
    fn test_known_2x2() {
        let a = DenseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let b = DenseMatrix::from_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();
        let executor = LocalExecutor::new(2).unwrap();
        let c = multiply_distributed(&a, &b, &executor).unwrap();
        assert_eq!(c.to_rows(), vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
    }

    #[test]
    fn test_matches_basic() {
        let a = sample(9);
        let b = sample(9);
        let executor = LocalExecutor::new(3).unwrap();
        let c = multiply_distributed(&a, &b, &executor).unwrap();
        assert_eq!(c, multiply_basic(&a, &b).unwrap());
    }

    #[test]
    fn test_row_failure_is_not_zero_filled() {
        let executor = FlakyExecutor {
            failing_rows: vec![5, 2],
            submitted: AtomicUsize::new(0),
        };
        let err = multiply_distributed(&sample(6), &sample(6), &executor).unwrap_err();

        // Every row was submitted before collection began
        assert_eq!(executor.submitted.load(Ordering::SeqCst), 6);
        match err {
            MatbenchError::RowFailure { row, source } => {
                assert_eq!(row, 2);
                assert!(matches!(*source, MatbenchError::ComputationFailure { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejected_submission() {
        let executor = LimitedExecutor {
            capacity: 3,
            submitted: AtomicUsize::new(0),
        };
        let err = multiply_distributed(&sample(5), &sample(5), &executor).unwrap_err();
        assert!(matches!(err, MatbenchError::ResourceUnavailable(_)));
    }

    #[test]
    fn test_dimension_mismatch() {
        let executor = LocalExecutor::new(1).unwrap();
        let err = multiply_distributed(&sample(2), &sample(3), &executor).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_dyn_executor() {
        let executor: Box<dyn RowExecutor> = Box::new(LocalExecutor::new(1).unwrap());
        let identity = DenseMatrix::identity(3);
        let c = multiply_distributed(&identity, &sample(3), executor.as_ref()).unwrap();
        assert_eq!(c, sample(3));
    }
}
