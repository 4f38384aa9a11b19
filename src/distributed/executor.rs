//! Executors that accept row tasks and hand back pending results

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Mutex;

use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::distributed::RowTask;
use crate::error::{panic_message, MatbenchError, Result};

/// Something that can run [`RowTask`]s, locally or on another machine.
///
/// `submit` must not block on the computation itself; the result is
/// collected later through the returned [`PendingRow`].
pub trait RowExecutor {
    fn submit(&self, task: RowTask) -> Result<PendingRow>;
}

/// Handle to a row that has been submitted but not yet collected.
#[derive(Debug)]
pub struct PendingRow {
    row_index: usize,
    receiver: mpsc::Receiver<Result<Vec<f64>>>,
}

impl PendingRow {
    /// Creates a handle together with the sender the worker reports through
    pub fn channel(row_index: usize) -> (mpsc::Sender<Result<Vec<f64>>>, Self) {
        let (sender, receiver) = mpsc::channel();
        (sender, Self { row_index, receiver })
    }

    /// Creates a handle whose result is already known
    pub fn ready(row_index: usize, result: Result<Vec<f64>>) -> Self {
        let (sender, pending) = Self::channel(row_index);
        // The receiver is alive, so the send cannot fail
        let _ = sender.send(result);
        pending
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// Blocks until the row is available.
    ///
    /// A worker that went away without reporting surfaces as
    /// `ResourceUnavailable`.
    pub fn wait(self) -> Result<Vec<f64>> {
        self.receiver.recv().unwrap_or_else(|_| {
            Err(MatbenchError::ResourceUnavailable(format!(
                "worker for row {} disconnected before reporting",
                self.row_index
            )))
        })
    }
}

/// In-process executor backed by a dedicated rayon thread pool.
pub struct LocalExecutor {
    pool: Mutex<Option<ThreadPool>>,
}

impl LocalExecutor {
    /// Creates an executor with `n_threads` workers
    pub fn new(n_threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("row-worker-{}", i))
            .build()
            .map_err(|e| MatbenchError::ResourceUnavailable(e.to_string()))?;
        Ok(Self {
            pool: Mutex::new(Some(pool)),
        })
    }

    /// Stops accepting tasks. Work already queued still completes.
    pub fn shutdown(&self) {
        if let Ok(mut pool) = self.pool.lock() {
            pool.take();
        }
    }
}

impl RowExecutor for LocalExecutor {
    fn submit(&self, task: RowTask) -> Result<PendingRow> {
        let guard = self
            .pool
            .lock()
            .map_err(|_| MatbenchError::ResourceUnavailable("executor lock poisoned".to_string()))?;
        let pool = guard.as_ref().ok_or_else(|| {
            MatbenchError::ResourceUnavailable("executor has been shut down".to_string())
        })?;

        let row_index = task.row_index();
        let (sender, pending) = PendingRow::channel(row_index);
        debug!("submitting row {}", row_index);

        pool.spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| task.run()))
                .unwrap_or_else(|payload| {
                    Err(MatbenchError::ComputationFailure {
                        worker: rayon::current_thread_index().unwrap_or(0),
                        message: panic_message(payload.as_ref()),
                    })
                });
            // The caller may have given up on this row
            let _ = sender.send(result);
        });

        Ok(pending)
    }
}
