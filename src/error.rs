//! Error types shared by the kernels, the loader and the distributed path.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading matrices or running a kernel.
#[derive(Debug, Error)]
pub enum MatbenchError {
    /// The input file could not be opened or read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is empty or contains only comment lines.
    #[error("Invalid Matrix Market file {}: missing header", path.display())]
    MissingHeader { path: PathBuf },

    /// A header or data line could not be parsed.
    #[error("Invalid Matrix Market file {}, line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Operands do not have compatible shapes.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A tuning parameter is out of range (zero workers, zero block size).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A worker panicked while computing its row block.
    #[error("Worker {worker} failed: {message}")]
    ComputationFailure { worker: usize, message: String },

    /// A distributed row task failed.
    #[error("Row {row} failed: {source}")]
    RowFailure {
        row: usize,
        #[source]
        source: Box<MatbenchError>,
    },

    /// The executor refused the task or is no longer reachable.
    #[error("Executor unavailable: {0}")]
    ResourceUnavailable(String),
}

impl MatbenchError {
    /// Whether this error was caused by bad input rather than a runtime fault.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MatbenchError::Io { .. }
                | MatbenchError::MissingHeader { .. }
                | MatbenchError::Parse { .. }
                | MatbenchError::DimensionMismatch(_)
                | MatbenchError::InvalidArgument(_)
        )
    }

    pub(crate) fn parse(path: &std::path::Path, line: usize, message: impl Into<String>) -> Self {
        MatbenchError::Parse {
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, MatbenchError>;

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
