//! CSV persistence of benchmark summaries

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::bench::BenchResult;
use crate::error::{MatbenchError, Result};

pub const CSV_HEADER: &str = "algorithm,size,runs,mean,stdev,best,worst,memory";

/// Appends benchmark results to a CSV file, writing the header once
pub struct CsvReport {
    path: PathBuf,
}

impl CsvReport {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row per result, creating the file and its parent
    /// directory if needed
    pub fn append(&self, results: &[BenchResult]) -> Result<()> {
        let io_error = |source| MatbenchError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_error)?;

        if needs_header {
            writeln!(file, "{}", CSV_HEADER).map_err(io_error)?;
        }
        for result in results {
            writeln!(file, "{}", format_row(result)).map_err(io_error)?;
        }
        Ok(())
    }
}

/// Formats one result as a CSV line (without the newline)
pub fn format_row(result: &BenchResult) -> String {
    let s = &result.summary;
    format!(
        "{},{},{},{:.6},{:.6},{:.6},{:.6},{:.0}",
        result.algorithm.label(),
        result.size,
        s.runs,
        s.mean,
        s.stdev,
        s.best,
        s.worst,
        s.memory
    )
}
