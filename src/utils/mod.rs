//! Utility functions and helpers

use std::collections::TryReserveError;

pub mod formats;

pub use formats::{from_ndarray, from_sprs_csr, to_ndarray, to_sprs_csr};

/// Computes an exclusive prefix sum (scan) for a vector
///
/// The output has `input.len() + 1` entries; its allocation is fallible so
/// oversized row counts surface as an error instead of an abort.
pub fn exclusive_scan(input: &[usize]) -> Result<Vec<usize>, TryReserveError> {
    let mut result = Vec::new();
    result.try_reserve_exact(input.len() + 1)?;
    let mut sum = 0;

    result.push(0); // First element is always 0

    for &val in input {
        sum += val;
        result.push(sum);
    }

    Ok(result)
}
