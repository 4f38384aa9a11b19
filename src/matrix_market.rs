//! Matrix Market coordinate-format reader and writer
//!
//! Only the real-valued coordinate layout is supported:
//!
//! ```text
//! %%MatrixMarket matrix coordinate real general
//! % any number of comment lines
//! <rows> <cols> <nnz>
//! <row> <col> <value>      (nnz lines, 1-based indices)
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{info, warn};

use crate::error::{MatbenchError, Result};
use crate::matrix::CsrMatrix;

/// Upper bound on up-front triplet allocation; a lying header should not
/// reserve gigabytes before the first entry is read.
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 20;

/// Reads a Matrix Market file into CSR form.
///
/// Fails with `Io` if the file cannot be read, `MissingHeader` if it has
/// no non-comment line, and `Parse` for a malformed header or entry, an
/// index outside the declared shape, or fewer than `nnz` entries.
pub fn load_csr<P: AsRef<Path>>(path: P) -> Result<CsrMatrix> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| MatbenchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let matrix = read_csr(BufReader::new(file), path)?;
    info!(
        "loaded {}: {}x{} with {} non-zeros",
        path.display(),
        matrix.n_rows(),
        matrix.n_cols(),
        matrix.nnz()
    );
    Ok(matrix)
}

/// Parses Matrix Market text from any reader. `path` only labels errors.
pub fn read_csr<R: BufRead>(reader: R, path: &Path) -> Result<CsrMatrix> {
    let io_error = |source| MatbenchError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut lines = reader.lines().enumerate().map(|(i, line)| (i + 1, line));

    // Skip comments and read header
    let mut header = None;
    for (line_no, line) in lines.by_ref() {
        let line = line.map_err(io_error)?;
        let trimmed = line.trim();
        if trimmed.starts_with('%') || trimmed.is_empty() {
            continue;
        }
        header = Some((line_no, line));
        break;
    }
    let (header_line, header) = header.ok_or_else(|| MatbenchError::MissingHeader {
        path: path.to_path_buf(),
    })?;

    // Parse header: rows cols nnz
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(MatbenchError::parse(
            path,
            header_line,
            format!("expected `rows cols nnz`, found {} fields", fields.len()),
        ));
    }
    let parse_count = |field: &str, name: &str| -> Result<usize> {
        field.parse().map_err(|_| {
            MatbenchError::parse(path, header_line, format!("invalid {} `{}`", name, field))
        })
    };
    let n_rows = parse_count(fields[0], "number of rows")?;
    let n_cols = parse_count(fields[1], "number of columns")?;
    let nnz = parse_count(fields[2], "number of non-zeros")?;

    // The header's row count is untrusted until its counters fit in memory
    let mut row_count = CsrMatrix::row_counts(n_rows).map_err(|e| {
        MatbenchError::parse(path, header_line, format!("cannot hold {} rows: {}", n_rows, e))
    })?;

    // Read triplets
    let mut triplets = Vec::with_capacity(nnz.min(MAX_PREALLOCATED_ENTRIES));
    let mut last_line = header_line;
    while triplets.len() < nnz {
        let Some((line_no, line)) = lines.next() else {
            break;
        };
        let line = line.map_err(io_error)?;
        last_line = line_no;
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_entry(&line, line_no, n_rows, n_cols, path)?;
        row_count[entry.0] += 1;
        triplets.push(entry);
    }

    if triplets.len() < nnz {
        return Err(MatbenchError::parse(
            path,
            last_line,
            format!("expected {} entries, found {}", nnz, triplets.len()),
        ));
    }

    let trailing = lines
        .filter(|(_, l)| l.as_ref().map_or(true, |l| !l.trim().is_empty()))
        .count();
    if trailing > 0 {
        warn!("{}: ignoring {} lines after the last entry", path.display(), trailing);
    }

    CsrMatrix::from_row_counts(n_cols, row_count, &triplets)
        .map_err(|e| MatbenchError::parse(path, header_line, e.to_string()))
}

/// Parses one `row col value` line into a 0-based triplet
fn parse_entry(
    line: &str,
    line_no: usize,
    n_rows: usize,
    n_cols: usize,
    path: &Path,
) -> Result<(usize, usize, f64)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(MatbenchError::parse(
            path,
            line_no,
            format!("expected `row col value`, found {} fields", fields.len()),
        ));
    }

    let index = |field: &str, limit: usize, name: &str| -> Result<usize> {
        let one_based: usize = field.parse().map_err(|_| {
            MatbenchError::parse(path, line_no, format!("invalid {} index `{}`", name, field))
        })?;
        if one_based == 0 || one_based > limit {
            return Err(MatbenchError::parse(
                path,
                line_no,
                format!("{} index {} outside 1..={}", name, one_based, limit),
            ));
        }
        // Convert from 1-indexed to 0-indexed
        Ok(one_based - 1)
    };

    let row = index(fields[0], n_rows, "row")?;
    let col = index(fields[1], n_cols, "column")?;
    let value: f64 = fields[2].parse().map_err(|_| {
        MatbenchError::parse(path, line_no, format!("invalid value `{}`", fields[2]))
    })?;

    Ok((row, col, value))
}

/// Writes a matrix in Matrix Market coordinate format, entries in CSR order
pub fn write_csr<P: AsRef<Path>>(path: P, matrix: &CsrMatrix) -> Result<()> {
    let path = path.as_ref();
    let io_error = |source| MatbenchError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "%%MatrixMarket matrix coordinate real general").map_err(io_error)?;
    writeln!(out, "{} {} {}", matrix.n_rows(), matrix.n_cols(), matrix.nnz()).map_err(io_error)?;

    for i in 0..matrix.n_rows() {
        for (j, val) in matrix.row_iter(i) {
            // Convert to 1-indexed
            writeln!(out, "{} {} {:?}", i + 1, j + 1, val).map_err(io_error)?;
        }
    }

    out.flush().map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn parse(text: &str) -> Result<CsrMatrix> {
        read_csr(Cursor::new(text), &PathBuf::from("test.mtx"))
    }

    #[test]
    fn test_two_by_two() {
        let m = parse("2 2 2\n1 1 5.0\n2 2 7.0\n").unwrap();
        assert_eq!((m.n_rows(), m.n_cols(), m.nnz()), (2, 2, 2));
        assert_eq!(m.multiply(&[1.0, 1.0]).unwrap(), vec![5.0, 7.0]);
    }

    #[test]
    fn test_matrix_market_format() {
        let mtx_content = "%%MatrixMarket matrix coordinate real general\n\
                          % generated\n\
                          3 3 5\n\
                          3 3 5.0\n\
                          1 1 1.0\n\
                          2 2 3.0\n\
                          3 1 4.0\n\
                          1 3 2.0\n";

        let matrix = parse(mtx_content).unwrap();

        assert_eq!(matrix.row_ptr(), vec![0, 2, 3, 5]);
        // Row-grouped, each row in file order
        assert_eq!(matrix.col_idx(), vec![0, 2, 1, 2, 0]);
        assert_eq!(matrix.values(), vec![1.0, 2.0, 3.0, 5.0, 4.0]);
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse(""), Err(MatbenchError::MissingHeader { .. })));
    }

    #[test]
    fn test_only_comments() {
        let result = parse("%%MatrixMarket\n% nothing\n");
        assert!(matches!(result, Err(MatbenchError::MissingHeader { .. })));
    }

    #[test]
    fn test_malformed_header() {
        let err = parse("2 two 2\n1 1 1.0\n").unwrap_err();
        match err {
            MatbenchError::Parse { line, message, .. } => {
                assert_eq!(line, 1);
                assert!(message.contains("columns"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(parse("2 2\n").is_err());
    }

    #[test]
    fn test_malformed_entries() {
        assert!(matches!(parse("2 2 1\n1 x 1.0\n"), Err(MatbenchError::Parse { line: 2, .. })));
        assert!(matches!(parse("2 2 1\n1 1 abc\n"), Err(MatbenchError::Parse { line: 2, .. })));
        assert!(matches!(parse("2 2 1\n1 1\n"), Err(MatbenchError::Parse { line: 2, .. })));
        assert!(matches!(parse("2 2 1\n1 1 1.0 9\n"), Err(MatbenchError::Parse { .. })));
    }

    #[test]
    fn test_index_out_of_range() {
        assert!(parse("2 2 1\n0 1 1.0\n").is_err());
        assert!(parse("2 2 1\n3 1 1.0\n").is_err());
        assert!(parse("2 2 1\n1 3 1.0\n").is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_header_row_count_too_large() {
        // usize::MAX counters cannot be addressed
        let err = parse("18446744073709551615 1 0\n").unwrap_err();
        assert!(matches!(err, MatbenchError::Parse { line: 1, .. }));
        assert!(err.to_string().contains("test.mtx"));

        // 2^61 row counters need 2^64 bytes
        let err = parse("% huge\n2305843009213693952 1 0\n").unwrap_err();
        assert!(matches!(err, MatbenchError::Parse { line: 2, .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_truncated() {
        let err = parse("3 3 3\n1 1 1.0\n2 2 2.0\n").unwrap_err();
        assert!(err.to_string().contains("expected 3 entries, found 2"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_blank_lines_and_trailing_data() {
        let m = parse("\n2 2 1\n\n2 1 -3.5\n1 1 9.0\n").unwrap();
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.multiply(&[2.0, 0.0]).unwrap(), vec![0.0, -7.0]);
    }

    #[test]
    fn test_error_names_file() {
        let err = parse("").unwrap_err();
        assert!(err.to_string().contains("test.mtx"));
    }
}
