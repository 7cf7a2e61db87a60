//! Registry CSV tokenizing
//!
//! Rows are one per line with double-quoted fields. Input must be UTF-8;
//! the first invalid line fails the whole file.

use csv_core::ReadFieldResult;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const BOM: &str = "\u{feff}";

/// CSV reading errors
#[derive(Debug, Error)]
pub enum ReadError {
    /// File could not be read
    #[error("Read {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Line is not valid UTF-8
    #[error("Invalid input: {path} line {line} is not UTF-8")]
    Encoding { path: PathBuf, line: usize },
}

/// One tokenized row with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Tokenize a single line into fields, removing quoting
pub fn parse_line(line: &str) -> Vec<String> {
    let mut rdr = csv_core::Reader::new();
    let mut input = line.as_bytes();
    let mut output = [0; 4096];
    let mut field = Vec::new();
    let mut fields = Vec::new();

    loop {
        let (result, nin, nout) = rdr.read_field(input, &mut output);
        field.extend_from_slice(&output[..nout]);
        input = &input[nin..];
        match result {
            // Exhausted input; the next call with an empty slice flushes the last field
            ReadFieldResult::InputEmpty | ReadFieldResult::OutputFull => {}
            ReadFieldResult::Field { record_end } => {
                fields.push(String::from_utf8_lossy(&field).into_owned());
                field.clear();
                if record_end {
                    break;
                }
            }
            ReadFieldResult::End => break,
        }
    }
    fields
}

/// Read and tokenize every non-blank line of `path`
pub fn read_rows(path: &Path) -> Result<Vec<CsvRow>, ReadError> {
    let bytes = std::fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rows = Vec::new();
    for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = index + 1;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let text = std::str::from_utf8(raw).map_err(|_| ReadError::Encoding {
            path: path.to_path_buf(),
            line,
        })?;
        let text = if line == 1 { text.trim_start_matches(BOM) } else { text };
        if text.trim().is_empty() {
            continue;
        }
        rows.push(CsvRow {
            line,
            fields: parse_line(text),
        });
    }
    debug!(path = %path.display(), rows = rows.len(), "CSV read");
    Ok(rows)
}
