// ==============================================================================
// parsers/table.rs - Delimited Table Reader
// ==============================================================================
// Description: Header-addressed TSV/CSV tables for the annotation and filter tools
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use super::open_reader;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Row at line {line} has {found} fields, expected at least {expected}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("File is empty (no header row)")]
    EmptyFile,
}

/// In-memory delimited table with a header row
///
/// Cells are kept verbatim so that tools which only append or drop rows
/// reproduce their input byte for byte.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Read a tab-delimited file (plain or gzip)
    pub fn read_tsv(path: impl AsRef<Path>) -> Result<Self, TableError> {
        Self::read_delimited(path, b'\t')
    }

    pub fn read_delimited(path: impl AsRef<Path>, delimiter: u8) -> Result<Self, TableError> {
        let reader = open_reader(path.as_ref())?;
        Self::from_reader(reader, delimiter)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, TableError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = reader.records();

        let headers: Vec<String> = match records.next() {
            Some(header) => header?.iter().map(|h| h.trim().to_string()).collect(),
            None => return Err(TableError::EmptyFile),
        };

        let mut rows = Vec::new();
        for (idx, result) in records.enumerate() {
            let record = result?;
            if record.len() < headers.len() {
                // A lone empty field is a blank line
                if record.len() == 1 && record.get(0).is_some_and(|f| f.trim().is_empty()) {
                    continue;
                }
                return Err(TableError::ShortRow {
                    line: idx + 2,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Index of a column by exact header name
    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Fail unless the table has at least `count` columns
    pub fn require_columns(&self, count: usize) -> Result<(), TableError> {
        if self.headers.len() < count {
            return Err(TableError::ShortRow {
                line: 1,
                expected: count,
                found: self.headers.len(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
