// ==============================================================================
// parsers/gaf.rs - GO Annotation File (GAF) Parser
// ==============================================================================
// Description: Parser for GO association files (goa_human.gaf / .gaf.gz)
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited, '!' header comments, 15 (GAF 1.0) or 17 (GAF 2.x) columns
// Example:
//   !gaf-version: 2.2
//   UniProtKB  A0A024RBG1  NUDT4B  enables  GO:0003723  GO_REF:0000043  IEA  ...  F  ...
// Only columns 2 (protein), 5 (GO id) and 9 (aspect) are used.
// ==============================================================================

use std::io::BufRead;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use super::open_reader;
use crate::models::{Aspect, AnnotationRecord};

/// Minimum column count of a GAF row (GAF 1.0)
pub const MIN_GAF_COLUMNS: usize = 15;

const PROTEIN_COLUMN: usize = 1;
const GO_ID_COLUMN: usize = 4;
const ASPECT_COLUMN: usize = 8;

/// Errors that can occur during GAF parsing
#[derive(Error, Debug)]
pub enum GafParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid GAF row at line {line}: {details}")]
    InvalidFormat { line: usize, details: String },

    #[error("Invalid aspect code '{code}' at line {line} (expected F, P or C)")]
    InvalidAspect { line: usize, code: String },

    #[error("File is empty or contains only comments")]
    EmptyFile,
}

/// GAF parser
///
/// Malformed rows are fatal by default. With `skip_malformed` they are
/// logged and counted in `skipped_count` instead.
#[derive(Debug, Clone, Default)]
pub struct GafParser {
    pub skip_malformed: bool,

    /// Rows rejected during the last parse (only non-zero when skipping)
    pub skipped_count: usize,
}

impl GafParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    /// Parse a GAF file (plain or gzip)
    pub fn parse(&mut self, path: impl AsRef<Path>) -> Result<Vec<AnnotationRecord>, GafParseError> {
        let reader = open_reader(path.as_ref())?;
        self.parse_reader(reader)
    }

    pub fn parse_reader<R: BufRead>(&mut self, reader: R) -> Result<Vec<AnnotationRecord>, GafParseError> {
        self.skipped_count = 0;
        let mut records = Vec::new();

        for (idx, line_result) in reader.lines().enumerate() {
            let line_number = idx + 1;
            let line = line_result?;
            let line = line.trim_end_matches('\r');

            if line.starts_with('!') || line.trim().is_empty() {
                continue;
            }

            match Self::parse_line(line, line_number) {
                Ok(record) => records.push(record),
                Err(e) if self.skip_malformed => {
                    warn!("Skipping malformed annotation row: {}", e);
                    self.skipped_count += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if records.is_empty() {
            return Err(GafParseError::EmptyFile);
        }

        debug!(
            "Parsed {} annotation records ({} skipped)",
            records.len(),
            self.skipped_count
        );

        Ok(records)
    }

    fn parse_line(line: &str, line_number: usize) -> Result<AnnotationRecord, GafParseError> {
        let fields: Vec<&str> = line.split('\t').collect();

        if fields.len() < MIN_GAF_COLUMNS {
            return Err(GafParseError::InvalidFormat {
                line: line_number,
                details: format!(
                    "Expected at least {} tab-delimited fields, found {}",
                    MIN_GAF_COLUMNS,
                    fields.len()
                ),
            });
        }

        let protein_id = fields[PROTEIN_COLUMN].trim();
        let go_id = fields[GO_ID_COLUMN].trim();
        let aspect_code = fields[ASPECT_COLUMN].trim();

        if protein_id.is_empty() {
            return Err(GafParseError::InvalidFormat {
                line: line_number,
                details: "Empty protein identifier".to_string(),
            });
        }
        if go_id.is_empty() {
            return Err(GafParseError::InvalidFormat {
                line: line_number,
                details: "Empty GO term identifier".to_string(),
            });
        }

        let aspect = Aspect::from_code(aspect_code).ok_or_else(|| GafParseError::InvalidAspect {
            line: line_number,
            code: aspect_code.to_string(),
        })?;

        Ok(AnnotationRecord {
            protein_id: protein_id.to_string(),
            go_id: go_id.to_string(),
            aspect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn gaf_row(protein: &str, go_id: &str, aspect: &str) -> String {
        format!(
            "UniProtKB\t{}\tGENE\tenables\t{}\tGO_REF:0000043\tIEA\t\t{}\tName\t\tprotein\ttaxon:9606\t20240101\tUniProt\t\t\n",
            protein, go_id, aspect
        )
    }

    #[test]
    fn test_parse_valid_file() {
        let mut contents = String::from("!gaf-version: 2.2\n!generated-by: GOC\n");
        contents.push_str(&gaf_row("P12345", "GO:0003723", "F"));
        contents.push_str(&gaf_row("P12345", "GO:0005739", "C"));
        contents.push_str(&gaf_row("Q99999", "GO:0006412", "P"));
        let file = create_test_file(&contents);

        let records = GafParser::new().parse(file.path()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].protein_id, "P12345");
        assert_eq!(records[0].go_id, "GO:0003723");
        assert_eq!(records[0].aspect, Aspect::Function);
        assert_eq!(records[1].aspect, Aspect::Component);
        assert_eq!(records[2].protein_id, "Q99999");
        assert_eq!(records[2].aspect, Aspect::Process);
    }

    #[test]
    fn test_first_data_row_is_not_a_header() {
        let contents = gaf_row("P1", "GO:0000001", "F");
        let file = create_test_file(&contents);

        let records = GafParser::new().parse(file.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_short_row_is_rejected() {
        let mut contents = gaf_row("P1", "GO:0000001", "F");
        contents.push_str("UniProtKB\tP2\tGENE\tenables\tGO:0000002\n");
        let file = create_test_file(&contents);

        let err = GafParser::new().parse(file.path()).unwrap_err();
        match err {
            GafParseError::InvalidFormat { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_aspect_is_rejected() {
        let contents = gaf_row("P1", "GO:0000001", "X");
        let file = create_test_file(&contents);

        let err = GafParser::new().parse(file.path()).unwrap_err();
        assert!(matches!(err, GafParseError::InvalidAspect { line: 1, .. }));
    }

    #[test]
    fn test_skip_malformed_counts_rows() {
        let mut contents = gaf_row("P1", "GO:0000001", "F");
        contents.push_str("too\tshort\n");
        contents.push_str(&gaf_row("", "GO:0000002", "P"));
        contents.push_str(&gaf_row("P3", "GO:0000003", "C"));
        let file = create_test_file(&contents);

        let mut parser = GafParser::new().with_skip_malformed(true);
        let records = parser.parse(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(parser.skipped_count, 2);
    }

    #[test]
    fn test_comments_only_is_empty() {
        let file = create_test_file("!gaf-version: 2.2\n\n");
        let err = GafParser::new().parse(file.path()).unwrap_err();
        assert!(matches!(err, GafParseError::EmptyFile));
    }
}
