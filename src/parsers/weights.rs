// ==============================================================================
// parsers/weights.rs - Reference Weight Table Parser
// ==============================================================================
// Description: Parser for per-aspect GO term weights derived from known disease genes
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited with header, GO id in the first column, weight in "Count"
// Example:
//   GO_ID       GO_Term          Count
//   GO:0005739  mitochondrion    42
//   GO:0003723  RNA binding      7
// ==============================================================================

use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use super::open_reader;

/// Name of the weight column
pub const COUNT_COLUMN: &str = "Count";

#[derive(Error, Debug)]
pub enum WeightParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid weight at line {line}: '{value}' (must be a finite, non-negative number)")]
    InvalidWeight { line: usize, value: String },

    #[error("Empty GO term identifier at line {line}")]
    EmptyGoId { line: usize },
}

/// GO term id -> non-negative weight for one aspect
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceWeights {
    weights: HashMap<String, f64>,
}

impl ReferenceWeights {
    pub fn parse(path: impl AsRef<Path>) -> Result<Self, WeightParseError> {
        let reader = open_reader(path.as_ref())?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, WeightParseError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let count_idx = headers
            .iter()
            .position(|h| h.trim() == COUNT_COLUMN)
            .ok_or_else(|| WeightParseError::MissingColumn(COUNT_COLUMN.to_string()))?;

        let mut weights = HashMap::new();

        for (idx, result) in reader.records().enumerate() {
            // Header occupies line 1
            let line = idx + 2;
            let record = result?;

            let go_id = record.get(0).map(str::trim).unwrap_or_default();
            if go_id.is_empty() {
                return Err(WeightParseError::EmptyGoId { line });
            }

            let raw = record.get(count_idx).map(str::trim).unwrap_or_default();
            let weight: f64 = raw.parse().map_err(|_| WeightParseError::InvalidWeight {
                line,
                value: raw.to_string(),
            })?;

            if !weight.is_finite() || weight < 0.0 {
                return Err(WeightParseError::InvalidWeight {
                    line,
                    value: raw.to_string(),
                });
            }

            weights.insert(go_id.to_string(), weight);
        }

        Ok(Self { weights })
    }

    /// Weight of a GO term, 0 when the term is not in the table
    pub fn get(&self, go_id: &str) -> f64 {
        self.weights.get(go_id).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, go_id: &str) -> bool {
        self.weights.contains_key(go_id)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl FromIterator<(String, f64)> for ReferenceWeights {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weights() {
        let contents = "GO_ID\tGO_Term\tCount\nGO:0005739\tmitochondrion\t42\nGO:0003723\tRNA binding\t7.5\n";
        let weights = ReferenceWeights::from_reader(contents.as_bytes()).unwrap();

        assert_eq!(weights.len(), 2);
        assert_eq!(weights.get("GO:0005739"), 42.0);
        assert_eq!(weights.get("GO:0003723"), 7.5);
        assert_eq!(weights.get("GO:0000000"), 0.0);
        assert!(!weights.contains("GO:0000000"));
    }

    #[test]
    fn test_count_column_found_by_name() {
        let contents = "GO_ID\tCount\tGO_Term\nGO:0000001\t3\tsomething\n";
        let weights = ReferenceWeights::from_reader(contents.as_bytes()).unwrap();
        assert_eq!(weights.get("GO:0000001"), 3.0);
    }

    #[test]
    fn test_missing_count_column() {
        let contents = "GO_ID\tGO_Term\nGO:0000001\tsomething\n";
        let err = ReferenceWeights::from_reader(contents.as_bytes()).unwrap_err();
        assert!(matches!(err, WeightParseError::MissingColumn(_)));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let contents = "GO_ID\tGO_Term\tCount\nGO:0000001\tok\t1\nGO:0000002\tbad\t-2\n";
        let err = ReferenceWeights::from_reader(contents.as_bytes()).unwrap_err();
        match err {
            WeightParseError::InvalidWeight { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "-2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_weight_rejected() {
        let contents = "GO_ID\tGO_Term\tCount\nGO:0000001\tbad\tmany\n";
        let err = ReferenceWeights::from_reader(contents.as_bytes()).unwrap_err();
        assert!(matches!(err, WeightParseError::InvalidWeight { line: 2, .. }));
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let weights = ReferenceWeights::from_reader("GO_ID\tGO_Term\tCount\n".as_bytes()).unwrap();
        assert!(weights.is_empty());
    }
}
