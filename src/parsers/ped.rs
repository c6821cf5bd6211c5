// ==============================================================================
// parsers/ped.rs - PED Pedigree Parser
// ==============================================================================
// Description: Parser for six-column PED pedigree files
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited, no header
//   family_id  individual_id  father_id  mother_id  sex  phenotype
//   FAM1       P001           F001       M001       1    2
// A parent id of "0" means the parent is not in the cohort.
// ==============================================================================

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

use super::open_reader;

/// Parent id used for founders / unknown parents
pub const UNKNOWN_PARENT: &str = "0";

const PED_COLUMNS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct PedRecord {
    pub family_id: String,
    pub individual_id: String,
    pub father_id: String,
    pub mother_id: String,
    pub sex: String,
    pub phenotype: String,
}

impl PedRecord {
    pub fn father(&self) -> Option<&str> {
        Some(self.father_id.as_str()).filter(|id| *id != UNKNOWN_PARENT)
    }

    pub fn mother(&self) -> Option<&str> {
        Some(self.mother_id.as_str()).filter(|id| *id != UNKNOWN_PARENT)
    }
}

#[derive(Error, Debug)]
pub enum PedParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid PED line {line}: {details}")]
    InvalidFormat { line: usize, details: String },

    #[error("PED file is empty")]
    EmptyFile,
}

/// Pedigree indexed by individual id
#[derive(Debug, Clone, Default)]
pub struct Pedigree {
    records: Vec<PedRecord>,
    by_individual: HashMap<String, usize>,
}

impl Pedigree {
    pub fn parse(path: impl AsRef<Path>) -> Result<Self, PedParseError> {
        let reader = open_reader(path.as_ref())?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, PedParseError> {
        let mut pedigree = Self::default();

        for (idx, line_result) in reader.lines().enumerate() {
            let line_number = idx + 1;
            let line = line_result?;
            let line = line.trim_end_matches('\r');

            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            if fields.len() < PED_COLUMNS {
                return Err(PedParseError::InvalidFormat {
                    line: line_number,
                    details: format!(
                        "Expected {} tab-delimited fields, found {}",
                        PED_COLUMNS,
                        fields.len()
                    ),
                });
            }

            pedigree.push(PedRecord {
                family_id: fields[0].to_string(),
                individual_id: fields[1].to_string(),
                father_id: fields[2].to_string(),
                mother_id: fields[3].to_string(),
                sex: fields[4].to_string(),
                phenotype: fields[5].to_string(),
            });
        }

        if pedigree.records.is_empty() {
            return Err(PedParseError::EmptyFile);
        }

        Ok(pedigree)
    }

    fn push(&mut self, record: PedRecord) {
        // First row for an individual wins
        self.by_individual
            .entry(record.individual_id.clone())
            .or_insert(self.records.len());
        self.records.push(record);
    }

    pub fn get(&self, individual_id: &str) -> Option<&PedRecord> {
        self.by_individual
            .get(individual_id)
            .map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<PedRecord> for Pedigree {
    fn from_iter<I: IntoIterator<Item = PedRecord>>(iter: I) -> Self {
        let mut pedigree = Self::default();
        for record in iter {
            pedigree.push(record);
        }
        pedigree
    }
}
