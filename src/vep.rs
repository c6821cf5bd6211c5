// ==============================================================================
// vep.rs - Inheritance and VEP Score Join
// ==============================================================================
// Description: Appends OMIM inheritance modes and per-protein VEP predictor
//              scores to proband variant rows
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// VEP directory layout:
//   <vep_dir>/<uniprot_id>.csv   variant,ESM-1v,AlphaMissense,CPT,GEMME,popEVE
//                                M1A,-4.2,0.11,0.35,-2.9,0.4
// Scores are looked up only for missense variants, keyed by
// wild_type + uniprot_start + mutant (e.g. "M1A").
// ==============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::models::{join_list, MISSING_VALUE};
use crate::parsers::{Table, TableError};

/// Predictor columns appended to every row, in output order
pub const VEP_PREDICTORS: [&str; 5] = ["ESM-1v", "AlphaMissense", "CPT", "GEMME", "popEVE"];

pub const INHERITANCE_COLUMN: &str = "inheritance";
pub const MISSENSE_CONSEQUENCE: &str = "missense_variant";

const VARIANT_COLUMN: &str = "variant";

/// OMIM inheritance modes by UniProt id, in file order
#[derive(Debug, Clone, Default)]
pub struct OmimInheritance {
    modes: HashMap<String, Vec<String>>,
}

impl OmimInheritance {
    pub fn from_table(table: &Table) -> Result<Self, TableError> {
        let id_column = table.column_index("uniprot_id")?;
        let mode_column = table.column_index(INHERITANCE_COLUMN)?;

        let mut modes: HashMap<String, Vec<String>> = HashMap::new();
        for row in &table.rows {
            let mode = row[mode_column].trim();
            if mode.is_empty() {
                continue;
            }
            modes
                .entry(row[id_column].trim().to_string())
                .or_default()
                .push(mode.to_string());
        }

        Ok(Self { modes })
    }

    pub fn modes(&self, uniprot_id: &str) -> &[String] {
        self.modes.get(uniprot_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One protein's VEP scores keyed by substitution
#[derive(Debug, Clone, Default)]
pub struct VepTable {
    /// Which predictors the file provides
    present: [bool; VEP_PREDICTORS.len()],
    scores: HashMap<String, [String; VEP_PREDICTORS.len()]>,
}

impl VepTable {
    pub fn from_table(table: &Table) -> Result<Self, TableError> {
        let variant = table.column_index(VARIANT_COLUMN)?;
        let columns: Vec<Option<usize>> = VEP_PREDICTORS
            .iter()
            .map(|name| table.column_index(name).ok())
            .collect();

        let mut present = [false; VEP_PREDICTORS.len()];
        for (slot, column) in present.iter_mut().zip(&columns) {
            *slot = column.is_some();
        }

        let mut scores = HashMap::with_capacity(table.len());
        for row in &table.rows {
            let values: [String; VEP_PREDICTORS.len()] = std::array::from_fn(|i| {
                columns[i]
                    .map(|c| row[c].trim().to_string())
                    .unwrap_or_default()
            });
            // First row for a substitution wins
            scores
                .entry(row[variant].trim().to_string())
                .or_insert(values);
        }

        Ok(Self { present, scores })
    }

    /// Predictor values for a substitution; `.` for anything unavailable
    pub fn lookup(&self, uniprot_id: &str, substitution: &str) -> [String; VEP_PREDICTORS.len()] {
        let Some(values) = self.scores.get(substitution) else {
            warn!("No VEP scores for {} {}", uniprot_id, substitution);
            return missing_scores();
        };

        std::array::from_fn(|i| {
            if !self.present[i] {
                warn!("{}: no {} column", uniprot_id, VEP_PREDICTORS[i]);
                MISSING_VALUE.to_string()
            } else if values[i].is_empty() {
                warn!(
                    "{} {}: empty {} value",
                    uniprot_id, substitution, VEP_PREDICTORS[i]
                );
                MISSING_VALUE.to_string()
            } else {
                values[i].clone()
            }
        })
    }
}

fn missing_scores() -> [String; VEP_PREDICTORS.len()] {
    std::array::from_fn(|_| MISSING_VALUE.to_string())
}

/// Lazily loaded per-protein VEP tables; each file is read at most once
#[derive(Debug)]
pub struct VepScoreCache {
    dir: PathBuf,
    tables: HashMap<String, Option<VepTable>>,
}

impl VepScoreCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            tables: HashMap::new(),
        }
    }

    pub fn path_for(&self, uniprot_id: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", uniprot_id))
    }

    /// Table for a protein, or `None` if its file is missing or unreadable
    pub fn get(&mut self, uniprot_id: &str) -> Option<&VepTable> {
        if !self.tables.contains_key(uniprot_id) {
            let loaded = self.load(uniprot_id);
            self.tables.insert(uniprot_id.to_string(), loaded);
        }
        self.tables.get(uniprot_id).and_then(Option::as_ref)
    }

    fn load(&self, uniprot_id: &str) -> Option<VepTable> {
        let path = self.path_for(uniprot_id);
        if !path.is_file() {
            warn!("VEP file not found: {:?}", path);
            return None;
        }

        let result = Table::read_delimited(&path, b',').and_then(|t| VepTable::from_table(&t));
        match result {
            Ok(table) => {
                debug!("Loaded {} VEP substitutions from {:?}", table.scores.len(), path);
                Some(table)
            }
            Err(TableError::EmptyFile) => {
                warn!("Empty VEP file: {:?}", path);
                None
            }
            Err(e) => {
                warn!("Unreadable VEP file {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn loaded(&self) -> usize {
        self.tables.len()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct VepJoinSummary {
    pub rows: usize,
    pub missense: usize,
    pub with_inheritance: usize,
}

struct ProbandColumns {
    uniprot_id: usize,
    wild_type: usize,
    uniprot_start: usize,
    mutant: usize,
    consequence: usize,
}

impl ProbandColumns {
    fn locate(table: &Table) -> Result<Self, TableError> {
        Ok(Self {
            uniprot_id: table.column_index("uniprot_id")?,
            wild_type: table.column_index("wild_type")?,
            uniprot_start: table.column_index("uniprot_start")?,
            mutant: table.column_index("mutant")?,
            consequence: table.column_index("consequence")?,
        })
    }
}

/// Append `inheritance` and the five predictor columns to every proband row
pub fn annotate_probands(
    table: &mut Table,
    omim: &OmimInheritance,
    cache: &mut VepScoreCache,
) -> Result<VepJoinSummary, TableError> {
    let columns = ProbandColumns::locate(table)?;

    table.headers.push(INHERITANCE_COLUMN.to_string());
    table
        .headers
        .extend(VEP_PREDICTORS.iter().map(|p| p.to_string()));

    let mut summary = VepJoinSummary::default();

    for row in table.rows.iter_mut() {
        let uniprot_id = row[columns.uniprot_id].trim().to_string();

        let modes = omim.modes(&uniprot_id);
        if !modes.is_empty() {
            summary.with_inheritance += 1;
        }

        let scores = if row[columns.consequence].trim() == MISSENSE_CONSEQUENCE {
            summary.missense += 1;
            let substitution = format!(
                "{}{}{}",
                row[columns.wild_type].trim(),
                row[columns.uniprot_start].trim(),
                row[columns.mutant].trim()
            );
            match cache.get(&uniprot_id) {
                Some(vep) => vep.lookup(&uniprot_id, &substitution),
                None => missing_scores(),
            }
        } else {
            missing_scores()
        };

        row.push(join_list(modes));
        row.extend(scores);
        summary.rows += 1;
    }

    info!(
        "Annotated {} rows ({} missense, {} with OMIM inheritance, {} VEP files read)",
        summary.rows,
        summary.missense,
        summary.with_inheritance,
        cache.loaded()
    );

    Ok(summary)
}
