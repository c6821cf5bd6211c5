// ==============================================================================
// go_counts.rs - Reference Weight Builder
// ==============================================================================
// Description: Sums disease-gene GO annotations into per-aspect weight tables
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Input (disease-gene TSV, header row):
//   gene  n_probands  uniprot_id  ...
//   POLG  12          P54098
// Each of the gene's distinct GO terms receives n_probands (or 1 per gene in
// unweighted mode) under the aspect it is annotated with.
// ==============================================================================

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::enrichment::AnnotationIndex;
use crate::models::{join_list, Aspect, PerAspect};
use crate::parsers::{GoLabels, Table, TableError};

const N_PROBANDS_COLUMN: usize = 1;
const UNIPROT_COLUMN: usize = 2;

#[derive(Error, Debug)]
pub enum GoCountsError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Invalid proband count '{value}' at line {line}")]
    InvalidProbandCount { line: usize, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseGene {
    pub uniprot_id: String,
    pub n_probands: u64,
}

/// How each gene contributes to the terms it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountMode {
    /// Add the gene's proband count
    #[default]
    ProbandWeighted,
    /// Add 1 per gene
    PerGene,
}

impl CountMode {
    /// Output file name for one aspect's weight table
    pub fn file_name(&self, aspect: Aspect) -> String {
        match self {
            CountMode::ProbandWeighted => {
                format!("{}_counts_weighted_n_probands.tsv", aspect.code())
            }
            CountMode::PerGene => format!("{}_counts_unweighted.tsv", aspect.code()),
        }
    }
}

/// Read disease genes from a parsed table (column 1 = probands, column 2 = UniProt id)
pub fn disease_genes(table: &Table) -> Result<Vec<DiseaseGene>, GoCountsError> {
    table.require_columns(UNIPROT_COLUMN + 1)?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let raw = row[N_PROBANDS_COLUMN].trim();
            let n_probands = raw
                .parse()
                .map_err(|_| GoCountsError::InvalidProbandCount {
                    line: idx + 2,
                    value: raw.to_string(),
                })?;
            Ok(DiseaseGene {
                uniprot_id: row[UNIPROT_COLUMN].trim().to_string(),
                n_probands,
            })
        })
        .collect()
}

/// Per-aspect weight of every GO term carried by the disease genes
///
/// Genes absent from the annotation index contribute nothing.
pub fn reference_weights(
    genes: &[DiseaseGene],
    index: &AnnotationIndex,
    mode: CountMode,
) -> PerAspect<BTreeMap<String, f64>> {
    let mut weights: PerAspect<BTreeMap<String, f64>> = PerAspect::default();
    let mut unannotated = 0usize;

    for gene in genes {
        let Some(terms) = index.get(&gene.uniprot_id) else {
            unannotated += 1;
            debug!("No GO annotations for {}", gene.uniprot_id);
            continue;
        };

        let increment = match mode {
            CountMode::ProbandWeighted => gene.n_probands as f64,
            CountMode::PerGene => 1.0,
        };

        for aspect in Aspect::ALL {
            for go_id in &terms[aspect] {
                *weights[aspect].entry(go_id.clone()).or_insert(0.0) += increment;
            }
        }
    }

    if unannotated > 0 {
        warn!(
            "{} of {} disease genes have no GO annotations",
            unannotated,
            genes.len()
        );
    }

    weights
}

/// Append F/P/C term and label columns to a disease-gene table
pub fn append_term_columns(table: &mut Table, index: &AnnotationIndex, labels: &GoLabels) {
    for aspect in Aspect::ALL {
        table.headers.push(aspect.code().to_string());
    }
    for aspect in Aspect::ALL {
        table.headers.push(format!("{}_lbl", aspect.code()));
    }

    for row in table.rows.iter_mut() {
        let uniprot_id = row.get(UNIPROT_COLUMN).map(|id| id.trim()).unwrap_or_default();
        let terms: PerAspect<Vec<&str>> = match index.get(uniprot_id) {
            Some(terms) => terms.map(|_, go_ids| go_ids.iter().map(String::as_str).collect()),
            None => PerAspect::default(),
        };

        for aspect in Aspect::ALL {
            row.push(join_list(&terms[aspect]));
        }
        for aspect in Aspect::ALL {
            let lbls: Vec<&str> = terms[aspect]
                .iter()
                .map(|go_id| labels.get_or_unknown(go_id))
                .collect();
            row.push(join_list(&lbls));
        }
    }
}
