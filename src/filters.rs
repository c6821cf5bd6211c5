// ==============================================================================
// filters.rs - Variant Table Filters
// ==============================================================================
// Description: Site-quality filter and top-percentile candidate filter
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Quality:    MQ >= 30, QD >= 2, FS <= 60, phylop >= 0, not synonymous
// Candidates: VEP > quantile(VEP, q), F/P/C enrichment > min_enrichment,
//             X-linked inheritance or no monoallelic carriers,
//             sorted by VEP descending
// ==============================================================================

use std::cmp::Ordering;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{split_list, MISSING_VALUE};
use crate::parsers::{Table, TableError};

/// Site metrics that must be numeric for a row to be considered
pub const SITE_METRICS: [&str; 4] = ["MQ", "QD", "FS", "phylop"];

pub const SYNONYMOUS_CONSEQUENCE: &str = "synonymous_variant";
pub const X_LINKED_MODES: [&str; 2] = ["X-linked", "X-linked recessive"];

const ENRICHMENT_COLUMNS: [&str; 3] = ["F_enrichment", "P_enrichment", "C_enrichment"];

#[derive(Error, Debug)]
pub enum FilterError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Quantile must be within [0, 1], got {0}")]
    InvalidQuantile(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityThresholds {
    pub min_mq: f64,
    pub min_qd: f64,
    pub max_fs: f64,
    pub min_phylop: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_mq: 30.0,
            min_qd: 2.0,
            max_fs: 60.0,
            min_phylop: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateCriteria {
    pub vep_column: String,
    pub quantile: f64,
    pub min_enrichment: f64,
}

impl Default for CandidateCriteria {
    fn default() -> Self {
        Self {
            vep_column: "CPT".to_string(),
            quantile: 0.95,
            min_enrichment: 0.75,
        }
    }
}

/// Finite numeric value of a cell; `.`, text and NaN are `None`
pub fn parse_numeric(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell == MISSING_VALUE {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Linear interpolation between closest ranks
///
/// `values` must be sorted ascending and non-empty.
fn quantile_sorted(values: &[f64], q: f64) -> f64 {
    let position = q * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    values[lower] + (values[upper] - values[lower]) * (position - lower as f64)
}

/// `q`-quantile of the values, or `None` when there are none
pub fn quantile(values: &[f64], q: f64) -> Result<Option<f64>, FilterError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(FilterError::InvalidQuantile(q));
    }
    if values.is_empty() {
        return Ok(None);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(Some(quantile_sorted(&sorted, q)))
}

/// Column indices of the site metrics, in `SITE_METRICS` order
fn metric_columns(table: &Table) -> Result<Vec<usize>, TableError> {
    SITE_METRICS
        .iter()
        .map(|name| table.column_index(name))
        .collect()
}

fn numeric_metrics(row: &[String], columns: &[usize]) -> Option<Vec<f64>> {
    columns.iter().map(|&c| parse_numeric(&row[c])).collect()
}

/// Keep rows passing the site-quality thresholds, in input order
pub fn filter_quality(table: &Table, thresholds: &QualityThresholds) -> Result<Table, FilterError> {
    let metrics = metric_columns(table)?;
    let consequence = table.column_index("consequence")?;

    let mut filtered = Table::new(table.headers.clone());
    let mut non_numeric = 0usize;

    for row in &table.rows {
        let Some(values) = numeric_metrics(row, &metrics) else {
            non_numeric += 1;
            continue;
        };
        let (mq, qd, fs, phylop) = (values[0], values[1], values[2], values[3]);

        if mq >= thresholds.min_mq
            && qd >= thresholds.min_qd
            && fs <= thresholds.max_fs
            && phylop >= thresholds.min_phylop
            && row[consequence].trim() != SYNONYMOUS_CONSEQUENCE
        {
            filtered.rows.push(row.clone());
        }
    }

    info!(
        "Quality filter kept {} of {} rows ({} with non-numeric site metrics)",
        filtered.len(),
        table.len(),
        non_numeric
    );
    Ok(filtered)
}

fn inheritance_passes(inheritance: &str, n_monoallelic: &str) -> bool {
    let x_linked = split_list(inheritance)
        .iter()
        .any(|mode| X_LINKED_MODES.contains(&mode.trim()));

    x_linked || parse_numeric(n_monoallelic).is_some_and(|n| n < 1.0)
}

/// Top-percentile VEP candidates with strong enrichment, sorted by VEP descending
pub fn filter_candidates(table: &Table, criteria: &CandidateCriteria) -> Result<Table, FilterError> {
    if !(0.0..=1.0).contains(&criteria.quantile) {
        return Err(FilterError::InvalidQuantile(criteria.quantile));
    }

    let metrics = metric_columns(table)?;
    let vep = table.column_index(&criteria.vep_column)?;
    let enrichment: Vec<usize> = ENRICHMENT_COLUMNS
        .iter()
        .map(|name| table.column_index(name))
        .collect::<Result<_, _>>()?;
    let inheritance = table.column_index("inheritance")?;
    let n_monoallelic = table.column_index("n_monoallelic")?;

    // Rows with numeric site metrics and a VEP value
    let scored: Vec<&Vec<String>> = table
        .rows
        .iter()
        .filter(|row| numeric_metrics(row, &metrics).is_some())
        .filter(|row| row[vep].trim() != MISSING_VALUE)
        .collect();

    let vep_values: Vec<f64> = scored
        .iter()
        .filter_map(|row| parse_numeric(&row[vep]))
        .collect();

    let mut filtered = Table::new(table.headers.clone());

    let Some(threshold) = quantile(&vep_values, criteria.quantile)? else {
        warn!(
            "No numeric {} values; candidate output is empty",
            criteria.vep_column
        );
        return Ok(filtered);
    };

    let mut candidates: Vec<(f64, &Vec<String>)> = scored
        .into_iter()
        .filter_map(|row| parse_numeric(&row[vep]).map(|value| (value, row)))
        .filter(|(value, _)| *value > threshold)
        .filter(|(_, row)| {
            enrichment.iter().all(|&c| {
                parse_numeric(&row[c]).is_some_and(|score| score > criteria.min_enrichment)
            })
        })
        .filter(|(_, row)| inheritance_passes(&row[inheritance], &row[n_monoallelic]))
        .collect();

    // Stable: equal scores keep input order
    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    filtered.rows = candidates.into_iter().map(|(_, row)| row.clone()).collect();

    info!(
        "Candidate filter kept {} of {} rows ({} threshold {})",
        filtered.len(),
        table.len(),
        criteria.vep_column,
        threshold
    );
    Ok(filtered)
}
