// ==============================================================================
// annotate.rs - Enrichment Join
// ==============================================================================
// Description: Appends rank-normalized GO enrichment scores to variant rows
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use std::collections::HashMap;
use tracing::debug;

use crate::models::{Aspect, PerAspect, MISSING_VALUE};
use crate::parsers::{Table, TableError};

/// Column of the variant table holding the UniProt id
pub const VARIANT_UNIPROT_COLUMN: usize = 2;

const KEY_COLUMN: &str = "Key";

/// Normalized enrichment scores by protein id, read from a `score` table
#[derive(Debug, Clone, Default)]
pub struct EnrichmentLookup {
    scores: HashMap<String, PerAspect<String>>,
}

impl EnrichmentLookup {
    /// Columns are located by header name (`Key`, `F_enrichment_norm`, ...)
    pub fn from_table(table: &Table) -> Result<Self, TableError> {
        let key = table.column_index(KEY_COLUMN)?;
        let columns = PerAspect::new(
            table.column_index(&normalized_column(Aspect::Function))?,
            table.column_index(&normalized_column(Aspect::Process))?,
            table.column_index(&normalized_column(Aspect::Component))?,
        );

        let scores = table
            .rows
            .iter()
            .map(|row| {
                (
                    row[key].clone(),
                    columns.map(|_, &column| row[column].clone()),
                )
            })
            .collect();

        Ok(Self { scores })
    }

    pub fn lookup(&self, protein_id: &str) -> Option<&PerAspect<String>> {
        self.scores.get(protein_id)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

fn normalized_column(aspect: Aspect) -> String {
    format!("{}_enrichment_norm", aspect.code())
}

/// Append `F_enrichment`, `P_enrichment`, `C_enrichment` to every row
///
/// Proteins missing from the lookup receive `.` in all three columns.
/// Returns the number of rows that matched.
pub fn annotate_variants(table: &mut Table, lookup: &EnrichmentLookup) -> Result<usize, TableError> {
    table.require_columns(VARIANT_UNIPROT_COLUMN + 1)?;

    for aspect in Aspect::ALL {
        table.headers.push(format!("{}_enrichment", aspect.code()));
    }

    let mut matched = 0;
    for row in table.rows.iter_mut() {
        let values: PerAspect<String> = match lookup.lookup(row[VARIANT_UNIPROT_COLUMN].trim()) {
            Some(scores) => {
                matched += 1;
                scores.clone()
            }
            None => PerAspect::from_fn(|_| MISSING_VALUE.to_string()),
        };

        for aspect in Aspect::ALL {
            row.push(values[aspect].clone());
        }
    }

    debug!("{} of {} variants matched a scored protein", matched, table.len());
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_table() -> Table {
        let contents = "Key\tF\tP\tC\tF_lbl\tP_lbl\tC_lbl\tF_enrichment\tP_enrichment\tC_enrichment\tF_enrichment_norm\tP_enrichment_norm\tC_enrichment_norm\n\
            P54098\tGO:1\t\t\tx\t\t\t4\t0\t0\t1\t0.5\t0.5\n\
            Q96RR1\t\t\t\t\t\t\t0\t0\t0\t0.5\t0.5\t0.5\n";
        Table::from_reader(contents.as_bytes(), b'\t').unwrap()
    }

    #[test]
    fn test_lookup_reads_normalized_columns() {
        let lookup = EnrichmentLookup::from_table(&score_table()).unwrap();
        assert_eq!(lookup.len(), 2);

        let scores = lookup.lookup("P54098").unwrap();
        assert_eq!(scores[Aspect::Function], "1");
        assert_eq!(scores[Aspect::Process], "0.5");
        assert!(lookup.lookup("X00000").is_none());
    }

    #[test]
    fn test_missing_normalized_column() {
        let table = Table::from_reader("Key\tF_enrichment\nP1\t1\n".as_bytes(), b'\t').unwrap();
        let err = EnrichmentLookup::from_table(&table).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn(ref c) if c == "F_enrichment_norm"));
    }

    #[test]
    fn test_annotate_present_and_absent() {
        let lookup = EnrichmentLookup::from_table(&score_table()).unwrap();
        let contents = "gnomad_id\tgene\tuniprot_id\tconsequence\n\
            1-100-A-G\tPOLG\tP54098\tmissense_variant\n\
            2-200-C-T\tNOVEL\tX00000\tmissense_variant\n";
        let mut variants = Table::from_reader(contents.as_bytes(), b'\t').unwrap();

        let matched = annotate_variants(&mut variants, &lookup).unwrap();

        assert_eq!(matched, 1);
        assert_eq!(
            variants.headers[4..],
            ["F_enrichment", "P_enrichment", "C_enrichment"]
        );
        assert_eq!(variants.rows[0][4..], ["1", "0.5", "0.5"]);
        assert_eq!(variants.rows[1][4..], [".", ".", "."]);
    }
}
