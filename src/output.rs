// ==============================================================================
// output.rs - Table Output
// ==============================================================================
// Description: Atomic TSV writers for enrichment, weight and passthrough tables
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Outputs are written to a temporary file in the destination directory and
// renamed into place only after the whole table has been serialized. A failed
// run leaves no partial output behind.
// ==============================================================================

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::models::{join_list, Aspect, ProteinEnrichment};
use crate::parsers::{GoLabels, Table};

/// Header of the `score` output table
pub const ENRICHMENT_HEADER: [&str; 13] = [
    "Key",
    "F",
    "P",
    "C",
    "F_lbl",
    "P_lbl",
    "C_lbl",
    "F_enrichment",
    "P_enrichment",
    "C_enrichment",
    "F_enrichment_norm",
    "P_enrichment_norm",
    "C_enrichment_norm",
];

/// Header of a reference weight table
pub const WEIGHT_HEADER: [&str; 3] = ["GO_ID", "GO_Term", "Count"];

/// Write `target` through a temporary file that is renamed on success
pub fn write_atomically<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;

    {
        let mut buffered = BufWriter::new(temp.as_file_mut());
        write(&mut buffered)?;
        buffered
            .flush()
            .with_context(|| format!("Failed to write {:?}", target))?;
    }

    temp.persist(target)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move output into place at {:?}", target))?;

    debug!("Wrote {:?}", target);
    Ok(())
}

/// Write to `target` atomically, or to stdout when no target is given
pub fn write_to<F>(target: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match target {
        Some(path) => write_atomically(path, write),
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write(&mut lock)?;
            lock.flush().context("Failed to flush stdout")?;
            Ok(())
        }
    }
}

/// Tab-delimited writer with minimal quoting
pub fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer)
}

/// Shortest round-trip representation (deterministic across runs)
pub fn format_score(value: f64) -> String {
    value.to_string()
}

/// Serialize `score` results, one row per protein
pub fn write_enrichment_table<W: Write>(writer: W, records: &[ProteinEnrichment]) -> Result<()> {
    let mut tsv = tsv_writer(writer);
    tsv.write_record(ENRICHMENT_HEADER)?;

    for record in records {
        let mut row = Vec::with_capacity(ENRICHMENT_HEADER.len());
        row.push(record.protein_id.clone());
        row.extend(Aspect::ALL.map(|aspect| join_list(&record.terms[aspect])));
        row.extend(Aspect::ALL.map(|aspect| join_list(&record.labels[aspect])));
        row.extend(Aspect::ALL.map(|aspect| format_score(record.enrichment[aspect])));
        row.extend(Aspect::ALL.map(|aspect| format_score(record.normalized[aspect])));
        tsv.write_record(&row)?;
    }

    tsv.flush()?;
    Ok(())
}

/// Serialize one aspect's reference weights (GO_ID, GO_Term, Count)
pub fn write_weight_table<W: Write>(
    writer: W,
    weights: &BTreeMap<String, f64>,
    labels: &GoLabels,
) -> Result<()> {
    let mut tsv = tsv_writer(writer);
    tsv.write_record(WEIGHT_HEADER)?;

    for (go_id, count) in weights {
        let label = labels.get(go_id).unwrap_or_default();
        tsv.write_record([go_id.as_str(), label, format_score(*count).as_str()])?;
    }

    tsv.flush()?;
    Ok(())
}

/// Serialize a header-addressed table verbatim
pub fn write_table<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut tsv = tsv_writer(writer);
    tsv.write_record(&table.headers)?;
    for row in &table.rows {
        tsv.write_record(row)?;
    }
    tsv.flush()?;
    Ok(())
}
