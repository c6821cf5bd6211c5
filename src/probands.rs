// ==============================================================================
// probands.rs - Proband VCF Formatting
// ==============================================================================
// Description: Splits multi-sample VCF records into per-allele records listing
//              the carriers of each ALT allele
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Input record:
//   chr1  100  .  A  G,*  50  PASS  AC=2  GT:DP  0/1:30  0/2:12  0/0:40
// Output records (8 columns, FORMAT/sample columns dropped):
//   chr1  100  1-100-A-G    A  G  50  PASS  samples=S1:0/1:30:diag
//   chr1  100  1-100-A-del  A  *  50  PASS  samples=S2:0/2:12:father_diag
// ==============================================================================

use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::{BufRead, Read, Write};
use thiserror::Error;
use tracing::{debug, warn};

use crate::genotype::{alt_allele_indices, classify_genotype};
use crate::models::MISSING_VALUE;

const VCF_FIXED_COLUMNS: usize = 8;
const FORMAT_COLUMN: usize = 8;
const PASS: &str = "PASS";
const DELETION_ALLELE: &str = "*";

#[derive(Error, Debug)]
pub enum ProbandFormatError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("VCF has no #CHROM header line before the first record")]
    MissingHeader,

    #[error("Invalid VCF record at line {line}: {details}")]
    InvalidRecord { line: usize, details: String },

    #[error("FORMAT field at line {line} has no GT key")]
    MissingGtField { line: usize },
}

/// Diagnosis lookup keyed by lowercase sample id
///
/// Rows are `proband, father, mother, diagnosis`. A sample found in the father
/// or mother column is reported as `father_<diagnosis>` / `mother_<diagnosis>`.
#[derive(Debug, Clone, Default)]
pub struct ProbandDirectory {
    diagnoses: HashMap<String, String>,
}

impl ProbandDirectory {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ProbandFormatError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut directory = Self::default();
        for result in reader.records() {
            let record = result?;
            let diagnosis = record.get(3).map(str::trim).unwrap_or(MISSING_VALUE);

            let roles = [
                (0, diagnosis.to_string()),
                (1, format!("father_{}", diagnosis)),
                (2, format!("mother_{}", diagnosis)),
            ];
            for (column, value) in roles {
                let Some(id) = record.get(column).map(str::trim) else {
                    continue;
                };
                if id.is_empty() {
                    continue;
                }
                // First match in file order wins
                directory
                    .diagnoses
                    .entry(id.to_lowercase())
                    .or_insert(value);
            }
        }

        debug!("Loaded diagnoses for {} samples", directory.diagnoses.len());
        Ok(directory)
    }

    pub fn diagnosis(&self, sample_id: &str) -> &str {
        self.diagnoses
            .get(&sample_id.to_lowercase())
            .map(String::as_str)
            .unwrap_or(MISSING_VALUE)
    }
}

impl FromIterator<(String, String)> for ProbandDirectory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            diagnoses: iter
                .into_iter()
                .map(|(id, diagnosis)| (id.to_lowercase(), diagnosis))
                .collect(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FormatSummary {
    pub records_read: usize,
    pub records_filtered: usize,
    pub alleles_written: usize,
}

/// `chr1` -> `1`; other names pass through
fn strip_chr(chrom: &str) -> &str {
    chrom.strip_prefix("chr").unwrap_or(chrom)
}

/// Rewrite a multi-sample VCF as one record per ALT allele
pub fn format_vcf<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    directory: &ProbandDirectory,
) -> Result<FormatSummary, ProbandFormatError> {
    let mut samples: Option<Vec<String>> = None;
    let mut summary = FormatSummary::default();

    for (idx, line_result) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line_result?;
        let line = line.trim_end_matches(['\r', '\n']);

        if line.starts_with("##") || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();

        if line.starts_with('#') {
            let fixed = fields.len().min(VCF_FIXED_COLUMNS);
            writeln!(writer, "{}", fields[..fixed].join("\t"))?;
            samples = Some(
                fields
                    .iter()
                    .skip(FORMAT_COLUMN + 1)
                    .map(|s| s.to_string())
                    .collect(),
            );
            continue;
        }

        let sample_ids = samples.as_ref().ok_or(ProbandFormatError::MissingHeader)?;
        summary.records_read += 1;

        if fields.len() < VCF_FIXED_COLUMNS {
            return Err(ProbandFormatError::InvalidRecord {
                line: line_number,
                details: format!(
                    "Expected at least {} fields, found {}",
                    VCF_FIXED_COLUMNS,
                    fields.len()
                ),
            });
        }

        if fields[6] != PASS {
            summary.records_filtered += 1;
            continue;
        }

        let carriers = allele_carriers(&fields, sample_ids, directory, line_number)?;

        let chrom = strip_chr(fields[0]);
        let (pos, reference) = (fields[1], fields[3]);

        for (allele_idx, alt) in fields[4].split(',').enumerate() {
            let id_alt = if alt == DELETION_ALLELE { "del" } else { alt };
            let variant_id = format!("{}-{}-{}-{}", chrom, pos, reference, id_alt);
            let info = format!(
                "samples={}",
                carriers
                    .get(&(allele_idx + 1))
                    .map(|entries| entries.join(","))
                    .unwrap_or_default()
            );

            let record = [
                fields[0],
                fields[1],
                variant_id.as_str(),
                reference,
                alt,
                fields[5],
                fields[6],
                info.as_str(),
            ];
            writeln!(writer, "{}", record.join("\t"))?;
            summary.alleles_written += 1;
        }
    }

    writer.flush()?;
    debug!(
        "Formatted {} records into {} allele records ({} non-PASS dropped)",
        summary.records_read, summary.alleles_written, summary.records_filtered
    );

    Ok(summary)
}

/// Carrier fields (`id:GT:DP:diagnosis`) per ALT allele index (1-based)
fn allele_carriers(
    fields: &[&str],
    sample_ids: &[String],
    directory: &ProbandDirectory,
    line_number: usize,
) -> Result<HashMap<usize, Vec<String>>, ProbandFormatError> {
    let mut carriers: HashMap<usize, Vec<String>> = HashMap::new();

    let Some(format) = fields.get(FORMAT_COLUMN) else {
        return Ok(carriers);
    };
    let keys: Vec<&str> = format.split(':').collect();
    let gt_index = keys
        .iter()
        .position(|k| *k == "GT")
        .ok_or(ProbandFormatError::MissingGtField { line: line_number })?;
    let dp_index = keys.iter().position(|k| *k == "DP");

    for (sample_idx, sample) in fields.iter().skip(FORMAT_COLUMN + 1).enumerate() {
        let values: Vec<&str> = sample.split(':').collect();
        let gt = values.get(gt_index).copied().unwrap_or(MISSING_VALUE);

        if !classify_genotype(gt).is_carrier() {
            continue;
        }

        let Some(sample_id) = sample_ids.get(sample_idx) else {
            warn!("Line {}: sample column {} has no header name", line_number, sample_idx + 1);
            continue;
        };

        let depth = dp_index
            .and_then(|i| values.get(i).copied())
            .unwrap_or(MISSING_VALUE);
        let carrier_field = format!(
            "{}:{}:{}:{}",
            sample_id,
            gt,
            depth,
            directory.diagnosis(sample_id)
        );

        let alleles = alt_allele_indices(gt).map_err(|e| ProbandFormatError::InvalidRecord {
            line: line_number,
            details: e.to_string(),
        })?;
        for allele in alleles {
            carriers.entry(allele).or_default().push(carrier_field.clone());
        }
    }

    Ok(carriers)
}
