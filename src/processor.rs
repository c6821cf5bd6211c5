// ==============================================================================
// processor.rs - Pipeline Job Orchestration
// ==============================================================================
// Description: File-level jobs behind each subcommand (validate, parse,
//              transform, write atomically, record provenance)
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::annotate::{annotate_variants, EnrichmentLookup};
use crate::enrichment::{score_corpus, AnnotationIndex};
use crate::filters::{filter_candidates, filter_quality, CandidateCriteria, QualityThresholds};
use crate::go_counts::{append_term_columns, disease_genes, reference_weights, CountMode};
use crate::inheritance::{classify_carriers, CohortGenotypes};
use crate::manifest::RunManifest;
use crate::models::{AnnotationRecord, Aspect, PerAspect};
use crate::output::{
    write_atomically, write_enrichment_table, write_table, write_to, write_weight_table,
};
use crate::parsers::{open_reader, GafParser, GoLabels, Pedigree, ReferenceWeights, Table};
use crate::probands::{format_vcf, FormatSummary, ProbandDirectory};
use crate::validator::InputValidator;
use crate::vep::{annotate_probands, OmimInheritance, VepJoinSummary, VepScoreCache};

/// Counts reported by a finished `score` run
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentSummary {
    pub annotations: usize,
    pub skipped_annotations: usize,
    pub proteins: usize,
    pub background_terms: PerAspect<usize>,
}

fn load_annotations(
    path: &Path,
    validator: &InputValidator,
    skip_malformed: bool,
) -> Result<(Vec<AnnotationRecord>, usize)> {
    validator.validate_file(path)?;
    info!("Parsing GO annotations: {:?}", path);

    let mut parser = GafParser::new().with_skip_malformed(skip_malformed);
    let records = parser
        .parse(path)
        .with_context(|| format!("Failed to parse annotation file {:?}", path))?;

    info!(
        "Parsed {} annotation records ({} malformed rows skipped)",
        records.len(),
        parser.skipped_count
    );
    Ok((records, parser.skipped_count))
}

fn load_labels(path: &Path, validator: &InputValidator) -> Result<GoLabels> {
    validator.validate_file(path)?;
    let labels =
        GoLabels::parse(path).with_context(|| format!("Failed to parse GO label file {:?}", path))?;
    info!("Loaded {} GO term labels", labels.len());
    Ok(labels)
}

fn load_table(path: &Path, validator: &InputValidator) -> Result<Table> {
    validator.validate_file(path)?;
    let table = Table::read_tsv(path).with_context(|| format!("Failed to read {:?}", path))?;
    debug!("Read {} rows from {:?}", table.len(), path);
    Ok(table)
}

/// GO enrichment scoring from files to the output table
#[derive(Debug, Clone)]
pub struct EnrichmentJob {
    pub weights: PerAspect<PathBuf>,
    pub annotations: PathBuf,
    pub go_labels: PathBuf,
    pub output: PathBuf,
    pub skip_malformed: bool,
    pub write_manifest: bool,
}

impl EnrichmentJob {
    pub fn run(&self) -> Result<EnrichmentSummary> {
        let mut manifest = RunManifest::new("score");
        let validator = InputValidator::new();

        // 1. Reference weights
        let mut weights: PerAspect<ReferenceWeights> = PerAspect::default();
        for (aspect, path) in self.weights.iter() {
            validator.validate_file(path)?;
            weights[aspect] = ReferenceWeights::parse(path)
                .with_context(|| format!("Failed to parse {} weight table {:?}", aspect, path))?;
            info!("Loaded {} {} reference weights", weights[aspect].len(), aspect);
        }

        // 2. Annotation corpus and labels
        let (records, skipped) =
            load_annotations(&self.annotations, &validator, self.skip_malformed)?;
        let labels = load_labels(&self.go_labels, &validator)?;

        // 3. Group, score and rank-normalize
        let scored = score_corpus(&records, &weights, &labels).with_context(|| {
            format!(
                "Annotation file {:?} is inconsistent with its derived background",
                self.annotations
            )
        })?;

        // 4. Output
        write_atomically(&self.output, |w| write_enrichment_table(w, &scored.proteins))?;
        info!("Enrichment scores written to {:?}", self.output);

        let summary = EnrichmentSummary {
            annotations: records.len(),
            skipped_annotations: skipped,
            proteins: scored.proteins.len(),
            background_terms: scored.background_terms,
        };

        if self.write_manifest {
            for (aspect, path) in self.weights.iter() {
                manifest.add_input(&format!("{}_weights", aspect.code()), path)?;
            }
            manifest.add_input("annotations", &self.annotations)?;
            manifest.add_input("go_labels", &self.go_labels)?;
            manifest.add_output(&self.output);
            manifest.set_count("annotations", summary.annotations as u64);
            manifest.set_count("skipped_annotations", summary.skipped_annotations as u64);
            manifest.set_count("proteins", summary.proteins as u64);
            manifest.finish(&self.output)?;
        }

        Ok(summary)
    }
}

/// Reference weight tables built from a disease-gene list
#[derive(Debug, Clone)]
pub struct ReferenceWeightJob {
    pub genes: PathBuf,
    pub annotations: PathBuf,
    pub go_labels: PathBuf,
    pub output_dir: PathBuf,
    pub mode: CountMode,
    pub terms_output: Option<PathBuf>,
    pub skip_malformed: bool,
    pub write_manifest: bool,
}

impl ReferenceWeightJob {
    /// Returns the three weight table paths in F, P, C order
    pub fn run(&self) -> Result<PerAspect<PathBuf>> {
        let mut manifest = RunManifest::new("go-counts");
        let validator = InputValidator::new();
        validator.validate_dir(&self.output_dir)?;

        let mut gene_table = load_table(&self.genes, &validator)?;
        let genes = disease_genes(&gene_table)
            .with_context(|| format!("Invalid disease-gene table {:?}", self.genes))?;
        info!("Loaded {} disease genes", genes.len());

        let (records, _) = load_annotations(&self.annotations, &validator, self.skip_malformed)?;
        let labels = load_labels(&self.go_labels, &validator)?;
        let index = AnnotationIndex::from_records(&records);

        let weights = reference_weights(&genes, &index, self.mode);

        let outputs = PerAspect::from_fn(|aspect| self.output_dir.join(self.mode.file_name(aspect)));
        for (aspect, path) in outputs.iter() {
            write_atomically(path, |w| write_weight_table(w, &weights[aspect], &labels))?;
            info!("{} GO terms written to {:?}", weights[aspect].len(), path);
            manifest.add_output(path);
            manifest.set_count(&format!("{}_terms", aspect.code()), weights[aspect].len() as u64);
        }

        if let Some(terms_output) = &self.terms_output {
            append_term_columns(&mut gene_table, &index, &labels);
            write_atomically(terms_output, |w| write_table(w, &gene_table))?;
            info!("Per-gene GO terms written to {:?}", terms_output);
            manifest.add_output(terms_output);
        }

        if self.write_manifest {
            manifest.add_input("genes", &self.genes)?;
            manifest.add_input("annotations", &self.annotations)?;
            manifest.add_input("go_labels", &self.go_labels)?;
            manifest.set_count("genes", genes.len() as u64);
            manifest.finish(&outputs[Aspect::Function])?;
        }

        Ok(outputs)
    }
}

/// Join normalized enrichment scores onto a variant table
pub fn run_annotate_go(scores: &Path, variants: &Path, output: &Path) -> Result<usize> {
    let validator = InputValidator::new();

    let score_table = load_table(scores, &validator)?;
    let lookup = EnrichmentLookup::from_table(&score_table)
        .with_context(|| format!("Invalid enrichment score table {:?}", scores))?;
    info!("Loaded enrichment scores for {} proteins", lookup.len());

    let mut table = load_table(variants, &validator)?;
    let matched = annotate_variants(&mut table, &lookup)
        .with_context(|| format!("Invalid variant table {:?}", variants))?;
    info!("{} of {} variants matched a scored protein", matched, table.len());

    write_atomically(output, |w| write_table(w, &table))?;
    Ok(matched)
}

/// Join OMIM inheritance and VEP predictor scores onto proband variants
pub fn run_inheritance_vep(
    probands: &Path,
    omim: &Path,
    vep_dir: &Path,
    output: &Path,
) -> Result<VepJoinSummary> {
    let validator = InputValidator::new();
    validator.validate_dir(vep_dir)?;

    let mut table = load_table(probands, &validator)?;
    let omim_table = load_table(omim, &validator)?;
    let omim = OmimInheritance::from_table(&omim_table)
        .with_context(|| format!("Invalid OMIM table {:?}", omim))?;

    let mut cache = VepScoreCache::new(vep_dir);
    let summary = annotate_probands(&mut table, &omim, &mut cache)
        .with_context(|| format!("Invalid proband variant table {:?}", probands))?;

    write_atomically(output, |w| write_table(w, &table))?;
    Ok(summary)
}

/// Classify carriers at one site; returns the output line
pub fn run_inheritance(gnomad_id: &str, rest: &str, cohort: &str, ped: &Path) -> Result<String> {
    InputValidator::new().validate_file(ped)?;
    let pedigree =
        Pedigree::parse(ped).with_context(|| format!("Failed to parse PED file {:?}", ped))?;
    let cohort = CohortGenotypes::parse(cohort).context("Invalid cohort genotype string")?;

    let counts = classify_carriers(&cohort, &pedigree);
    debug!(
        "{}: {} carriers among {} samples",
        gnomad_id,
        counts.probands.len(),
        cohort.len()
    );
    Ok(counts.to_row(gnomad_id, rest))
}

/// Reformat a multi-sample VCF to stdout or an output file
pub fn run_format_probands(
    vcf: &Path,
    probands: &Path,
    output: Option<&Path>,
) -> Result<FormatSummary> {
    let validator = InputValidator::new();
    validator.validate_file(vcf)?;
    validator.validate_file(probands)?;

    let file = File::open(probands).with_context(|| format!("Failed to open {:?}", probands))?;
    let directory = ProbandDirectory::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse proband file {:?}", probands))?;

    let reader = open_reader(vcf).with_context(|| format!("Failed to open {:?}", vcf))?;
    let mut summary = FormatSummary::default();
    write_to(output, |w| {
        summary = format_vcf(reader, w, &directory)
            .with_context(|| format!("Failed to format VCF {:?}", vcf))?;
        Ok(())
    })?;

    info!(
        "Wrote {} allele records from {} PASS-filtered VCF records",
        summary.alleles_written,
        summary.records_read - summary.records_filtered
    );
    Ok(summary)
}

pub fn run_filter_quality(input: &Path, output: &Path, thresholds: &QualityThresholds) -> Result<usize> {
    let table = load_table(input, &InputValidator::new())?;
    let filtered = filter_quality(&table, thresholds)
        .with_context(|| format!("Failed to filter {:?}", input))?;
    write_atomically(output, |w| write_table(w, &filtered))?;
    Ok(filtered.len())
}

pub fn run_filter_candidates(input: &Path, output: &Path, criteria: &CandidateCriteria) -> Result<usize> {
    let table = load_table(input, &InputValidator::new())?;
    let filtered = filter_candidates(&table, criteria)
        .with_context(|| format!("Failed to filter {:?}", input))?;
    write_atomically(output, |w| write_table(w, &filtered))?;
    Ok(filtered.len())
}
