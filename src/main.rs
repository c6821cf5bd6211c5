// ==============================================================================
// main.rs - MPD Tools Entry Point
// ==============================================================================
// Description: Command-line entry point for the rare-disease analysis tools
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mpd_tools::filters::{CandidateCriteria, QualityThresholds};
use mpd_tools::go_counts::CountMode;
use mpd_tools::gnomad;
use mpd_tools::models::PerAspect;
use mpd_tools::processor::{self, EnrichmentJob, ReferenceWeightJob};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score every annotated protein for GO enrichment against reference weights
    Score {
        /// Molecular function (F) reference weight table
        #[arg(long = "f")]
        function_weights: PathBuf,

        /// Biological process (P) reference weight table
        #[arg(long = "p")]
        process_weights: PathBuf,

        /// Cellular component (C) reference weight table
        #[arg(long = "c")]
        component_weights: PathBuf,

        /// GO annotation file (GAF, plain or gzip)
        #[arg(long)]
        goa: PathBuf,

        /// GO ontology JSON (labels)
        #[arg(long)]
        go: PathBuf,

        /// Output TSV
        #[arg(short, long)]
        output: PathBuf,

        /// Skip malformed annotation rows instead of failing
        #[arg(long, env = "MPD_SKIP_MALFORMED")]
        skip_malformed: bool,

        /// Write a <output>.manifest.json provenance sidecar
        #[arg(long, env = "MPD_MANIFEST")]
        manifest: bool,
    },

    /// Build F/P/C reference weight tables from a disease-gene table
    GoCounts {
        /// Disease-gene TSV (column 2: proband count, column 3: UniProt id)
        #[arg(short, long)]
        input: PathBuf,

        /// GO annotation file (GAF, plain or gzip)
        #[arg(long)]
        goa: PathBuf,

        /// GO ontology JSON (labels)
        #[arg(long)]
        go: PathBuf,

        /// Directory for the three weight tables
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Count 1 per gene instead of the proband count
        #[arg(long)]
        unweighted: bool,

        /// Also write the input table with per-gene GO terms and labels
        #[arg(long)]
        terms_output: Option<PathBuf>,

        #[arg(long, env = "MPD_SKIP_MALFORMED")]
        skip_malformed: bool,

        #[arg(long, env = "MPD_MANIFEST")]
        manifest: bool,
    },

    /// Append normalized GO enrichment scores to a variant table
    AnnotateGo {
        /// `score` output table
        #[arg(long)]
        scores: PathBuf,

        /// Variant TSV (column 3: UniProt id)
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Append OMIM inheritance and VEP predictor scores to proband variants
    AddInheritanceVep {
        /// Proband variant TSV
        proband_tsv: PathBuf,

        /// OMIM TSV with uniprot_id and inheritance columns
        omim_tsv: PathBuf,

        /// Directory of <uniprot_id>.csv VEP score files
        vep_dir: PathBuf,

        /// Output TSV
        output: PathBuf,
    },

    /// Classify carriers at one site as monoallelic, biallelic, de novo or unknown
    Inheritance {
        gnomad_id: String,

        /// Passthrough columns
        rest: String,

        /// Newline-delimited sample_id:GT pairs
        probands: String,

        /// PED pedigree file
        #[arg(long)]
        ped: PathBuf,
    },

    /// Flatten a gnomAD INFO string into fixed columns
    GnomadInfo {
        gnomad_id: String,

        /// Passthrough columns
        rest: String,

        /// Semicolon-delimited key=value INFO string
        gnomad_query: String,
    },

    /// Split a multi-sample VCF into per-allele carrier records
    FormatProbands {
        /// Input VCF (plain or gzip)
        #[arg(short, long)]
        input: PathBuf,

        /// Proband CSV: proband, father, mother, diagnosis
        #[arg(long)]
        probands: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Drop variants failing site-quality thresholds
    FilterQuality {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value_t = 30.0)]
        min_mq: f64,

        #[arg(long, default_value_t = 2.0)]
        min_qd: f64,

        #[arg(long, default_value_t = 60.0)]
        max_fs: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        min_phylop: f64,
    },

    /// Keep top-percentile VEP candidates with high GO enrichment
    FilterCandidates {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// VEP predictor column to rank by
        #[arg(long, default_value = "CPT")]
        vep: String,

        /// VEP quantile a candidate must exceed
        #[arg(long, default_value_t = 0.95)]
        quantile: f64,

        /// Minimum normalized enrichment (exclusive) for F, P and C
        #[arg(long, default_value_t = 0.75)]
        min_enrichment: f64,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr; several tools write their data to stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mpd_tools=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Score {
            function_weights,
            process_weights,
            component_weights,
            goa,
            go,
            output,
            skip_malformed,
            manifest,
        } => {
            let job = EnrichmentJob {
                weights: PerAspect::new(function_weights, process_weights, component_weights),
                annotations: goa,
                go_labels: go,
                output,
                skip_malformed,
                write_manifest: manifest,
            };
            let summary = job.run()?;
            info!(
                "Scored {} proteins from {} annotations",
                summary.proteins, summary.annotations
            );
        }

        Command::GoCounts {
            input,
            goa,
            go,
            output_dir,
            unweighted,
            terms_output,
            skip_malformed,
            manifest,
        } => {
            let job = ReferenceWeightJob {
                genes: input,
                annotations: goa,
                go_labels: go,
                output_dir,
                mode: if unweighted {
                    CountMode::PerGene
                } else {
                    CountMode::ProbandWeighted
                },
                terms_output,
                skip_malformed,
                write_manifest: manifest,
            };
            job.run()?;
            info!("Cumulative GO terms written");
        }

        Command::AnnotateGo {
            scores,
            input,
            output,
        } => {
            processor::run_annotate_go(&scores, &input, &output)?;
        }

        Command::AddInheritanceVep {
            proband_tsv,
            omim_tsv,
            vep_dir,
            output,
        } => {
            processor::run_inheritance_vep(&proband_tsv, &omim_tsv, &vep_dir, &output)?;
        }

        Command::Inheritance {
            gnomad_id,
            rest,
            probands,
            ped,
        } => {
            let row = processor::run_inheritance(&gnomad_id, &rest, &probands, &ped)?;
            writeln!(std::io::stdout(), "{}", row)?;
        }

        Command::GnomadInfo {
            gnomad_id,
            rest,
            gnomad_query,
        } => {
            writeln!(
                std::io::stdout(),
                "{}",
                gnomad::format_row(&gnomad_id, &rest, &gnomad_query)
            )?;
        }

        Command::FormatProbands {
            input,
            probands,
            output,
        } => {
            processor::run_format_probands(&input, &probands, output.as_deref())?;
        }

        Command::FilterQuality {
            input,
            output,
            min_mq,
            min_qd,
            max_fs,
            min_phylop,
        } => {
            let thresholds = QualityThresholds {
                min_mq,
                min_qd,
                max_fs,
                min_phylop,
            };
            let kept = processor::run_filter_quality(&input, &output, &thresholds)?;
            info!("Filtered data saved to {:?} ({} rows)", output, kept);
        }

        Command::FilterCandidates {
            input,
            output,
            vep,
            quantile,
            min_enrichment,
        } => {
            let criteria = CandidateCriteria {
                vep_column: vep,
                quantile,
                min_enrichment,
            };
            let kept = processor::run_filter_candidates(&input, &output, &criteria)?;
            info!("Filtered data saved to {:?} ({} rows)", output, kept);
        }
    }

    Ok(())
}
