// ==============================================================================
// enrichment_example.rs - GO Enrichment Scoring Example
// ==============================================================================
// Description: Demonstrates scoring and rank-normalizing a small protein set
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use mpd_tools::enrichment::{rank_normalize, score_corpus};
use mpd_tools::models::{AnnotationRecord, Aspect, PerAspect};
use mpd_tools::parsers::{GoLabels, ReferenceWeights};

fn annotation(protein: &str, go_id: &str, aspect: Aspect) -> AnnotationRecord {
    AnnotationRecord {
        protein_id: protein.to_string(),
        go_id: go_id.to_string(),
        aspect,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== GO Enrichment Scoring Example ===\n");

    // Example 1: Rank normalization with ties
    println!("--- Example 1: Rank Normalization ---");
    let raw = [3.0, 1.0, 3.0, 0.0, 0.0];
    let normalized = rank_normalize(&raw);
    println!("{:<10} {}", "Raw", "Normalized");
    println!("{:-<24}", "");
    for (r, n) in raw.iter().zip(&normalized) {
        println!("{:<10} {}", r, n);
    }

    // Example 2: Scoring a toy corpus
    println!("\n--- Example 2: Scoring ---");
    let corpus = vec![
        annotation("P54098", "GO:0003887", Aspect::Function),
        annotation("P54098", "GO:0005739", Aspect::Component),
        annotation("Q96RR1", "GO:0003887", Aspect::Function),
        annotation("Q96RR1", "GO:0006264", Aspect::Process),
        annotation("P04637", "GO:0005634", Aspect::Component),
        annotation("P04637", "GO:0003700", Aspect::Function),
    ];

    let weights = PerAspect::new(
        [("GO:0003887".to_string(), 15.0)].into_iter().collect::<ReferenceWeights>(),
        [("GO:0006264".to_string(), 3.0)].into_iter().collect(),
        [("GO:0005739".to_string(), 12.0)].into_iter().collect(),
    );
    let labels: GoLabels = [
        ("GO:0003887".to_string(), "DNA-directed DNA polymerase activity".to_string()),
        ("GO:0005739".to_string(), "mitochondrion".to_string()),
    ]
    .into_iter()
    .collect();

    let scored = score_corpus(&corpus, &weights, &labels)?.proteins;

    println!("{:<10} {:<8} {:<8} {:<8} {:<8}", "Protein", "Aspect", "Raw", "Norm", "Labels");
    println!("{:-<60}", "");
    for record in &scored {
        for aspect in Aspect::ALL {
            println!(
                "{:<10} {:<8} {:<8} {:<8} {}",
                record.protein_id,
                aspect.code(),
                record.enrichment[aspect],
                record.normalized[aspect],
                record.labels[aspect].join(", ")
            );
        }
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
