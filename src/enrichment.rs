// ==============================================================================
// enrichment.rs - GO Enrichment Scoring
// ==============================================================================
// Description: Per-protein GO enrichment against a disease reference gene set
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Algorithm:
//   1. Group annotations by protein; distinct GO ids per aspect
//   2. Background frequency = proteins carrying term / all proteins (per aspect)
//   3. Score(protein, aspect) = mean over its terms of weight(term) / background(term)
//      (0 when the protein has no terms for the aspect)
//   4. Normalized score = min-rank of score among all proteins / protein count
// ==============================================================================

use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{AnnotationRecord, Aspect, PerAspect, ProteinEnrichment};
use crate::parsers::{GoLabels, ReferenceWeights};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnrichmentError {
    /// Scored term has no background frequency (inputs from inconsistent snapshots)
    #[error("GO term {go_id} (aspect {aspect}) has no background frequency")]
    MissingBackground { aspect: Aspect, go_id: String },

    #[error("GO term {go_id} (aspect {aspect}) has background frequency {frequency} outside (0, 1]")]
    InvalidBackground {
        aspect: Aspect,
        go_id: String,
        frequency: f64,
    },
}

/// Distinct GO terms per aspect for every protein in the corpus
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    proteins: BTreeMap<String, PerAspect<BTreeSet<String>>>,
}

impl AnnotationIndex {
    /// Group annotation records by protein; duplicate annotations collapse
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AnnotationRecord>,
    {
        let mut proteins: BTreeMap<String, PerAspect<BTreeSet<String>>> = BTreeMap::new();

        for record in records {
            proteins.entry(record.protein_id.clone()).or_default()[record.aspect]
                .insert(record.go_id.clone());
        }

        Self { proteins }
    }

    pub fn get(&self, protein_id: &str) -> Option<&PerAspect<BTreeSet<String>>> {
        self.proteins.get(protein_id)
    }

    /// Proteins in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PerAspect<BTreeSet<String>>)> {
        self.proteins.iter()
    }

    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }

    /// Fraction of all proteins carrying each term, per aspect
    pub fn background_frequencies(&self) -> BackgroundFrequencies {
        let mut counts: PerAspect<HashMap<String, usize>> = PerAspect::default();

        for terms in self.proteins.values() {
            for (aspect, go_ids) in terms.iter() {
                for go_id in go_ids {
                    *counts[aspect].entry(go_id.clone()).or_insert(0) += 1;
                }
            }
        }

        let total = self.proteins.len() as f64;
        let frequencies: PerAspect<HashMap<String, f64>> = counts.map(|_, per_term| {
            per_term
                .iter()
                .map(|(go_id, &count)| (go_id.clone(), count as f64 / total))
                .collect()
        });

        BackgroundFrequencies { frequencies }
    }
}

/// GO term prevalence across the annotated protein population
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundFrequencies {
    frequencies: PerAspect<HashMap<String, f64>>,
}

impl BackgroundFrequencies {
    /// Use externally supplied frequency tables
    pub fn from_tables(frequencies: PerAspect<HashMap<String, f64>>) -> Self {
        Self { frequencies }
    }

    pub fn get(&self, aspect: Aspect, go_id: &str) -> Option<f64> {
        self.frequencies[aspect].get(go_id).copied()
    }

    /// Frequency of a scored term; absence or a value outside (0, 1] is fatal
    pub fn require(&self, aspect: Aspect, go_id: &str) -> Result<f64, EnrichmentError> {
        let frequency = self
            .get(aspect, go_id)
            .ok_or_else(|| EnrichmentError::MissingBackground {
                aspect,
                go_id: go_id.to_string(),
            })?;

        if !(frequency > 0.0 && frequency <= 1.0) {
            return Err(EnrichmentError::InvalidBackground {
                aspect,
                go_id: go_id.to_string(),
                frequency,
            });
        }

        Ok(frequency)
    }

    pub fn term_count(&self, aspect: Aspect) -> usize {
        self.frequencies[aspect].len()
    }
}

/// Mean weighted association of one protein's terms for one aspect
pub fn aspect_enrichment(
    aspect: Aspect,
    go_ids: &BTreeSet<String>,
    background: &BackgroundFrequencies,
    weights: &ReferenceWeights,
) -> Result<f64, EnrichmentError> {
    if go_ids.is_empty() {
        return Ok(0.0);
    }

    let mut raw = 0.0;
    for go_id in go_ids {
        let frequency = background.require(aspect, go_id)?;
        raw += weights.get(go_id) / frequency;
    }

    Ok(raw / go_ids.len() as f64)
}

/// Score every protein in the index, in ascending protein id order
///
/// Normalized scores are left at 0; see [`apply_rank_normalization`].
pub fn score_proteins(
    index: &AnnotationIndex,
    background: &BackgroundFrequencies,
    weights: &PerAspect<ReferenceWeights>,
) -> Result<Vec<ProteinEnrichment>, EnrichmentError> {
    let mut scored = Vec::with_capacity(index.len());

    for (protein_id, terms) in index.iter() {
        let mut record = ProteinEnrichment::new(
            protein_id.clone(),
            terms.map(|_, go_ids| go_ids.iter().cloned().collect()),
        );

        for aspect in Aspect::ALL {
            record.enrichment[aspect] =
                aspect_enrichment(aspect, &terms[aspect], background, &weights[aspect])?;
        }

        scored.push(record);
    }

    debug!("Scored {} proteins", scored.len());
    Ok(scored)
}

/// Fill term labels for the export columns
pub fn attach_labels(records: &mut [ProteinEnrichment], labels: &GoLabels) {
    for record in records.iter_mut() {
        record.labels = record.terms.map(|_, go_ids| {
            go_ids
                .iter()
                .map(|go_id| labels.get_or_unknown(go_id).to_string())
                .collect()
        });
    }
}

/// Competition ("min") rank of each value divided by the number of values
///
/// Tied values share the lowest rank of their group, so the result is in
/// (0, 1] and equal inputs always map to equal outputs.
pub fn rank_normalize(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut normalized = vec![0.0; n];
    let mut rank = 1;
    for (position, &idx) in order.iter().enumerate() {
        if position > 0 && values[idx] != values[order[position - 1]] {
            rank = position + 1;
        }
        normalized[idx] = rank as f64 / n as f64;
    }

    normalized
}

/// Rank-normalize every aspect's scores across all records
pub fn apply_rank_normalization(records: &mut [ProteinEnrichment]) {
    for aspect in Aspect::ALL {
        let values: Vec<f64> = records.iter().map(|r| r.enrichment[aspect]).collect();
        for (record, normalized) in records.iter_mut().zip(rank_normalize(&values)) {
            record.normalized[aspect] = normalized;
        }
    }
}

/// Scored proteins plus the size of each aspect's background
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCorpus {
    pub proteins: Vec<ProteinEnrichment>,
    pub background_terms: PerAspect<usize>,
}

/// Full scoring pass over an annotation corpus
///
/// Groups the records, derives background frequencies, scores every
/// protein, attaches labels and rank-normalizes each aspect.
pub fn score_corpus(
    records: &[AnnotationRecord],
    weights: &PerAspect<ReferenceWeights>,
    labels: &GoLabels,
) -> Result<ScoredCorpus, EnrichmentError> {
    let index = AnnotationIndex::from_records(records);
    let background = index.background_frequencies();
    let background_terms = PerAspect::from_fn(|aspect| background.term_count(aspect));
    info!(
        "Grouped {} proteins; background terms F={} P={} C={}",
        index.len(),
        background_terms.function,
        background_terms.process,
        background_terms.component
    );

    let mut proteins = score_proteins(&index, &background, weights)?;
    attach_labels(&mut proteins, labels);
    apply_rank_normalization(&mut proteins);
    info!("Scored {} proteins", proteins.len());

    Ok(ScoredCorpus {
        proteins,
        background_terms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(protein: &str, go_id: &str, aspect: Aspect) -> AnnotationRecord {
        AnnotationRecord {
            protein_id: protein.to_string(),
            go_id: go_id.to_string(),
            aspect,
        }
    }

    fn weights(pairs: &[(&str, f64)]) -> ReferenceWeights {
        pairs.iter().map(|(id, w)| (id.to_string(), *w)).collect()
    }

    fn terms(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn corpus() -> Vec<AnnotationRecord> {
        vec![
            annotation("P1", "GO:001", Aspect::Function),
            annotation("P1", "GO:002", Aspect::Function),
            annotation("P1", "GO:002", Aspect::Function),
            annotation("P1", "GO:100", Aspect::Process),
            annotation("P2", "GO:001", Aspect::Function),
            annotation("P2", "GO:200", Aspect::Component),
            annotation("P3", "GO:100", Aspect::Process),
            annotation("P4", "GO:200", Aspect::Component),
        ]
    }

    #[test]
    fn test_grouping_collapses_duplicates() {
        let records = corpus();
        let index = AnnotationIndex::from_records(&records);

        assert_eq!(index.len(), 4);
        let p1 = index.get("P1").unwrap();
        assert_eq!(p1.function, terms(&["GO:001", "GO:002"]));
        assert_eq!(p1.process, terms(&["GO:100"]));
        assert!(p1.component.is_empty());

        let ids: Vec<_> = index.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3", "P4"]);
    }

    #[test]
    fn test_background_frequencies() {
        let records = corpus();
        let background = AnnotationIndex::from_records(&records).background_frequencies();

        // 4 distinct proteins
        assert_eq!(background.get(Aspect::Function, "GO:001"), Some(0.5));
        assert_eq!(background.get(Aspect::Function, "GO:002"), Some(0.25));
        assert_eq!(background.get(Aspect::Process, "GO:100"), Some(0.5));
        assert_eq!(background.get(Aspect::Component, "GO:200"), Some(0.5));
        // Aspect-specific: a process term is not a function term
        assert_eq!(background.get(Aspect::Function, "GO:100"), None);

        for aspect in Aspect::ALL {
            for (_, go_ids) in AnnotationIndex::from_records(&records).iter() {
                for go_id in &go_ids[aspect] {
                    let f = background.get(aspect, go_id).unwrap();
                    assert!(f > 0.0 && f <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_worked_example_score() {
        let background = BackgroundFrequencies::from_tables(PerAspect::new(
            [("GO:001".to_string(), 0.5), ("GO:002".to_string(), 0.25)]
                .into_iter()
                .collect(),
            HashMap::new(),
            HashMap::new(),
        ));
        let f_weights = weights(&[("GO:001", 2.0), ("GO:002", 1.0)]);

        let score = aspect_enrichment(
            Aspect::Function,
            &terms(&["GO:001", "GO:002"]),
            &background,
            &f_weights,
        )
        .unwrap();

        // (2 / 0.5 + 1 / 0.25) / 2
        assert!((score - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_no_terms_scores_zero() {
        let background = BackgroundFrequencies::default();
        let score = aspect_enrichment(
            Aspect::Process,
            &BTreeSet::new(),
            &background,
            &ReferenceWeights::default(),
        )
        .unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_unweighted_term_still_counts_toward_mean() {
        let records = corpus();
        let index = AnnotationIndex::from_records(&records);
        let background = index.background_frequencies();
        let all_weights = PerAspect::new(
            weights(&[("GO:001", 2.0)]),
            ReferenceWeights::default(),
            ReferenceWeights::default(),
        );

        let scored = score_proteins(&index, &background, &all_weights).unwrap();
        let p1 = &scored[0];

        // (2 / 0.5 + 0 / 0.25) / 2
        assert_eq!(p1.protein_id, "P1");
        assert!((p1.enrichment.function - 2.0).abs() < 1e-10);
        assert_eq!(p1.enrichment.process, 0.0);
        assert_eq!(p1.enrichment.component, 0.0);
    }

    #[test]
    fn test_missing_background_is_fatal() {
        let background = BackgroundFrequencies::from_tables(PerAspect::new(
            [("GO:001".to_string(), 0.5)].into_iter().collect(),
            HashMap::new(),
            HashMap::new(),
        ));

        let err = aspect_enrichment(
            Aspect::Function,
            &terms(&["GO:001", "GO:404"]),
            &background,
            &ReferenceWeights::default(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            EnrichmentError::MissingBackground {
                aspect: Aspect::Function,
                go_id: "GO:404".to_string(),
            }
        );
        assert!(err.to_string().contains("GO:404"));
    }

    #[test]
    fn test_zero_background_is_fatal() {
        let background = BackgroundFrequencies::from_tables(PerAspect::new(
            HashMap::new(),
            [("GO:100".to_string(), 0.0)].into_iter().collect(),
            HashMap::new(),
        ));

        let err = background.require(Aspect::Process, "GO:100").unwrap_err();
        assert!(matches!(err, EnrichmentError::InvalidBackground { .. }));
    }

    #[test]
    fn test_rank_normalize_min_ties() {
        let normalized = rank_normalize(&[3.0, 1.0, 3.0, 0.0, 0.0]);
        // sorted: 0, 0, 1, 3, 3 -> ranks 1, 1, 3, 4, 4
        assert_eq!(normalized, vec![0.8, 0.6, 0.8, 0.2, 0.2]);
    }

    #[test]
    fn test_rank_normalize_properties() {
        let values = vec![0.0, 5.5, 2.0, 2.0, 0.0, 9.0, 1.0];
        let normalized = rank_normalize(&values);

        let mut pairs: Vec<(f64, f64)> = values.iter().copied().zip(normalized).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        for window in pairs.windows(2) {
            assert!(window[0].1 <= window[1].1, "not non-decreasing: {:?}", window);
            if window[0].0 == window[1].0 {
                assert_eq!(window[0].1, window[1].1);
            }
        }
        for (_, n) in &pairs {
            assert!(*n > 0.0 && *n <= 1.0);
        }
    }

    #[test]
    fn test_rank_normalize_empty() {
        assert!(rank_normalize(&[]).is_empty());
    }

    #[test]
    fn test_score_corpus_end_to_end() {
        let records = corpus();
        let all_weights = PerAspect::new(
            weights(&[("GO:001", 2.0), ("GO:002", 1.0)]),
            weights(&[("GO:100", 1.0)]),
            ReferenceWeights::default(),
        );
        let labels: GoLabels = [("GO:001".to_string(), "binding".to_string())]
            .into_iter()
            .collect();

        let corpus = score_corpus(&records, &all_weights, &labels).unwrap();
        assert_eq!(corpus.background_terms.component, 1);
        let scored = corpus.proteins;
        assert_eq!(scored.len(), 4);

        let p1 = &scored[0];
        assert!((p1.enrichment.function - 4.0).abs() < 1e-10);
        assert_eq!(p1.labels.function, vec!["binding", "Unknown"]);

        // P2 scores 2 / 0.5 = 4.0 as well: P1 and P2 share rank 3 of 4
        assert!((scored[1].enrichment.function - 4.0).abs() < 1e-10);
        assert_eq!(p1.normalized.function, 0.75);
        assert_eq!(scored[1].normalized.function, 0.75);

        // P3 and P4 have no function terms: tied at the lowest rank
        let p3 = &scored[2];
        let p4 = &scored[3];
        assert_eq!(p3.enrichment.function, 0.0);
        assert_eq!(p3.normalized.function, 0.25);
        assert_eq!(p4.normalized.function, 0.25);

        // P2 has no process terms: raw 0, tied with P4 at rank 1
        let p2 = &scored[1];
        assert_eq!(p2.enrichment.process, 0.0);
        assert_eq!(p2.normalized.process, 0.25);
        assert!(!p2.normalized.process.is_nan());

        // Component weights are empty: everyone ties at rank 1
        for record in &scored {
            assert_eq!(record.normalized.component, 0.25);
        }
    }

    #[test]
    fn test_score_corpus_is_deterministic() {
        let records = corpus();
        let all_weights = PerAspect::new(
            weights(&[("GO:001", 2.0), ("GO:002", 1.0)]),
            weights(&[("GO:100", 3.0)]),
            weights(&[("GO:200", 0.5)]),
        );
        let labels = GoLabels::default();

        let first = score_corpus(&records, &all_weights, &labels).unwrap();
        let mut reversed = records.clone();
        reversed.reverse();
        let second = score_corpus(&reversed, &all_weights, &labels).unwrap();

        assert_eq!(first, second);
    }
}
