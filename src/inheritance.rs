// ==============================================================================
// inheritance.rs - Trio Inheritance Classification
// ==============================================================================
// Description: Bins variant carriers by parental genotype using a PED pedigree
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Bins (each carrier lands in exactly one):
//   unknown      not in PED, a parent is "0", or a parental GT is missing
//   monoallelic  exactly one parent carries the variant
//   biallelic    both parents carry the variant
//   de novo      both parents called homozygous reference
// ==============================================================================

use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use crate::genotype::{classify_genotype, GenotypeCall};
use crate::models::join_list;
use crate::parsers::Pedigree;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CohortParseError {
    #[error("Invalid cohort genotype line {line}: '{content}' (expected sample_id:GT)")]
    InvalidLine { line: usize, content: String },
}

/// Sample genotypes at one site, in input order
#[derive(Debug, Clone, Default)]
pub struct CohortGenotypes {
    order: Vec<String>,
    genotypes: HashMap<String, String>,
}

impl CohortGenotypes {
    /// Parse newline-delimited `sample_id:GT` pairs
    ///
    /// A repeated sample keeps its first position and its last genotype.
    pub fn parse(input: &str) -> Result<Self, CohortParseError> {
        let mut cohort = Self::default();

        for (idx, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (sample, gt) = line
                .split_once(':')
                .filter(|(sample, gt)| !sample.is_empty() && !gt.contains(':'))
                .ok_or_else(|| CohortParseError::InvalidLine {
                    line: idx + 1,
                    content: line.to_string(),
                })?;

            if cohort
                .genotypes
                .insert(sample.to_string(), gt.to_string())
                .is_none()
            {
                cohort.order.push(sample.to_string());
            }
        }

        Ok(cohort)
    }

    pub fn genotype(&self, sample: &str) -> Option<&str> {
        self.genotypes.get(sample).map(String::as_str)
    }

    pub fn call(&self, sample: &str) -> Option<GenotypeCall> {
        self.genotype(sample).map(classify_genotype)
    }

    /// Samples carrying a non-reference allele, in input order
    pub fn carriers(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|sample| {
                self.call(sample)
                    .is_some_and(|call| call.is_carrier())
            })
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InheritanceClass {
    Unknown,
    Monoallelic,
    Biallelic,
    DeNovo,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InheritanceCounts {
    pub probands: Vec<String>,
    pub monoallelic: Vec<String>,
    pub biallelic: Vec<String>,
    pub denovo: Vec<String>,
    pub unknown: Vec<String>,
}

impl InheritanceCounts {
    fn bin_mut(&mut self, class: InheritanceClass) -> &mut Vec<String> {
        match class {
            InheritanceClass::Unknown => &mut self.unknown,
            InheritanceClass::Monoallelic => &mut self.monoallelic,
            InheritanceClass::Biallelic => &mut self.biallelic,
            InheritanceClass::DeNovo => &mut self.denovo,
        }
    }

    /// Output line: `gnomad_id, rest, probands, n_monoallelic, monoallelic_probands, ...`
    pub fn to_row(&self, gnomad_id: &str, rest: &str) -> String {
        [
            gnomad_id.to_string(),
            rest.to_string(),
            join_list(&self.probands),
            self.monoallelic.len().to_string(),
            join_list(&self.monoallelic),
            self.biallelic.len().to_string(),
            join_list(&self.biallelic),
            self.denovo.len().to_string(),
            join_list(&self.denovo),
            self.unknown.len().to_string(),
            join_list(&self.unknown),
        ]
        .join("\t")
    }
}

/// Classify one carrier from its parents' calls
pub fn classify_carrier(
    carrier: &str,
    pedigree: &Pedigree,
    cohort: &CohortGenotypes,
) -> InheritanceClass {
    let Some(record) = pedigree.get(carrier) else {
        warn!("Proband {} not found in PED file", carrier);
        return InheritanceClass::Unknown;
    };

    let (Some(father), Some(mother)) = (record.father(), record.mother()) else {
        return InheritanceClass::Unknown;
    };

    let informative = |id: &str| cohort.call(id).filter(GenotypeCall::is_informative);
    let (Some(father_call), Some(mother_call)) = (informative(father), informative(mother)) else {
        return InheritanceClass::Unknown;
    };

    match (father_call.is_carrier(), mother_call.is_carrier()) {
        (true, true) => InheritanceClass::Biallelic,
        (true, false) | (false, true) => InheritanceClass::Monoallelic,
        (false, false) => InheritanceClass::DeNovo,
    }
}

/// Bin every carrier in the cohort
pub fn classify_carriers(cohort: &CohortGenotypes, pedigree: &Pedigree) -> InheritanceCounts {
    let mut counts = InheritanceCounts::default();

    for carrier in cohort.carriers() {
        counts.probands.push(carrier.to_string());
        let class = classify_carrier(carrier, pedigree, cohort);
        counts.bin_mut(class).push(carrier.to_string());
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::PedRecord;

    fn ped(individual: &str, father: &str, mother: &str) -> PedRecord {
        PedRecord {
            family_id: "FAM".to_string(),
            individual_id: individual.to_string(),
            father_id: father.to_string(),
            mother_id: mother.to_string(),
            sex: "1".to_string(),
            phenotype: "2".to_string(),
        }
    }

    fn pedigree() -> Pedigree {
        vec![
            ped("P1", "F1", "M1"),
            ped("P2", "F2", "M2"),
            ped("P3", "F3", "M3"),
            ped("P4", "0", "M4"),
            ped("P5", "F5", "M5"),
            ped("P6", "F6", "M6"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_parse_cohort() {
        let cohort = CohortGenotypes::parse("P1:0/1\nF1:0/0\n\nM1:./.\n").unwrap();
        assert_eq!(cohort.len(), 3);
        assert_eq!(cohort.genotype("M1"), Some("./."));
        assert_eq!(cohort.carriers(), vec!["P1"]);
    }

    #[test]
    fn test_parse_cohort_rejects_bad_line() {
        let err = CohortGenotypes::parse("P1:0/1\nnot-a-pair\n").unwrap_err();
        assert_eq!(
            err,
            CohortParseError::InvalidLine {
                line: 2,
                content: "not-a-pair".to_string()
            }
        );
    }

    #[test]
    fn test_all_classification_paths() {
        let cohort = CohortGenotypes::parse(
            "P1:0/1\nF1:0/1\nM1:0/0\n\
             P2:1/1\nF2:0/1\nM2:0|1\n\
             P3:0/1\nF3:0/0\nM3:0|0\n\
             P4:0/1\nM4:0/0\n\
             P5:0/1\nF5:./.\nM5:0/0\n\
             P6:0/1\nF6:0/0\n\
             X1:0/1\n",
        )
        .unwrap();

        let counts = classify_carriers(&cohort, &pedigree());

        // Parents who carry the variant are carriers themselves
        assert_eq!(
            counts.probands,
            vec!["P1", "F1", "P2", "F2", "M2", "P3", "P4", "P5", "P6", "X1"]
        );
        assert_eq!(counts.monoallelic, vec!["P1"]);
        assert_eq!(counts.biallelic, vec!["P2"]);
        assert_eq!(counts.denovo, vec!["P3"]);
        // P4 unknown father, P5 missing father GT, P6 mother absent from cohort,
        // X1 and the carrier parents are not in the pedigree as children
        assert_eq!(counts.unknown, vec!["F1", "F2", "M2", "P4", "P5", "P6", "X1"]);
    }

    #[test]
    fn test_partial_calls_are_carriers() {
        let cohort = CohortGenotypes::parse("P1:0/.\nP2:./1\nP3:0/0\nP4:./0\n").unwrap();
        assert_eq!(cohort.carriers(), vec!["P1", "P2", "P4"]);

        let counts = classify_carriers(&cohort, &pedigree());
        assert_eq!(counts.probands, vec!["P1", "P2", "P4"]);
    }

    #[test]
    fn test_partial_call_parent_counts_as_carrier() {
        let cohort = CohortGenotypes::parse("P1:0/1\nF1:0/.\nM1:0/0\n").unwrap();
        assert_eq!(
            classify_carrier("P1", &pedigree(), &cohort),
            InheritanceClass::Monoallelic
        );
    }

    #[test]
    fn test_haploid_reference_parent_is_uninformative() {
        let cohort = CohortGenotypes::parse("P1:0/1\nF1:0\nM1:0/0\n").unwrap();
        assert_eq!(
            classify_carrier("P1", &pedigree(), &cohort),
            InheritanceClass::Unknown
        );
    }

    #[test]
    fn test_output_row() {
        let counts = InheritanceCounts {
            probands: vec!["P1".into(), "P2".into()],
            monoallelic: vec!["P1".into()],
            biallelic: Vec::new(),
            denovo: Vec::new(),
            unknown: vec!["P2".into()],
        };
        assert_eq!(
            counts.to_row("1-100-A-G", "POLG"),
            "1-100-A-G\tPOLG\tP1|P2\t1\tP1\t0\t\t0\t\t1\tP2"
        );
    }
}
