// ==============================================================================
// genotype.rs - VCF Genotype Classification
// ==============================================================================
// Description: Classifies VCF GT strings into carrier / hom-ref / missing calls
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Classification:
//   ./.  .|.  .      -> Missing
//   0/0  0|0         -> HomRef
//   0                -> HemizygousRef (haploid reference call)
//   0/1  1|1  1  1/2 -> Carrier (at least one non-reference allele)
//   0/.  .|0         -> PartialRef (partially called, no alt allele)
// ==============================================================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenotypeError {
    #[error("Invalid allele '{allele}' in genotype '{genotype}'")]
    InvalidAllele { genotype: String, allele: String },
}

/// Call category of a single GT string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenotypeCall {
    Missing,
    HomRef,
    HemizygousRef,
    /// Partially called with no alternate allele (`0/.`, `./0`)
    PartialRef,
    Carrier,
}

impl GenotypeCall {
    /// Anything other than a hom-ref or fully missing call
    ///
    /// Partial calls count here but carry no allele index, see
    /// [`alt_allele_indices`].
    pub fn is_carrier(&self) -> bool {
        matches!(self, GenotypeCall::Carrier | GenotypeCall::PartialRef)
    }

    /// Whether a parent with this call can be used for trio classification
    ///
    /// Haploid reference calls are treated as uninformative, like missing calls.
    pub fn is_informative(&self) -> bool {
        matches!(
            self,
            GenotypeCall::HomRef | GenotypeCall::PartialRef | GenotypeCall::Carrier
        )
    }
}

fn alleles(genotype: &str) -> impl Iterator<Item = &str> {
    genotype.split(['/', '|']).map(str::trim)
}

/// Classify a GT string
///
/// # Examples
/// ```
/// use mpd_tools::genotype::{classify_genotype, GenotypeCall};
///
/// assert_eq!(classify_genotype("0/1"), GenotypeCall::Carrier);
/// assert_eq!(classify_genotype("0|0"), GenotypeCall::HomRef);
/// assert_eq!(classify_genotype("./."), GenotypeCall::Missing);
/// assert_eq!(classify_genotype("0"), GenotypeCall::HemizygousRef);
/// ```
pub fn classify_genotype(genotype: &str) -> GenotypeCall {
    let genotype = genotype.trim();
    if genotype.is_empty() {
        return GenotypeCall::Missing;
    }

    let mut ploidy = 0;
    let mut has_missing = false;
    let mut has_ref = false;
    for allele in alleles(genotype) {
        ploidy += 1;
        match allele {
            "0" => has_ref = true,
            "." | "" => has_missing = true,
            _ => return GenotypeCall::Carrier,
        }
    }

    if has_missing && has_ref {
        GenotypeCall::PartialRef
    } else if has_missing {
        GenotypeCall::Missing
    } else if ploidy == 1 {
        GenotypeCall::HemizygousRef
    } else {
        GenotypeCall::HomRef
    }
}

/// Distinct non-reference allele indices carried by a GT string, ascending
///
/// `"0/1"` -> `[1]`, `"1/2"` -> `[1, 2]`, `"1|1"` -> `[1]`, `"./."` -> `[]`
pub fn alt_allele_indices(genotype: &str) -> Result<Vec<usize>, GenotypeError> {
    let mut indices = Vec::new();

    for allele in alleles(genotype.trim()) {
        if allele == "0" || allele == "." || allele.is_empty() {
            continue;
        }
        let index: usize = allele.parse().map_err(|_| GenotypeError::InvalidAllele {
            genotype: genotype.to_string(),
            allele: allele.to_string(),
        })?;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }

    indices.sort_unstable();
    Ok(indices)
}
