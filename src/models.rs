// ==============================================================================
// models.rs - Gene Ontology Data Models
// ==============================================================================
// Description: Aspect-keyed containers and records shared by the MPD tools
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Sub-delimiter for list-valued cells inside a tab-delimited table
pub const LIST_DELIMITER: char = '|';

/// Placeholder written when a value is not available (distinct from a computed 0)
pub const MISSING_VALUE: &str = ".";

/// Gene Ontology aspect (column 9 of a GAF file)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Aspect {
    /// Molecular function (F)
    Function,
    /// Biological process (P)
    Process,
    /// Cellular component (C)
    Component,
}

impl Aspect {
    /// All aspects in output column order (F, P, C)
    pub const ALL: [Aspect; 3] = [Aspect::Function, Aspect::Process, Aspect::Component];

    pub fn code(&self) -> &'static str {
        match self {
            Aspect::Function => "F",
            Aspect::Process => "P",
            Aspect::Component => "C",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "F" => Some(Aspect::Function),
            "P" => Some(Aspect::Process),
            "C" => Some(Aspect::Component),
            _ => None,
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One value per GO aspect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerAspect<T> {
    pub function: T,
    pub process: T,
    pub component: T,
}

impl<T> PerAspect<T> {
    pub fn new(function: T, process: T, component: T) -> Self {
        Self {
            function,
            process,
            component,
        }
    }

    /// Build each slot from its aspect
    pub fn from_fn(mut f: impl FnMut(Aspect) -> T) -> Self {
        Self {
            function: f(Aspect::Function),
            process: f(Aspect::Process),
            component: f(Aspect::Component),
        }
    }

    /// Iterate slots in F, P, C order
    pub fn iter(&self) -> impl Iterator<Item = (Aspect, &T)> + '_ {
        Aspect::ALL.into_iter().map(move |aspect| (aspect, &self[aspect]))
    }

    pub fn map<'a, U>(&'a self, mut f: impl FnMut(Aspect, &'a T) -> U) -> PerAspect<U> {
        PerAspect::from_fn(|aspect| f(aspect, &self[aspect]))
    }
}

impl<T> Index<Aspect> for PerAspect<T> {
    type Output = T;

    fn index(&self, aspect: Aspect) -> &T {
        match aspect {
            Aspect::Function => &self.function,
            Aspect::Process => &self.process,
            Aspect::Component => &self.component,
        }
    }
}

impl<T> IndexMut<Aspect> for PerAspect<T> {
    fn index_mut(&mut self, aspect: Aspect) -> &mut T {
        match aspect {
            Aspect::Function => &mut self.function,
            Aspect::Process => &mut self.process,
            Aspect::Component => &mut self.component,
        }
    }
}

/// Single protein-to-GO-term association from the annotation corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// UniProt accession (GAF column 2)
    pub protein_id: String,

    /// GO term identifier, e.g. "GO:0005739" (GAF column 5)
    pub go_id: String,

    /// Aspect code (GAF column 9)
    pub aspect: Aspect,
}

/// Per-protein enrichment result (one output row of `score`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinEnrichment {
    /// UniProt accession
    pub protein_id: String,

    /// Distinct GO term ids per aspect, sorted
    pub terms: PerAspect<Vec<String>>,

    /// Labels matching `terms` position by position
    pub labels: PerAspect<Vec<String>>,

    /// Mean weighted association per annotated term (0 when the aspect has no terms)
    pub enrichment: PerAspect<f64>,

    /// Min-rank / protein count, in (0, 1]
    pub normalized: PerAspect<f64>,
}

impl ProteinEnrichment {
    pub fn new(protein_id: String, terms: PerAspect<Vec<String>>) -> Self {
        Self {
            protein_id,
            terms,
            labels: PerAspect::default(),
            enrichment: PerAspect::default(),
            normalized: PerAspect::default(),
        }
    }
}

/// Join list values with the table sub-delimiter
pub fn join_list<S: AsRef<str>>(values: &[S]) -> String {
    let mut joined = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            joined.push(LIST_DELIMITER);
        }
        joined.push_str(value.as_ref());
    }
    joined
}

/// Split a sub-delimited cell back into its values (empty cell -> empty list)
pub fn split_list(cell: &str) -> Vec<&str> {
    if cell.trim().is_empty() {
        return Vec::new();
    }
    cell.split(LIST_DELIMITER).map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_codes() {
        for aspect in Aspect::ALL {
            assert_eq!(Aspect::from_code(aspect.code()), Some(aspect));
        }
        assert_eq!(Aspect::from_code("X"), None);
        assert_eq!(Aspect::from_code("f"), None);
        assert_eq!(Aspect::Process.to_string(), "P");
    }

    #[test]
    fn test_per_aspect_indexing() {
        let mut counts = PerAspect::new(1, 2, 3);
        counts[Aspect::Component] += 10;

        assert_eq!(counts[Aspect::Function], 1);
        assert_eq!(counts[Aspect::Process], 2);
        assert_eq!(counts.component, 13);

        let codes: Vec<_> = counts.iter().map(|(aspect, _)| aspect.code()).collect();
        assert_eq!(codes, vec!["F", "P", "C"]);

        let doubled = counts.map(|_, v| v * 2);
        assert_eq!(doubled, PerAspect::new(2, 4, 26));
    }

    #[test]
    fn test_map_can_borrow_slots() {
        let terms = PerAspect::new(
            vec!["GO:001".to_string(), "GO:002".to_string()],
            Vec::new(),
            vec!["GO:200".to_string()],
        );

        let borrowed: PerAspect<Vec<&str>> =
            terms.map(|_, ids| ids.iter().map(String::as_str).collect());

        assert_eq!(borrowed.function, vec!["GO:001", "GO:002"]);
        assert!(borrowed.process.is_empty());
        assert_eq!(borrowed.component, vec!["GO:200"]);
    }

    #[test]
    fn test_list_round_trip() {
        let values = vec!["GO:0000001".to_string(), "GO:0000002".to_string()];
        let joined = join_list(&values);
        assert_eq!(joined, "GO:0000001|GO:0000002");
        assert_eq!(split_list(&joined), vec!["GO:0000001", "GO:0000002"]);
        assert!(split_list("").is_empty());
        assert_eq!(join_list::<String>(&[]), "");
    }
}
