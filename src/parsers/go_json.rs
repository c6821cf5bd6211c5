// ==============================================================================
// parsers/go_json.rs - GO Term Label Parser
// ==============================================================================
// Description: Loads GO term labels from the OBO Graphs JSON release (go.json)
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format:
//   {"graphs": [{"nodes": [
//       {"id": "http://purl.obolibrary.org/obo/GO_0005739", "lbl": "mitochondrion"}, ...
//   ]}]}
// ==============================================================================

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Label written for GO ids with no entry in the label table
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Error, Debug)]
pub enum GoJsonError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    graphs: Vec<Graph>,
}

#[derive(Debug, Deserialize)]
struct Graph {
    #[serde(default)]
    nodes: Vec<GraphNode>,
}

#[derive(Debug, Deserialize)]
struct GraphNode {
    id: Option<String>,
    lbl: Option<String>,
}

/// GO term id -> human-readable label
#[derive(Debug, Clone, Default)]
pub struct GoLabels {
    labels: HashMap<String, String>,
}

impl GoLabels {
    pub fn parse(path: impl AsRef<Path>) -> Result<Self, GoJsonError> {
        Self::from_reader(super::open_reader(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GoJsonError> {
        let document: GraphDocument = serde_json::from_reader(reader)?;

        let labels = document
            .graphs
            .into_iter()
            .flat_map(|graph| graph.nodes)
            .filter_map(|node| {
                let go_id = go_id_from_uri(node.id.as_deref()?)?;
                let label = node.lbl.filter(|l| !l.is_empty())?;
                Some((go_id, label))
            })
            .collect();

        Ok(Self { labels })
    }

    pub fn get(&self, go_id: &str) -> Option<&str> {
        self.labels.get(go_id).map(String::as_str)
    }

    pub fn get_or_unknown(&self, go_id: &str) -> &str {
        self.get(go_id).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<(String, String)> for GoLabels {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

/// "http://purl.obolibrary.org/obo/GO_0005739" -> "GO:0005739"
pub fn go_id_from_uri(uri: &str) -> Option<String> {
    let segment = uri.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.replace('_', ":"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_id_from_uri() {
        assert_eq!(
            go_id_from_uri("http://purl.obolibrary.org/obo/GO_0005739").as_deref(),
            Some("GO:0005739")
        );
        assert_eq!(go_id_from_uri("GO_0000001").as_deref(), Some("GO:0000001"));
        assert_eq!(go_id_from_uri("http://example.org/"), None);
    }

    #[test]
    fn test_parse_graph_document() {
        let json = r#"{
            "graphs": [
                {"nodes": [
                    {"id": "http://purl.obolibrary.org/obo/GO_0005739", "lbl": "mitochondrion", "type": "CLASS"},
                    {"id": "http://purl.obolibrary.org/obo/GO_0003723", "lbl": "RNA binding"},
                    {"id": "http://purl.obolibrary.org/obo/GO_0000000"},
                    {"lbl": "orphan label"}
                ]},
                {"nodes": [
                    {"id": "http://purl.obolibrary.org/obo/GO_0006412", "lbl": "translation"}
                ]},
                {"edges": []}
            ]
        }"#;

        let labels = GoLabels::from_reader(json.as_bytes()).unwrap();

        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get("GO:0005739"), Some("mitochondrion"));
        assert_eq!(labels.get("GO:0006412"), Some("translation"));
        assert_eq!(labels.get("GO:0000000"), None);
        assert_eq!(labels.get_or_unknown("GO:9999999"), UNKNOWN_LABEL);
    }

    #[test]
    fn test_missing_graphs_is_empty() {
        let labels = GoLabels::from_reader("{}".as_bytes()).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn test_parse_gzipped_file() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let json = r#"{"graphs": [{"nodes": [
            {"id": "http://purl.obolibrary.org/obo/GO_0005739", "lbl": "mitochondrion"}
        ]}]}"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        file.write_all(&encoder.finish().unwrap()).unwrap();
        file.flush().unwrap();

        let labels = GoLabels::parse(file.path()).unwrap();
        assert_eq!(labels.get("GO:0005739"), Some("mitochondrion"));
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = GoLabels::from_reader("{\"graphs\": [".as_bytes()).unwrap_err();
        assert!(matches!(err, GoJsonError::JsonError(_)));
    }
}
