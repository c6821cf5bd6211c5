// ==============================================================================
// manifest.rs - Run Provenance
// ==============================================================================
// Description: JSON sidecar recording inputs, outputs and counts of a run
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::output::write_atomically;
use crate::validator::compute_sha256;

pub const MANIFEST_SUFFIX: &str = ".manifest.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InputFingerprint {
    pub role: String,
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub command: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub inputs: Vec<InputFingerprint>,
    pub outputs: Vec<PathBuf>,
    pub counts: BTreeMap<String, u64>,
}

impl RunManifest {
    pub fn new(command: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            command: command.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
            finished_at: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            counts: BTreeMap::new(),
        }
    }

    /// Fingerprint an input file
    pub fn add_input(&mut self, role: &str, path: &Path) -> Result<()> {
        let size = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat {:?}", path))?
            .len();
        let sha256 = compute_sha256(path)?;

        self.inputs.push(InputFingerprint {
            role: role.to_string(),
            path: path.to_path_buf(),
            size,
            sha256,
        });
        Ok(())
    }

    pub fn add_output(&mut self, path: &Path) {
        self.outputs.push(path.to_path_buf());
    }

    pub fn set_count(&mut self, name: &str, value: u64) {
        self.counts.insert(name.to_string(), value);
    }

    /// Stamp the finish time and write the manifest next to `output`
    pub fn finish(mut self, output: &Path) -> Result<PathBuf> {
        self.finished_at = Some(Utc::now());

        let target = manifest_path(output);
        write_atomically(&target, |w| {
            serde_json::to_writer_pretty(&mut *w, &self)?;
            writeln!(w)?;
            Ok(())
        })?;

        info!("Run manifest written to {:?} (run {})", target, self.run_id);
        Ok(target)
    }
}

/// `<output>.manifest.json`
pub fn manifest_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(MANIFEST_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_manifest_path() {
        assert_eq!(
            manifest_path(Path::new("out/enrichment.tsv")),
            PathBuf::from("out/enrichment.tsv.manifest.json")
        );
    }

    #[test]
    fn test_manifest_round_trip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("F_counts.tsv");
        std::fs::File::create(&input)
            .unwrap()
            .write_all(b"abc")
            .unwrap();
        let output = dir.path().join("enrichment.tsv");

        let mut manifest = RunManifest::new("score");
        manifest.add_input("function_weights", &input).unwrap();
        manifest.add_output(&output);
        manifest.set_count("proteins", 42);
        let run_id = manifest.run_id;

        let written = manifest.finish(&output).unwrap();
        let parsed: RunManifest =
            serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();

        assert_eq!(parsed.run_id, run_id);
        assert_eq!(parsed.command, "score");
        assert!(parsed.finished_at.is_some());
        assert_eq!(parsed.inputs[0].size, 3);
        assert_eq!(
            parsed.inputs[0].sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(parsed.outputs, vec![output]);
        assert_eq!(parsed.counts["proteins"], 42);
    }

    #[test]
    fn test_missing_input_is_error() {
        let mut manifest = RunManifest::new("go-counts");
        assert!(manifest
            .add_input("annotations", Path::new("/nonexistent/goa.gaf"))
            .is_err());
    }
}
