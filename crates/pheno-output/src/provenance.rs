//! Run provenance sidecar.
//!
//! The table itself stays byte-stable across runs; everything run-specific
//! (timestamp, input paths, options) goes into `participants.json` next to
//! it.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use pheno_model::RunOptions;

#[derive(Debug, Serialize)]
pub struct Provenance {
    /// Run timestamp, `YYYY-MM-DD_HHhMMmSSs`.
    pub created: String,
    pub sessions_root: String,
    /// Source code -> input path, for every source provided.
    pub source_files: BTreeMap<String, String>,
    pub options: RunOptions,
    pub subjects: usize,
}

impl Provenance {
    pub fn timestamp_now() -> String {
        chrono::Local::now().format("%Y-%m-%d_%Hh%Mm%Ss").to_string()
    }
}

/// Writes the sidecar as pretty JSON under `output_dir`.
pub fn write_provenance(provenance: &Provenance, output_dir: &Path) -> Result<std::path::PathBuf> {
    let path = output_dir.join("participants.json");
    let file = std::fs::File::create(&path)
        .with_context(|| format!("create {}", path.display()))?;
    serde_json::to_writer_pretty(file, provenance).context("serialize provenance")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_round_trips_as_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut source_files = BTreeMap::new();
        source_files.insert("EDSS".to_string(), "inputs/edss.csv".to_string());
        let provenance = Provenance {
            created: "2026-08-27_10h00m00s".to_string(),
            sessions_root: "imaging".to_string(),
            source_files,
            options: RunOptions::default(),
            subjects: 2,
        };
        let path = write_provenance(&provenance, dir.path()).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["subjects"], 2);
        assert_eq!(value["source_files"]["EDSS"], "inputs/edss.csv");
        assert_eq!(value["options"]["max_lag_cognition_days"], 180);
    }
}
