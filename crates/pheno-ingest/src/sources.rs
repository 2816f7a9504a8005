//! Clinical source loading.
//!
//! Each configured source file is read fully into memory ahead of matching.
//! A missing or unreadable file is non-fatal: the source is simply absent
//! from the resulting [`SourceSet`] and its output columns stay at the
//! sentinel.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use pheno_model::{ClinicalRecord, ClinicalSource, SourceKind, SourceSet, SourceSpec, source_spec};

use crate::csv_table::{CsvTable, read_csv_table};
use crate::error::{IngestError, Result};

/// File locations for the configured clinical sources. `None` means the
/// source was not provided for this run.
#[derive(Debug, Clone, Default)]
pub struct SourcePaths {
    pub cognition: Option<PathBuf>,
    pub disability: Option<PathBuf>,
    pub pegboard: Option<PathBuf>,
    pub walk: Option<PathBuf>,
    pub education: Option<PathBuf>,
    pub demographics: Option<PathBuf>,
}

impl SourcePaths {
    pub fn get(&self, kind: SourceKind) -> Option<&Path> {
        let path = match kind {
            SourceKind::Cognition => &self.cognition,
            SourceKind::Disability => &self.disability,
            SourceKind::Pegboard => &self.pegboard,
            SourceKind::Walk => &self.walk,
            SourceKind::Education => &self.education,
            SourceKind::Demographics => &self.demographics,
        };
        path.as_deref()
    }
}

/// Subject identifiers come through spreadsheet round-trips as floats
/// (`12.0`); strip the trailing `.0` so they join with the imaging tree.
fn normalize_subject_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let cleaned = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    cleaned.to_string()
}

/// Builds a [`ClinicalSource`] from a loaded table.
///
/// Rows without a subject identifier are dropped; everything else is kept
/// verbatim (date validation happens at match time, not here).
pub fn source_from_table(spec: &'static SourceSpec, table: &CsvTable) -> ClinicalSource {
    let Some(subject_idx) = table.column_index(spec.subject_column) else {
        warn!(
            source = %spec.kind,
            column = spec.subject_column,
            "subject column missing; source loads empty"
        );
        return ClinicalSource::new(spec, Vec::new());
    };

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let subject_id = normalize_subject_id(row.get(subject_idx).map(String::as_str).unwrap_or(""));
        if subject_id.is_empty() {
            continue;
        }
        let mut cells = BTreeMap::new();
        for (idx, header) in table.headers.iter().enumerate() {
            if let Some(value) = row.get(idx) {
                if !value.is_empty() {
                    cells.insert(header.clone(), value.clone());
                }
            }
        }
        records.push(ClinicalRecord::new(spec.kind, subject_id, cells));
    }
    ClinicalSource::new(spec, records)
}

/// Loads one source from disk.
pub fn load_source(kind: SourceKind, path: &Path) -> Result<ClinicalSource> {
    if !path.is_file() {
        return Err(IngestError::SourceFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let spec = source_spec(kind);
    let table = read_csv_table(path, spec.delimiter)?;
    let source = source_from_table(spec, &table);
    debug!(source = %kind, records = source.len(), "loaded clinical source");
    Ok(source)
}

/// Loads every provided source, skipping the missing ones with a warning.
///
/// Returns the loaded set plus the kinds that could not be loaded.
pub fn load_sources(paths: &SourcePaths) -> (SourceSet, Vec<SourceKind>) {
    let mut set = SourceSet::new();
    let mut missing = Vec::new();
    for kind in SourceKind::ALL {
        let Some(path) = paths.get(kind) else {
            missing.push(kind);
            continue;
        };
        match load_source(kind, path) {
            Ok(source) => set.insert(source),
            Err(error) => {
                warn!(source = %kind, %error, "clinical source unavailable; column stays at sentinel");
                missing.push(kind);
            }
        }
    }
    (set, missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn normalizes_float_style_subject_ids() {
        assert_eq!(normalize_subject_id(" 12.0 "), "12");
        assert_eq!(normalize_subject_id("500000017"), "500000017");
        assert_eq!(normalize_subject_id(""), "");
    }

    #[test]
    fn loads_records_and_drops_rows_without_subject() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"IMED,EDSS_date,EDSS_score\n12.0,2018-02-10,\"2,5\"\n,2018-03-01,3\n")
            .unwrap();
        let source = load_source(SourceKind::Disability, file.path()).unwrap();
        assert_eq!(source.len(), 1);
        let record = &source.records()[0];
        assert_eq!(record.subject_id, "12");
        assert_eq!(record.value("EDSS_score"), Some("2,5"));
    }

    #[test]
    fn missing_file_is_reported_not_fatal() {
        let paths = SourcePaths {
            disability: Some(PathBuf::from("/nonexistent/edss.csv")),
            ..SourcePaths::default()
        };
        let (set, missing) = load_sources(&paths);
        assert!(set.get(SourceKind::Disability).is_none());
        assert!(missing.contains(&SourceKind::Disability));
        // All six sources unaccounted for: five unconfigured, one unreadable.
        assert_eq!(missing.len(), 6);
    }
}
