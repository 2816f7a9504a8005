//! Clinical records and loaded source tables.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::source::{SourceKind, SourceSpec};

/// One row of a clinical source table, keyed by normalized column name.
///
/// Read-only after construction; owned by its [`ClinicalSource`].
#[derive(Debug, Clone)]
pub struct ClinicalRecord {
    pub source: SourceKind,
    pub subject_id: String,
    cells: BTreeMap<String, String>,
}

impl ClinicalRecord {
    pub fn new(
        source: SourceKind,
        subject_id: impl Into<String>,
        cells: BTreeMap<String, String>,
    ) -> Self {
        Self {
            source,
            subject_id: subject_id.into(),
            cells,
        }
    }

    /// Returns the trimmed cell value, or `None` when empty or absent.
    pub fn value(&self, column: &str) -> Option<&str> {
        let value = self.cells.get(column)?.trim();
        if value.is_empty() { None } else { Some(value) }
    }

    /// Column names present on this record, in sorted order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

/// One clinical source, fully loaded into memory ahead of matching.
///
/// Records keep the file's natural row order; ties during matching are
/// broken by that order, so iteration must stay stable.
#[derive(Debug, Clone)]
pub struct ClinicalSource {
    pub spec: &'static SourceSpec,
    records: Vec<ClinicalRecord>,
}

impl ClinicalSource {
    pub fn new(spec: &'static SourceSpec, records: Vec<ClinicalRecord>) -> Self {
        Self { spec, records }
    }

    pub fn records(&self) -> &[ClinicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records belonging to one subject, in natural row order.
    pub fn records_for<'a, 'b>(
        &'a self,
        subject_id: &'b str,
    ) -> impl Iterator<Item = &'a ClinicalRecord> + use<'a, 'b> {
        self.records
            .iter()
            .filter(move |record| record.subject_id == subject_id)
    }
}

/// The set of loaded clinical sources for one run.
///
/// A `None` entry means the source file was absent or unreadable; the
/// corresponding output column stays at the sentinel for every subject.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    sources: BTreeMap<SourceKind, ClinicalSource>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: ClinicalSource) {
        self.sources.insert(source.spec.kind, source);
    }

    pub fn get(&self, kind: SourceKind) -> Option<&ClinicalSource> {
        self.sources.get(&kind)
    }

    pub fn loaded_kinds(&self) -> impl Iterator<Item = SourceKind> + '_ {
        self.sources.keys().copied()
    }
}

/// Outcome of matching one source against one session. Derived, never
/// persisted; recomputed per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub source: SourceKind,
    pub session_date: NaiveDate,
    /// Index into the source's record list, when a record was accepted.
    pub record_index: Option<usize>,
    /// Absolute day lag of the accepted record.
    pub lag_days: Option<i64>,
}

impl MatchResult {
    pub fn none(source: SourceKind, session_date: NaiveDate) -> Self {
        Self {
            source,
            session_date,
            record_index: None,
            lag_days: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.record_index.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::source_spec;

    #[test]
    fn record_value_treats_blank_as_missing() {
        let mut cells = BTreeMap::new();
        cells.insert("EDSS_score".to_string(), "  2,5 ".to_string());
        cells.insert("note".to_string(), "   ".to_string());
        let record = ClinicalRecord::new(SourceKind::Disability, "12", cells);
        assert_eq!(record.value("EDSS_score"), Some("2,5"));
        assert_eq!(record.value("note"), None);
        assert_eq!(record.value("absent"), None);
    }

    #[test]
    fn records_for_preserves_row_order() {
        let spec = source_spec(SourceKind::Disability);
        let rows = vec![
            ClinicalRecord::new(SourceKind::Disability, "12", BTreeMap::new()),
            ClinicalRecord::new(SourceKind::Disability, "7", BTreeMap::new()),
            ClinicalRecord::new(SourceKind::Disability, "12", BTreeMap::new()),
        ];
        let source = ClinicalSource::new(spec, rows);
        let indices: Vec<usize> = source
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.subject_id == "12")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(source.records_for("12").count(), 2);
    }
}
