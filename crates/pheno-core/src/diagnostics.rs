//! Run diagnostics, aggregated by the caller instead of logged globally.
//!
//! Each fusion stage feeds counters into one [`RunDiagnostics`] value that
//! travels back with the output rows; the CLI renders it as the run
//! summary. Created once per run, flushed (printed) at the end.

use std::collections::BTreeMap;

use pheno_model::SourceKind;

/// Counters for one clinical source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SourceStats {
    /// Records loaded from the file.
    pub records: usize,
    /// Records whose date cell failed to normalize.
    pub unparseable_dates: usize,
    /// Session slots that accepted a record.
    pub matched: usize,
    /// Session slots whose nearest record fell outside the tolerance.
    pub rejected_over_tolerance: usize,
    /// Matched pegboard records discarded for hand inconsistency.
    pub hand_mismatches: usize,
    /// Source file absent or unreadable for this run.
    pub missing_file: bool,
}

/// Whole-run diagnostics.
#[derive(Debug, Default, Clone)]
pub struct RunDiagnostics {
    pub subjects: usize,
    pub sessions: usize,
    /// Subject/field fusions that failed and were sentinel-filled.
    pub fusion_failures: usize,
    per_source: BTreeMap<SourceKind, SourceStats>,
}

impl RunDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_mut(&mut self, kind: SourceKind) -> &mut SourceStats {
        self.per_source.entry(kind).or_default()
    }

    pub fn source(&self, kind: SourceKind) -> SourceStats {
        self.per_source.get(&kind).copied().unwrap_or_default()
    }

    pub fn iter_sources(&self) -> impl Iterator<Item = (SourceKind, SourceStats)> + '_ {
        self.per_source.iter().map(|(kind, stats)| (*kind, *stats))
    }
}
