//! Data model for the phenotype-linkage pipeline.
//!
//! Pure types only: sessions, clinical records, source specs, run options
//! and the fused per-subject output row. Parsing and matching live in
//! `pheno-core`; I/O lives in `pheno-ingest` and `pheno-output`.

pub mod options;
pub mod record;
pub mod source;
pub mod subject;

/// Missing-value representation used throughout the output table.
///
/// BIDS `participants.tsv` convention; never an empty cell and never a
/// stored error value.
pub const SENTINEL: &str = "n/a";

pub use options::{LagCriterion, RunOptions};
pub use record::{ClinicalRecord, ClinicalSource, MatchResult, SourceSet};
pub use source::{
    DEFAULT_MAX_LAG_COGNITION_DAYS, DEFAULT_MAX_LAG_DISABILITY_DAYS, DateFormat, LinkMode,
    MS_COURSE_DATE_PREFIX, MatchPolicy, SourceKind, SourceSpec, default_sources, source_spec,
};
pub use subject::{CanonicalRow, Session};
