//! Linkage engine: date normalization, session matching, field fusion.

pub mod datetime;
pub mod diagnostics;
pub mod fusion;
pub mod matcher;
pub mod numeric;
pub mod score;

pub use datetime::{format_date, normalize_date};
pub use diagnostics::{RunDiagnostics, SourceStats};
pub use fusion::{fuse_all, fuse_all_with, fuse_subject};
pub use matcher::match_session;
pub use numeric::{normalize_decimal_text, parse_decimal};
pub use score::{
    HIGH_EDUCATION_YEARS, IMPAIRMENT_THRESHOLD, education_indicator, is_impaired, normalized_score,
};
