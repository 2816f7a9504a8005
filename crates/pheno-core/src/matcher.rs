//! Session-to-record matching.
//!
//! Pure functions: given one subject, one session date and one loaded
//! source, select the best record under the source's policy. Records whose
//! date cell fails to normalize drop out of candidacy; they never abort
//! the scan.

use chrono::NaiveDate;

use pheno_model::{ClinicalSource, MatchPolicy, MatchResult};

use crate::datetime::normalize_date;

/// Matches one session against a source under an explicit policy.
///
/// Tolerance policy: the record with minimal absolute day lag wins, with
/// ties broken by natural row order; a minimal lag above the maximum
/// rejects the match. Exact policy: the first record dated exactly on the
/// session date wins.
pub fn match_session(
    source: &ClinicalSource,
    subject_id: &str,
    session_date: NaiveDate,
    policy: MatchPolicy,
) -> MatchResult {
    let mut best: Option<(usize, i64)> = None;
    for (index, record) in source.records().iter().enumerate() {
        if record.subject_id != subject_id {
            continue;
        }
        let Some(raw) = record.value(source.spec.date_column) else {
            continue;
        };
        let Some(record_date) = normalize_date(raw, source.spec.date_formats) else {
            continue;
        };
        let lag = (record_date - session_date).num_days().abs();
        match policy {
            MatchPolicy::ExactDate => {
                if lag == 0 {
                    // First record on the exact date wins outright.
                    return MatchResult {
                        source: source.spec.kind,
                        session_date,
                        record_index: Some(index),
                        lag_days: Some(0),
                    };
                }
            }
            MatchPolicy::Tolerance { .. } => {
                // Strict < keeps the first-encountered record on ties.
                if best.is_none_or(|(_, best_lag)| lag < best_lag) {
                    best = Some((index, lag));
                }
            }
        }
    }

    match policy {
        MatchPolicy::ExactDate => MatchResult::none(source.spec.kind, session_date),
        MatchPolicy::Tolerance { max_lag_days } => match best {
            Some((index, lag)) if lag <= max_lag_days => MatchResult {
                source: source.spec.kind,
                session_date,
                record_index: Some(index),
                lag_days: Some(lag),
            },
            _ => MatchResult::none(source.spec.kind, session_date),
        },
    }
}
