//! Field fusion: one canonical row per subject.
//!
//! Drives a matcher pass per subject, per source, per session, and fills
//! the session-aligned value sequences. Stages run independently so a
//! failure in one field sentinel-fills that field only and leaves the rest
//! of the subject's row intact.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use pheno_ingest::SessionIndex;
use pheno_model::{
    CanonicalRow, ClinicalRecord, ClinicalSource, DateFormat, LagCriterion,
    MS_COURSE_DATE_PREFIX, MatchPolicy, RunOptions, SENTINEL, Session, SourceKind, SourceSet,
};

use crate::datetime::{format_date, normalize_date};
use crate::diagnostics::RunDiagnostics;
use crate::matcher::match_session;
use crate::numeric::{normalize_decimal_text, parse_decimal};
use crate::score;

/// Mean length of the Gregorian calendar year, for age in years.
const DAYS_PER_YEAR: f64 = 365.2425;

/// Fuses every subject in the session index.
///
/// Subjects are independent; iteration order (and therefore output order)
/// is the index's sorted subject order.
pub fn fuse_all(
    index: &SessionIndex,
    sources: &SourceSet,
    options: &RunOptions,
) -> (Vec<CanonicalRow>, RunDiagnostics) {
    fuse_all_with(index, sources, options, |_| {})
}

/// [`fuse_all`] with a per-subject callback, invoked after each finished
/// subject (progress reporting).
pub fn fuse_all_with<F>(
    index: &SessionIndex,
    sources: &SourceSet,
    options: &RunOptions,
    mut on_subject: F,
) -> (Vec<CanonicalRow>, RunDiagnostics)
where
    F: FnMut(&str),
{
    let mut diag = seed_diagnostics(sources);
    let mut rows = Vec::with_capacity(index.subject_count());
    for (subject_id, sessions) in index.iter() {
        rows.push(fuse_subject(subject_id, sessions, sources, options, &mut diag));
        on_subject(subject_id);
    }
    diag.subjects = rows.len();
    diag.sessions = rows.iter().map(CanonicalRow::session_count).sum();
    (rows, diag)
}

/// Fuses one subject's row. Pure apart from diagnostics accumulation.
pub fn fuse_subject(
    subject_id: &str,
    sessions: &[Session],
    sources: &SourceSet,
    options: &RunOptions,
    diag: &mut RunDiagnostics,
) -> CanonicalRow {
    let dates: Vec<NaiveDate> = sessions.iter().map(|s| s.date).collect();
    let mut row = CanonicalRow::new(subject_id, dates);

    isolated(&mut row, diag, "demographics", |row, diag| {
        fuse_demographics(row, sources, diag)
    });
    isolated(&mut row, diag, "disability", |row, diag| {
        fuse_disability(row, sources, options, diag)
    });
    isolated(&mut row, diag, "cognition", |row, diag| {
        fuse_cognition(row, sources, options, diag)
    });
    isolated(&mut row, diag, "pegboard", |row, diag| {
        fuse_pegboard(row, sources, diag)
    });
    isolated(&mut row, diag, "walk", |row, diag| {
        fuse_walk(row, sources, diag)
    });
    isolated(&mut row, diag, "education", |row, diag| {
        fuse_education(row, sources, diag)
    });

    if options.unique_subjects {
        let kept = reduction_index(&row, options.criterion);
        row.retain_session(kept);
        debug!(subject = subject_id, kept, "unique-subject reduction applied");
    }
    row
}

/// Runs one fusion stage on a scratch copy; a failing stage leaves its
/// fields at the sentinel without touching the rest of the row.
fn isolated<F>(row: &mut CanonicalRow, diag: &mut RunDiagnostics, stage: &str, f: F)
where
    F: FnOnce(&mut CanonicalRow, &mut RunDiagnostics) -> anyhow::Result<()>,
{
    let mut scratch = row.clone();
    match f(&mut scratch, diag) {
        Ok(()) => *row = scratch,
        Err(error) => {
            warn!(
                subject = %row.subject_id,
                stage,
                %error,
                "fusion stage failed; field stays at sentinel"
            );
            diag.fusion_failures += 1;
        }
    }
}

/// Pre-seeds per-source record and date-parse counters, so callers that
/// drive [`fuse_subject`] themselves start from the same baseline as
/// [`fuse_all`].
pub fn seed_diagnostics(sources: &SourceSet) -> RunDiagnostics {
    let mut diag = RunDiagnostics::new();
    for kind in sources.loaded_kinds().collect::<Vec<_>>() {
        let Some(source) = sources.get(kind) else {
            continue;
        };
        let unparseable = source
            .records()
            .iter()
            .filter(|record| {
                record
                    .value(source.spec.date_column)
                    .and_then(|raw| normalize_date(raw, source.spec.date_formats))
                    .is_none()
            })
            .count();
        let stats = diag.source_mut(kind);
        stats.records = source.len();
        stats.unparseable_dates = unparseable;
    }
    diag
}

/// True when the subject has at least one record with a parseable date,
/// i.e. a failed match was a tolerance rejection rather than absence.
fn has_dated_candidate(source: &ClinicalSource, subject_id: &str) -> bool {
    source.records_for(subject_id).any(|record| {
        record
            .value(source.spec.date_column)
            .and_then(|raw| normalize_date(raw, source.spec.date_formats))
            .is_some()
    })
}

fn birth_date(sources: &SourceSet, subject_id: &str) -> Option<NaiveDate> {
    let source = sources.get(SourceKind::Demographics)?;
    let record = source.records_for(subject_id).next()?;
    let raw = record.value(source.spec.date_column)?;
    normalize_date(raw, source.spec.date_formats)
}

fn age_years(birth: NaiveDate, session: NaiveDate) -> f64 {
    (session - birth).num_days() as f64 / DAYS_PER_YEAR
}

fn fuse_demographics(
    row: &mut CanonicalRow,
    sources: &SourceSet,
    _diag: &mut RunDiagnostics,
) -> anyhow::Result<()> {
    let Some(source) = sources.get(SourceKind::Demographics) else {
        return Ok(());
    };
    let subject = row.subject_id.clone();
    let Some(record) = source.records_for(&subject).next() else {
        return Ok(());
    };
    if let Some(sex) = record.value("Gender") {
        row.sex = sex.to_string();
    }
    if let Some(birth) = record
        .value(source.spec.date_column)
        .and_then(|raw| normalize_date(raw, source.spec.date_formats))
    {
        for (idx, date) in row.session_dates.clone().into_iter().enumerate() {
            row.age_years[idx] = format!("{:.2}", age_years(birth, date));
        }
    }
    if let Some(onset) = record
        .value("Date of onset")
        .and_then(|raw| normalize_date(raw, source.spec.date_formats))
    {
        row.diagnosis_date = format_date(onset);
        for (idx, date) in row.session_dates.clone().into_iter().enumerate() {
            row.disease_duration_years[idx] = (date.year() - onset.year()).to_string();
        }
    }
    let course_columns = ms_course_columns(record);
    for (idx, date) in row.session_dates.clone().into_iter().enumerate() {
        if let Some((course_date, value)) =
            latest_prescan_course(record, &course_columns, date, source.spec.date_formats)
        {
            row.disease_course_date[idx] = format_date(course_date);
            if let Some(value) = value {
                row.disease_course[idx] = value;
            }
        }
    }
    Ok(())
}

/// The `Date MSCourse N` column family of a demographics record, ordered by
/// `N`. Each entry pairs the date column with its value column.
fn ms_course_columns(record: &ClinicalRecord) -> Vec<(u32, String, String)> {
    let mut columns: Vec<(u32, String, String)> = record
        .columns()
        .filter_map(|column| {
            let suffix = column.strip_prefix(MS_COURSE_DATE_PREFIX)?;
            let n: u32 = suffix.trim().parse().ok()?;
            let value_column = format!("MSCourse{n}");
            Some((n, column.to_string(), value_column))
        })
        .collect();
    columns.sort_by_key(|(n, _, _)| *n);
    columns
}

/// Most recent disease-course entry dated strictly before the session:
/// course entries are numbered chronologically, so the highest-numbered
/// pre-session entry wins.
fn latest_prescan_course(
    record: &ClinicalRecord,
    columns: &[(u32, String, String)],
    session_date: NaiveDate,
    formats: &[DateFormat],
) -> Option<(NaiveDate, Option<String>)> {
    let mut latest = None;
    for (_, date_column, value_column) in columns {
        let Some(course_date) = record
            .value(date_column)
            .and_then(|raw| normalize_date(raw, formats))
        else {
            continue;
        };
        if course_date < session_date {
            let value = record.value(value_column).map(str::to_string);
            latest = Some((course_date, value));
        }
    }
    latest
}

fn fuse_disability(
    row: &mut CanonicalRow,
    sources: &SourceSet,
    options: &RunOptions,
    diag: &mut RunDiagnostics,
) -> anyhow::Result<()> {
    let Some(source) = sources.get(SourceKind::Disability) else {
        return Ok(());
    };
    let policy = MatchPolicy::Tolerance {
        max_lag_days: options.max_lag_disability_days,
    };
    let has_candidate = has_dated_candidate(source, &row.subject_id);
    for (idx, date) in row.session_dates.clone().into_iter().enumerate() {
        let result = match_session(source, &row.subject_id, date, policy);
        match result.record_index {
            Some(record_index) => {
                diag.source_mut(SourceKind::Disability).matched += 1;
                if let Some(lag) = result.lag_days {
                    row.edss_lag_days[idx] = lag.to_string();
                }
                let record = &source.records()[record_index];
                if let Some(value) = record.value("EDSS_score").and_then(parse_decimal) {
                    // EDSS is reported in half points; one decimal always.
                    row.edss[idx] = format!("{value:.1}");
                }
            }
            None if has_candidate => {
                diag.source_mut(SourceKind::Disability).rejected_over_tolerance += 1;
            }
            None => {}
        }
    }
    Ok(())
}

fn fuse_cognition(
    row: &mut CanonicalRow,
    sources: &SourceSet,
    options: &RunOptions,
    diag: &mut RunDiagnostics,
) -> anyhow::Result<()> {
    let Some(source) = sources.get(SourceKind::Cognition) else {
        return Ok(());
    };
    let policy = MatchPolicy::Tolerance {
        max_lag_days: options.max_lag_cognition_days,
    };
    let has_candidate = has_dated_candidate(source, &row.subject_id);
    let birth = birth_date(sources, &row.subject_id);
    for (idx, date) in row.session_dates.clone().into_iter().enumerate() {
        let result = match_session(source, &row.subject_id, date, policy);
        let Some(record_index) = result.record_index else {
            if has_candidate {
                diag.source_mut(SourceKind::Cognition).rejected_over_tolerance += 1;
            }
            continue;
        };
        diag.source_mut(SourceKind::Cognition).matched += 1;
        if let Some(lag) = result.lag_days {
            row.cognition_lag_days[idx] = lag.to_string();
        }
        let record = &source.records()[record_index];
        let Some(raw_text) = record.value("sdmt90_total").and_then(normalize_decimal_text)
        else {
            continue;
        };
        row.cognition_raw[idx] = raw_text.clone();

        // The standardized score needs age and the education indicator for
        // this session; either missing leaves z at the sentinel.
        let age = birth.map(|b| age_years(b, date));
        let education = education_years_for(sources, &row.subject_id, date);
        if let (Some(age), Some(years), Some(raw)) = (age, education, parse_decimal(&raw_text)) {
            let z = score::normalized_score(age, score::education_indicator(years), raw);
            row.cognition_z[idx] = format!("{z:.3}");
            row.cognition_impaired[idx] = if score::is_impaired(z) { "1" } else { "0" }.to_string();
        }
    }
    Ok(())
}

fn education_years_for(sources: &SourceSet, subject_id: &str, date: NaiveDate) -> Option<f64> {
    let source = sources.get(SourceKind::Education)?;
    let result = match_session(source, subject_id, date, MatchPolicy::ExactDate);
    let record = &source.records()[result.record_index?];
    record.value("edu_years").and_then(parse_decimal)
}

/// Valid dominance labels; anything else never assigns handedness.
fn hand_label(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "left" | "l" => Some("left"),
        "right" | "r" => Some("right"),
        _ => None,
    }
}

fn fuse_pegboard(
    row: &mut CanonicalRow,
    sources: &SourceSet,
    diag: &mut RunDiagnostics,
) -> anyhow::Result<()> {
    let Some(source) = sources.get(SourceKind::Pegboard) else {
        return Ok(());
    };
    for (idx, date) in row.session_dates.clone().into_iter().enumerate() {
        let result = match_session(source, &row.subject_id, date, MatchPolicy::ExactDate);
        let Some(record_index) = result.record_index else {
            continue;
        };
        diag.source_mut(SourceKind::Pegboard).matched += 1;
        let record = &source.records()[record_index];
        let dominant = record.value("dominant_hand").and_then(hand_label);
        let used = record.value("hand_used").and_then(hand_label);
        match (dominant, used) {
            (Some(dominant), Some(used)) if dominant == used => {
                // Hand-consistent record: the measurement is attributable.
                let (dom_col, nondom_col) = if dominant == "right" {
                    ("hpt_right_s", "hpt_left_s")
                } else {
                    ("hpt_left_s", "hpt_right_s")
                };
                if let Some(time) = record.value(dom_col).and_then(normalize_decimal_text) {
                    row.pegboard_dominant_s[idx] = time;
                }
                if let Some(time) = record.value(nondom_col).and_then(normalize_decimal_text) {
                    row.pegboard_nondominant_s[idx] = time;
                }
                // Handedness is set once, from the first consistent record,
                // and never overwritten by later sessions.
                if row.handedness == SENTINEL {
                    row.handedness = dominant.to_string();
                }
            }
            _ => {
                // Mismatched or missing hand labels: the time cannot be
                // attributed to either hand; both outputs stay sentinel.
                diag.source_mut(SourceKind::Pegboard).hand_mismatches += 1;
            }
        }
    }
    Ok(())
}

fn fuse_walk(
    row: &mut CanonicalRow,
    sources: &SourceSet,
    diag: &mut RunDiagnostics,
) -> anyhow::Result<()> {
    let Some(source) = sources.get(SourceKind::Walk) else {
        return Ok(());
    };
    for (idx, date) in row.session_dates.clone().into_iter().enumerate() {
        let result = match_session(source, &row.subject_id, date, MatchPolicy::ExactDate);
        let Some(record_index) = result.record_index else {
            continue;
        };
        diag.source_mut(SourceKind::Walk).matched += 1;
        let record = &source.records()[record_index];
        if let Some(duration) = record.value("t25fw_s").and_then(normalize_decimal_text) {
            row.walk_s[idx] = duration;
        }
    }
    Ok(())
}

fn fuse_education(
    row: &mut CanonicalRow,
    sources: &SourceSet,
    diag: &mut RunDiagnostics,
) -> anyhow::Result<()> {
    let Some(source) = sources.get(SourceKind::Education) else {
        return Ok(());
    };
    for (idx, date) in row.session_dates.clone().into_iter().enumerate() {
        let result = match_session(source, &row.subject_id, date, MatchPolicy::ExactDate);
        let Some(record_index) = result.record_index else {
            continue;
        };
        diag.source_mut(SourceKind::Education).matched += 1;
        let record = &source.records()[record_index];
        if let Some(years) = record.value("edu_years").and_then(normalize_decimal_text) {
            row.education_years[idx] = years;
        }
    }
    Ok(())
}

/// Session index kept by the unique-subject reduction: the session with the
/// smallest criterion lag, ties to the earliest session; with no linked
/// session at all, the first session stays.
fn reduction_index(row: &CanonicalRow, criterion: LagCriterion) -> usize {
    let lags = match criterion {
        LagCriterion::Cognition => &row.cognition_lag_days,
        LagCriterion::Disability => &row.edss_lag_days,
    };
    let mut best: Option<(i64, usize)> = None;
    for (idx, lag) in lags.iter().enumerate() {
        let Ok(lag) = lag.parse::<i64>() else {
            continue;
        };
        if best.is_none_or(|(best_lag, _)| lag < best_lag) {
            best = Some((lag, idx));
        }
    }
    best.map(|(_, idx)| idx).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_lags(lags: &[&str]) -> CanonicalRow {
        let dates: Vec<NaiveDate> = (0..lags.len())
            .map(|i| NaiveDate::from_ymd_opt(2018, 1, 1 + i as u32).unwrap())
            .collect();
        let mut row = CanonicalRow::new("s", dates);
        row.cognition_lag_days = lags.iter().map(|l| (*l).to_string()).collect();
        row
    }

    #[test]
    fn reduction_keeps_lowest_lag_session() {
        let row = row_with_lags(&["45", "12"]);
        assert_eq!(reduction_index(&row, LagCriterion::Cognition), 1);
    }

    #[test]
    fn reduction_ties_keep_earliest_session() {
        let row = row_with_lags(&["12", "12"]);
        assert_eq!(reduction_index(&row, LagCriterion::Cognition), 0);
    }

    #[test]
    fn reduction_ignores_sentinel_lags() {
        let row = row_with_lags(&[SENTINEL, "30"]);
        assert_eq!(reduction_index(&row, LagCriterion::Cognition), 1);
        let unlinked = row_with_lags(&[SENTINEL, SENTINEL]);
        assert_eq!(reduction_index(&unlinked, LagCriterion::Cognition), 0);
    }

    #[test]
    fn hand_labels_normalize_and_reject_noise() {
        assert_eq!(hand_label(" Right "), Some("right"));
        assert_eq!(hand_label("L"), Some("left"));
        assert_eq!(hand_label("ambidextrous"), None);
        assert_eq!(hand_label(""), None);
    }

    #[test]
    fn age_uses_mean_year_length() {
        let birth = NaiveDate::from_ymd_opt(1978, 2, 12).unwrap();
        let session = NaiveDate::from_ymd_opt(2018, 2, 12).unwrap();
        let age = age_years(birth, session);
        assert!((age - 40.0).abs() < 0.05, "age = {age}");
    }
}
