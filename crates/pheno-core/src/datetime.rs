//! Date normalization across heterogeneous source encodings.
//!
//! Every clinical export writes dates its own way: epoch seconds, RFC
//! 2822-style long forms, ISO dates, `DD/MM/YYYY`, `DD.MM.YYYY`, and the
//! compact `YYYYMMDD` of session folders. Callers declare which encodings
//! their source may use and in what priority; [`normalize_date`] tries them
//! in that order and the first full parse wins.
//!
//! No variant may partially succeed: either the entire value parses under
//! that encoding or the variant yields nothing. Failure is `None`, never a
//! panic or an error value.

use chrono::{DateTime, NaiveDate};

use pheno_model::DateFormat;

/// Normalizes a date-like value under an ordered list of candidate formats.
pub fn normalize_date(raw: &str, formats: &[DateFormat]) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    formats.iter().find_map(|format| parse_as(value, *format))
}

/// Canonical rendering; [`normalize_date`] of the result round-trips.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_as(value: &str, format: DateFormat) -> Option<NaiveDate> {
    match format {
        DateFormat::EpochSeconds => parse_epoch_seconds(value),
        DateFormat::LongForm => parse_long_form(value),
        DateFormat::IsoDate => NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
        DateFormat::SlashDayMonthYear => NaiveDate::parse_from_str(value, "%d/%m/%Y").ok(),
        DateFormat::DotDayMonthYear => NaiveDate::parse_from_str(value, "%d.%m.%Y").ok(),
        DateFormat::CompactDate => parse_compact(value),
    }
}

fn parse_epoch_seconds(value: &str) -> Option<NaiveDate> {
    let seconds: i64 = value.parse().ok()?;
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}

/// Long form per RFC 2822, e.g. `Mon, 12 Feb 2018 00:00:00 +0100`.
///
/// The offset is discarded rather than applied: the calendar date as
/// written is the assessment date regardless of timezone bookkeeping.
fn parse_long_form(value: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.date_naive())
}

fn parse_compact(value: &str) -> Option<NaiveDate> {
    // Length-gated so shorter digit runs never alias to a date.
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}
