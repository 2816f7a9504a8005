//! Clinical source registry.
//!
//! Each assessment domain is described by a static [`SourceSpec`]: which
//! column identifies the subject, which column carries the assessment date,
//! which date encodings that column is known to use, and how records are
//! linked to imaging sessions. The registry is the single place where
//! source-specific constants (column names, delimiters, default tolerances)
//! live.

use std::fmt;

/// Known date encodings, tried in the order a source declares them.
///
/// Every variant either parses the complete value or fails; no variant may
/// accept a prefix of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// Unix epoch seconds, as an integer or integer string.
    EpochSeconds,
    /// RFC 2822-style long form: weekday, day, month name, year, time and a
    /// numeric offset. The offset is discarded; the written calendar date is
    /// kept as-is.
    LongForm,
    /// `YYYY-MM-DD`.
    IsoDate,
    /// `DD/MM/YYYY`.
    SlashDayMonthYear,
    /// `DD.MM.YYYY`.
    DotDayMonthYear,
    /// `YYYYMMDD`, as used by session folder names.
    CompactDate,
}

/// Identifies one clinical assessment domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    Cognition,
    Disability,
    Pegboard,
    Walk,
    Education,
    Demographics,
}

impl SourceKind {
    pub const ALL: [SourceKind; 6] = [
        SourceKind::Cognition,
        SourceKind::Disability,
        SourceKind::Pegboard,
        SourceKind::Walk,
        SourceKind::Education,
        SourceKind::Demographics,
    ];

    /// Short stable code used in logs and the run summary.
    pub fn code(self) -> &'static str {
        match self {
            SourceKind::Cognition => "COG",
            SourceKind::Disability => "EDSS",
            SourceKind::Pegboard => "HPT",
            SourceKind::Walk => "T25FW",
            SourceKind::Education => "EDU",
            SourceKind::Demographics => "DEMO",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SourceKind::Cognition => "Cognitive assessment (symbol-digit)",
            SourceKind::Disability => "Disability score (EDSS)",
            SourceKind::Pegboard => "Nine-hole peg test",
            SourceKind::Walk => "Timed 25-foot walk",
            SourceKind::Education => "Education record",
            SourceKind::Demographics => "Demographics / phenotype",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How a source's records are linked to imaging sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Nearest record by absolute day lag, rejected when the minimum lag
    /// exceeds `max_lag_days`. Ties break on natural row order.
    Tolerance { max_lag_days: i64 },
    /// Record date must equal the session date exactly; first row wins.
    ExactDate,
}

/// How a source participates in the fusion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Matched once per imaging session under a [`MatchPolicy`].
    PerSession(MatchPolicy),
    /// One record per subject; values apply to the subject as a whole.
    SubjectLevel,
}

/// Static description of one clinical source table.
#[derive(Debug, Clone, Copy)]
pub struct SourceSpec {
    pub kind: SourceKind,
    /// Column holding the subject identifier.
    pub subject_column: &'static str,
    /// Column holding the record date. Subject-level sources use this for
    /// their reference date (birth date) instead.
    pub date_column: &'static str,
    /// Date encodings this source is known to emit, in trial order.
    pub date_formats: &'static [DateFormat],
    pub link: LinkMode,
    /// Value columns consumed by fusion.
    pub value_columns: &'static [&'static str],
    /// Field delimiter of the export file.
    pub delimiter: u8,
}

/// Default maximum lag between a cognitive assessment and a session, in days.
pub const DEFAULT_MAX_LAG_COGNITION_DAYS: i64 = 180;
/// Default maximum lag between a disability score and a session, in days.
pub const DEFAULT_MAX_LAG_DISABILITY_DAYS: i64 = 90;

const COGNITION: SourceSpec = SourceSpec {
    kind: SourceKind::Cognition,
    subject_column: "IMED",
    date_column: "psycho_date",
    date_formats: &[DateFormat::DotDayMonthYear, DateFormat::IsoDate],
    link: LinkMode::PerSession(MatchPolicy::Tolerance {
        max_lag_days: DEFAULT_MAX_LAG_COGNITION_DAYS,
    }),
    value_columns: &["sdmt90_total"],
    // The cognition export is semicolon-separated.
    delimiter: b';',
};

const DISABILITY: SourceSpec = SourceSpec {
    kind: SourceKind::Disability,
    subject_column: "IMED",
    date_column: "EDSS_date",
    date_formats: &[
        DateFormat::IsoDate,
        DateFormat::SlashDayMonthYear,
        DateFormat::LongForm,
    ],
    link: LinkMode::PerSession(MatchPolicy::Tolerance {
        max_lag_days: DEFAULT_MAX_LAG_DISABILITY_DAYS,
    }),
    value_columns: &["EDSS_score"],
    delimiter: b',',
};

const PEGBOARD: SourceSpec = SourceSpec {
    kind: SourceKind::Pegboard,
    subject_column: "IMED",
    date_column: "hpt_date",
    date_formats: &[DateFormat::DotDayMonthYear, DateFormat::IsoDate],
    link: LinkMode::PerSession(MatchPolicy::ExactDate),
    value_columns: &["hpt_left_s", "hpt_right_s", "dominant_hand", "hand_used"],
    delimiter: b',',
};

const WALK: SourceSpec = SourceSpec {
    kind: SourceKind::Walk,
    subject_column: "IMED",
    date_column: "t25fw_date",
    date_formats: &[DateFormat::DotDayMonthYear, DateFormat::IsoDate],
    link: LinkMode::PerSession(MatchPolicy::ExactDate),
    value_columns: &["t25fw_s"],
    delimiter: b',',
};

const EDUCATION: SourceSpec = SourceSpec {
    kind: SourceKind::Education,
    subject_column: "IMED",
    date_column: "edu_date",
    date_formats: &[DateFormat::DotDayMonthYear, DateFormat::IsoDate],
    link: LinkMode::PerSession(MatchPolicy::ExactDate),
    value_columns: &["edu_years"],
    delimiter: b',',
};

/// Prefix of the demographics disease-course date column family
/// (`Date MSCourse 1`, `Date MSCourse 2`, ...). Each date column pairs with
/// a value column named without the prefix and without spaces
/// (`MSCourse1`, `MSCourse2`, ...).
pub const MS_COURSE_DATE_PREFIX: &str = "Date MSCourse ";

const DEMOGRAPHICS: SourceSpec = SourceSpec {
    kind: SourceKind::Demographics,
    subject_column: "Patient ID",
    date_column: "Birth Date",
    date_formats: &[
        DateFormat::LongForm,
        DateFormat::EpochSeconds,
        DateFormat::IsoDate,
        DateFormat::SlashDayMonthYear,
    ],
    link: LinkMode::SubjectLevel,
    value_columns: &["Gender", "Date of onset"],
    delimiter: b',',
};

/// All configured sources, in their canonical order.
pub fn default_sources() -> &'static [SourceSpec] {
    &[
        COGNITION, DISABILITY, PEGBOARD, WALK, EDUCATION, DEMOGRAPHICS,
    ]
}

/// Looks up the spec for one source kind.
pub fn source_spec(kind: SourceKind) -> &'static SourceSpec {
    match kind {
        SourceKind::Cognition => &COGNITION,
        SourceKind::Disability => &DISABILITY,
        SourceKind::Pegboard => &PEGBOARD,
        SourceKind::Walk => &WALK,
        SourceKind::Education => &EDUCATION,
        SourceKind::Demographics => &DEMOGRAPHICS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_all_kinds_once() {
        let specs = default_sources();
        assert_eq!(specs.len(), SourceKind::ALL.len());
        for kind in SourceKind::ALL {
            assert_eq!(
                specs.iter().filter(|s| s.kind == kind).count(),
                1,
                "{kind} must appear exactly once"
            );
            assert_eq!(source_spec(kind).kind, kind);
        }
    }

    #[test]
    fn per_session_sources_declare_date_formats() {
        for spec in default_sources() {
            assert!(!spec.date_formats.is_empty(), "{} has no formats", spec.kind);
            assert!(!spec.value_columns.is_empty());
        }
    }

    #[test]
    fn tolerance_defaults_match_configured_constants() {
        let MatchPolicy::Tolerance { max_lag_days } = policy_of(SourceKind::Cognition) else {
            panic!("cognition must use the tolerance policy");
        };
        assert_eq!(max_lag_days, 180);
        let MatchPolicy::Tolerance { max_lag_days } = policy_of(SourceKind::Disability) else {
            panic!("disability must use the tolerance policy");
        };
        assert_eq!(max_lag_days, 90);
    }

    fn policy_of(kind: SourceKind) -> MatchPolicy {
        match source_spec(kind).link {
            LinkMode::PerSession(policy) => policy,
            LinkMode::SubjectLevel => panic!("{kind} is subject-level"),
        }
    }
}
