//! Run options controlling matching tolerances and the reduction mode.

use serde::Serialize;

use crate::source::{DEFAULT_MAX_LAG_COGNITION_DAYS, DEFAULT_MAX_LAG_DISABILITY_DAYS};

/// Which lag field the unique-subject reduction minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LagCriterion {
    /// Cognition-to-imaging lag.
    #[default]
    Cognition,
    /// Disability-score-to-imaging lag.
    Disability,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOptions {
    /// Maximum accepted cognition-to-session lag, in days.
    pub max_lag_cognition_days: i64,
    /// Maximum accepted disability-score-to-session lag, in days.
    pub max_lag_disability_days: i64,
    /// Collapse each subject to its single best-linked session.
    pub unique_subjects: bool,
    /// Lag field minimized when `unique_subjects` is set.
    pub criterion: LagCriterion,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_lag_cognition_days: DEFAULT_MAX_LAG_COGNITION_DAYS,
            max_lag_disability_days: DEFAULT_MAX_LAG_DISABILITY_DAYS,
            unique_subjects: false,
            criterion: LagCriterion::default(),
        }
    }
}
