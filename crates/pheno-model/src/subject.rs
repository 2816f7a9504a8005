//! Subjects, sessions and the fused per-subject output row.

use chrono::NaiveDate;

use crate::SENTINEL;

/// One imaging session of a subject.
///
/// Built once by the session index and immutable afterwards. Ordinals are
/// dense, 1-based and strictly increasing with date within a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub subject_id: String,
    pub ordinal: u32,
    pub date: NaiveDate,
}

impl Session {
    pub fn new(subject_id: impl Into<String>, ordinal: u32, date: NaiveDate) -> Self {
        Self {
            subject_id: subject_id.into(),
            ordinal,
            date,
        }
    }
}

/// One subject's fully fused, session-aligned output record.
///
/// Every per-session vector has exactly one entry per session, positionally
/// aligned with `session_dates`; missing data holds the [`SENTINEL`], never
/// an absent slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    pub subject_id: String,
    pub session_dates: Vec<NaiveDate>,

    // Subject-level scalars.
    pub sex: String,
    pub handedness: String,
    pub diagnosis_date: String,

    // Per-session sequences.
    pub age_years: Vec<String>,
    pub disease_duration_years: Vec<String>,
    pub disease_course: Vec<String>,
    pub disease_course_date: Vec<String>,
    pub education_years: Vec<String>,
    pub edss: Vec<String>,
    pub edss_lag_days: Vec<String>,
    pub cognition_raw: Vec<String>,
    pub cognition_lag_days: Vec<String>,
    pub cognition_z: Vec<String>,
    pub cognition_impaired: Vec<String>,
    pub pegboard_dominant_s: Vec<String>,
    pub pegboard_nondominant_s: Vec<String>,
    pub walk_s: Vec<String>,
}

impl CanonicalRow {
    /// Creates a row with every field filled with the sentinel.
    pub fn new(subject_id: impl Into<String>, session_dates: Vec<NaiveDate>) -> Self {
        let blank = vec![SENTINEL.to_string(); session_dates.len()];
        Self {
            subject_id: subject_id.into(),
            session_dates,
            sex: SENTINEL.to_string(),
            handedness: SENTINEL.to_string(),
            diagnosis_date: SENTINEL.to_string(),
            age_years: blank.clone(),
            disease_duration_years: blank.clone(),
            disease_course: blank.clone(),
            disease_course_date: blank.clone(),
            education_years: blank.clone(),
            edss: blank.clone(),
            edss_lag_days: blank.clone(),
            cognition_raw: blank.clone(),
            cognition_lag_days: blank.clone(),
            cognition_z: blank.clone(),
            cognition_impaired: blank.clone(),
            pegboard_dominant_s: blank.clone(),
            pegboard_nondominant_s: blank.clone(),
            walk_s: blank,
        }
    }

    pub fn session_count(&self) -> usize {
        self.session_dates.len()
    }

    /// All per-session sequences, in canonical column order.
    pub fn sequences(&self) -> [&Vec<String>; 14] {
        [
            &self.age_years,
            &self.disease_duration_years,
            &self.disease_course,
            &self.disease_course_date,
            &self.education_years,
            &self.edss,
            &self.edss_lag_days,
            &self.cognition_raw,
            &self.cognition_lag_days,
            &self.cognition_z,
            &self.cognition_impaired,
            &self.pegboard_dominant_s,
            &self.pegboard_nondominant_s,
            &self.walk_s,
        ]
    }

    fn sequences_mut(&mut self) -> [&mut Vec<String>; 14] {
        [
            &mut self.age_years,
            &mut self.disease_duration_years,
            &mut self.disease_course,
            &mut self.disease_course_date,
            &mut self.education_years,
            &mut self.edss,
            &mut self.edss_lag_days,
            &mut self.cognition_raw,
            &mut self.cognition_lag_days,
            &mut self.cognition_z,
            &mut self.cognition_impaired,
            &mut self.pegboard_dominant_s,
            &mut self.pegboard_nondominant_s,
            &mut self.walk_s,
        ]
    }

    /// True when every sequence is aligned with the session-date list.
    pub fn is_aligned(&self) -> bool {
        let len = self.session_dates.len();
        self.sequences().iter().all(|seq| seq.len() == len)
    }

    /// Collapses the row to the single session at `index` (unique-subject
    /// reduction). Out-of-range indices leave the row untouched.
    pub fn retain_session(&mut self, index: usize) {
        if index >= self.session_dates.len() {
            return;
        }
        self.session_dates = vec![self.session_dates[index]];
        for seq in self.sequences_mut() {
            let kept = seq[index].clone();
            *seq = vec![kept];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_row_is_sentinel_filled_and_aligned() {
        let row = CanonicalRow::new("500000017", vec![date(2018, 2, 12), date(2019, 5, 3)]);
        assert!(row.is_aligned());
        assert_eq!(row.session_count(), 2);
        assert!(row.edss.iter().all(|v| v == SENTINEL));
        assert_eq!(row.sex, SENTINEL);
    }

    #[test]
    fn retain_session_keeps_one_aligned_entry() {
        let mut row = CanonicalRow::new("s", vec![date(2018, 2, 12), date(2019, 5, 3)]);
        row.edss = vec!["2.5".into(), "3.0".into()];
        row.retain_session(1);
        assert_eq!(row.session_dates, vec![date(2019, 5, 3)]);
        assert_eq!(row.edss, vec!["3.0".to_string()]);
        assert!(row.is_aligned());
    }

    #[test]
    fn retain_session_ignores_out_of_range() {
        let mut row = CanonicalRow::new("s", vec![date(2018, 2, 12)]);
        row.retain_session(5);
        assert_eq!(row.session_count(), 1);
    }
}
