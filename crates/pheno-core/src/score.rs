//! Regression-based normalization of the raw cognitive score.
//!
//! The transform regresses the raw symbol-digit score on age (cubic and
//! quartic terms) and a binary education-level indicator, then scales by
//! the residual standard deviation. Coefficients come from the published
//! normative model and must not be re-derived.

const INTERCEPT: f64 = 67.180_421_61;
const AGE_CUBED: f64 = 0.000_201_447_292_4;
const AGE_FOURTH: f64 = 0.000_002_358_544_643;
const EDUCATION: f64 = 3.864_964_401;
const RESIDUAL_SD: f64 = -8.342_252_676;

/// Standardized score below or at which a subject counts as impaired.
pub const IMPAIRMENT_THRESHOLD: f64 = -1.0;

/// Years of education at or above which the education indicator is 1.
pub const HIGH_EDUCATION_YEARS: f64 = 16.0;

/// Education-level indicator for the regression.
pub fn education_indicator(years: f64) -> u8 {
    u8::from(years >= HIGH_EDUCATION_YEARS)
}

/// Standardized cognitive score for one session.
pub fn normalized_score(age_years: f64, education_high: u8, raw_score: f64) -> f64 {
    (raw_score - INTERCEPT + AGE_CUBED * age_years.powi(3)
        - AGE_FOURTH * age_years.powi(4)
        - EDUCATION * f64::from(education_high))
        / RESIDUAL_SD
}

/// Impairment flag derived from a standardized score.
pub fn is_impaired(z: f64) -> bool {
    z <= IMPAIRMENT_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn education_indicator_thresholds_at_sixteen_years() {
        assert_eq!(education_indicator(16.0), 1);
        assert_eq!(education_indicator(18.0), 1);
        assert_eq!(education_indicator(15.5), 0);
        assert_eq!(education_indicator(12.0), 0);
    }

    #[test]
    fn normalized_score_matches_reference_value() {
        // Hand-computed: age 40, high education, raw 50.
        let z = normalized_score(40.0, 1, 50.0);
        assert!((z - 1.701_055_3).abs() < 1e-5, "z = {z}");
    }

    #[test]
    fn higher_raw_score_lowers_z() {
        let low = normalized_score(40.0, 1, 30.0);
        let high = normalized_score(40.0, 1, 60.0);
        assert!(high < low);
    }

    #[test]
    fn impairment_flag_is_inclusive_at_threshold() {
        assert!(is_impaired(-1.0));
        assert!(is_impaired(-2.3));
        assert!(!is_impaired(-0.99));
    }
}
