//! Numeric cell normalization.
//!
//! Several exports write decimals with a comma (`2,5`); education years
//! sometimes arrive as floats of whole numbers. Parsing is full-match or
//! nothing, mirroring the date chain.

/// Parses a decimal that may use either `.` or `,` as its separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let normalized = if value.contains(',') && !value.contains('.') {
        value.replace(',', ".")
    } else {
        value.to_string()
    };
    // Reject exotic float syntax a score cell never legitimately holds.
    if normalized.contains(['e', 'E', 'x', 'X']) {
        return None;
    }
    let parsed: f64 = normalized.parse().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Re-renders a decimal cell with a `.` separator, keeping the source's
/// precision (`"2,5"` becomes `"2.5"`, `"19.4"` stays `"19.4"`).
pub fn normalize_decimal_text(raw: &str) -> Option<String> {
    parse_decimal(raw)?;
    let value = raw.trim();
    if value.contains(',') && !value.contains('.') {
        Some(value.replace(',', "."))
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_comma_and_point_decimals() {
        assert_eq!(parse_decimal("2,5"), Some(2.5));
        assert_eq!(parse_decimal("2.5"), Some(2.5));
        assert_eq!(parse_decimal(" 19.4 "), Some(19.4));
        assert_eq!(parse_decimal("16"), Some(16.0));
    }

    #[test]
    fn rejects_non_numeric_and_exotic_forms() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("nan"), None);
        assert_eq!(parse_decimal("1e3"), None);
        assert_eq!(parse_decimal("2,5,0"), None);
        assert_eq!(parse_decimal("high"), None);
    }

    #[test]
    fn text_normalization_keeps_precision() {
        assert_eq!(normalize_decimal_text("2,5"), Some("2.5".to_string()));
        assert_eq!(normalize_decimal_text("19.4"), Some("19.4".to_string()));
        assert_eq!(normalize_decimal_text("bad"), None);
    }
}
