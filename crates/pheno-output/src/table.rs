//! Canonical participants table serialization.
//!
//! One tab-separated UTF-8 file: a single header row, then one row per
//! subject in sorted subject order. Multi-valued fields are comma-joined
//! and positionally aligned with the session-date list; identical inputs
//! produce byte-identical output.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};

use pheno_model::CanonicalRow;

/// Fixed output column order.
pub const COLUMNS: [&str; 19] = [
    "participant_id",
    "session_dates",
    "sex",
    "age",
    "handedness",
    "education_years",
    "diagnosis_date",
    "disease_duration",
    "disease_course",
    "disease_course_date",
    "edss",
    "edss_lag_days",
    "cognition_raw",
    "cognition_lag_days",
    "cognition_z",
    "cognition_impaired",
    "pegboard_dominant_s",
    "pegboard_nondominant_s",
    "walk_s",
];

fn join_dates(row: &CanonicalRow) -> String {
    let rendered: Vec<String> = row
        .session_dates
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();
    rendered.join(",")
}

fn to_record(row: &CanonicalRow) -> Vec<String> {
    vec![
        format!("sub-{}", row.subject_id),
        join_dates(row),
        row.sex.clone(),
        row.age_years.join(","),
        row.handedness.clone(),
        row.education_years.join(","),
        row.diagnosis_date.clone(),
        row.disease_duration_years.join(","),
        row.disease_course.join(","),
        row.disease_course_date.join(","),
        row.edss.join(","),
        row.edss_lag_days.join(","),
        row.cognition_raw.join(","),
        row.cognition_lag_days.join(","),
        row.cognition_z.join(","),
        row.cognition_impaired.join(","),
        row.pegboard_dominant_s.join(","),
        row.pegboard_nondominant_s.join(","),
        row.walk_s.join(","),
    ]
}

/// Writes the participants table to any writer.
///
/// Rows are sorted by subject identifier before writing; misaligned rows
/// are a caller bug and abort the write.
pub fn write_participants<W: Write>(rows: &[CanonicalRow], writer: W) -> Result<()> {
    let mut ordered: Vec<&CanonicalRow> = rows.iter().collect();
    ordered.sort_by(|a, b| a.subject_id.cmp(&b.subject_id));

    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    out.write_record(COLUMNS).context("write header")?;
    for row in ordered {
        if !row.is_aligned() {
            bail!(
                "subject {} has a field sequence misaligned with its {} sessions",
                row.subject_id,
                row.session_count()
            );
        }
        out.write_record(to_record(row))
            .with_context(|| format!("write row for subject {}", row.subject_id))?;
    }
    out.flush().context("flush participants table")?;
    Ok(())
}

/// Writes the participants table to `participants.tsv` under `output_dir`.
pub fn write_participants_file(rows: &[CanonicalRow], output_dir: &Path) -> Result<std::path::PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;
    let path = output_dir.join("participants.tsv");
    let file = std::fs::File::create(&path)
        .with_context(|| format!("create {}", path.display()))?;
    write_participants(rows, file)?;
    Ok(path)
}
