//! End-to-end pipeline tests: imaging tree plus clinical exports in, one
//! participants table plus provenance sidecar out.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use pheno_cli::cli::{CriterionArg, LinkArgs};
use pheno_cli::pipeline::run_link;
use pheno_model::SourceKind;

fn link_args(root: &Path) -> LinkArgs {
    LinkArgs {
        imaging_root: root.to_path_buf(),
        output_dir: None,
        cognition: None,
        disability: None,
        pegboard: None,
        walk: None,
        education: None,
        demographics: None,
        max_lag_cognition: 180,
        max_lag_disability: 90,
        unique_subjects: false,
        criterion: CriterionArg::Cognition,
    }
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// One subject with two sessions and a typical mix of sources.
fn fixture() -> (TempDir, LinkArgs) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("imaging");
    fs::create_dir_all(root.join("396_500000017/20180212")).unwrap();
    fs::create_dir_all(root.join("396_500000017/20190503")).unwrap();

    let disability = write_file(
        dir.path(),
        "edss.csv",
        "IMED,EDSS_date,EDSS_score\n\
         500000017.0,2018-02-10,2.5\n\
         500000017.0,2019-04-04,3\n",
    );
    let pegboard = write_file(
        dir.path(),
        "hpt.csv",
        "IMED,hpt_date,hpt_left_s,hpt_right_s,dominant_hand,hand_used\n\
         500000017,12.02.2018,28.1,19.4,right,right\n",
    );
    let demographics = write_file(
        dir.path(),
        "demo.csv",
        "Patient ID,Birth Date,Gender,Date of onset,Date MSCourse 1,MSCourse1,Date MSCourse 2,MSCourse2\n\
         500000017,1978-02-12,F,2010-06-01,2015-03-01,RR,2018-09-15,SP\n",
    );

    let mut args = link_args(&root);
    args.disability = Some(disability);
    args.pegboard = Some(pegboard);
    args.demographics = Some(demographics);
    (dir, args)
}

fn read_row<'a>(tsv: &'a str, participant: &str) -> Vec<&'a str> {
    tsv.lines()
        .find(|line| line.starts_with(participant))
        .unwrap_or_else(|| panic!("no row for {participant}"))
        .split('\t')
        .collect()
}

#[test]
fn link_writes_session_aligned_table() {
    let (_dir, args) = fixture();
    let result = run_link(&args).unwrap();

    let tsv = fs::read_to_string(&result.output_path).unwrap();
    let header: Vec<&str> = tsv.lines().next().unwrap().split('\t').collect();
    assert_eq!(header[0], "participant_id");
    assert_eq!(header.len(), 19);

    let row = read_row(&tsv, "sub-500000017");
    assert_eq!(row[1], "2018-02-12,2019-05-03");
    assert_eq!(row[2], "F");
    assert_eq!(row[3], "40.00,41.22");
    assert_eq!(row[4], "right");
    assert_eq!(row[6], "2010-06-01");
    assert_eq!(row[7], "8,9");
    // Latest pre-scan course entry per session.
    assert_eq!(row[8], "RR,SP");
    assert_eq!(row[9], "2015-03-01,2018-09-15");
    assert_eq!(row[10], "2.5,3.0");
    assert_eq!(row[11], "2,29");
    // Pegboard matched the first session only.
    assert_eq!(row[16], "19.4,n/a");
    assert_eq!(row[17], "28.1,n/a");
}

#[test]
fn missing_sources_leave_sentinel_columns() {
    let (_dir, args) = fixture();
    let result = run_link(&args).unwrap();

    assert!(result.missing_sources.contains(&SourceKind::Cognition));
    assert!(result.missing_sources.contains(&SourceKind::Walk));
    assert!(result.diagnostics.source(SourceKind::Cognition).missing_file);

    let tsv = fs::read_to_string(&result.output_path).unwrap();
    let row = read_row(&tsv, "sub-500000017");
    assert_eq!(row[12], "n/a,n/a");
    assert_eq!(row[18], "n/a,n/a");
}

#[test]
fn diagnostics_count_matches_and_subjects() {
    let (_dir, args) = fixture();
    let result = run_link(&args).unwrap();

    assert_eq!(result.diagnostics.subjects, 1);
    assert_eq!(result.diagnostics.sessions, 2);
    assert_eq!(result.diagnostics.source(SourceKind::Disability).records, 2);
    assert_eq!(result.diagnostics.source(SourceKind::Disability).matched, 2);
    assert_eq!(result.diagnostics.source(SourceKind::Pegboard).matched, 1);
}

#[test]
fn provenance_sidecar_records_inputs_and_options() {
    let (_dir, args) = fixture();
    let result = run_link(&args).unwrap();

    let text = fs::read_to_string(&result.provenance_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["subjects"], 1);
    assert_eq!(value["options"]["max_lag_disability_days"], 90);
    assert!(value["source_files"]["EDSS"].as_str().unwrap().ends_with("edss.csv"));
    assert!(value["source_files"].get("COG").is_none());
}

#[test]
fn output_lands_under_root_by_default() {
    let (_dir, args) = fixture();
    let result = run_link(&args).unwrap();
    assert_eq!(
        result.output_path,
        args.imaging_root.join("output").join("participants.tsv")
    );
}

#[test]
fn explicit_output_dir_wins() {
    let (dir, mut args) = fixture();
    let custom = dir.path().join("elsewhere");
    args.output_dir = Some(custom.clone());
    let result = run_link(&args).unwrap();
    assert_eq!(result.output_path, custom.join("participants.tsv"));
}

#[test]
fn unreadable_imaging_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let args = link_args(&dir.path().join("nope"));
    assert!(run_link(&args).is_err());
}

#[test]
fn unique_subjects_keeps_best_linked_session() {
    let (_dir, mut args) = fixture();
    args.unique_subjects = true;
    args.criterion = CriterionArg::Disability;
    let result = run_link(&args).unwrap();

    let tsv = fs::read_to_string(&result.output_path).unwrap();
    let row = read_row(&tsv, "sub-500000017");
    // Lags 2 and 29: the first session stays.
    assert_eq!(row[1], "2018-02-12");
    assert_eq!(row[10], "2.5");
    assert_eq!(result.diagnostics.sessions, 1);
}
