use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;

use pheno_ingest::{IngestError, SessionIndex};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn mkdirs(root: &Path, relative: &[&str]) {
    for rel in relative {
        fs::create_dir_all(root.join(rel)).unwrap();
    }
}

fn fixture_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    mkdirs(
        dir.path(),
        &[
            // Sessions deliberately created out of date order.
            "396_500000017/01_20190503/anat",
            "396_500000017/20180212/anat",
            "396_500000017/notes",          // not a session
            "397_500000021/20200101",
            "logs",                          // not a subject
            "sub-extra/20180101",            // non-conforming subject name
        ],
    );
    fs::write(dir.path().join("readme.txt"), "not a subject").unwrap();
    dir
}

#[test]
fn scan_assigns_dense_date_ordered_ordinals() {
    let dir = fixture_tree();
    let index = SessionIndex::scan(dir.path()).unwrap();

    assert_eq!(index.subject_count(), 2);
    let sessions = index.sessions_for("500000017").unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].ordinal, 1);
    assert_eq!(sessions[0].date, date(2018, 2, 12));
    assert_eq!(sessions[1].ordinal, 2);
    assert_eq!(sessions[1].date, date(2019, 5, 3));
    // Ordinals strictly increase with date, starting at 1.
    for pair in sessions.windows(2) {
        assert!(pair[0].date < pair[1].date);
        assert_eq!(pair[0].ordinal + 1, pair[1].ordinal);
    }
}

#[test]
fn scan_skips_non_conforming_entries_silently() {
    let dir = fixture_tree();
    let index = SessionIndex::scan(dir.path()).unwrap();
    assert!(index.sessions_for("extra").is_none());
    let subjects: Vec<&str> = index.subjects().collect();
    assert_eq!(subjects, vec!["500000017", "500000021"]);
}

#[test]
fn rescan_of_unchanged_tree_is_identical() {
    let dir = fixture_tree();
    let first = SessionIndex::scan(dir.path()).unwrap();
    let second = SessionIndex::scan(dir.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn duplicate_session_dates_collapse_to_one_ordinal() {
    let dir = TempDir::new().unwrap();
    // Same date with and without an ordinal prefix.
    mkdirs(dir.path(), &["1_42/20180212", "1_42/01_20180212"]);
    let index = SessionIndex::scan(dir.path()).unwrap();
    let sessions = index.sessions_for("42").unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].ordinal, 1);
}

#[test]
fn unreadable_root_is_fatal() {
    let missing = Path::new("/nonexistent/imaging-root");
    match SessionIndex::scan(missing) {
        Err(IngestError::RootNotFound { path }) => assert_eq!(path, missing),
        other => panic!("expected RootNotFound, got {other:?}"),
    }
}

#[test]
fn subject_without_sessions_is_not_indexed() {
    let dir = TempDir::new().unwrap();
    mkdirs(dir.path(), &["5_99/raw"]);
    let index = SessionIndex::scan(dir.path()).unwrap();
    assert!(index.is_empty());
}
