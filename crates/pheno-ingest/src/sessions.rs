//! Session index: subject and session discovery from the imaging tree.
//!
//! The tree is laid out `root/<subject>/<session_folder>/...`, where the
//! subject folder is `<site>_<patient>` (both numeric) and the session
//! folder embeds an 8-digit date, optionally behind an existing two-digit
//! ordinal (`01_20180212`). Anything that does not match is skipped without
//! error; those entries are simply not sessions.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use pheno_model::Session;

use crate::error::{IngestError, Result};

/// Per-subject ordered session lists, keyed by patient identifier.
///
/// Ordinals are assigned as the 1-based rank of each distinct session date;
/// re-scanning an unchanged tree yields identical ordinals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIndex {
    subjects: BTreeMap<String, Vec<Session>>,
}

impl SessionIndex {
    /// Scans the imaging tree root.
    ///
    /// An unreadable root is the only fatal condition; unreadable or
    /// non-conforming entries below it are skipped.
    pub fn scan(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(IngestError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        let entries = std::fs::read_dir(root).map_err(|e| IngestError::DirectoryRead {
            path: root.to_path_buf(),
            source: e,
        })?;

        let mut subjects: BTreeMap<String, Vec<Session>> = BTreeMap::new();
        for entry_result in entries {
            let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
                path: root.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(folder) = name.to_str() else {
                continue;
            };
            let Some(subject_id) = parse_subject_folder(folder) else {
                debug!(folder, "skipping non-subject folder");
                continue;
            };
            let dates = session_dates(&path);
            if dates.is_empty() {
                debug!(folder, "subject folder has no session folders");
                continue;
            }
            let sessions = subjects.entry(subject_id.to_string()).or_default();
            let mut all: Vec<NaiveDate> = sessions.iter().map(|s| s.date).collect();
            all.extend(dates);
            all.sort();
            all.dedup();
            *sessions = all
                .into_iter()
                .enumerate()
                .map(|(idx, date)| Session::new(subject_id, (idx + 1) as u32, date))
                .collect();
        }
        Ok(Self { subjects })
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.subjects.keys().map(String::as_str)
    }

    pub fn sessions_for(&self, subject_id: &str) -> Option<&[Session]> {
        self.subjects.get(subject_id).map(Vec::as_slice)
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    pub fn session_count(&self) -> usize {
        self.subjects.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Session])> {
        self.subjects
            .iter()
            .map(|(id, sessions)| (id.as_str(), sessions.as_slice()))
    }
}

/// Collects parseable session dates under one subject folder. Unsorted,
/// may contain duplicates; the caller dedups and ranks.
fn session_dates(subject_path: &Path) -> Vec<NaiveDate> {
    let Ok(entries) = std::fs::read_dir(subject_path) else {
        debug!(path = %subject_path.display(), "unreadable subject folder");
        return Vec::new();
    };
    let mut dates = Vec::new();
    for entry in entries.flatten() {
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(folder) = name.to_str() else {
            continue;
        };
        match parse_session_folder(folder) {
            Some(date) => dates.push(date),
            None => debug!(folder, "skipping non-session folder"),
        }
    }
    dates
}

/// Parses `<site>_<patient>` and returns the patient identifier, which is
/// the key clinical tables use. Both parts must be all digits.
pub fn parse_subject_folder(name: &str) -> Option<&str> {
    let (site, patient) = name.split_once('_')?;
    if site.is_empty() || patient.is_empty() {
        return None;
    }
    if !site.bytes().all(|b| b.is_ascii_digit()) || !patient.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(patient)
}

/// Parses a session folder name: an 8-digit `YYYYMMDD` date, optionally
/// prefixed by a two-digit ordinal and underscore. The whole name must
/// conform; partial matches are rejected.
pub fn parse_session_folder(name: &str) -> Option<NaiveDate> {
    let digits = match name.split_once('_') {
        Some((prefix, rest)) => {
            if prefix.len() != 2 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            rest
        }
        None => name,
    };
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}
