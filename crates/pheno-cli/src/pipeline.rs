//! Link pipeline orchestration: scan, load, fuse, write.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use pheno_core::RunDiagnostics;
use pheno_core::fusion::fuse_all_with;
use pheno_ingest::{SessionIndex, SourcePaths, load_sources};
use pheno_model::{LagCriterion, RunOptions, SourceKind};
use pheno_output::{Provenance, write_participants_file, write_provenance};

use crate::cli::{CriterionArg, LinkArgs};

/// Everything the summary needs after a completed run.
pub struct LinkResult {
    pub output_path: PathBuf,
    pub provenance_path: PathBuf,
    pub diagnostics: RunDiagnostics,
    pub missing_sources: Vec<SourceKind>,
}

/// Runs the full link pipeline for one invocation.
///
/// Only an unreadable imaging root or an unwritable output directory is
/// fatal; missing clinical sources degrade to sentinel columns.
pub fn run_link(args: &LinkArgs) -> Result<LinkResult> {
    let index = SessionIndex::scan(&args.imaging_root)
        .with_context(|| format!("scan imaging root {}", args.imaging_root.display()))?;
    info!(
        subjects = index.subject_count(),
        sessions = index.session_count(),
        "imaging tree scanned"
    );

    let paths = source_paths(args);
    let (sources, missing) = load_sources(&paths);
    let options = run_options(args);

    let progress = subject_progress(index.subject_count() as u64);
    let (rows, mut diagnostics) =
        fuse_all_with(&index, &sources, &options, |_| progress.inc(1));
    progress.finish_and_clear();
    for kind in &missing {
        diagnostics.source_mut(*kind).missing_file = true;
    }
    if diagnostics.fusion_failures > 0 {
        warn!(
            failures = diagnostics.fusion_failures,
            "some fusion stages failed; affected fields carry the sentinel"
        );
    }

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.imaging_root.join("output"));
    let output_path = write_participants_file(&rows, &output_dir)?;
    info!(path = %output_path.display(), rows = rows.len(), "participants table written");

    let provenance = Provenance {
        created: Provenance::timestamp_now(),
        sessions_root: args.imaging_root.display().to_string(),
        source_files: source_file_map(&paths),
        options,
        subjects: rows.len(),
    };
    let provenance_path = write_provenance(&provenance, &output_dir)?;

    Ok(LinkResult {
        output_path,
        provenance_path,
        diagnostics,
        missing_sources: missing,
    })
}

fn source_paths(args: &LinkArgs) -> SourcePaths {
    SourcePaths {
        cognition: args.cognition.clone(),
        disability: args.disability.clone(),
        pegboard: args.pegboard.clone(),
        walk: args.walk.clone(),
        education: args.education.clone(),
        demographics: args.demographics.clone(),
    }
}

fn run_options(args: &LinkArgs) -> RunOptions {
    RunOptions {
        max_lag_cognition_days: args.max_lag_cognition,
        max_lag_disability_days: args.max_lag_disability,
        unique_subjects: args.unique_subjects,
        criterion: match args.criterion {
            CriterionArg::Cognition => LagCriterion::Cognition,
            CriterionArg::Disability => LagCriterion::Disability,
        },
    }
}

fn source_file_map(paths: &SourcePaths) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for kind in SourceKind::ALL {
        if let Some(path) = paths.get(kind) {
            map.insert(kind.to_string(), path.display().to_string());
        }
    }
    map
}

fn subject_progress(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::with_template("{bar:40} {pos}/{len} subjects ({elapsed})")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}
