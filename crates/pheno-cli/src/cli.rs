//! CLI argument definitions for pheno-link.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "pheno-link",
    version,
    about = "Couple MRI imaging sessions with clinical assessment tables",
    long_about = "Scan a BIDS-style imaging tree for subject sessions, link each\n\
                  session to clinical assessments (nearest-date or exact-date per\n\
                  source), and write one session-aligned participants.tsv row per\n\
                  subject."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Link imaging sessions to clinical sources and write participants.tsv.
    Link(LinkArgs),

    /// List the configured clinical sources and their matching policies.
    Sources,
}

#[derive(Parser)]
pub struct LinkArgs {
    /// Imaging tree root: <site>_<patient>/<session>/... folders.
    #[arg(value_name = "IMAGING_ROOT")]
    pub imaging_root: PathBuf,

    /// Output directory (default: <IMAGING_ROOT>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Cognitive assessment export (semicolon-separated).
    #[arg(long = "cognition", value_name = "FILE")]
    pub cognition: Option<PathBuf>,

    /// Disability (EDSS) score table.
    #[arg(long = "disability", value_name = "FILE")]
    pub disability: Option<PathBuf>,

    /// Nine-hole peg test table.
    #[arg(long = "pegboard", value_name = "FILE")]
    pub pegboard: Option<PathBuf>,

    /// Timed 25-foot walk table.
    #[arg(long = "walk", value_name = "FILE")]
    pub walk: Option<PathBuf>,

    /// Education record table.
    #[arg(long = "education", value_name = "FILE")]
    pub education: Option<PathBuf>,

    /// Demographics / phenotype table.
    #[arg(long = "demographics", value_name = "FILE")]
    pub demographics: Option<PathBuf>,

    /// Max days between cognitive assessment and session.
    #[arg(long = "max-lag-cognition", value_name = "DAYS", default_value_t = 180)]
    pub max_lag_cognition: i64,

    /// Max days between disability score and session.
    #[arg(long = "max-lag-disability", value_name = "DAYS", default_value_t = 90)]
    pub max_lag_disability: i64,

    /// Collapse each subject to its single best-linked session.
    #[arg(long = "unique-subjects")]
    pub unique_subjects: bool,

    /// Lag minimized by --unique-subjects.
    #[arg(long = "criterion", value_enum, default_value = "cognition")]
    pub criterion: CriterionArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CriterionArg {
    /// Lowest cognition-to-imaging lag.
    Cognition,
    /// Lowest disability-score-to-imaging lag.
    Disability,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
