//! Output generation for the phenotype-linkage pipeline.
//!
//! - `participants.tsv`: the canonical per-subject table
//! - `participants.json`: run provenance sidecar

mod provenance;
mod table;

pub use provenance::{Provenance, write_provenance};
pub use table::{COLUMNS, write_participants, write_participants_file};
