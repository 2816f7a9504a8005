pub mod csv_table;
pub mod error;
pub mod sessions;
pub mod sources;

pub use csv_table::{CsvTable, read_csv_table};
pub use error::{IngestError, Result};
pub use sessions::{SessionIndex, parse_session_folder, parse_subject_folder};
pub use sources::{SourcePaths, load_source, load_sources, source_from_table};
