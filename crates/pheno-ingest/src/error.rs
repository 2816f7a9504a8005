use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("imaging root not found or not a directory: {path}")]
    RootNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read csv {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("source file not found: {path}")]
    SourceFileNotFound { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, IngestError>;
