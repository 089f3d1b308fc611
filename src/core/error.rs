//! Error types for scanning and recording

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while scanning a tree or recording matches
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan root {path:?} is not a readable directory")]
    InvalidRoot { path: PathBuf },

    #[error("output file {path:?} cannot be opened for appending: {source}")]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list {path:?}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to record {path:?}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl ScanError {
    /// Path of the entry the error refers to
    pub fn path(&self) -> &Path {
        match self {
            ScanError::InvalidRoot { path }
            | ScanError::OutputUnavailable { path, .. }
            | ScanError::Read { path, .. }
            | ScanError::List { path, .. }
            | ScanError::Walk { path, .. }
            | ScanError::Record { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
