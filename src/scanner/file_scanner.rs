//! Per-file inspection: header read, classification and hashing

use std::fs::File;
use std::io::{self, Seek};
use std::path::Path;

use crate::core::error::{Result, ScanError};
use crate::core::hasher::HashAlgorithm;
use crate::core::signature::{classify, read_header, FileType};
use crate::reporting::record_writer::FileRecord;

/// What happened to a single file
#[derive(Debug)]
pub enum FileOutcome {
    /// No known signature
    Unmatched,
    /// Matched and recorded
    Recorded(FileType),
    /// Matched, but the record could not be written
    Lost(ScanError),
    /// Could not be opened or read
    Unreadable(ScanError),
}

/// Inspect one file
///
/// The file is opened once. Its header is classified and, on a match, the
/// handle is rewound and the full content hashed.
///
/// # Returns
/// `Ok(None)` when no signature matches, otherwise the record to write
pub fn inspect_file(path: &Path, algorithm: HashAlgorithm) -> Result<Option<FileRecord>> {
    let read_error = |source: io::Error| ScanError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_error)?;
    let header = read_header(&mut file).map_err(read_error)?;

    let Some(file_type) = classify(&header) else {
        return Ok(None);
    };

    file.rewind().map_err(read_error)?;
    let hash = algorithm.hash_reader(&mut file).map_err(read_error)?;

    Ok(Some(FileRecord {
        path: path.to_path_buf(),
        file_type,
        hash,
    }))
}

/// Inspect a file and hand any match to `on_match`
pub fn process_file<F>(path: &Path, algorithm: HashAlgorithm, on_match: F) -> FileOutcome
where
    F: FnOnce(&FileRecord) -> Result<()>,
{
    match inspect_file(path, algorithm) {
        Ok(None) => FileOutcome::Unmatched,
        Ok(Some(record)) => match on_match(&record) {
            Ok(()) => FileOutcome::Recorded(record.file_type),
            Err(e) => FileOutcome::Lost(e),
        },
        Err(e) => FileOutcome::Unreadable(e),
    }
}
