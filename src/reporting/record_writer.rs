//! Append-only CSV output of matched files
//!
//! Each row is `path,file_type,hash`. Rows are encoded in full before the
//! artifact is touched, then appended with a single write and flushed, so a
//! successful append always leaves the file ending on a complete row.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::error::{Result, ScanError};
use crate::core::signature::FileType;

/// One matched file as written to the output artifact
///
/// Paths that are not valid UTF-8 are written with each invalid sequence
/// replaced by U+FFFD, so such a row names the file only approximately and
/// does not parse back to the original path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub file_type: FileType,
    pub hash: String,
}

#[derive(Serialize)]
struct RecordRow<'a> {
    path: Cow<'a, str>,
    file_type: FileType,
    hash: &'a str,
}

impl<'a> From<&'a FileRecord> for RecordRow<'a> {
    fn from(record: &'a FileRecord) -> Self {
        Self {
            path: record.path.to_string_lossy(),
            file_type: record.file_type,
            hash: &record.hash,
        }
    }
}

/// Writer that appends one CSV row per matched file
#[derive(Debug)]
pub struct RecordWriter {
    path: PathBuf,
    rows_written: usize,
}

impl RecordWriter {
    /// Check that `path` can be opened for appending and build a writer for it.
    ///
    /// The file is created if it does not exist; existing content is kept.
    pub fn open(path: &Path) -> Result<Self> {
        open_append(path).map_err(|source| ScanError::OutputUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            rows_written: 0,
        })
    }

    /// Rows appended through this writer
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Append one record. The file handle is opened, written, flushed and
    /// dropped within this call.
    pub fn append(&mut self, record: &FileRecord) -> Result<()> {
        let to_error = |source: csv::Error| ScanError::Record {
            path: record.path.clone(),
            source,
        };

        let row = encode_row(record).map_err(to_error)?;

        let mut file = open_append(&self.path).map_err(|e| to_error(e.into()))?;
        file.write_all(&row).map_err(|e| to_error(e.into()))?;
        file.flush().map_err(|e| to_error(e.into()))?;

        self.rows_written += 1;
        Ok(())
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Encode a record as one RFC-4180 row, quoting fields that need it
fn encode_row(record: &FileRecord) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.serialize(RecordRow::from(record))?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Parse an output artifact back into records
///
/// # Arguments
/// * `path` - CSV file previously produced by [`RecordWriter`]
pub fn read_records(path: &Path) -> std::result::Result<Vec<FileRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    reader.deserialize().collect()
}
