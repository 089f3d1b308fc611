//! Run totals

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::file_scanner::FileOutcome;
use crate::core::error::ScanError;
use crate::core::signature::FileType;

/// An entry that was skipped or lost, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryIssue {
    pub path: PathBuf,
    pub reason: String,
}

impl From<&ScanError> for EntryIssue {
    fn from(err: &ScanError) -> Self {
        Self {
            path: err.path().to_path_buf(),
            reason: err.to_string(),
        }
    }
}

/// Totals for one scan
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Regular files visited, readable or not
    pub scanned: usize,
    /// Files whose header matched a signature
    pub matched: usize,
    /// Matches written to the output artifact
    pub recorded: usize,
    pub by_type: BTreeMap<FileType, usize>,
    /// Files and directories skipped with a warning
    pub skipped: Vec<EntryIssue>,
    /// Matches that could not be written
    pub lost: Vec<EntryIssue>,
    /// The walk stopped early on request
    pub interrupted: bool,
}

impl ScanSummary {
    pub fn failed_to_record(&self) -> usize {
        self.lost.len()
    }

    /// True when every match reached the output artifact
    pub fn is_complete(&self) -> bool {
        self.lost.is_empty()
    }

    pub(crate) fn add_skipped(&mut self, err: &ScanError) {
        self.skipped.push(EntryIssue::from(err));
    }

    pub(crate) fn add_outcome(&mut self, outcome: &FileOutcome) {
        self.scanned += 1;
        match outcome {
            FileOutcome::Unmatched => {}
            FileOutcome::Recorded(file_type) => {
                self.matched += 1;
                self.recorded += 1;
                *self.by_type.entry(*file_type).or_insert(0) += 1;
            }
            FileOutcome::Lost(err) => {
                self.matched += 1;
                self.lost.push(EntryIssue::from(err));
            }
            FileOutcome::Unreadable(err) => self.add_skipped(err),
        }
    }
}
