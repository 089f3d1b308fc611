//! Walk, classify, hash and record
//!
//! The walk itself is always single-threaded. In parallel mode the files it
//! finds are inspected on the rayon pool, and every match still goes through
//! one mutex-guarded sink so appends to the output are serialized.

use indicatif::ProgressBar;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use super::file_scanner::{process_file, FileOutcome};
use super::summary::ScanSummary;
use super::tree_walker::{walk_files, WalkEntry, WalkOptions};
use crate::core::error::{Result, ScanError};
use crate::core::hasher::HashAlgorithm;
use crate::reporting::record_writer::{FileRecord, RecordWriter};

/// Settings for one scan, passed explicitly to every entry point
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory to scan
    pub root: PathBuf,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Follow symbolic links
    pub follow_links: bool,
    /// Digest for matched files
    pub algorithm: HashAlgorithm,
    /// Inspect files on the rayon pool
    pub parallel: bool,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: false,
            follow_links: false,
            algorithm: HashAlgorithm::default(),
            parallel: false,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            recursive: self.recursive,
            follow_links: self.follow_links,
        }
    }
}

/// Progress display and stop flag shared with the caller
#[derive(Clone)]
pub struct ScanControl {
    pub progress: ProgressBar,
    pub stop: Arc<AtomicBool>,
    matched: Arc<AtomicUsize>,
}

impl Default for ScanControl {
    fn default() -> Self {
        Self {
            progress: ProgressBar::hidden(),
            stop: Arc::new(AtomicBool::new(false)),
            matched: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ScanControl {
    /// Use `progress` for display, keeping this control's stop flag
    pub fn with_progress(self, progress: ProgressBar) -> Self {
        Self { progress, ..self }
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn warn_skipped(&self, err: &ScanError) {
        self.progress.suspend(|| {
            warn!(path = %err.path().display(), error = %err, "skipping entry");
        });
    }

    fn observe(&self, path: &Path, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Unmatched => {}
            FileOutcome::Recorded(file_type) => {
                self.progress.suspend(|| {
                    debug!(path = %path.display(), %file_type, "recorded match");
                });
                self.count_match();
            }
            FileOutcome::Lost(err) => {
                self.progress.suspend(|| {
                    warn!(path = %path.display(), error = %err, "match could not be recorded");
                });
                self.count_match();
            }
            FileOutcome::Unreadable(err) => self.warn_skipped(err),
        }
        self.progress.inc(1);
    }

    fn count_match(&self) {
        let matched = self.matched.fetch_add(1, Ordering::Relaxed) + 1;
        self.progress.set_message(format!("{} matched", matched));
    }
}

fn check_root(root: &Path) -> Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(ScanError::InvalidRoot {
            path: root.to_path_buf(),
        })
    }
}

/// Scan a tree sequentially, calling `on_match` for every matched file
///
/// Files in each directory are handled before its subdirectories. Unreadable
/// files and directories are logged, counted and skipped.
///
/// # Errors
/// Returns [`ScanError::InvalidRoot`] if `options.root` is not a directory.
pub fn scan_tree<F>(options: &ScanOptions, control: &ScanControl, mut on_match: F) -> Result<ScanSummary>
where
    F: FnMut(&FileRecord) -> Result<()>,
{
    check_root(&options.root)?;
    let mut summary = ScanSummary::default();

    for entry in walk_files(&options.root, options.walk_options()) {
        if control.stop_requested() {
            summary.interrupted = true;
            break;
        }

        match entry {
            WalkEntry::File(path) => {
                let outcome = process_file(&path, options.algorithm, &mut on_match);
                control.observe(&path, &outcome);
                summary.add_outcome(&outcome);
            }
            WalkEntry::Unreadable(err) => {
                control.warn_skipped(&err);
                summary.add_skipped(&err);
            }
        }
    }

    Ok(summary)
}

/// Scan a tree, inspecting files on the rayon pool
///
/// `on_match` is called under a mutex, one record at a time.
///
/// # Errors
/// Returns [`ScanError::InvalidRoot`] if `options.root` is not a directory.
pub fn scan_tree_parallel<F>(options: &ScanOptions, control: &ScanControl, on_match: F) -> Result<ScanSummary>
where
    F: FnMut(&FileRecord) -> Result<()> + Send,
{
    check_root(&options.root)?;
    let mut summary = ScanSummary::default();

    let mut files = Vec::new();
    for entry in walk_files(&options.root, options.walk_options()) {
        match entry {
            WalkEntry::File(path) => files.push(path),
            WalkEntry::Unreadable(err) => {
                control.warn_skipped(&err);
                summary.add_skipped(&err);
            }
        }
    }

    let sink = Mutex::new(on_match);
    let outcomes: Vec<Option<FileOutcome>> = files
        .par_iter()
        .map(|path| {
            if control.stop_requested() {
                return None;
            }
            let outcome = process_file(path, options.algorithm, |record| {
                let mut append = sink.lock().unwrap_or_else(PoisonError::into_inner);
                (*append)(record)
            });
            control.observe(path, &outcome);
            Some(outcome)
        })
        .collect();

    for outcome in &outcomes {
        match outcome {
            Some(outcome) => summary.add_outcome(outcome),
            None => summary.interrupted = true,
        }
    }

    Ok(summary)
}

/// Scan a tree and append every match to the CSV file at `output`
///
/// The output is opened once before the walk starts; failing to open it is
/// the only error that stops the run.
///
/// # Errors
/// Returns [`ScanError::InvalidRoot`] or [`ScanError::OutputUnavailable`].
pub fn scan_to_csv(options: &ScanOptions, output: &Path, control: &ScanControl) -> Result<ScanSummary> {
    check_root(&options.root)?;
    let mut writer = RecordWriter::open(output)?;
    let append = |record: &FileRecord| writer.append(record);

    let summary = if options.parallel {
        scan_tree_parallel(options, control, append)
    } else {
        scan_tree(options, control, append)
    }?;

    debug!(output = %output.display(), rows = writer.rows_written(), "scan finished");
    Ok(summary)
}
