//! Directory scanning

pub mod file_scanner;
pub mod summary;
pub mod tree_scan;
pub mod tree_walker;

pub use file_scanner::{inspect_file, process_file, FileOutcome};
pub use summary::{EntryIssue, ScanSummary};
pub use tree_scan::{scan_to_csv, scan_tree, scan_tree_parallel, ScanControl, ScanOptions};
pub use tree_walker::{walk_files, WalkEntry, WalkOptions};
