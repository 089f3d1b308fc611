//! Signature Scanner Library
//!
//! Finds PDF and JPEG files by their leading bytes and appends their content
//! hashes to a CSV inventory.

pub mod core;
pub mod reporting;
pub mod scanner;

pub use self::core::signature;
pub use reporting::record_writer;
pub use scanner::tree_scan;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::core::error::ScanError;
    pub use crate::core::hasher::{compute_file_hash, HashAlgorithm};
    pub use crate::core::signature::{classify, FileType, HEADER_LEN};
    pub use crate::reporting::record_writer::{read_records, FileRecord, RecordWriter};
    pub use crate::reporting::report_writer::write_report;
    pub use crate::scanner::summary::{EntryIssue, ScanSummary};
    pub use crate::scanner::tree_scan::{scan_to_csv, scan_tree, scan_tree_parallel, ScanControl, ScanOptions};
}
