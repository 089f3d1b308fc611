//! Output artifact and run report writing

pub mod record_writer;
pub mod report_writer;

pub use record_writer::{read_records, FileRecord, RecordWriter};
pub use report_writer::write_report;
