//! Human-readable run report

use anyhow::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::scanner::summary::{EntryIssue, ScanSummary};
use crate::scanner::tree_scan::ScanOptions;

/// Write a scan report to a file, replacing any previous report
///
/// # Arguments
/// * `report_path` - Path to the report file
/// * `options` - Settings the scan ran with
/// * `output` - CSV artifact the matches were appended to
/// * `summary` - Totals from the scan
pub fn write_report(
    report_path: &Path,
    options: &ScanOptions,
    output: &Path,
    summary: &ScanSummary,
) -> Result<()> {
    let mut file = BufWriter::new(File::create(report_path)?);

    let now = std::time::SystemTime::now();
    writeln!(file, "Signature Scan Report")?;
    writeln!(file, "=====================")?;
    writeln!(file, "Generated: {:?}", now)?;
    writeln!(file, "Root: {}", options.root.display())?;
    writeln!(file, "Recursive: {}", if options.recursive { "yes" } else { "no" })?;
    writeln!(file, "Hash: {}", options.algorithm)?;
    writeln!(file, "Output: {}", output.display())?;
    if summary.interrupted {
        writeln!(file, "Status: interrupted before the walk finished")?;
    }
    writeln!(file)?;

    writeln!(file, "Summary Statistics:")?;
    writeln!(file, "-------------------")?;
    writeln!(file, "  Files scanned: {}", summary.scanned)?;
    writeln!(file, "  Signature matches: {}", summary.matched)?;
    writeln!(file, "  Rows recorded: {}", summary.recorded)?;
    writeln!(file, "  Entries skipped: {}", summary.skipped.len())?;
    writeln!(file, "  Failed to record: {}", summary.failed_to_record())?;
    writeln!(file)?;

    if !summary.by_type.is_empty() {
        writeln!(file, "Matches by Type:")?;
        writeln!(file, "----------------")?;
        for (file_type, count) in &summary.by_type {
            writeln!(file, "  {}: {}", file_type, count)?;
        }
        writeln!(file)?;
    }

    write_issues(&mut file, "Skipped Entries:", &summary.skipped)?;
    write_issues(&mut file, "Unrecorded Matches:", &summary.lost)?;

    file.flush()?;
    Ok(())
}

fn write_issues<W: Write>(out: &mut W, title: &str, issues: &[EntryIssue]) -> Result<()> {
    if issues.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.len()))?;
    for issue in issues {
        writeln!(out, "  {}", issue.path.display())?;
        writeln!(out, "    {}", issue.reason)?;
    }
    writeln!(out)?;
    Ok(())
}
