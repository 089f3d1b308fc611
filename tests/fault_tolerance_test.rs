//! Integration tests for error isolation
//!
//! An unreadable file or directory must cost exactly one warning and never
//! stop the rest of the tree from being recorded.

use sigscan::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Log sink shared between a test and its scoped tracing subscriber
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Run `f` with warnings captured into the returned buffer
fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}

fn populated_root(temp_dir: &TempDir) -> PathBuf {
    let root = temp_dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("one.pdf"), b"%PDF-1.7").unwrap();
    fs::write(root.join("two.jpg"), [0xFF, 0xD8, 0xFF, 0xE1]).unwrap();
    root
}

fn scan_recursive(root: &Path, output: &Path, follow_links: bool) -> ScanSummary {
    let mut options = ScanOptions::new(root).recursive(true);
    options.follow_links = follow_links;
    scan_to_csv(&options, output, &ScanControl::default()).unwrap()
}

/// A dangling symlink is reported once and the rest of the tree is recorded
#[cfg(unix)]
#[test]
fn test_dangling_symlink_is_skipped_with_warning() {
    let temp_dir = TempDir::new().unwrap();
    let root = populated_root(&temp_dir);
    std::os::unix::fs::symlink(root.join("vanished.pdf"), root.join("dangling")).unwrap();

    let output = temp_dir.path().join("out.csv");
    let summary = scan_recursive(&root, &output, true);

    assert_eq!(summary.recorded, 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].path, root.join("dangling"));
    assert!(summary.is_complete());
    assert_eq!(read_records(&output).unwrap().len(), 2);
}

/// A file the process may not read is skipped with one warning
#[cfg(unix)]
#[test]
fn test_permission_denied_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let root = populated_root(&temp_dir);
    let locked = root.join("locked.pdf");
    fs::write(&locked, b"%PDF-1.7 secret").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::File::open(&locked).is_ok() {
        // Running with permission bypass (e.g. root); denial cannot be simulated
        return;
    }

    let output = temp_dir.path().join("out.csv");
    let summary = scan_recursive(&root, &output, false);

    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.recorded, 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].path, locked);

    let records = read_records(&output).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.path != locked));
}

/// A directory that cannot be listed is skipped; its siblings are still scanned
#[cfg(unix)]
#[test]
fn test_unlistable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let root = populated_root(&temp_dir);
    let closed = root.join("closed");
    let open = root.join("open");
    fs::create_dir(&closed).unwrap();
    fs::create_dir(&open).unwrap();
    fs::write(closed.join("hidden.pdf"), b"%PDF-1.7").unwrap();
    fs::write(open.join("visible.pdf"), b"%PDF-1.7").unwrap();
    fs::set_permissions(&closed, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&closed).is_ok() {
        fs::set_permissions(&closed, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let output = temp_dir.path().join("out.csv");
    let summary = scan_recursive(&root, &output, false);
    fs::set_permissions(&closed, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(summary.recorded, 3);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].path, closed);
    assert!(read_records(&output)
        .unwrap()
        .iter()
        .any(|r| r.path == open.join("visible.pdf")));
}

/// A regular file that opens but fails to read is skipped with one warning,
/// and every other file is still recorded. `/proc/self/mem` fails on read at
/// offset zero regardless of privileges.
#[cfg(target_os = "linux")]
#[test]
fn test_read_failure_is_skipped_with_one_warning() {
    let temp_dir = TempDir::new().unwrap();
    let root = populated_root(&temp_dir);
    let broken = root.join("broken.pdf");
    std::os::unix::fs::symlink("/proc/self/mem", &broken).unwrap();

    let output = temp_dir.path().join("out.csv");
    let (summary, logs) = with_captured_logs(|| scan_recursive(&root, &output, true));

    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.recorded, 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].path, broken);
    assert!(summary.is_complete());

    let records = read_records(&output).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.path != broken));

    assert_eq!(logs.matches("skipping entry").count(), 1, "logs: {}", logs);
    assert!(logs.contains("broken.pdf"), "logs: {}", logs);
}

/// A clean scan emits no warnings
#[test]
fn test_clean_scan_logs_no_warnings() {
    let temp_dir = TempDir::new().unwrap();
    let root = populated_root(&temp_dir);
    let output = temp_dir.path().join("out.csv");

    let (summary, logs) = with_captured_logs(|| scan_recursive(&root, &output, false));
    assert_eq!(summary.recorded, 2);
    assert!(logs.is_empty(), "logs: {}", logs);
}

/// A file removed between listing and reading is skipped, not fatal
#[test]
fn test_disappearing_file_is_unreadable() {
    let temp_dir = TempDir::new().unwrap();
    let root = populated_root(&temp_dir);
    let gone = root.join("gone.pdf");

    let outcome = sigscan::scanner::process_file(&gone, HashAlgorithm::Md5, |_| Ok(()));
    assert!(matches!(
        outcome,
        sigscan::scanner::FileOutcome::Unreadable(ScanError::Read { .. })
    ));
}

/// Writer failures are counted per record and the walk carries on
#[test]
fn test_lost_records_are_counted() {
    let temp_dir = TempDir::new().unwrap();
    let root = populated_root(&temp_dir);
    let output = temp_dir.path().join("out.csv");
    let mut writer = RecordWriter::open(&output).unwrap();

    let mut calls = 0;
    let summary = scan_tree(
        &ScanOptions::new(&root),
        &ScanControl::default(),
        |record| {
            calls += 1;
            if record.file_type == FileType::Pdf {
                // Simulate the artifact disappearing under us
                Err(ScanError::Record {
                    path: record.path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full").into(),
                })
            } else {
                writer.append(record)
            }
        },
    )
    .unwrap();

    assert_eq!(calls, 2);
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.recorded, 1);
    assert_eq!(summary.failed_to_record(), 1);
    assert_eq!(summary.lost[0].path, root.join("one.pdf"));
    assert_eq!(read_records(&output).unwrap().len(), 1);
}

/// An output path that cannot be opened stops the run before any walking
#[test]
fn test_unopenable_output_fails_eagerly() {
    let temp_dir = TempDir::new().unwrap();
    let root = populated_root(&temp_dir);
    let output = temp_dir.path().join("missing_dir").join("out.csv");

    let err = scan_to_csv(&ScanOptions::new(&root), &output, &ScanControl::default()).unwrap_err();
    assert!(matches!(err, ScanError::OutputUnavailable { .. }));
}
