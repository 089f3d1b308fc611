//! Directory traversal
//!
//! Files in a directory are yielded before any of its subdirectories are
//! entered, in file-name order. Entries that cannot be listed are yielded as
//! errors rather than ending the walk.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::ScanError;

/// Traversal policy, fixed for the whole run
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Follow symbolic links; directory loops are reported as errors
    pub follow_links: bool,
}

/// One item produced by the walk
#[derive(Debug)]
pub enum WalkEntry {
    /// A regular file to inspect
    File(PathBuf),
    /// A directory or entry that could not be read
    Unreadable(ScanError),
}

/// Enumerate regular files under `root`
///
/// # Arguments
/// * `root` - Directory to scan; not itself yielded
/// * `options` - Recursion and symlink policy
pub fn walk_files(root: &Path, options: WalkOptions) -> Box<dyn Iterator<Item = WalkEntry>> {
    if options.recursive {
        Box::new(walk_recursive(root, options.follow_links))
    } else {
        Box::new(list_flat(root, options.follow_links).into_iter())
    }
}

/// List the files directly inside `root`. Subdirectories are never opened.
fn list_flat(root: &Path, follow_links: bool) -> Vec<WalkEntry> {
    let list_error = |source| {
        WalkEntry::Unreadable(ScanError::List {
            path: root.to_path_buf(),
            source,
        })
    };

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => return vec![list_error(e)],
    };

    let mut errors = Vec::new();
    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                errors.push(list_error(e));
                continue;
            }
        };
        let path = entry.path();

        let file_type = if follow_links {
            fs::metadata(&path).map(|m| m.file_type())
        } else {
            entry.file_type()
        };
        match file_type {
            Ok(file_type) if file_type.is_file() => files.push(path),
            Ok(_) => {}
            Err(source) => errors.push(WalkEntry::Unreadable(ScanError::Read { path, source })),
        }
    }

    files.sort();
    errors.extend(files.into_iter().map(WalkEntry::File));
    errors
}

fn walk_recursive(root: &Path, follow_links: bool) -> impl Iterator<Item = WalkEntry> {
    let root_path = root.to_path_buf();

    WalkDir::new(root)
        .min_depth(1)
        .follow_links(follow_links)
        .sort_by(files_before_dirs)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(WalkEntry::File(entry.into_path())),
            Ok(_) => None,
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root_path.clone());
                Some(WalkEntry::Unreadable(ScanError::Walk { path, source: err }))
            }
        })
}

// walkdir sorts before following links, so a link's target decides its place
fn is_dir_like(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

fn files_before_dirs(a: &DirEntry, b: &DirEntry) -> Ordering {
    is_dir_like(a)
        .cmp(&is_dir_like(b))
        .then_with(|| a.file_name().cmp(b.file_name()))
}
