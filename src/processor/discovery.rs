//! File discovery for the watched directory
//!
//! Walks the watched directory tree, including subdirectories, and collects
//! files whose name matches the configured pattern together with a stamp
//! used to detect modifications between scans.

use crate::error::Result;
use glob::Pattern;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use walkdir::WalkDir;

/// Modification marker of a file at scan time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// Logical file identifier: the file name without its last extension
///
/// Everything after the last `.` is the extension, so a name such as
/// `.csv` has no identifier.
pub fn logical_identifier(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let stem = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => &name[..],
    };
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Whether the file name of `path` matches `pattern`
pub fn matches_pattern(path: &Path, pattern: &Pattern) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| pattern.matches(name))
}

/// Discover matching files below `root`
///
/// An unreadable root is an error; entries that vanish or cannot be read
/// while walking are skipped.
pub fn discover_files(root: &Path, pattern: &Pattern) -> Result<Vec<(PathBuf, FileStamp)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !matches_pattern(entry.path(), pattern) {
            continue;
        }

        let stamp = match entry.metadata() {
            Ok(metadata) => FileStamp {
                modified: metadata.modified().ok(),
                len: metadata.len(),
            },
            Err(e) => {
                debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };

        files.push((entry.into_path(), stamp));
    }

    debug!("Discovered {} matching files in {}", files.len(), root.display());
    Ok(files)
}
