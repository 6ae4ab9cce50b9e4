//! Integration tests for the processor module
//!
//! Exercises the complete per-file pipeline against temporary directories.

pub mod end_to_end;

use super::{FileProcessor, SessionState};
use crate::config::ConverterConfig;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const HEADER: &str = "INTERNAL_ID,FIRST_NAME,MIDDLE_NAME,LAST_NAME,PHONE_NUM";

/// Temporary watch/json/error directories with a processor bound to them
pub struct Fixture {
    pub root: TempDir,
    pub processor: FileProcessor,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_settle(2, Duration::from_millis(10))
    }

    /// Fixture whose processor waits `attempts` times `delay` for a source
    pub fn with_settle(attempts: u32, delay: Duration) -> Self {
        let root = TempDir::new().unwrap();
        for dir in ["watch", "json", "errors"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }

        let config = ConverterConfig::new(
            root.path().join("watch"),
            root.path().join("json"),
            root.path().join("errors"),
        )
        .with_settle_attempts(attempts)
        .with_settle_delay(delay);

        let processor = FileProcessor::new(config, Arc::new(SessionState::new()));
        Self { root, processor }
    }

    pub fn watch_dir(&self) -> PathBuf {
        self.root.path().join("watch")
    }

    pub fn json_path(&self, identifier: &str) -> PathBuf {
        self.root.path().join("json").join(format!("{}.json", identifier))
    }

    pub fn error_path(&self, identifier: &str) -> PathBuf {
        self.root.path().join("errors").join(format!("{}.csv", identifier))
    }

    /// Drop a CSV file with a header and the given rows into the watch directory
    pub fn drop_csv(&self, name: &str, rows: &[&str]) -> PathBuf {
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content.push('\n');

        let path = self.watch_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }
}
