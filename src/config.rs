//! Configuration management and validation.
//!
//! Holds the watched directory, the two artifact directories and the
//! polling/settle parameters used by the watcher and orchestrator.

use crate::constants::{
    DEFAULT_FILE_PATTERN, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_ATTEMPTS,
    DEFAULT_SETTLE_DELAY_MS, ERROR_EXTENSION, JSON_EXTENSION,
};
use crate::error::{ConverterError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Runtime configuration for one armed watcher
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Directory observed for incoming CSV files (subdirectories included)
    pub watch_dir: PathBuf,

    /// Directory receiving `<name>.json`
    pub json_output_dir: PathBuf,

    /// Directory receiving `<name>.csv` error reports
    pub error_output_dir: PathBuf,

    /// Glob matched against file names
    pub file_pattern: String,

    /// Interval between directory scans
    pub poll_interval: Duration,

    /// Attempts made to reach a source file before giving up
    pub settle_attempts: u32,

    /// Delay between settle attempts
    pub settle_delay: Duration,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from("."),
            json_output_dir: PathBuf::from("."),
            error_output_dir: PathBuf::from("."),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            settle_attempts: DEFAULT_SETTLE_ATTEMPTS,
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
        }
    }
}

impl ConverterConfig {
    /// Create configuration for the given directories with default timings
    pub fn new(
        watch_dir: impl Into<PathBuf>,
        json_output_dir: impl Into<PathBuf>,
        error_output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            json_output_dir: json_output_dir.into(),
            error_output_dir: error_output_dir.into(),
            ..Self::default()
        }
    }

    /// Set the watched file name pattern
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    /// Set the scan interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the number of settle attempts
    pub fn with_settle_attempts(mut self, attempts: u32) -> Self {
        self.settle_attempts = attempts;
        self
    }

    /// Set the delay between settle attempts
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Path of the JSON artifact for a logical file identifier
    pub fn json_artifact_path(&self, identifier: &str) -> PathBuf {
        artifact_path(&self.json_output_dir, identifier, JSON_EXTENSION)
    }

    /// Path of the error artifact for a logical file identifier
    pub fn error_artifact_path(&self, identifier: &str) -> PathBuf {
        artifact_path(&self.error_output_dir, identifier, ERROR_EXTENSION)
    }

    /// Validate directories and parameters
    pub fn validate(&self) -> Result<()> {
        for dir in [&self.watch_dir, &self.json_output_dir, &self.error_output_dir] {
            if !dir.is_dir() {
                return Err(ConverterError::DirectoryNotFound { path: dir.clone() });
            }
        }

        glob::Pattern::new(&self.file_pattern).map_err(|e| {
            ConverterError::configuration(format!(
                "Invalid file pattern '{}': {}",
                self.file_pattern, e
            ))
        })?;

        if self.poll_interval.is_zero() {
            return Err(ConverterError::configuration(
                "Poll interval must be greater than zero",
            ));
        }

        if self.settle_attempts == 0 {
            return Err(ConverterError::configuration(
                "Settle attempts must be at least 1",
            ));
        }

        debug!(
            "Configuration valid: watch={} json={} errors={}",
            self.watch_dir.display(),
            self.json_output_dir.display(),
            self.error_output_dir.display()
        );
        Ok(())
    }
}

fn artifact_path(dir: &Path, identifier: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", identifier, extension))
}
