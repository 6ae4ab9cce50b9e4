//! File processing pipeline.
//!
//! Orchestrates the conversion of one CSV file: existence check, admission
//! through the processed-file registry, row processing, issue aggregation,
//! artifact writing and source deletion.
//!
//! Every per-file sequence runs under a session-wide lock. Duplicate
//! notifications for the same file therefore never interleave: the first
//! invocation wins admission and deletes the source, later ones find it
//! rejected or already gone.

pub mod aggregator;
pub mod discovery;
pub mod registry;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{
    aggregator::aggregate_issues, discovery::logical_identifier, registry::ProcessedFileRegistry,
    writer::ArtifactWriter,
};

use crate::config::ConverterConfig;
use crate::constants::HEADER_ROW;
use crate::error::{ConverterError, Result};
use crate::models::{FileEvent, FileOutcome, FileReport, ProcessingStats, User, ValidationIssue};
use crate::record::process_row;

use colored::*;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::fs;
use tokio::task;
use tracing::{debug, error, info, warn};

/// Users and issues of one file, both in row order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedFile {
    pub users: Vec<User>,
    pub issues: Vec<ValidationIssue>,
}

/// Run the row processor over every line after the header
pub fn convert_content(content: &str) -> Result<ConvertedFile> {
    let mut converted = ConvertedFile::default();

    for (index, line) in source_lines(content).enumerate().skip(HEADER_ROW) {
        let row = process_row(line, index + 1)?;
        converted.users.push(row.user);
        converted.issues.extend(row.issues);
    }

    Ok(converted)
}

/// Lines ended by `\n`, `\r\n` or a lone `\r`; a final terminator adds no empty line
fn source_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = content;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let line = match rest.find(['\r', '\n']) {
            Some(end) => {
                let line = &rest[..end];
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + terminator..];
                line
            }
            None => std::mem::take(&mut rest),
        };
        Some(line)
    })
}

/// State shared by every processor created during the process lifetime
#[derive(Debug, Default)]
pub struct SessionState {
    registry: ProcessedFileRegistry,
    stats: Mutex<ProcessingStats>,
    dispatch_lock: tokio::sync::Mutex<()>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ProcessedFileRegistry {
        &self.registry
    }

    /// Copy of the statistics gathered so far
    pub fn stats(&self) -> ProcessingStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_stats(&self, update: impl FnOnce(&mut ProcessingStats)) {
        update(&mut self.stats.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

/// Converts files for one armed set of directories
#[derive(Debug, Clone)]
pub struct FileProcessor {
    config: ConverterConfig,
    writer: ArtifactWriter,
    session: Arc<SessionState>,
}

impl FileProcessor {
    /// Create a processor sharing `session` with any earlier processors
    pub fn new(config: ConverterConfig, session: Arc<SessionState>) -> Self {
        let writer = ArtifactWriter::new(&config);
        Self {
            config,
            writer,
            session,
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Entry point for the trigger source; never propagates failures
    pub async fn handle_event(&self, event: FileEvent) {
        println!("{}", "File detected.".bright_cyan());
        debug!("Event for {}", event.path.display());

        match self.process_file(&event.path).await {
            Ok(FileOutcome::Processed(report)) => {
                if report.error_path.is_some() {
                    println!(
                        "{}",
                        "Errors found! Check your error output directory for details."
                            .bright_yellow()
                    );
                }
                println!("{}", "File processed.".bright_green());
                println!("--");
            }
            Ok(FileOutcome::RejectedDuplicate { .. }) => {
                println!("{}", "File already processed.".bright_yellow());
            }
            Ok(FileOutcome::KeptForReprocessing { identifier }) => {
                println!(
                    "{} {}",
                    "File left in place for manual reprocessing:".bright_yellow(),
                    identifier
                );
            }
            Err(e) if !e.is_fatal_for_file() => {
                warn!("[{}] {}", e.category(), e);
            }
            Err(e) => {
                error!(
                    "[{}] Processing {} failed: {}",
                    e.category(),
                    event.path.display(),
                    e
                );
                eprintln!(
                    "{} {}",
                    format!("{} error occurred:", e.category()).bright_red().bold(),
                    e
                );
            }
        }
    }

    /// Process one source file
    pub async fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let _guard = self.session.dispatch_lock.lock().await;

        let identifier = logical_identifier(path).ok_or_else(|| {
            ConverterError::configuration(format!(
                "No file name to derive an identifier from in {}",
                path.display()
            ))
        })?;

        if !self.await_source(path, &identifier).await? {
            info!("'{}' was already handled and is gone", identifier);
            self.session.update_stats(|stats| stats.files_rejected += 1);
            return Ok(FileOutcome::RejectedDuplicate { identifier });
        }

        if !self.session.registry.admit(&identifier) {
            if self.session.registry.is_failed(&identifier) {
                warn!(
                    "'{}' failed earlier; leaving {} untouched",
                    identifier,
                    path.display()
                );
                return Ok(FileOutcome::KeptForReprocessing { identifier });
            }

            info!("'{}' already processed, discarding {}", identifier, path.display());
            remove_if_present(path).await?;
            self.session.update_stats(|stats| stats.files_rejected += 1);
            return Ok(FileOutcome::RejectedDuplicate { identifier });
        }

        println!("{}", "Begin processing...".bright_white());
        info!("Processing {}", path.display());

        match self.convert(path, &identifier).await {
            Ok(report) => {
                info!(
                    "Processed '{}': {} rows, {} issues",
                    identifier, report.rows_processed, report.issue_count
                );
                self.session.update_stats(|stats| stats.record_report(&report));
                Ok(FileOutcome::Processed(report))
            }
            Err(e) => {
                self.session.registry.mark_failed(&identifier);
                self.session.update_stats(|stats| stats.files_failed += 1);
                Err(e)
            }
        }
    }

    async fn convert(&self, path: &Path, identifier: &str) -> Result<FileReport> {
        let content = self.read_source(path).await?;
        let converted = convert_content(&content)?;
        let errors = aggregate_issues(&converted.issues);

        let rows_processed = converted.users.len();
        let issue_count = converted.issues.len();
        let rows_with_issues = errors.len();

        let written = task::spawn_blocking({
            let writer = self.writer.clone();
            let identifier = identifier.to_string();
            move || writer.write_artifacts(&identifier, &converted.users, &errors)
        })
        .await??;

        remove_if_present(path).await?;

        Ok(FileReport {
            identifier: identifier.to_string(),
            rows_processed,
            issue_count,
            rows_with_issues,
            json_path: written.json_path,
            error_path: written.error_path,
        })
    }

    /// Wait for the source to exist
    ///
    /// Returns `Ok(false)` without waiting when the file is absent and its
    /// identifier was already admitted: a competing notification handled it.
    async fn await_source(&self, path: &Path, identifier: &str) -> Result<bool> {
        for attempt in 1..=self.config.settle_attempts {
            if fs::metadata(path).await.is_ok_and(|m| m.is_file()) {
                return Ok(true);
            }
            if self.session.registry.contains(identifier) {
                return Ok(false);
            }
            if attempt < self.config.settle_attempts {
                debug!(
                    "{} not present yet (attempt {}/{})",
                    path.display(),
                    attempt,
                    self.config.settle_attempts
                );
                tokio::time::sleep(self.config.settle_delay).await;
            }
        }

        Err(ConverterError::SourceMissing {
            path: path.to_path_buf(),
        })
    }

    async fn read_source(&self, path: &Path) -> Result<String> {
        read_with_retry(
            path,
            self.config.settle_attempts,
            self.config.settle_delay,
            |path| async move { fs::read_to_string(path).await },
        )
        .await
    }
}

/// Read through `read`, retrying while the producer may still hold the file
///
/// Invalid UTF-8 is final and fails at once.
async fn read_with_retry<F, Fut>(
    path: &Path,
    attempts: u32,
    delay: Duration,
    mut read: F,
) -> Result<String>
where
    F: FnMut(PathBuf) -> Fut,
    Fut: Future<Output = io::Result<String>>,
{
    let mut attempt = 1;
    loop {
        match read(path.to_path_buf()).await {
            Ok(content) => return Ok(content),
            Err(e) if e.kind() == ErrorKind::InvalidData => return Err(e.into()),
            Err(e) if attempt >= attempts => return Err(e.into()),
            Err(e) => {
                debug!("Read of {} failed (attempt {}): {}", path.display(), attempt, e);
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
