//! Error handling for CSV conversion operations.
//!
//! Provides error types with context for source file handling, record
//! structure failures and artifact writing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source file not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Malformed row {row}: expected {expected} fields, found {found}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Failed to write artifact {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error table writing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Directory traversal failed: {0}")]
    DirectoryTraversal(#[from] walkdir::Error),

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ConverterError {
    /// Create an output write error for the given artifact path
    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Short category label used when reporting failures to the operator
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::SourceMissing { .. } => "missing-source",
            Self::MalformedRow { .. } => "malformed-row",
            Self::OutputWrite { .. } | Self::Json(_) | Self::Csv(_) => "output-write",
            Self::DirectoryTraversal(_) => "io",
            Self::DirectoryNotFound { .. } => "directory-not-found",
            Self::Configuration { .. } => "configuration",
            Self::Task(_) => "task",
        }
    }

    /// Whether the failure aborts processing of a file that was already admitted
    pub fn is_fatal_for_file(&self) -> bool {
        !matches!(self, Self::SourceMissing { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConverterError>;
