//! CSV to JSON Converter Library
//!
//! Watches a directory tree for comma-separated person records and converts
//! each arriving file into a JSON document plus, when any field fails
//! validation, a CSV error report.
//!
//! This library provides tools for:
//! - Parsing positional five-field records and validating every field
//! - Aggregating field issues into one error line per row
//! - Writing JSON and error artifacts atomically
//! - Tracking processed file names so each is converted at most once
//! - Polling a directory tree and dispatching arrivals to the processor

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod processor;
pub mod record;
pub mod watcher;

// Re-export commonly used types
pub use config::ConverterConfig;
pub use error::{ConverterError, Result};
pub use models::{ErrorEntry, FileEvent, FileOutcome, FileReport, User, UserName};
pub use processor::{FileProcessor, SessionState};
pub use watcher::DirectoryWatcher;
