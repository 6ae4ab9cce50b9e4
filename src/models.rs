//! Core data structures and types for CSV conversion.
//!
//! Defines raw rows, validation issues, the output entities and
//! the per-file and per-session processing reports.

use crate::constants::{FIELD_COUNT, fields};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Positional fields of one non-header line, borrowed from the line itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRow<'a> {
    fields: [&'a str; FIELD_COUNT],
}

impl<'a> RawRow<'a> {
    pub fn new(fields: [&'a str; FIELD_COUNT]) -> Self {
        Self { fields }
    }

    pub fn internal_id(&self) -> &'a str {
        self.fields[fields::INTERNAL_ID]
    }

    pub fn first_name(&self) -> &'a str {
        self.fields[fields::FIRST_NAME]
    }

    pub fn middle_name(&self) -> &'a str {
        self.fields[fields::MIDDLE_NAME]
    }

    pub fn last_name(&self) -> &'a str {
        self.fields[fields::LAST_NAME]
    }

    pub fn phone(&self) -> &'a str {
        self.fields[fields::PHONE_NUM]
    }
}

/// Fixed set of validation failures a field can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    InternalIdEmpty,
    InternalIdNotEightDigits,
    InternalIdNotInteger,
    InternalIdNotPositive,
    FirstNameEmpty,
    FirstNameTooLong,
    MiddleNameTooLong,
    LastNameEmpty,
    LastNameTooLong,
    PhoneEmpty,
    PhoneMalformed,
}

impl IssueCode {
    /// Code written to the error report
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::InternalIdEmpty => "INTERNAL_ID-cannot-be-empty",
            IssueCode::InternalIdNotEightDigits => "INTERNAL_ID-is-not-8-digits",
            IssueCode::InternalIdNotInteger => "INTERNAL_ID-is-not-an-integer",
            IssueCode::InternalIdNotPositive => "INTERNAL_ID-is-not-a-positive-integer",
            IssueCode::FirstNameEmpty => "FIRST_NAME-cannot-be-empty",
            IssueCode::FirstNameTooLong => "FIRST_NAME-is-longer-than-15-characters",
            IssueCode::MiddleNameTooLong => "MIDDLE_NAME-is-longer-than-15-characters",
            IssueCode::LastNameEmpty => "LAST_NAME-cannot-be-empty",
            IssueCode::LastNameTooLong => "LAST_NAME-is-longer-than-15-characters",
            IssueCode::PhoneEmpty => "PHONE_NUM-cannot-be-empty",
            IssueCode::PhoneMalformed => "PHONE_NUM-not-formatted-correctly",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field failure; `row` is 1-based with the header counted as row 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationIssue {
    pub row: usize,
    pub code: IssueCode,
}

impl ValidationIssue {
    pub fn new(row: usize, code: IssueCode) -> Self {
        Self { row, code }
    }
}

/// Name mapping of a user; `middle` is omitted from JSON when absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserName {
    pub first: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle: Option<String>,
    pub last: String,
}

/// Output entity produced for every data row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: UserName,
    pub phone: String,
}

/// One line of the error report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    #[serde(rename = "LINE_NUM")]
    pub line_num: usize,
    #[serde(rename = "ERROR_MSG")]
    pub error_msg: String,
}

/// Result of converting one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub identifier: String,
    pub rows_processed: usize,
    pub issue_count: usize,
    pub rows_with_issues: usize,
    pub json_path: PathBuf,
    pub error_path: Option<PathBuf>,
}

/// What happened to a file handed to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Converted, artifacts written and source deleted
    Processed(FileReport),
    /// Identifier seen before; source deleted, nothing written
    RejectedDuplicate { identifier: String },
    /// Identifier failed earlier; source left untouched for manual reprocessing
    KeptForReprocessing { identifier: String },
}

/// Notification that a watched file appeared or changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
}

impl FileEvent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Processing statistics for the lifetime of the process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_rejected: usize,
    pub files_failed: usize,
    pub total_rows: usize,
    pub total_issues: usize,
}

impl ProcessingStats {
    /// Fold one file report into the totals
    pub fn record_report(&mut self, report: &FileReport) {
        self.files_processed += 1;
        self.total_rows += report.rows_processed;
        self.total_issues += report.issue_count;
    }
}
