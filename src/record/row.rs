//! Per-row processing: parse, validate every field, build the output entity

use super::parser::parse_record;
use super::validator::{
    validate_first_name, validate_internal_id, validate_last_name, validate_middle_name,
    validate_phone,
};
use crate::error::Result;
use crate::models::{User, UserName, ValidationIssue};

/// Output entity of one row and the issues found while building it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    pub user: User,
    pub issues: Vec<ValidationIssue>,
}

/// Process one data line
///
/// Validators run in the order id, first, middle, last, phone and their
/// issues keep that order. The user is always produced; issues only
/// annotate it.
pub fn process_row(line: &str, row: usize) -> Result<RowResult> {
    let raw = parse_record(line, row)?;

    let id = validate_internal_id(raw.internal_id(), row);
    let first = validate_first_name(raw.first_name(), row);
    let middle = validate_middle_name(raw.middle_name(), row);
    let last = validate_last_name(raw.last_name(), row);
    let phone = validate_phone(raw.phone(), row);

    let issues = [id.issues, first.issues, middle.issues, last.issues, phone.issues].concat();

    let user = User {
        id: id.value,
        name: UserName {
            first: first.value,
            middle: middle.value,
            last: last.value,
        },
        phone: phone.value,
    };

    Ok(RowResult { user, issues })
}
