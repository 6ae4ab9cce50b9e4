//! Groups validation issues into one error report line per row

use crate::constants::ISSUE_SEPARATOR;
use crate::models::{ErrorEntry, ValidationIssue};

/// Fold consecutive issues sharing a row number into a single [`ErrorEntry`]
///
/// Issue codes are joined with `-&-` in encounter order. Entries come out in
/// the order their rows were first encountered.
pub fn aggregate_issues<'a, I>(issues: I) -> Vec<ErrorEntry>
where
    I: IntoIterator<Item = &'a ValidationIssue>,
{
    let mut entries: Vec<ErrorEntry> = Vec::new();

    for issue in issues {
        match entries.last_mut() {
            Some(current) if current.line_num == issue.row => {
                current.error_msg.push_str(ISSUE_SEPARATOR);
                current.error_msg.push_str(issue.code.as_str());
            }
            _ => entries.push(ErrorEntry {
                line_num: issue.row,
                error_msg: issue.code.as_str().to_string(),
            }),
        }
    }

    entries
}
