//! Positional field splitting for person records
//!
//! Lines are split on every comma. Quoting and escaping are not supported,
//! so a field can never contain a literal comma.

use crate::constants::{FIELD_COUNT, FIELD_SEPARATOR};
use crate::error::{ConverterError, Result};
use crate::models::RawRow;
use tracing::debug;

/// Split one data line into its five positional fields
///
/// Fields past the fifth are ignored. Fewer than five fields is a
/// structural failure reported with the row number of the line.
pub fn parse_record(line: &str, row: usize) -> Result<RawRow<'_>> {
    let mut parts = line.split(FIELD_SEPARATOR);
    let mut fields = [""; FIELD_COUNT];

    for (index, slot) in fields.iter_mut().enumerate() {
        *slot = parts.next().ok_or(ConverterError::MalformedRow {
            row,
            expected: FIELD_COUNT,
            found: index,
        })?;
    }

    let extra = parts.count();
    if extra > 0 {
        debug!("Row {} has {} extra fields, ignoring them", row, extra);
    }

    Ok(RawRow::new(fields))
}
