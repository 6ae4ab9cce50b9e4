//! Field validation rules for person records
//!
//! One function per field. Every rule for a field runs independently, so a
//! single value can produce several issues. Name fields also yield the value
//! to emit, truncated to [`MAX_NAME_LENGTH`] characters whenever it is longer,
//! whether or not the length issue is reported.

use crate::constants::{INTERNAL_ID_DIGITS, MAX_NAME_LENGTH, PHONE_PATTERN};
use crate::models::{IssueCode, ValidationIssue};
use regex::Regex;
use std::sync::LazyLock;

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern is a valid regex"));

/// Validated field value together with the issues found for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck<T> {
    pub value: T,
    pub issues: Vec<ValidationIssue>,
}

impl<T> FieldCheck<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            issues: Vec::new(),
        }
    }

    fn flag(&mut self, row: usize, code: IssueCode) {
        self.issues.push(ValidationIssue::new(row, code));
    }
}

/// Validate the internal id
///
/// The emitted value is 0 when the text does not parse. Because 0 is not
/// negative, an unparseable id never also reports
/// [`IssueCode::InternalIdNotPositive`].
pub fn validate_internal_id(value: &str, row: usize) -> FieldCheck<i32> {
    let parsed = parse_invariant_integer(value);
    let mut check = FieldCheck::new(parsed.unwrap_or_default());

    if value.is_empty() {
        check.flag(row, IssueCode::InternalIdEmpty);
    }
    if value.chars().filter(|c| *c != '-').count() != INTERNAL_ID_DIGITS {
        check.flag(row, IssueCode::InternalIdNotEightDigits);
    }
    if parsed.is_none() {
        check.flag(row, IssueCode::InternalIdNotInteger);
    }
    if check.value < 0 {
        check.flag(row, IssueCode::InternalIdNotPositive);
    }

    check
}

/// Validate the first name
pub fn validate_first_name(value: &str, row: usize) -> FieldCheck<String> {
    validate_required_name(value, row, IssueCode::FirstNameEmpty, IssueCode::FirstNameTooLong)
}

/// Validate the middle name; an empty value yields `None` and no issue
pub fn validate_middle_name(value: &str, row: usize) -> FieldCheck<Option<String>> {
    if value.is_empty() {
        return FieldCheck::new(None);
    }

    let (truncated, too_long) = truncate_name(value);
    let mut check = FieldCheck::new(Some(truncated));
    if too_long {
        check.flag(row, IssueCode::MiddleNameTooLong);
    }
    check
}

/// Validate the last name
pub fn validate_last_name(value: &str, row: usize) -> FieldCheck<String> {
    validate_required_name(value, row, IssueCode::LastNameEmpty, IssueCode::LastNameTooLong)
}

/// Validate the phone number against `XXX-XXX-XXXX`
pub fn validate_phone(value: &str, row: usize) -> FieldCheck<String> {
    let mut check = FieldCheck::new(value.to_string());

    if value.is_empty() {
        check.flag(row, IssueCode::PhoneEmpty);
    }
    if !PHONE_REGEX.is_match(value) {
        check.flag(row, IssueCode::PhoneMalformed);
    }

    check
}

fn validate_required_name(
    value: &str,
    row: usize,
    empty_code: IssueCode,
    too_long_code: IssueCode,
) -> FieldCheck<String> {
    let (truncated, too_long) = truncate_name(value);
    let mut check = FieldCheck::new(truncated);

    if value.is_empty() {
        check.flag(row, empty_code);
    }
    if too_long {
        check.flag(row, too_long_code);
    }

    check
}

/// Returns the first [`MAX_NAME_LENGTH`] characters and whether anything was cut
fn truncate_name(value: &str) -> (String, bool) {
    match value.char_indices().nth(MAX_NAME_LENGTH) {
        Some((cut, _)) => (value[..cut].to_string(), true),
        None => (value.to_string(), false),
    }
}

/// Parse an integer the way an invariant-culture "any" number style does
///
/// Accepts surrounding whitespace, one leading or trailing sign, parentheses
/// for negatives, `,` group separators, a fractional part made only of zeros,
/// and an exponent. The result must fit in an `i32`.
pub fn parse_invariant_integer(value: &str) -> Option<i32> {
    let mut text = value.trim();
    let mut negative = false;

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        negative = true;
        text = inner.trim();
    }

    let (sign, body) = split_sign(text)?;
    if sign.is_some() && negative {
        return None;
    }
    negative |= sign == Some('-');

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], parse_exponent(&body[pos + 1..])?),
        None => (body, 0),
    };

    let (integer_part, fraction_part) = match mantissa.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (mantissa, ""),
    };

    if integer_part.starts_with(',') {
        return None;
    }
    if !integer_part.chars().all(|c| c.is_ascii_digit() || c == ',')
        || !fraction_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let digits: String = integer_part
        .chars()
        .filter(char::is_ascii_digit)
        .chain(fraction_part.chars())
        .collect();
    if digits.is_empty() {
        return None;
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > 20 {
        return None;
    }
    let mut magnitude: i128 = if significant.is_empty() {
        0
    } else {
        significant.parse().ok()?
    };

    let scale = exponent - fraction_part.len() as i64;
    if magnitude != 0 {
        if scale > 0 {
            if scale > 10 {
                return None;
            }
            magnitude = magnitude.checked_mul(10_i128.pow(scale as u32))?;
        } else if scale < 0 {
            let divisor = 10_i128.checked_pow(scale.unsigned_abs().try_into().ok()?)?;
            if magnitude % divisor != 0 {
                return None;
            }
            magnitude /= divisor;
        }
    }

    let signed = if negative { -magnitude } else { magnitude };
    i32::try_from(signed).ok()
}

fn split_sign(text: &str) -> Option<(Option<char>, &str)> {
    let leading = text.chars().next().filter(|c| *c == '+' || *c == '-');
    let trailing = text.chars().last().filter(|c| *c == '+' || *c == '-');

    match (leading, trailing) {
        (Some(sign), _) => {
            let rest = text[1..].trim_start();
            if rest.ends_with(['+', '-']) && !rest.contains(['e', 'E']) {
                return None;
            }
            Some((Some(sign), rest))
        }
        (None, Some(sign)) if !text.contains(['e', 'E']) => {
            Some((Some(sign), text[..text.len() - 1].trim_end()))
        }
        _ => Some((None, text)),
    }
}

fn parse_exponent(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || digits.len() > 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
