//! Validators: pure predicates over a value string given an AI spec.
//!
//! Each validator is independent; failures accumulate into the element's
//! error list and never abort the decode. The reconstructor reuses the date
//! and check-digit validators as hard constraints.

use chrono::NaiveDate;

use crate::dictionary::{AiSpec, DataType, DateFormat};
use crate::element::{Gs1Date, TypedValue};
use crate::result::DiagnosticCode;

/// Outcome of validating one element value.
#[derive(Debug, Clone)]
pub(crate) struct Validation {
    pub valid: bool,
    pub errors: Vec<DiagnosticCode>,
    pub typed: TypedValue,
}

/// Compute the GS1 mod-10 check digit over a digit string.
///
/// Right to left, multipliers alternate 3, 1 starting at 3; the check digit
/// is `(10 - sum % 10) % 10`. Returns `None` for empty or non-digit input.
#[must_use]
pub fn compute_check_digit(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit * 3
            } else {
                digit
            }
        })
        .sum();
    Some((10 - sum % 10) % 10)
}

/// Whether the final digit of `value` is the correct mod-10 check digit
/// over the preceding digits. `None` when `value` is not checkable
/// (non-numeric or shorter than two characters).
#[must_use]
pub fn check_digit_valid(value: &str) -> Option<bool> {
    if value.len() < 2 {
        return None;
    }
    let (data, check) = value.split_at(value.len() - 1);
    let expected = compute_check_digit(data)?;
    let provided = u32::from(check.as_bytes()[0].checked_sub(b'0')?);
    if provided > 9 {
        return None;
    }
    Some(provided == expected)
}

/// Whether `c` belongs to GS1 character set 82: the printable ASCII range
/// `!` (0x21) through `}` (0x7D), everything printable except space, `~`,
/// and DEL.
#[must_use]
pub fn is_cset82(c: char) -> bool {
    ('\x21'..='\x7d').contains(&c)
}

/// Whether `c` belongs to GS1 character set 39 (`#`, `-`, `/`, digits,
/// uppercase letters). Defined by the specification; no AI in the built-in
/// dictionary currently demands it.
#[must_use]
pub fn is_cset39(c: char) -> bool {
    matches!(c, '#' | '-' | '/' | '0'..='9' | 'A'..='Z')
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn resolve_century(yy: i32, pivot: u8) -> i32 {
    if yy >= i32::from(pivot) {
        1900 + yy
    } else {
        2000 + yy
    }
}

fn two_digits(bytes: &[u8], at: usize) -> i32 {
    i32::from(bytes[at] - b'0') * 10 + i32::from(bytes[at + 1] - b'0')
}

/// Parse a GS1 date value.
///
/// The date portion occupies the leading `format.digits()` characters;
/// date-bearing AIs with trailing components (e.g. an appended time) leave
/// the remainder to the length validator. A `YyMmD0` day of `00` resolves
/// to the last day of the month with `day_unspecified` set.
pub fn parse_date(
    value: &str,
    format: DateFormat,
    century_pivot: u8,
) -> Result<Gs1Date, DiagnosticCode> {
    let needed = format.digits();
    if value.len() < needed || !value.bytes().take(needed).all(|b| b.is_ascii_digit()) {
        return Err(DiagnosticCode::InvalidDate);
    }
    let bytes = value.as_bytes();

    let (year, month, day_digits, hour) = match format {
        DateFormat::YyMmDd | DateFormat::YyMmD0 => (
            resolve_century(two_digits(bytes, 0), century_pivot),
            two_digits(bytes, 2) as u32,
            two_digits(bytes, 4) as u32,
            None,
        ),
        DateFormat::YyyyMmDd => (
            two_digits(bytes, 0) * 100 + two_digits(bytes, 2),
            two_digits(bytes, 4) as u32,
            two_digits(bytes, 6) as u32,
            None,
        ),
        DateFormat::YyMmDdHh => {
            let hour = two_digits(bytes, 6);
            if !(0..=23).contains(&hour) {
                return Err(DiagnosticCode::InvalidDate);
            }
            (
                resolve_century(two_digits(bytes, 0), century_pivot),
                two_digits(bytes, 2) as u32,
                two_digits(bytes, 4) as u32,
                Some(hour as u8),
            )
        }
    };

    if !(1..=12).contains(&month) {
        return Err(DiagnosticCode::InvalidDate);
    }

    let (day, day_unspecified) = if day_digits == 0 {
        if format != DateFormat::YyMmD0 {
            return Err(DiagnosticCode::InvalidDate);
        }
        (days_in_month(year, month), true)
    } else {
        if day_digits > days_in_month(year, month) {
            return Err(DiagnosticCode::InvalidDate);
        }
        (day_digits, false)
    };

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(DiagnosticCode::InvalidDate)?;
    Ok(Gs1Date {
        date,
        day_unspecified,
        hour,
    })
}

/// Decode a value with an implied decimal point.
///
/// `decimal_position` digits from the right become the fractional part;
/// short values are zero-padded. Returns the scaled float and the formatted
/// decimal string.
#[must_use]
pub fn decode_decimal(value: &str, decimal_position: u8) -> Option<(f64, String)> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let raw: u64 = value.parse().ok()?;
    if decimal_position == 0 {
        return Some((raw as f64, value.to_string()));
    }
    let d = usize::from(decimal_position);
    let padded = if value.len() <= d {
        format!("{value:0>width$}", width = d + 1)
    } else {
        value.to_string()
    };
    let (int_part, dec_part) = padded.split_at(padded.len() - d);
    let formatted = format!("{int_part}.{dec_part}");
    let scaled = raw as f64 / 10f64.powi(i32::from(decimal_position));
    Some((scaled, formatted))
}

/// Validate a value against its AI spec, producing the typed interpretation
/// and the accumulated error list.
pub(crate) fn validate_element(spec: &AiSpec, value: &str, century_pivot: u8) -> Validation {
    let mut errors = Vec::new();
    let is_numeric_value = !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit());

    // Length
    match spec.fixed_length {
        Some(fixed) => {
            if value.len() != fixed {
                errors.push(DiagnosticCode::InvalidLength);
            }
        }
        None => {
            if value.len() < spec.min_length || value.len() > spec.max_length {
                errors.push(DiagnosticCode::InvalidLength);
            }
        }
    }

    // Character set
    let charset_ok = match spec.data_type {
        DataType::Numeric => is_numeric_value,
        DataType::Alphanumeric => value.chars().all(is_cset82),
    };
    if !charset_ok {
        errors.push(DiagnosticCode::InvalidCharacters);
    }

    // Check digit, only meaningful over an all-digit value
    if spec.check_digit && is_numeric_value {
        match check_digit_valid(value) {
            Some(true) => {}
            Some(false) | None => errors.push(DiagnosticCode::InvalidCheckDigit),
        }
    }

    // Date
    let mut date = None;
    if let Some(format) = spec.date_format {
        match parse_date(value, format, century_pivot) {
            Ok(parsed) => date = Some(parsed),
            Err(code) => errors.push(code),
        }
    }

    // Decimal
    let mut decimal = None;
    if let Some(d) = spec.decimal_position {
        if is_numeric_value {
            decimal = decode_decimal(value, d);
        }
    }

    let typed = if let Some(d) = date {
        TypedValue::Date(d)
    } else if let Some((scaled, formatted)) = decimal {
        TypedValue::Decimal {
            value: scaled,
            scaled: formatted,
        }
    } else if spec.data_type == DataType::Numeric
        && !spec.check_digit
        && !spec.is_fixed_length
        && is_numeric_value
    {
        value
            .parse::<i64>()
            .map(TypedValue::Integer)
            .unwrap_or_else(|_| TypedValue::Text(value.to_string()))
    } else {
        TypedValue::Text(value.to_string())
    };

    Validation {
        valid: errors.is_empty(),
        errors,
        typed,
    }
}
