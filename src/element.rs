//! Decoded element types: one element per recognized AI occurrence.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::result::DiagnosticCode;

/// Byte span into the normalized input, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if this span overlaps with another.
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }
}

/// A GS1 date as carried by date-bearing AIs (11, 13, 15, 17, ...).
///
/// `YYMMD0` values with day `00` mean "month-level granularity"; the typed
/// day is pinned to the last day of the month so dates remain ordered, and
/// `day_unspecified` records the distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gs1Date {
    /// The resolved calendar date.
    pub date: NaiveDate,
    /// True for `YYMMD0` values whose day digits were `00`.
    pub day_unspecified: bool,
    /// Hour component for `YYMMDDHH` values.
    pub hour: Option<u8>,
}

impl Gs1Date {
    /// Format back to the 6-digit `YYMMDD` wire form.
    ///
    /// A day-unspecified date renders its day as `00`, so formatting is the
    /// inverse of decoding for every valid input.
    #[must_use]
    pub fn to_yymmdd(&self) -> String {
        let day = if self.day_unspecified { 0 } else { self.date.day() };
        format!("{:02}{:02}{:02}", self.date.year() % 100, self.date.month(), day)
    }
}

/// The decoded, typed interpretation of an element value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    /// Value passed through unchanged (alphanumeric AIs).
    Text(String),
    /// Whole-number numeric value (count AIs such as 30, 37).
    Integer(i64),
    /// Value with an implied decimal point (weight/measure AIs).
    Decimal {
        /// The scaled numeric value.
        value: f64,
        /// The formatted decimal string, e.g. `"12.34"`.
        scaled: String,
    },
    /// A decoded date.
    Date(Gs1Date),
}

impl TypedValue {
    /// The decoded date, if this value is one.
    #[must_use]
    pub fn as_date(&self) -> Option<&Gs1Date> {
        match self {
            TypedValue::Date(d) => Some(d),
            _ => None,
        }
    }

    /// The scaled decimal value, if this value is one.
    #[must_use]
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            TypedValue::Decimal { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// One recognized AI occurrence in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedElement {
    /// The AI code matched, e.g. `"01"`.
    pub ai: String,
    /// Dictionary title for the AI, e.g. `"GTIN"`.
    pub title: String,
    /// The substring consumed as the value.
    pub raw_value: String,
    /// Typed interpretation of the value.
    pub typed_value: TypedValue,
    /// Conjunction of every applicable validator.
    pub valid: bool,
    /// Ordered validation failure kinds.
    pub errors: Vec<DiagnosticCode>,
    /// Offsets into the normalized input covering AI and value.
    pub span: Span,
}

impl DecodedElement {
    /// Whether this element carries a particular validation failure.
    #[must_use]
    pub fn has_error(&self, code: DiagnosticCode) -> bool {
        self.errors.contains(&code)
    }

    /// The decoded date, if this element carries one.
    #[must_use]
    pub fn date(&self) -> Option<&Gs1Date> {
        self.typed_value.as_date()
    }
}
