//! Witness type for confidence values bounded to [0.0, 1.0].
//!
//! # What Confidence Actually Means
//!
//! The decoder reports confidence on two very different bases, and the
//! number should be read accordingly:
//!
//! - **Fast path** (separators present, no ambiguity): confidence is a
//!   determinism statement. 1.0 means every element tokenized and validated
//!   cleanly; values below 1.0 track how many elements or top-level
//!   diagnostics degraded the parse.
//! - **Reconstructor** (separators stripped): confidence is a gap statement.
//!   It maps the score margin between the best and second-best complete
//!   parse through a logistic curve: a wide margin means the boundary
//!   hypotheses were not really in competition; a value near 0.5 means two
//!   parses were nearly tied and the alternatives list deserves a look.
//!
//! The two scales share only the guarantee that 1.0 is "no competing
//! reading existed" and 0.0 is "no valid reading existed".

use serde::{Deserialize, Serialize};
use std::fmt;

/// A confidence score guaranteed to be in the range [0.0, 1.0].
///
/// This is a "witness type" - its existence proves the value is valid.
/// Once you have a `Confidence`, you never need to check bounds again.
///
/// # Construction
///
/// - [`Confidence::new`]: Returns `None` if out of range (strict parsing)
/// - [`Confidence::saturating`]: Clamps to [0, 1] (lenient, never fails)
///
/// # Example
///
/// ```rust
/// use gs1_decode::Confidence;
///
/// let c = Confidence::new(0.85).unwrap();
/// assert!(c.value() > 0.8);
///
/// // Out-of-range values clamp under saturating construction
/// assert_eq!(Confidence::saturating(1.7).value(), 1.0);
/// assert!(Confidence::new(1.7).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Full confidence: no competing parse existed.
    pub const CERTAIN: Confidence = Confidence(1.0);

    /// Zero confidence: no valid parse existed.
    pub const NONE: Confidence = Confidence(0.0);

    /// Create a confidence, returning `None` if outside [0.0, 1.0] or NaN.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Some(Confidence(value))
        } else {
            None
        }
    }

    /// Create a confidence, clamping to [0.0, 1.0]. NaN maps to 0.0.
    #[must_use]
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            Confidence(0.0)
        } else {
            Confidence(value.clamp(0.0, 1.0))
        }
    }

    /// The inner value, guaranteed in [0.0, 1.0].
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Cap this confidence at `limit` (itself clamped to [0, 1]).
    #[must_use]
    pub fn cap(self, limit: f64) -> Self {
        Confidence::saturating(self.0.min(limit))
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::CERTAIN
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> f64 {
        c.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(Confidence::new(-0.1).is_none());
        assert!(Confidence::new(1.1).is_none());
        assert!(Confidence::new(f64::NAN).is_none());
        assert!(Confidence::new(0.0).is_some());
        assert!(Confidence::new(1.0).is_some());
    }

    #[test]
    fn test_saturating_clamps() {
        assert_eq!(Confidence::saturating(-3.0).value(), 0.0);
        assert_eq!(Confidence::saturating(2.0).value(), 1.0);
        assert_eq!(Confidence::saturating(f64::NAN).value(), 0.0);
    }

    #[test]
    fn test_cap() {
        let c = Confidence::saturating(0.95);
        assert_eq!(c.cap(0.9).value(), 0.9);
        assert_eq!(c.cap(0.99).value(), 0.95);
    }
}
