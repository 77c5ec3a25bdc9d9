//! Decode results and the diagnostic taxonomy.

use serde::{Deserialize, Serialize};

use crate::element::DecodedElement;
use crate::types::Confidence;

/// Tagged diagnostic codes for everything that can go wrong in an input.
///
/// Structural codes (`MissingSeparator`, `AmbiguousParse`, `UnknownAi`,
/// `TruncatedData`) surface on the [`DecodeResult`]; value-level codes
/// attach to the individual [`DecodedElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// A variable-length field was followed by more data without a sentinel.
    MissingSeparator,
    /// More than one structurally valid parse existed.
    AmbiguousParse,
    /// No dictionary code matched at a position.
    UnknownAi,
    /// Value length outside the AI's bounds.
    InvalidLength,
    /// Input (or a value) did not conform to its expected shape.
    InvalidFormat,
    /// Mod-10 check digit mismatch.
    InvalidCheckDigit,
    /// Date digits do not form a valid calendar date.
    InvalidDate,
    /// A sentinel appeared where none was required.
    ExtraSeparator,
    /// Characters outside the AI's character set.
    InvalidCharacters,
    /// Fewer characters remained than a fixed-length AI requires.
    TruncatedData,
    /// The reconstructor could not satisfy the AI 01 check-digit anchor.
    CheckDigitFailure,
}

impl DiagnosticCode {
    /// Stable string form of the code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::MissingSeparator => "MISSING_SEPARATOR",
            DiagnosticCode::AmbiguousParse => "AMBIGUOUS_PARSE",
            DiagnosticCode::UnknownAi => "UNKNOWN_AI",
            DiagnosticCode::InvalidLength => "INVALID_LENGTH",
            DiagnosticCode::InvalidFormat => "INVALID_FORMAT",
            DiagnosticCode::InvalidCheckDigit => "INVALID_CHECK_DIGIT",
            DiagnosticCode::InvalidDate => "INVALID_DATE",
            DiagnosticCode::ExtraSeparator => "EXTRA_SEPARATOR",
            DiagnosticCode::InvalidCharacters => "INVALID_CHARACTERS",
            DiagnosticCode::TruncatedData => "TRUNCATED_DATA",
            DiagnosticCode::CheckDigitFailure => "CHECK_DIGIT_FAILURE",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tagged diagnostic about the input as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The tagged code.
    pub code: DiagnosticCode,
    /// Human-readable description.
    pub message: String,
    /// Offset into the normalized input, when positional.
    pub at: Option<usize>,
    /// The AI involved, when one is.
    pub ai: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic with no position or AI context.
    #[must_use]
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            message: message.into(),
            at: None,
            ai: None,
        }
    }

    /// Attach a position.
    #[must_use]
    pub fn at(mut self, index: usize) -> Self {
        self.at = Some(index);
        self
    }

    /// Attach an AI code.
    #[must_use]
    pub fn for_ai(mut self, ai: impl Into<String>) -> Self {
        self.ai = Some(ai.into());
        self
    }
}

/// An alternate complete parse with its reconstruction score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeParse {
    /// Elements of this parse, in positional order.
    pub elements: Vec<DecodedElement>,
    /// Cumulative reconstruction score.
    pub score: i64,
}

/// Complete result of decoding a GS1 element string.
///
/// Owns all of its strings and elements; callers may free the input buffer
/// immediately after the call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeResult {
    /// Original input string.
    pub raw: String,
    /// Canonicalized input: symbology prefix removed, separator glyphs
    /// replaced by the 0x1D sentinel.
    pub normalized: String,
    /// Symbology identifier name when a prefix was stripped,
    /// e.g. `"GS1 DataMatrix"`.
    pub symbology: Option<String>,
    /// Whether any separator glyph was observed prior to normalization.
    pub separators_present: bool,
    /// Decoded elements in positional order.
    pub elements: Vec<DecodedElement>,
    /// Structural errors about the input as a whole.
    pub errors: Vec<Diagnostic>,
    /// Non-fatal observations about the input as a whole.
    pub warnings: Vec<Diagnostic>,
    /// Confidence in the selected parse.
    pub confidence: Confidence,
    /// Ranked alternate parses. Populated only when the reconstructor ran
    /// and more than one valid parse existed; the head entry mirrors
    /// [`DecodeResult::elements`].
    pub alternatives: Vec<AlternativeParse>,
}

impl DecodeResult {
    /// The first element decoded for `ai`, if any.
    #[must_use]
    pub fn element(&self, ai: &str) -> Option<&DecodedElement> {
        self.elements.iter().find(|e| e.ai == ai)
    }

    /// Whether any top-level error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether a particular top-level code was recorded (error or warning).
    #[must_use]
    pub fn has_diagnostic(&self, code: DiagnosticCode) -> bool {
        self.errors.iter().chain(self.warnings.iter()).any(|d| d.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display_is_stable() {
        assert_eq!(DiagnosticCode::MissingSeparator.to_string(), "MISSING_SEPARATOR");
        assert_eq!(DiagnosticCode::CheckDigitFailure.to_string(), "CHECK_DIGIT_FAILURE");
    }

    #[test]
    fn test_diagnostic_builder() {
        let d = Diagnostic::new(DiagnosticCode::UnknownAi, "no code at offset").at(7).for_ai("99");
        assert_eq!(d.at, Some(7));
        assert_eq!(d.ai.as_deref(), Some("99"));
    }

    #[test]
    fn test_code_serde_matches_as_str() {
        let json = serde_json::to_string(&DiagnosticCode::InvalidCheckDigit).unwrap();
        assert_eq!(json, format!("\"{}\"", DiagnosticCode::InvalidCheckDigit.as_str()));
    }
}
