//! Fast-path tokenizer: a single left-to-right pass over well-formed input.
//!
//! The pass consumes AI+value pairs as long as every variable-length field
//! is terminated by a sentinel or is the final element. When a
//! variable-length field is followed by more data without a sentinel and a
//! recognizable continuation AI exists at some admissible split point, the
//! tokenizer halts and hands its state to the reconstructor.

use crate::dictionary::AiDictionary;
use crate::element::{DecodedElement, Span};
use crate::options::{DecodeOptions, SENTINEL};
use crate::result::{Diagnostic, DiagnosticCode};
use crate::validate::validate_element;

const SENTINEL_BYTE: u8 = SENTINEL as u8;

/// How the pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenizeOutcome {
    /// The whole input tokenized without structural ambiguity.
    Complete,
    /// A variable-length field at `resume_at` admits more than one
    /// boundary; elements before it are a valid seed.
    Ambiguous {
        /// Offset of the AI whose value boundary is ambiguous.
        resume_at: usize,
    },
}

/// Tokenizer output: elements so far plus diagnostics.
#[derive(Debug, Clone)]
pub(crate) struct Tokenized {
    pub elements: Vec<DecodedElement>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub outcome: TokenizeOutcome,
}

pub(crate) fn tokenize(text: &str, dict: &AiDictionary, options: &DecodeOptions) -> Tokenized {
    let bytes = text.as_bytes();
    let mut elements: Vec<DecodedElement> = Vec::new();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        if bytes[pos] == SENTINEL_BYTE {
            // Required sentinels are consumed by the variable-length branch
            // below, so any sentinel reaching the loop head is superfluous.
            warnings.push(
                Diagnostic::new(
                    DiagnosticCode::ExtraSeparator,
                    "separator not required at this position",
                )
                .at(pos),
            );
            pos += 1;
            continue;
        }

        let Some((spec, ai_len)) = dict.longest_match(text, pos) else {
            let snippet = String::from_utf8_lossy(&bytes[pos..bytes.len().min(pos + 4)]);
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::UnknownAi,
                    format!("no dictionary code matches at offset {pos}: {snippet:?}"),
                )
                .at(pos),
            );
            // Skip to the next sentinel or end of input
            pos = match bytes[pos..].iter().position(|&b| b == SENTINEL_BYTE) {
                Some(offset) => pos + offset + 1,
                None => bytes.len(),
            };
            continue;
        };

        let ai_start = pos;
        let value_start = pos + ai_len;

        let value_end = if let Some(fixed) = spec.fixed_length {
            if value_start + fixed > bytes.len() {
                errors.push(
                    Diagnostic::new(
                        DiagnosticCode::TruncatedData,
                        format!(
                            "value for AI {} truncated: need {fixed} characters, {} remain",
                            spec.code,
                            bytes.len() - value_start
                        ),
                    )
                    .at(value_start)
                    .for_ai(&spec.code),
                );
                bytes.len()
            } else {
                value_start + fixed
            }
        } else {
            match bytes[value_start..].iter().position(|&b| b == SENTINEL_BYTE) {
                Some(offset) => value_start + offset,
                None => {
                    let remaining = bytes.len() - value_start;
                    if has_recognizable_continuation(text, value_start, remaining, spec.min_length, spec.max_length, dict)
                    {
                        log::debug!(
                            "ambiguous boundary for AI {} at offset {ai_start}; handing off",
                            spec.code
                        );
                        return Tokenized {
                            elements,
                            errors,
                            warnings,
                            outcome: TokenizeOutcome::Ambiguous { resume_at: ai_start },
                        };
                    }
                    bytes.len()
                }
            }
        };

        let value = String::from_utf8_lossy(&bytes[value_start..value_end]).into_owned();
        let validation = validate_element(spec, &value, options.century_pivot);
        elements.push(DecodedElement {
            ai: spec.code.clone(),
            title: spec.title.clone(),
            raw_value: value,
            typed_value: validation.typed,
            valid: validation.valid,
            errors: validation.errors,
            span: Span::new(ai_start, value_end),
        });

        // A variable-length field's terminating sentinel belongs to the
        // field; consume it here.
        pos = if spec.fixed_length.is_none()
            && value_end < bytes.len()
            && bytes[value_end] == SENTINEL_BYTE
        {
            value_end + 1
        } else {
            value_end
        };
    }

    Tokenized {
        elements,
        errors,
        warnings,
        outcome: TokenizeOutcome::Complete,
    }
}

/// Whether a split point exists such that the suffix begins a dictionary
/// code that itself admits a conforming value.
fn has_recognizable_continuation(
    text: &str,
    value_start: usize,
    remaining: usize,
    min_length: usize,
    max_length: usize,
    dict: &AiDictionary,
) -> bool {
    let upper = max_length.min(remaining);
    for split in min_length..upper {
        let next_at = value_start + split;
        if let Some((next_spec, next_len)) = dict.longest_match(text, next_at) {
            let after = remaining - split - next_len;
            let conforming = match next_spec.fixed_length {
                Some(fixed) => after >= fixed,
                None => after >= next_spec.min_length,
            };
            if conforming {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Tokenized {
        tokenize(text, AiDictionary::builtin(), &DecodeOptions::default())
    }

    #[test]
    fn test_fixed_sequence() {
        let t = run("010628674000024917280430");
        assert_eq!(t.outcome, TokenizeOutcome::Complete);
        assert_eq!(t.elements.len(), 2);
        assert_eq!(t.elements[0].ai, "01");
        assert_eq!(t.elements[0].raw_value, "06286740000249");
        assert_eq!(t.elements[1].ai, "17");
        assert_eq!(t.elements[1].raw_value, "280430");
        assert!(t.errors.is_empty());
    }

    #[test]
    fn test_variable_terminated_by_sentinel() {
        let t = run("10GB2C\u{1d}2112345678");
        assert_eq!(t.outcome, TokenizeOutcome::Complete);
        assert_eq!(t.elements.len(), 2);
        assert_eq!(t.elements[0].raw_value, "GB2C");
        assert_eq!(t.elements[1].ai, "21");
        assert_eq!(t.elements[1].raw_value, "12345678");
    }

    #[test]
    fn test_variable_final_element_runs_to_end() {
        let t = run("21SERIAL123");
        assert_eq!(t.outcome, TokenizeOutcome::Complete);
        assert_eq!(t.elements.len(), 1);
        assert_eq!(t.elements[0].raw_value, "SERIAL123");
    }

    #[test]
    fn test_ambiguity_detected() {
        // (10) runs into what could be a (21) without a separator
        let t = run("10GB2C2171490437969853");
        assert_eq!(t.outcome, TokenizeOutcome::Ambiguous { resume_at: 0 });
        assert!(t.elements.is_empty());
    }

    #[test]
    fn test_ambiguity_preserves_seed() {
        let t = run("01062867400002491728043010GB2C2171490437969853");
        assert_eq!(t.outcome, TokenizeOutcome::Ambiguous { resume_at: 24 });
        assert_eq!(t.elements.len(), 2);
        assert_eq!(t.elements[0].ai, "01");
        assert_eq!(t.elements[1].ai, "17");
    }

    #[test]
    fn test_unknown_ai_skips_to_sentinel() {
        let t = run("AB123\u{1d}2112345678");
        assert_eq!(t.outcome, TokenizeOutcome::Complete);
        assert_eq!(t.elements.len(), 1);
        assert_eq!(t.elements[0].ai, "21");
        assert_eq!(t.errors.len(), 1);
        assert_eq!(t.errors[0].code, DiagnosticCode::UnknownAi);
    }

    #[test]
    fn test_truncated_fixed_value() {
        let t = run("010628674");
        assert_eq!(t.outcome, TokenizeOutcome::Complete);
        assert_eq!(t.errors[0].code, DiagnosticCode::TruncatedData);
        assert_eq!(t.elements.len(), 1);
        assert!(!t.elements[0].valid);
    }

    #[test]
    fn test_extra_separator_after_fixed() {
        let t = run("0106286740000249\u{1d}2112345678");
        assert_eq!(t.outcome, TokenizeOutcome::Complete);
        assert_eq!(t.elements.len(), 2);
        assert_eq!(t.warnings.len(), 1);
        assert_eq!(t.warnings[0].code, DiagnosticCode::ExtraSeparator);
    }

    #[test]
    fn test_required_sentinel_not_warned() {
        let t = run("10GB2C\u{1d}2112345678");
        assert!(t.warnings.is_empty());
    }

    #[test]
    fn test_spans_are_ordered_and_disjoint() {
        let t = run("0106286740000249\u{1d}10GB2C\u{1d}21ABCDEF");
        let spans: Vec<_> = t.elements.iter().map(|e| e.span).collect();
        for pair in spans.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }
}
