//! # gs1-decode
//!
//! Decoder for GS1 element strings: the concatenated Application Identifier
//! (AI) / value pairs emitted by GS1-128, GS1 DataMatrix, GS1 DataBar, and
//! GS1 QR barcodes.
//!
//! - **AI dictionary**: the GS1 syntax table compiled into a digit trie for
//!   longest-prefix lookup
//! - **Fast path**: a linear tokenizer for well-formed strings
//! - **Reconstruction**: a beam search that recovers field boundaries when
//!   the FNC1/GS separators have been stripped, a pervasive condition in
//!   pharmaceutical scanning pipelines
//! - **Validation**: mod-10 check digits, calendar dates, GS1 character
//!   sets, lengths, implied decimals
//!
//! ## Quick start
//!
//! ```rust
//! use gs1_decode::{decode, DecodeOptions};
//!
//! // A pharmacy DataMatrix payload with its separators stripped
//! let result = decode(
//!     "01062867400002491728043010GB2C2171490437969853",
//!     &DecodeOptions::default(),
//! );
//!
//! let gtin = result.element("01").unwrap();
//! assert_eq!(gtin.raw_value, "06286740000249");
//! assert!(gtin.valid);
//! assert_eq!(result.element("10").unwrap().raw_value, "GB2C");
//! assert!(result.confidence.value() >= 0.8);
//! ```
//!
//! ## Design
//!
//! `decode` is a pure function: no I/O, no locks, no shared mutable state.
//! The built-in dictionary is compiled once and shared by every call, and
//! results are bit-identical for identical `(raw, options, dictionary)`
//! inputs. Every input, garbage included, yields a well-formed
//! [`DecodeResult`]; problems surface as tagged diagnostics, never panics.

#![warn(missing_docs)]

mod beam;
mod dictionary;
mod element;
mod error;
mod labels;
mod normalize;
mod options;
mod result;
mod tokenize;
mod types;
mod validate;

pub use dictionary::{AiDictionary, AiSpec, DataType, DateFormat, PriorityClass};
pub use element::{DecodedElement, Gs1Date, Span, TypedValue};
pub use error::{Error, Result};
pub use labels::{field_name, format_date_ddmmyyyy};
pub use options::{default_separator_glyphs, DecodeOptions, ScoreWeights, SENTINEL};
pub use result::{AlternativeParse, DecodeResult, Diagnostic, DiagnosticCode};
pub use types::Confidence;
pub use validate::{
    check_digit_valid, compute_check_digit, decode_decimal, is_cset39, is_cset82, parse_date,
};

use tokenize::TokenizeOutcome;

/// Decode a GS1 element string using the built-in AI dictionary.
///
/// Accepts the character string a barcode reader produced: an optional
/// ISO/IEC 15424 symbology prefix, then AI/value pairs with separators in
/// any of the recognized glyph forms, or with the separators stripped, in
/// which case the beam-search reconstructor recovers the boundaries.
#[must_use]
pub fn decode(raw: &str, options: &DecodeOptions) -> DecodeResult {
    decode_with_dictionary(raw, options, AiDictionary::builtin())
}

/// Decode against a caller-supplied dictionary.
///
/// Useful for vendor tables compiled with [`AiDictionary::from_table`] or
/// trimmed dictionaries built with [`AiDictionary::from_entries`].
#[must_use]
pub fn decode_with_dictionary(
    raw: &str,
    options: &DecodeOptions,
    dictionary: &AiDictionary,
) -> DecodeResult {
    let normalized = normalize::normalize(raw, options);
    let mut result = DecodeResult {
        raw: raw.to_string(),
        normalized: normalized.text.clone(),
        symbology: normalized.symbology.map(str::to_string),
        separators_present: normalized.separators_present,
        elements: Vec::new(),
        errors: Vec::new(),
        warnings: Vec::new(),
        confidence: Confidence::NONE,
        alternatives: Vec::new(),
    };

    if normalized.text.is_empty() {
        result.errors.push(Diagnostic::new(
            DiagnosticCode::InvalidFormat,
            "empty input after normalization",
        ));
        return result;
    }

    let tokenized = tokenize::tokenize(&normalized.text, dictionary, options);
    result.warnings.extend(tokenized.warnings);
    result.errors.extend(tokenized.errors);

    match tokenized.outcome {
        TokenizeOutcome::Complete => {
            result.confidence = fast_path_confidence(&tokenized.elements, result.errors.len());
            result.elements = tokenized.elements;
        }
        TokenizeOutcome::Ambiguous { resume_at } => {
            if options.allow_ambiguous {
                result.warnings.push(
                    Diagnostic::new(
                        DiagnosticCode::MissingSeparator,
                        "variable-length field not terminated by a separator; \
                         boundaries reconstructed",
                    )
                    .at(resume_at),
                );
                let reconstruction = beam::reconstruct(
                    &normalized.text,
                    &tokenized.elements,
                    resume_at,
                    dictionary,
                    options,
                );
                result.elements = reconstruction.elements;
                result.alternatives = reconstruction.alternatives;
                result.confidence = reconstruction.confidence;
                result.errors.extend(reconstruction.errors);
            } else {
                result.elements = tokenized.elements;
                result.errors.push(
                    Diagnostic::new(
                        DiagnosticCode::AmbiguousParse,
                        "ambiguous field boundary and reconstruction is disabled",
                    )
                    .at(resume_at),
                );
                result.confidence = Confidence::saturating(0.5);
            }
        }
    }

    if options.strict_mode && result.elements.iter().any(|e| !e.valid) {
        result.errors.push(Diagnostic::new(
            DiagnosticCode::InvalidFormat,
            "strict mode: one or more elements failed validation",
        ));
        result.confidence = Confidence::NONE;
    }

    result
}

/// Confidence for a parse that never needed reconstruction: 1.0 when clean,
/// degraded by top-level errors and by the share of invalid elements.
fn fast_path_confidence(elements: &[DecodedElement], error_count: usize) -> Confidence {
    let mut confidence = if error_count == 0 {
        1.0
    } else {
        0.9 - 0.05 * error_count as f64
    };
    if !elements.is_empty() {
        let valid = elements.iter().filter(|e| e.valid).count() as f64;
        confidence *= 0.8 + 0.2 * (valid / elements.len() as f64);
    }
    Confidence::saturating(confidence)
}
