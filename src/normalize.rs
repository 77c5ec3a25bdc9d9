//! Input normalization: symbology prefix stripping and separator
//! canonicalization.
//!
//! Scanners differ in how they expose the invisible FNC1/GS character;
//! normalization localizes that variation so the tokenizer sees exactly one
//! form, the 0x1D sentinel.

use crate::options::{DecodeOptions, SENTINEL};

/// Recognized ISO/IEC 15424 symbology identifier prefixes. Matching is
/// exact and case-sensitive.
const SYMBOLOGY_PREFIXES: &[(&str, &str)] = &[
    ("]d2", "GS1 DataMatrix"),
    ("]C1", "GS1-128"),
    ("]e0", "GS1 DataBar"),
    ("]e1", "GS1 DataBar Limited"),
    ("]e2", "GS1 DataBar Expanded"),
    ("]Q3", "GS1 QR Code"),
];

/// A normalized input string and what normalization observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Normalized {
    /// The canonicalized text.
    pub text: String,
    /// Symbology name when a prefix was stripped.
    pub symbology: Option<&'static str>,
    /// Whether any separator glyph was present before canonicalization.
    pub separators_present: bool,
}

/// Normalize a raw scanner string.
///
/// Strips, in order: an optional symbology identifier, leading/trailing
/// ASCII whitespace, and every configured separator glyph (each replaced by
/// the canonical sentinel when `normalize_separators` is set).
pub(crate) fn normalize(raw: &str, options: &DecodeOptions) -> Normalized {
    let mut symbology = None;
    let mut text = raw;
    for &(prefix, name) in SYMBOLOGY_PREFIXES {
        if let Some(stripped) = text.strip_prefix(prefix) {
            symbology = Some(name);
            text = stripped;
            break;
        }
    }

    let text = text.trim_matches(|c: char| c.is_ascii_whitespace());

    let separators_present = options
        .separator_glyphs
        .iter()
        .any(|glyph| !glyph.is_empty() && text.contains(glyph.as_str()));

    let mut text = text.to_string();
    if options.normalize_separators {
        let sentinel = SENTINEL.to_string();
        // Multi-character glyphs first so "<GS>" never collides with a
        // later single-character pass.
        let mut glyphs: Vec<&String> = options.separator_glyphs.iter().collect();
        glyphs.sort_by_key(|g| std::cmp::Reverse(g.len()));
        for glyph in glyphs {
            if !glyph.is_empty() && glyph.as_str() != sentinel {
                text = text.replace(glyph.as_str(), &sentinel);
            }
        }
    }

    Normalized {
        text,
        symbology,
        separators_present,
    }
}
