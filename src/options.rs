//! Decode configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The group-separator sentinel every separator glyph canonicalizes to.
pub const SENTINEL: char = '\x1d';

/// Scoring weights for the beam-search reconstructor.
///
/// The defaults are the calibrated set; exact values matter insofar as the
/// relative orderings are preserved. They are configuration, not code, so
/// recalibration against new labeled data is a field change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Valid mod-10 check digit on AI 01. The hard anchor.
    pub gtin_check_digit: i64,
    /// Calendar-valid date on AI 17/11/13/15 with a concrete day.
    pub calendar_date: i64,
    /// Subtracted from `calendar_date` when the day digits are `00`.
    pub day_unspecified_penalty: i64,
    /// Lot (AI 10) length in the typical industry range [2, 10].
    pub lot_length: i64,
    /// Serial (AI 21) length in the typical industry range [6, 20].
    pub serial_length: i64,
    /// Canonical pharma order (01)(17)(10)(21) observed.
    pub canonical_order: i64,
    /// Documented alternative order (01)(21)(17)(10) observed.
    pub alternate_order: i64,
    /// Embedded `17<date>10` substring detected inside a (21) candidate.
    pub embedded_date: i64,
    /// Internal AI (90-99) used where the preceding (21) or (10) could have
    /// absorbed the data. Negative.
    pub internal_absorption: i64,
    /// Second occurrence of AI 10 in one parse. Negative.
    pub repeated_lot: i64,
    /// Second occurrence of AI 21 in one parse. Negative.
    pub repeated_serial: i64,
    /// Per-use bonus for parses that respect observed sentinels.
    pub sentinel_use: i64,
    /// Occam bonus granted to the complete parse(s) with fewest elements.
    pub fewest_elements: i64,
    /// Lot value longer than 12 characters. Negative.
    pub long_lot: i64,
    /// Serial value shorter than 4 characters. Negative.
    pub short_serial: i64,
    /// Internal AI split out although both (10) and (21) are already
    /// present. Negative.
    pub internal_beside_core_pair: i64,
    /// Standard four-element order closing out a parse.
    pub order_closure: i64,
    /// The (01)(17) opening pair.
    pub standard_opening: i64,
    /// Scores within this distance are resolved by the tiebreak chain.
    pub tie_window: i64,
    /// Best/second gap below this threshold reports `AmbiguousParse`.
    pub ambiguity_gap: i64,
    /// Temperature of the logistic confidence mapping. Chosen so a 60-point
    /// gap maps to roughly 0.85.
    pub confidence_tau: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            gtin_check_digit: 1000,
            calendar_date: 250,
            day_unspecified_penalty: 60,
            lot_length: 20,
            serial_length: 15,
            canonical_order: 120,
            alternate_order: 120,
            embedded_date: 90,
            internal_absorption: -200,
            repeated_lot: -150,
            repeated_serial: -120,
            sentinel_use: 5,
            fewest_elements: 10,
            long_lot: -50,
            short_serial: -50,
            internal_beside_core_pair: -80,
            order_closure: 30,
            standard_opening: 15,
            tie_window: 10,
            ambiguity_gap: 40,
            confidence_tau: 34.6,
        }
    }
}

/// Options controlling a decode call.
///
/// # Example
///
/// ```rust
/// use gs1_decode::DecodeOptions;
///
/// let options = DecodeOptions {
///     strict_mode: true,
///     ..DecodeOptions::default()
/// };
/// assert_eq!(options.century_pivot, 51);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// When false, the reconstructor is disabled and structurally ambiguous
    /// inputs return the partial fast-path result with an `AmbiguousParse`
    /// error.
    pub allow_ambiguous: bool,
    /// Upper bound on the size of `alternatives`.
    pub max_alternatives: usize,
    /// When true, any element-level validation failure adds a fatal
    /// top-level error and forces confidence to 0.
    pub strict_mode: bool,
    /// Replace separator glyphs with the canonical sentinel.
    pub normalize_separators: bool,
    /// Two-digit years at or above this pivot resolve to 19YY, below to
    /// 20YY.
    pub century_pivot: u8,
    /// Glyphs treated as separator-equivalent during normalization.
    pub separator_glyphs: Vec<String>,
    /// Maximum number of active beam states at any depth.
    pub beam_width: usize,
    /// Maximum beam depth.
    pub max_depth: usize,
    /// Internal AIs (90-99) exempt from the absorption penalty.
    pub vendor_internal_ai_whitelist: BTreeSet<String>,
    /// Reconstruction scoring weights.
    pub weights: ScoreWeights,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            allow_ambiguous: true,
            max_alternatives: 5,
            strict_mode: false,
            normalize_separators: true,
            century_pivot: 51,
            separator_glyphs: default_separator_glyphs(),
            beam_width: 200,
            max_depth: 50,
            vendor_internal_ai_whitelist: BTreeSet::new(),
            weights: ScoreWeights::default(),
        }
    }
}

/// The default separator-equivalent glyph set.
///
/// Scanners differ in how they expose the invisible FNC1/GS character;
/// these are the representations seen in the field.
#[must_use]
pub fn default_separator_glyphs() -> Vec<String> {
    vec![
        SENTINEL.to_string(),
        "<GS>".to_string(),
        "~".to_string(),
        "|".to_string(),
        "^".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let o = DecodeOptions::default();
        assert!(o.allow_ambiguous);
        assert_eq!(o.max_alternatives, 5);
        assert_eq!(o.century_pivot, 51);
        assert_eq!(o.beam_width, 200);
        assert_eq!(o.max_depth, 50);
        assert!(o.vendor_internal_ai_whitelist.is_empty());
    }

    #[test]
    fn test_day_unspecified_weight_relationship() {
        let w = ScoreWeights::default();
        // A day-00 date must stay positive evidence, just weaker.
        assert!(w.calendar_date - w.day_unspecified_penalty > 0);
        assert!(w.calendar_date - w.day_unspecified_penalty < w.calendar_date);
    }
}
