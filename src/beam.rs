//! Beam-search reconstructor for separator-stripped input.
//!
//! Stripped-separator pharmaceutical strings admit multiple syntactically
//! consistent parses. The reconstructor enumerates boundary hypotheses
//! under an additive scoring function and returns the best-scoring complete
//! parse plus ranked alternatives. The search is an explicit width-capped
//! beam over positions, not call-stack recursion, so tiebreaking is fair
//! across states at the same depth and the depth cap is enforceable.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dictionary::{AiDictionary, AiSpec, DataType, DateFormat};
use crate::element::{DecodedElement, Span};
use crate::options::{DecodeOptions, ScoreWeights, SENTINEL};
use crate::result::{AlternativeParse, Diagnostic, DiagnosticCode};
use crate::types::Confidence;
use crate::validate::{parse_date, validate_element};

const SENTINEL_BYTE: u8 = SENTINEL as u8;

// An expiry date hiding inside a serial/lot candidate, e.g. "...17280430 10..."
// absorbed into one (21) value. Evidence the variable field was over-extended.
static EMBEDDED_EXPIRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"17([0-9]{6})10").expect("valid regex"));

/// Reconstructor output, merged into the decode result by the caller.
#[derive(Debug, Clone)]
pub(crate) struct Reconstruction {
    pub elements: Vec<DecodedElement>,
    pub alternatives: Vec<AlternativeParse>,
    pub confidence: Confidence,
    pub errors: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
struct Candidate {
    elements: Vec<DecodedElement>,
    score: i64,
    position: usize,
    relaxed_check_digit: bool,
}

/// Run the beam search from the tokenizer's hand-off state.
///
/// `seed` holds the elements tokenized unambiguously before `resume_at`;
/// they participate in scoring exactly as searched elements do.
pub(crate) fn reconstruct(
    text: &str,
    seed: &[DecodedElement],
    resume_at: usize,
    dict: &AiDictionary,
    options: &DecodeOptions,
) -> Reconstruction {
    let weights = &options.weights;

    let mut complete = search(text, seed, resume_at, dict, options, false);
    if complete.is_empty() {
        log::debug!("no parse satisfied the hard constraints; retrying relaxed");
        complete = search(text, seed, resume_at, dict, options, true);
    }
    if complete.is_empty() {
        return Reconstruction {
            elements: Vec::new(),
            alternatives: Vec::new(),
            confidence: Confidence::NONE,
            errors: vec![Diagnostic::new(
                DiagnosticCode::InvalidFormat,
                "no structurally valid parse",
            )],
        };
    }

    // Occam bonus: the shortest complete parse(s) get the element-count nod.
    let min_count = complete
        .iter()
        .map(|c| c.elements.len())
        .min()
        .unwrap_or(0);
    for candidate in &mut complete {
        if candidate.elements.len() == min_count {
            candidate.score += weights.fewest_elements;
        }
    }

    let mut ranked = rank(dedup(complete), weights);

    // The AI 01 anchor may have entered through the tokenizer's seed with a
    // failed check digit; flag it the same way the relaxed pass does.
    let mut anchored_failure = ranked[0].relaxed_check_digit;
    for element in &mut ranked[0].elements {
        if element.ai == "01"
            && element.has_error(DiagnosticCode::InvalidCheckDigit)
            && !element.has_error(DiagnosticCode::CheckDigitFailure)
        {
            element.errors.push(DiagnosticCode::CheckDigitFailure);
            anchored_failure = true;
        }
    }
    let best = &ranked[0];

    let mut alternatives = Vec::new();
    if ranked.len() > 1 {
        let mut last_score = None;
        for candidate in ranked.iter().take(options.max_alternatives) {
            if let Some(previous) = last_score {
                if candidate.score >= previous {
                    continue;
                }
            }
            alternatives.push(AlternativeParse {
                elements: candidate.elements.clone(),
                score: candidate.score,
            });
            last_score = Some(candidate.score);
        }
    }

    let mut errors = Vec::new();
    let mut confidence = if ranked.len() == 1 {
        Confidence::CERTAIN
    } else {
        let gap = best.score - ranked[1].score;
        if gap < weights.ambiguity_gap {
            errors.push(Diagnostic::new(
                DiagnosticCode::AmbiguousParse,
                format!(
                    "{} structurally valid parses within a {} point margin",
                    ranked.len(),
                    weights.ambiguity_gap
                ),
            ));
        }
        Confidence::saturating(1.0 / (1.0 + (-(gap as f64) / weights.confidence_tau).exp()))
    };

    let day_unspecified_used = best
        .elements
        .iter()
        .any(|e| e.date().is_some_and(|d| d.day_unspecified));
    if day_unspecified_used {
        confidence = confidence.cap(0.9);
    }
    if anchored_failure {
        confidence = confidence.cap(0.4);
    }

    Reconstruction {
        elements: best.elements.clone(),
        alternatives,
        confidence,
        errors,
    }
}

fn search(
    text: &str,
    seed: &[DecodedElement],
    resume_at: usize,
    dict: &AiDictionary,
    options: &DecodeOptions,
    relax_check_digit: bool,
) -> Vec<Candidate> {
    let bytes = text.as_bytes();

    let mut seed_score = 0;
    for split in 0..seed.len() {
        seed_score += score_delta(&seed[..split], &seed[split], dict, options);
    }
    let initial = Candidate {
        elements: seed.to_vec(),
        score: seed_score,
        position: resume_at,
        relaxed_check_digit: false,
    };

    let mut beam = vec![initial];
    let mut complete = Vec::new();
    for _ in 0..options.max_depth {
        if beam.is_empty() {
            break;
        }
        let mut next = Vec::new();
        for candidate in beam {
            if candidate.position >= bytes.len() {
                complete.push(candidate);
                continue;
            }
            expand(&candidate, text, dict, options, relax_check_digit, &mut next);
        }
        // Stable sort keeps expansion order deterministic among equal scores
        next.sort_by(|a, b| b.score.cmp(&a.score));
        next.truncate(options.beam_width);
        beam = next;
    }
    complete
}

fn expand(
    candidate: &Candidate,
    text: &str,
    dict: &AiDictionary,
    options: &DecodeOptions,
    relax_check_digit: bool,
    out: &mut Vec<Candidate>,
) {
    let bytes = text.as_bytes();
    let pos = candidate.position;

    if bytes[pos] == SENTINEL_BYTE {
        let mut advanced = candidate.clone();
        advanced.position += 1;
        advanced.score += options.weights.sentinel_use;
        out.push(advanced);
        return;
    }

    // Every code that is a prefix here, not only the longest: ambiguity
    // between a 4-digit and a 2-digit code at the same offset is real.
    for (spec, ai_len) in dict.prefix_matches(text, pos) {
        let value_start = pos + ai_len;
        let available = bytes.len() - value_start;

        let lengths: Vec<usize> = match spec.fixed_length {
            Some(fixed) => {
                if fixed > available {
                    continue;
                }
                vec![fixed]
            }
            None => (spec.min_length..=spec.max_length.min(available))
                .filter(|&len| admissible_boundary(text, value_start + len, dict))
                .collect(),
        };

        for len in lengths {
            let value_end = value_start + len;
            let value_bytes = &bytes[value_start..value_end];
            if value_bytes.contains(&SENTINEL_BYTE) {
                continue;
            }
            let value = String::from_utf8_lossy(value_bytes).into_owned();

            let is_numeric = !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit());
            if spec.data_type == DataType::Numeric && !is_numeric {
                continue;
            }
            if let Some(format) = spec.date_format {
                if parse_date(&value, format, options.century_pivot).is_err() {
                    continue;
                }
            }

            let mut validation = validate_element(spec, &value, options.century_pivot);
            let mut relaxed = false;
            if validation
                .errors
                .contains(&DiagnosticCode::InvalidCheckDigit)
            {
                if relax_check_digit {
                    validation.errors.push(DiagnosticCode::CheckDigitFailure);
                    relaxed = true;
                } else {
                    continue;
                }
            }

            let element = DecodedElement {
                ai: spec.code.clone(),
                title: spec.title.clone(),
                raw_value: value,
                typed_value: validation.typed,
                valid: validation.valid,
                errors: validation.errors,
                span: Span::new(pos, value_end),
            };

            let mut extended = candidate.clone();
            extended.score += score_delta(&extended.elements, &element, dict, options);
            extended.elements.push(element);
            extended.position = value_end;
            extended.relaxed_check_digit |= relaxed;
            out.push(extended);
        }
    }
}

/// A variable-length value may end here only if a sentinel, end-of-input,
/// or another dictionary code follows. This pruning bounds the branching
/// factor by the dictionary's prefix fan-out.
fn admissible_boundary(text: &str, boundary: usize, dict: &AiDictionary) -> bool {
    boundary == text.len()
        || text.as_bytes()[boundary] == SENTINEL_BYTE
        || dict.longest_match(text, boundary).is_some()
}

fn score_delta(
    previous: &[DecodedElement],
    new: &DecodedElement,
    dict: &AiDictionary,
    options: &DecodeOptions,
) -> i64 {
    let w = &options.weights;
    let ai = new.ai.as_str();
    let value_len = new.raw_value.len();
    let mut delta = 0;

    if ai == "01" && new.valid {
        delta += w.gtin_check_digit;
    }

    if matches!(ai, "11" | "13" | "15" | "17") {
        if let Some(date) = new.date() {
            delta += if date.day_unspecified {
                w.calendar_date - w.day_unspecified_penalty
            } else {
                w.calendar_date
            };
        }
    }

    if ai == "10" {
        if (2..=10).contains(&value_len) {
            delta += w.lot_length;
        }
        if value_len > 12 {
            delta += w.long_lot;
        }
        if previous.iter().any(|e| e.ai == "10") {
            delta += w.repeated_lot;
        }
    }

    if ai == "21" {
        if (6..=20).contains(&value_len) {
            delta += w.serial_length;
        }
        if value_len < 4 {
            delta += w.short_serial;
        }
        if previous.iter().any(|e| e.ai == "21") {
            delta += w.repeated_serial;
        }
        for capture in EMBEDDED_EXPIRY.captures_iter(&new.raw_value) {
            if parse_date(&capture[1], DateFormat::YyMmDd, options.century_pivot).is_ok() {
                delta += w.embedded_date;
                break;
            }
        }
    }

    let sequence: Vec<&str> = previous
        .iter()
        .map(|e| e.ai.as_str())
        .chain(std::iter::once(ai))
        .collect();
    if sequence.len() >= 4 {
        let tail = &sequence[sequence.len() - 4..];
        if tail == ["01", "17", "10", "21"] {
            delta += w.canonical_order + w.order_closure;
        } else if tail == ["01", "21", "17", "10"] {
            delta += w.alternate_order + w.order_closure;
        }
    }
    if sequence == ["01", "17"] {
        delta += w.standard_opening;
    }

    let is_internal = dict.get(ai).is_some_and(AiSpec::is_internal);
    if is_internal {
        if !options.vendor_internal_ai_whitelist.contains(ai) {
            if let Some(prev) = previous.last() {
                if prev.ai == "10" || prev.ai == "21" {
                    if let Some(prev_spec) = dict.get(&prev.ai) {
                        let combined = prev.raw_value.len() + ai.len() + value_len;
                        if combined <= prev_spec.max_length {
                            delta += w.internal_absorption;
                        }
                    }
                }
            }
        }
        let has_lot = previous.iter().any(|e| e.ai == "10");
        let has_serial = previous.iter().any(|e| e.ai == "21");
        if has_lot && has_serial {
            delta += w.internal_beside_core_pair;
        }
    }

    delta
}

fn dedup(complete: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    for candidate in complete {
        let signature: Vec<(String, String)> = candidate
            .elements
            .iter()
            .map(|e| (e.ai.clone(), e.raw_value.clone()))
            .collect();
        if seen.insert(signature) {
            unique.push(candidate);
        }
    }
    unique
}

/// Rank complete parses: score first, then the deterministic tiebreak chain
/// for scores within the tie window.
fn rank(mut candidates: Vec<Candidate>, weights: &ScoreWeights) -> Vec<Candidate> {
    let mut ranked = Vec::with_capacity(candidates.len());
    while !candidates.is_empty() {
        let mut best = 0;
        for i in 1..candidates.len() {
            if prefer(&candidates[i], &candidates[best], weights) == std::cmp::Ordering::Less {
                best = i;
            }
        }
        ranked.push(candidates.remove(best));
    }
    ranked
}

fn prefer(a: &Candidate, b: &Candidate, weights: &ScoreWeights) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    if a.score > b.score + weights.tie_window {
        return Ordering::Less;
    }
    if b.score > a.score + weights.tie_window {
        return Ordering::Greater;
    }

    let pattern = pattern_rank(a).cmp(&pattern_rank(b));
    if pattern != Ordering::Equal {
        return pattern;
    }

    let internal = internal_count(a).cmp(&internal_count(b));
    if internal != Ordering::Equal {
        return internal;
    }

    if let (Some(a_lot), Some(b_lot)) = (lot_len_beside_serial(a), lot_len_beside_serial(b)) {
        let lot = a_lot.cmp(&b_lot);
        if lot != Ordering::Equal {
            return lot;
        }
    }

    ai_sequence(a)
        .cmp(&ai_sequence(b))
        .then(b.score.cmp(&a.score))
}

fn pattern_rank(candidate: &Candidate) -> u8 {
    let sequence: Vec<&str> = candidate.elements.iter().map(|e| e.ai.as_str()).collect();
    let canonical = sequence
        .windows(4)
        .any(|w| w == ["01", "17", "10", "21"] || w == ["01", "21", "17", "10"]);
    u8::from(!canonical)
}

fn internal_count(candidate: &Candidate) -> usize {
    candidate
        .elements
        .iter()
        .filter(|e| {
            let ai = e.ai.as_str();
            ai.len() == 2 && ai >= "90" && ai <= "99"
        })
        .count()
}

fn lot_len_beside_serial(candidate: &Candidate) -> Option<usize> {
    let has_serial = candidate.elements.iter().any(|e| e.ai == "21");
    if !has_serial {
        return None;
    }
    candidate
        .elements
        .iter()
        .find(|e| e.ai == "10")
        .map(|e| e.raw_value.len())
}

fn ai_sequence(candidate: &Candidate) -> String {
    let codes: Vec<&str> = candidate.elements.iter().map(|e| e.ai.as_str()).collect();
    codes.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Reconstruction {
        reconstruct(text, &[], 0, AiDictionary::builtin(), &DecodeOptions::default())
    }

    fn ai_values(elements: &[DecodedElement]) -> Vec<(&str, &str)> {
        elements
            .iter()
            .map(|e| (e.ai.as_str(), e.raw_value.as_str()))
            .collect()
    }

    #[test]
    fn test_canonical_pharma_string() {
        let r = run("01062867400002491728043010GB2C2171490437969853");
        assert_eq!(
            ai_values(&r.elements),
            vec![
                ("01", "06286740000249"),
                ("17", "280430"),
                ("10", "GB2C"),
                ("21", "71490437969853"),
            ]
        );
        assert!(r.confidence.value() >= 0.8);
    }

    #[test]
    fn test_serial_before_expiry() {
        let r = run("01062911037315552164SSI54CE688QZ1727021410C601");
        assert_eq!(
            ai_values(&r.elements),
            vec![
                ("01", "06291103731555"),
                ("21", "64SSI54CE688QZ"),
                ("17", "270214"),
                ("10", "C601"),
            ]
        );
    }

    #[test]
    fn test_trailing_digits_absorbed_into_serial() {
        let r = run("010622300001036517270903103056442130564439945626");
        assert_eq!(
            ai_values(&r.elements),
            vec![
                ("01", "06223000010365"),
                ("17", "270903"),
                ("10", "305644"),
                ("21", "30564439945626"),
            ]
        );
    }

    #[test]
    fn test_day_unspecified_caps_confidence() {
        let r = run("010625115902606717290400104562202106902409792902");
        assert_eq!(
            ai_values(&r.elements),
            vec![
                ("01", "06251159026067"),
                ("17", "290400"),
                ("10", "456220"),
                ("21", "06902409792902"),
            ]
        );
        let expiry = &r.elements[1];
        assert!(expiry.date().unwrap().day_unspecified);
        assert!(r.confidence.value() <= 0.9);
    }

    #[test]
    fn test_alternatives_head_mirrors_best() {
        let r = run("01062867400002491728043010GB2C2171490437969853");
        if let Some(head) = r.alternatives.first() {
            assert_eq!(head.elements, r.elements);
        }
    }

    #[test]
    fn test_alternatives_strictly_decreasing() {
        let r = run("01062867400002491728043010GB2C2171490437969853");
        for pair in r.alternatives.windows(2) {
            assert!(pair[0].score > pair[1].score);
        }
    }

    #[test]
    fn test_seeded_search_keeps_prefix() {
        let text = "01062867400002491728043010GB2C2171490437969853";
        let dict = AiDictionary::builtin();
        let options = DecodeOptions::default();
        let seeded = {
            let tokenized =
                crate::tokenize::tokenize(text, dict, &options);
            let crate::tokenize::TokenizeOutcome::Ambiguous { resume_at } = tokenized.outcome
            else {
                panic!("expected hand-off");
            };
            reconstruct(text, &tokenized.elements, resume_at, dict, &options)
        };
        let from_scratch = run(text);
        assert_eq!(ai_values(&seeded.elements), ai_values(&from_scratch.elements));
    }

    #[test]
    fn test_check_digit_fallback() {
        // GTIN with a corrupted check digit: the anchored pass finds
        // nothing, the relaxed pass emits the parse flagged and capped.
        let r = run("01062867400002401728043010GB2C");
        let gtin = r
            .elements
            .iter()
            .find(|e| e.ai == "01")
            .expect("gtin emitted");
        assert!(!gtin.valid);
        assert!(gtin.has_error(DiagnosticCode::CheckDigitFailure));
        assert!(r.confidence.value() <= 0.4);
    }

    #[test]
    fn test_internal_ai_whitelist_suppresses_absorption_penalty() {
        // Two parses exist: absorb everything into (10), or split a (97)
        // out of its tail. The whitelist lifts the absorption penalty from
        // the split parse, nothing else.
        let text = "10ABC97DEFG";
        let default_run = run(text);
        let mut options = DecodeOptions::default();
        options.vendor_internal_ai_whitelist.insert("97".to_string());
        let whitelisted = reconstruct(text, &[], 0, AiDictionary::builtin(), &options);

        let split_score = |r: &Reconstruction| {
            r.alternatives
                .iter()
                .find(|alt| alt.elements.iter().any(|e| e.ai == "97"))
                .map(|alt| alt.score)
        };
        let before = split_score(&default_run).expect("split parse ranked");
        let after = split_score(&whitelisted).expect("split parse ranked");
        assert_eq!(after - before, -options.weights.internal_absorption);
    }

    #[test]
    fn test_max_alternatives_cap() {
        let options = DecodeOptions {
            max_alternatives: 1,
            ..DecodeOptions::default()
        };
        let r = reconstruct(
            "01062867400002491728043010GB2C2171490437969853",
            &[],
            0,
            AiDictionary::builtin(),
            &options,
        );
        assert!(r.alternatives.len() <= 1);
    }

    #[test]
    fn test_unparseable_input_reports_invalid_format() {
        let r = run("XYZ!!");
        assert!(r.elements.is_empty());
        assert_eq!(r.errors[0].code, DiagnosticCode::InvalidFormat);
        assert_eq!(r.confidence.value(), 0.0);
    }

    #[test]
    fn test_determinism() {
        let a = run("010622300001036517270903103056442130564439945626");
        let b = run("010622300001036517270903103056442130564439945626");
        assert_eq!(a.elements, b.elements);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.alternatives, b.alternatives);
    }
}
