//! Universal decoder invariants, checked against a battery of inputs.

use gs1_decode::{check_digit_valid, decode, AiDictionary, DecodeOptions, SENTINEL};

const INPUTS: &[&str] = &[
    "01062867400002491728043010GB2C2171490437969853",
    "01062850960028771726033110HN8X2172869453519267",
    "01062911037315552164SSI54CE688QZ1727021410C601",
    "010622300001036517270903103056442130564439945626",
    "010625115902606717290400104562202106902409792902",
    "]d2010611800002210721SERIAL123\u{1d}17270301",
    "0106286740000249\u{1d}10GB2C\u{1d}21ABCDEF",
    "0106286740000249172804303102001234",
    "21SERIAL\u{1d}10LOT",
];

#[test]
fn decode_is_deterministic() {
    for input in INPUTS {
        let a = decode(input, &DecodeOptions::default());
        let b = decode(input, &DecodeOptions::default());
        assert_eq!(a, b, "non-deterministic decode for {input}");
    }
}

#[test]
fn mod10_soundness() {
    let dict = AiDictionary::builtin();
    for input in INPUTS {
        let result = decode(input, &DecodeOptions::default());
        for element in &result.elements {
            let spec = dict.get(&element.ai).expect("emitted AI is in dictionary");
            if spec.check_digit && element.errors.is_empty() {
                assert_eq!(
                    check_digit_valid(&element.raw_value),
                    Some(true),
                    "AI {} accepted with bad check digit in {input}",
                    element.ai
                );
            }
        }
    }
}

#[test]
fn date_soundness() {
    for input in INPUTS {
        let result = decode(input, &DecodeOptions::default());
        for element in &result.elements {
            if !element.valid || element.raw_value.len() != 6 {
                continue;
            }
            if let Some(date) = element.date() {
                assert_eq!(
                    date.to_yymmdd(),
                    element.raw_value,
                    "date for AI {} does not reformat to its wire form",
                    element.ai
                );
            }
        }
    }
}

#[test]
fn length_soundness() {
    let dict = AiDictionary::builtin();
    for input in INPUTS {
        let result = decode(input, &DecodeOptions::default());
        for element in &result.elements {
            if !element.valid {
                continue;
            }
            let spec = dict.get(&element.ai).unwrap();
            assert!(
                spec.admits_value_len(element.raw_value.len()),
                "AI {} emitted with out-of-bounds length in {input}",
                element.ai
            );
        }
    }
}

#[test]
fn span_coverage() {
    for input in INPUTS {
        let result = decode(input, &DecodeOptions::default());
        let mut covered = 0usize;
        let mut previous_end = 0usize;
        for element in &result.elements {
            assert!(
                element.span.start >= previous_end,
                "overlapping or out-of-order spans in {input}"
            );
            covered += element.span.len();
            previous_end = element.span.end;
        }
        let sentinels = result.normalized.matches(SENTINEL).count();
        assert_eq!(
            covered + sentinels,
            result.normalized.len(),
            "spans plus sentinels must cover the normalized input for {input}"
        );
    }
}

#[test]
fn alternatives_ranked_and_head_mirrors_elements() {
    for input in INPUTS {
        let result = decode(input, &DecodeOptions::default());
        for pair in result.alternatives.windows(2) {
            assert!(pair[0].score > pair[1].score);
        }
        if let Some(head) = result.alternatives.first() {
            assert_eq!(head.elements, result.elements);
        }
    }
}

#[test]
fn longest_prefix_ai_selected() {
    // 37 is a code and 371 is not; the 4-digit weight codes win over their
    // 2-digit prefixes
    let result = decode("371234", &DecodeOptions::default());
    assert_eq!(result.elements[0].ai, "37");
    assert_eq!(result.elements[0].raw_value, "1234");

    let result = decode("3102001234", &DecodeOptions::default());
    assert_eq!(result.elements[0].ai, "3102");
    assert_eq!(result.elements[0].raw_value, "001234");
}

#[test]
fn weight_ai_decodes_decimal() {
    let result = decode("0106286740000249172804303102001234", &DecodeOptions::default());
    let weight = result.element("3102").unwrap();
    assert!(weight.valid);
    assert_eq!(weight.typed_value.as_decimal(), Some(12.34));
}
