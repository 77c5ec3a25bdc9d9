//! The GS1 Application Identifier dictionary.
//!
//! A compiled, read-only catalogue of AI specifications indexed by a digit
//! trie for longest-prefix lookup. The built-in dictionary is constructed
//! once from the embedded syntax table and shared by every decode call;
//! callers may also compile their own table with [`AiDictionary::from_table`].

mod table;
mod trie;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use trie::MAX_AI_LEN;

/// Data type of an AI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Digits `0-9` only.
    Numeric,
    /// GS1 character set 82.
    Alphanumeric,
}

/// Date layout carried by date-bearing AIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFormat {
    /// Six digits, concrete day.
    YyMmDd,
    /// Six digits, day `00` permitted ("day unspecified").
    YyMmD0,
    /// Eight digits with explicit year.
    YyyyMmDd,
    /// Eight digits: date plus hour 00-23.
    YyMmDdHh,
}

impl DateFormat {
    /// Number of digits the date portion occupies.
    #[must_use]
    pub fn digits(&self) -> usize {
        match self {
            DateFormat::YyMmDd | DateFormat::YyMmD0 => 6,
            DateFormat::YyyyMmDd | DateFormat::YyMmDdHh => 8,
        }
    }
}

/// Priority classification used by the reconstructor's scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityClass {
    /// The identification/dating/serialization backbone (01, 10, 17, 21, ...).
    Core,
    /// Everything else in the public dictionary.
    General,
    /// Company-internal AIs 90-99.
    Internal,
}

/// Specification of a single Application Identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSpec {
    /// The 2-4 digit AI code.
    pub code: String,
    /// Human-readable title from the syntax table.
    pub title: String,
    /// Whether the AI belongs to the predefined fixed-length set (no
    /// trailing separator required).
    pub is_fixed_length: bool,
    /// Exact value length for fixed-length AIs.
    pub fixed_length: Option<usize>,
    /// Minimum value length.
    pub min_length: usize,
    /// Maximum value length.
    pub max_length: usize,
    /// Value data type.
    pub data_type: DataType,
    /// Whether the final data character is a mod-10 check digit.
    pub check_digit: bool,
    /// Date layout, when the value is a date.
    pub date_format: Option<DateFormat>,
    /// Implied decimal exponent for weight/measure/price AIs.
    pub decimal_position: Option<u8>,
    /// AIs that should accompany this one. Advisory only.
    pub required_with: Vec<String>,
    /// AIs that should not accompany this one. Advisory only.
    pub exclusive_with: Vec<String>,
    /// Scoring classification.
    pub priority_class: PriorityClass,
}

impl AiSpec {
    /// Whether `len` is an admissible value length for this AI.
    #[must_use]
    pub fn admits_value_len(&self, len: usize) -> bool {
        match self.fixed_length {
            Some(fixed) => len == fixed,
            None => len >= self.min_length && len <= self.max_length,
        }
    }

    /// Whether this is a company-internal AI (90-99).
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.priority_class == PriorityClass::Internal
    }
}

/// The compiled AI dictionary.
///
/// Construction happens once; afterwards the dictionary is immutable and may
/// be shared across threads without synchronization.
#[derive(Debug, Clone)]
pub struct AiDictionary {
    entries: Vec<AiSpec>,
    by_code: HashMap<String, usize>,
    trie: trie::DigitTrie,
}

static BUILTIN: Lazy<AiDictionary> = Lazy::new(|| {
    AiDictionary::from_table(table::BUILTIN_TABLE).expect("builtin syntax table is well-formed")
});

impl AiDictionary {
    /// The built-in dictionary, compiled on first use and shared thereafter.
    #[must_use]
    pub fn builtin() -> &'static AiDictionary {
        &BUILTIN
    }

    /// Compile a dictionary from a syntax table.
    ///
    /// Each line is `CODE [*] SPEC.. [attributes] # TITLE`; blank lines and
    /// lines starting with `#` are skipped. Codes ending in `n` expand to
    /// ten concrete codes carrying the implied decimal position.
    pub fn from_table(table: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for line in table.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((main, title)) = line.split_once('#') else {
                continue;
            };
            parse_table_line(main.trim(), title.trim(), &mut entries)?;
        }
        Self::from_entries(entries)
    }

    /// Build a dictionary from explicit entries, checking the structural
    /// invariants (2-4 digit codes, uniqueness, fixed-length coherence).
    pub fn from_entries(entries: Vec<AiSpec>) -> Result<Self> {
        let mut by_code = HashMap::with_capacity(entries.len());
        let mut trie = trie::DigitTrie::new();
        for (index, spec) in entries.iter().enumerate() {
            let code = spec.code.as_str();
            if code.len() < 2 || code.len() > MAX_AI_LEN || !code.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(Error::invalid_ai_code(code));
            }
            if by_code.insert(spec.code.clone(), index).is_some() {
                return Err(Error::duplicate_ai(code));
            }
            if !trie.insert(code, index as u32) {
                return Err(Error::duplicate_ai(code));
            }
        }
        Ok(AiDictionary {
            entries,
            by_code,
            trie,
        })
    }

    /// Look up a spec by exact code.
    #[must_use]
    pub fn get(&self, ai: &str) -> Option<&AiSpec> {
        self.by_code.get(ai).map(|&i| &self.entries[i])
    }

    /// The longest AI code that is a prefix of `input` at byte offset
    /// `start`, with its length.
    #[must_use]
    pub fn longest_match(&self, input: &str, start: usize) -> Option<(&AiSpec, usize)> {
        self.trie
            .longest_match(input.as_bytes(), start)
            .map(|(idx, len)| (&self.entries[idx as usize], len))
    }

    /// Every AI code that is a prefix of `input` at `start`, longest first.
    #[must_use]
    pub fn prefix_matches(&self, input: &str, start: usize) -> Vec<(&AiSpec, usize)> {
        self.trie
            .prefix_matches(input.as_bytes(), start)
            .into_iter()
            .map(|(idx, len)| (&self.entries[idx as usize], len))
            .collect()
    }

    /// Number of concrete AI codes in the dictionary.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all specs in table order.
    pub fn iter(&self) -> impl Iterator<Item = &AiSpec> {
        self.entries.iter()
    }
}

fn parse_table_line(main: &str, title: &str, entries: &mut Vec<AiSpec>) -> Result<()> {
    let tokens: Vec<&str> = main.split_whitespace().collect();
    let Some(&code_token) = tokens.first() else {
        return Ok(());
    };

    let mut rest = &tokens[1..];
    let mut fixed_flag = false;
    if let Some(&flag) = rest.first() {
        match flag {
            "*" | "*?" => {
                fixed_flag = true;
                rest = &rest[1..];
            }
            "?" => {
                rest = &rest[1..];
            }
            _ => {}
        }
    }

    // Leading tokens that parse as syntax components; the rest are
    // cross-AI attributes.
    let mut components = Vec::new();
    while let Some(&token) = rest.first() {
        match parse_component(token) {
            Some(c) => {
                components.push(c);
                rest = &rest[1..];
            }
            None => break,
        }
    }
    if components.is_empty() {
        return Err(Error::table(format!("no syntax component in: {main}")));
    }

    let mut required_with = Vec::new();
    let mut exclusive_with = Vec::new();
    for &attr in rest {
        if let Some(list) = attr.strip_prefix("req=") {
            required_with = list.split(',').map(str::to_string).collect();
        } else if let Some(list) = attr.strip_prefix("ex=") {
            exclusive_with = list.split(',').map(str::to_string).collect();
        }
    }

    let min_length: usize = components.iter().map(|c| c.min).sum();
    let max_length: usize = components.iter().map(|c| c.max).sum();
    let data_type = if components.iter().any(|c| c.alphanumeric) {
        DataType::Alphanumeric
    } else {
        DataType::Numeric
    };
    let check_digit = components
        .iter()
        .any(|c| c.linters.iter().any(|l| l == "csum"));
    let date_format = components
        .iter()
        .find_map(|c| c.linters.iter().find_map(|l| date_format_linter(l)));

    let build = |code: String, decimal_position: Option<u8>| AiSpec {
        priority_class: classify(&code),
        title: title.to_string(),
        is_fixed_length: fixed_flag,
        fixed_length: fixed_flag.then_some(max_length),
        min_length,
        max_length,
        data_type,
        check_digit,
        date_format,
        decimal_position,
        required_with: required_with.clone(),
        exclusive_with: exclusive_with.clone(),
        code,
    };

    if let Some(base) = code_token.strip_suffix('n') {
        for n in 0..10u8 {
            entries.push(build(format!("{base}{n}"), Some(n)));
        }
    } else {
        entries.push(build(code_token.to_string(), None));
    }
    Ok(())
}

struct Component {
    min: usize,
    max: usize,
    alphanumeric: bool,
    linters: Vec<String>,
}

fn parse_component(token: &str) -> Option<Component> {
    let mut parts = token.split(',');
    let type_len = parts.next()?;
    let alphanumeric = match type_len.as_bytes().first()? {
        b'N' => false,
        b'X' | b'Y' => true,
        _ => return None,
    };
    let len_spec = &type_len[1..];
    let (min, max) = if let Some(upper) = len_spec.strip_prefix("..") {
        (1, upper.parse().ok()?)
    } else {
        let exact: usize = len_spec.parse().ok()?;
        (exact, exact)
    };
    Some(Component {
        min,
        max,
        alphanumeric,
        linters: parts.map(str::to_string).collect(),
    })
}

fn date_format_linter(linter: &str) -> Option<DateFormat> {
    match linter {
        "yymmdd" => Some(DateFormat::YyMmDd),
        "yymmd0" => Some(DateFormat::YyMmD0),
        "yyyymmdd" => Some(DateFormat::YyyyMmDd),
        "yymmddhh" => Some(DateFormat::YyMmDdHh),
        _ => None,
    }
}

fn classify(code: &str) -> PriorityClass {
    const CORE: &[&str] = &[
        "00", "01", "02", "10", "11", "12", "13", "15", "16", "17", "20", "21", "22",
    ];
    if code.len() == 2 && code >= "90" && code <= "99" {
        PriorityClass::Internal
    } else if CORE.contains(&code) {
        PriorityClass::Core
    } else {
        PriorityClass::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads() {
        let dict = AiDictionary::builtin();
        assert!(dict.len() > 700);
    }

    #[test]
    fn test_gtin_spec() {
        let gtin = AiDictionary::builtin().get("01").unwrap();
        assert!(gtin.is_fixed_length);
        assert_eq!(gtin.fixed_length, Some(14));
        assert!(gtin.check_digit);
        assert_eq!(gtin.data_type, DataType::Numeric);
        assert_eq!(gtin.priority_class, PriorityClass::Core);
    }

    #[test]
    fn test_expiry_spec() {
        let expiry = AiDictionary::builtin().get("17").unwrap();
        assert_eq!(expiry.fixed_length, Some(6));
        assert_eq!(expiry.date_format, Some(DateFormat::YyMmD0));
        assert!(!expiry.check_digit);
    }

    #[test]
    fn test_lot_and_serial_are_variable() {
        let dict = AiDictionary::builtin();
        for code in ["10", "21"] {
            let spec = dict.get(code).unwrap();
            assert!(!spec.is_fixed_length);
            assert_eq!(spec.min_length, 1);
            assert_eq!(spec.max_length, 20);
            assert_eq!(spec.data_type, DataType::Alphanumeric);
        }
    }

    #[test]
    fn test_decimal_expansion() {
        let dict = AiDictionary::builtin();
        for n in 0..10u8 {
            let spec = dict.get(&format!("310{n}")).unwrap();
            assert_eq!(spec.decimal_position, Some(n));
            assert_eq!(spec.fixed_length, Some(6));
        }
        assert!(dict.get("310").is_none());
    }

    #[test]
    fn test_multi_component_lengths_sum() {
        let dict = AiDictionary::builtin();
        // 421 = N3,iso3166 X..9
        let ship_to = dict.get("421").unwrap();
        assert_eq!(ship_to.min_length, 4);
        assert_eq!(ship_to.max_length, 12);
        assert_eq!(ship_to.data_type, DataType::Alphanumeric);
        // 8006 = N14 N2 N2, fixed
        let itip = dict.get("8006").unwrap();
        assert_eq!(itip.fixed_length, Some(18));
        assert!(itip.check_digit);
    }

    #[test]
    fn test_longest_match_rule() {
        let dict = AiDictionary::builtin();
        // 371234...: 37 is a code, 371 is not
        let (spec, len) = dict.longest_match("371234", 0).unwrap();
        assert_eq!(spec.code, "37");
        assert_eq!(len, 2);
        // 4-digit wins over shorter prefixes when terminal
        let (spec, len) = dict.longest_match("3102123456", 0).unwrap();
        assert_eq!(spec.code, "3102");
        assert_eq!(len, 4);
    }

    #[test]
    fn test_internal_range() {
        let dict = AiDictionary::builtin();
        for n in 90..=99 {
            let spec = dict.get(&n.to_string()).unwrap();
            assert!(spec.is_internal());
        }
        assert_eq!(dict.get("90").unwrap().max_length, 30);
        assert_eq!(dict.get("91").unwrap().max_length, 90);
    }

    #[test]
    fn test_duplicate_rejected() {
        let spec = AiDictionary::builtin().get("01").unwrap().clone();
        let err = AiDictionary::from_entries(vec![spec.clone(), spec]).unwrap_err();
        assert!(matches!(err, Error::DuplicateAi(_)));
    }

    #[test]
    fn test_entries_roundtrip_serde() {
        let dict = AiDictionary::builtin();
        let entries: Vec<AiSpec> = dict.iter().cloned().collect();
        let json = serde_json::to_string(&entries).unwrap();
        let back: Vec<AiSpec> = serde_json::from_str(&json).unwrap();
        let rebuilt = AiDictionary::from_entries(back).unwrap();
        assert_eq!(rebuilt.len(), dict.len());
        assert_eq!(rebuilt.get("01").unwrap(), dict.get("01").unwrap());
    }
}
