//! Consumer-facing helper surfaces: friendly field labels and date
//! reformatting.
//!
//! Thin adapters over the decode result for callers that present fields to
//! people rather than machines. Nothing here participates in the decode
//! contract; downstream formatting may replace it wholesale.

use chrono::Datelike;

use crate::element::Gs1Date;

/// Friendly names for the AIs commonly shown to operators.
const FIELD_NAMES: &[(&str, &str)] = &[
    ("00", "SSCC"),
    ("01", "GTIN Code"),
    ("10", "Batch/Lot Number"),
    ("11", "Production Date"),
    ("13", "Packaging Date"),
    ("15", "Best Before Date"),
    ("16", "Sell By Date"),
    ("17", "Expiry Date"),
    ("20", "Variant"),
    ("21", "Serial Number"),
    ("22", "Consumer Product Variant"),
    ("235", "Third Party Controlled"),
    ("240", "Additional Product Identification"),
    ("241", "Customer Part Number"),
    ("242", "Made-to-Order Variation Number"),
    ("243", "Packaging Component Number"),
    ("250", "Secondary Serial Number"),
    ("251", "Reference to Source Entity"),
    ("253", "Global Document Type Identifier"),
    ("254", "GLN Extension Component"),
    ("255", "Global Coupon Number"),
    ("30", "Variable Count"),
    ("37", "Count of Trade Items"),
    ("90", "Internal Company Code 1"),
    ("91", "Internal Company Code 2"),
    ("92", "Internal Company Code 3"),
    ("93", "Internal Company Code 4"),
    ("94", "Internal Company Code 5"),
    ("95", "Internal Company Code 6"),
    ("96", "Internal Company Code 7"),
    ("97", "Internal Company Code 8"),
    ("98", "Internal Company Code 9"),
    ("99", "Internal Company Code 10"),
];

/// Friendly label for an AI code, e.g. `01` → `"GTIN Code"`.
///
/// Falls back to `AI(<code>)` for AIs without an established operator-facing
/// name.
#[must_use]
pub fn field_name(ai: &str) -> String {
    FIELD_NAMES
        .iter()
        .find(|(code, _)| *code == ai)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("AI({ai})"))
}

/// Format a decoded date as `dd/mm/yyyy`, or `XX/mm/yyyy` when the day is
/// unspecified.
///
/// # Example
///
/// ```rust
/// use gs1_decode::{format_date_ddmmyyyy, DateFormat, parse_date};
///
/// let date = parse_date("280430", DateFormat::YyMmDd, 51).unwrap();
/// assert_eq!(format_date_ddmmyyyy(&date), "30/04/2028");
///
/// let month_only = parse_date("290400", DateFormat::YyMmD0, 51).unwrap();
/// assert_eq!(format_date_ddmmyyyy(&month_only), "XX/04/2029");
/// ```
#[must_use]
pub fn format_date_ddmmyyyy(date: &Gs1Date) -> String {
    if date.day_unspecified {
        format!("XX/{:02}/{:04}", date.date.month(), date.date.year())
    } else {
        format!(
            "{:02}/{:02}/{:04}",
            date.date.day(),
            date.date.month(),
            date.date.year()
        )
    }
}
