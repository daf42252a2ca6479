//! Free-form numeric input rules for amount and goal fields.
//!
//! Text fields accept a leading integer and ignore whatever follows it, so
//! `"300ml"` reads as 300 and `"abc"` or `"NaN"` read as nothing.

use super::Milliliters;
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid leading integer regex"));

/// Parses the leading signed integer of `raw`.
///
/// Returns `None` for non-numeric input or values outside `i64`.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let captures = LEADING_INT_RE.captures(raw)?;
    captures.get(1)?.as_str().parse::<i64>().ok()
}

/// Narrows a signed value to a positive milliliter amount.
pub fn positive_milliliters(value: i64) -> Option<Milliliters> {
    if value <= 0 {
        return None;
    }
    Milliliters::try_from(value).ok()
}

/// Parses text input straight to a positive amount.
pub fn parse_milliliters(raw: &str) -> Option<Milliliters> {
    parse_leading_int(raw).and_then(positive_milliliters)
}
