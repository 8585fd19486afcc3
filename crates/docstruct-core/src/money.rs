//! Amount parsing for Indian-format invoice text.
//!
//! Handles lakh/crore digit grouping ("1,23,456.78"), plain decimals and
//! currency-marked values ("Rs.22.84", "₹ 1,250.00").

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

lazy_static! {
    /// A monetary amount: optional currency marker, grouped or plain digits,
    /// mandatory decimal part of one or two digits.
    pub static ref AMOUNT: Regex = Regex::new(
        r"(?:(?:Rs\.?|INR|₹)\s*)?(\d{1,3}(?:,\d{2,3})*|\d+)\.(\d{1,2})\b"
    )
    .unwrap();

    /// Currency marker with any number after it, decimals optional.
    pub static ref CURRENCY_MARKED: Regex = Regex::new(
        r"(?:Rs\.?|INR|₹)\s*(\d{1,3}(?:,\d{2,3})*|\d+)(?:\.(\d{1,2}))?"
    )
    .unwrap();
}

/// Parse an amount string into a `Decimal`.
///
/// Strips currency markers and digit-group separators. Returns `None` when
/// nothing numeric remains.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    // Strip currency markers first so the dot in "Rs." cannot be read as
    // a decimal point.
    let lower = s.trim().to_lowercase();
    let stripped = lower.trim_start_matches(['₹', ' ']);
    let stripped = ["rs.", "rs", "inr"]
        .iter()
        .find_map(|m| stripped.strip_prefix(m))
        .unwrap_or(stripped);

    let cleaned: String = stripped
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    // Multiple dots mean the filter swallowed something that was not an
    // amount ("1.2.3" version strings and the like).
    if cleaned.matches('.').count() > 1 {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Whether a single segment reads as a monetary value: a decimal number or
/// any currency-marked number.
pub fn is_amount_token(s: &str) -> bool {
    let s = s.trim();
    AMOUNT.is_match(s) || CURRENCY_MARKED.is_match(s)
}

/// Find the first amount in `text` and parse it.
pub fn find_amount(text: &str) -> Option<Decimal> {
    let m = AMOUNT
        .find(text)
        .or_else(|| CURRENCY_MARKED.find(text))?;
    parse_amount(m.as_str())
}

/// Format an amount with two decimal places for output cells.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("22.84"), Some(Decimal::from_str("22.84").unwrap()));
        assert_eq!(
            parse_amount("1,23,456.78"),
            Some(Decimal::from_str("123456.78").unwrap())
        );
        assert_eq!(parse_amount("Rs.250.00"), Some(Decimal::from_str("250.00").unwrap()));
        assert_eq!(parse_amount("Rs.100"), Some(Decimal::from_str("100").unwrap()));
        assert_eq!(parse_amount("₹ 99"), Some(Decimal::from_str("99").unwrap()));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_is_amount_token() {
        assert!(is_amount_token("22.84"));
        assert!(is_amount_token("1,250.50"));
        assert!(is_amount_token("Rs.100"));
        assert!(!is_amount_token("10"));
        assert!(!is_amount_token("PARACIP"));
        assert!(!is_amount_token("1*10"));
    }

    #[test]
    fn test_find_amount() {
        assert_eq!(
            find_amount("Grand Total: Rs. 1,234.50 only"),
            Some(Decimal::from_str("1234.50").unwrap())
        );
        assert_eq!(find_amount("no numbers here"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::from_str("22.8").unwrap()), "22.80");
        assert_eq!(format_amount(Decimal::from_str("0").unwrap()), "0.00");
    }
}
