//! Domain extractors for non-tabular documents.
//!
//! These bypass the table pipeline entirely. Every canonical field is
//! resolved by an ordered list of strategies evaluated in one dispatch
//! loop: anchor keyword + take-next-tokens first, regex over the full
//! normalized text second. Which strategy succeeded is recorded per field
//! for debuggability.

pub mod medical;
pub mod patterns;
pub mod payslip;

pub use medical::MedicalBillExtractor;
pub use payslip::PayslipExtractor;

use regex::Regex;

use crate::money;

/// Which strategy resolved a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Anchor keyword + nearby tokens.
    Anchor,
    /// Regex pattern over the full text.
    Pattern,
    /// Positional/structural heuristic (first line, line block).
    Derived,
}

impl FieldSource {
    /// Stable string form for metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldSource::Anchor => "anchor",
            FieldSource::Pattern => "pattern",
            FieldSource::Derived => "derived",
        }
    }
}

/// A single extraction strategy.
#[derive(Clone)]
pub enum Strategy {
    /// Find an anchor keyword, read up to `take` following tokens,
    /// stopping at anything that looks like a different field's anchor
    /// or a long digit run.
    Anchor {
        keywords: &'static [&'static str],
        take: usize,
    },

    /// Find an anchor keyword, read the first monetary value after it.
    AnchorAmount {
        keywords: &'static [&'static str],
    },

    /// Capture group 1 of a regex over the full text.
    Pattern(&'static Regex),
}

/// Try each strategy in order; first success wins.
pub fn resolve_field(
    text: &str,
    strategies: &[Strategy],
    stop_words: &[&str],
) -> Option<(String, FieldSource)> {
    for strategy in strategies {
        let resolved = match strategy {
            Strategy::Anchor { keywords, take } => {
                anchor_tokens(text, keywords, *take, stop_words)
                    .map(|v| (v, FieldSource::Anchor))
            }
            Strategy::AnchorAmount { keywords } => {
                anchor_amount(text, keywords).map(|v| (v, FieldSource::Anchor))
            }
            Strategy::Pattern(regex) => regex
                .captures(text)
                .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
                .map(|m| (m.as_str().trim().to_string(), FieldSource::Pattern)),
        };

        if let Some((value, source)) = resolved {
            if !value.is_empty() {
                return Some((value, source));
            }
        }
    }
    None
}

/// Locate an anchor keyword and take the tokens that follow it.
///
/// Tokens come from the remainder of the anchor's line, or from the next
/// non-empty line when the label sits alone. Reading stops at stop-word
/// tokens (other fields' anchors) and at digit-heavy tokens, which belong
/// to number-valued fields.
fn anchor_tokens(
    text: &str,
    keywords: &[&str],
    take: usize,
    stop_words: &[&str],
) -> Option<String> {
    let lower = text.to_ascii_lowercase();

    for keyword in keywords {
        let Some(pos) = lower.find(keyword) else { continue };
        let after = &text[pos + keyword.len()..];

        let mut lines = after.lines();
        let same_line = lines.next().unwrap_or("");
        let mut candidates = tokens_after_separator(same_line);
        if candidates.is_empty() {
            if let Some(next_line) = lines.find(|l| !l.trim().is_empty()) {
                candidates = tokens_after_separator(next_line);
            }
        }

        let mut taken: Vec<&str> = Vec::new();
        for token in candidates {
            if taken.len() >= take || is_stop_token(token, stop_words) {
                break;
            }
            taken.push(token);
        }

        if !taken.is_empty() {
            return Some(taken.join(" "));
        }
    }
    None
}

/// Locate an anchor keyword and parse the first amount after it, looking
/// at the rest of the line and one line below.
fn anchor_amount(text: &str, keywords: &[&str]) -> Option<String> {
    let lower = text.to_ascii_lowercase();

    for keyword in keywords {
        let Some(pos) = lower.find(keyword) else { continue };
        let after = &text[pos + keyword.len()..];

        let window: String = after.lines().take(2).collect::<Vec<_>>().join(" ");
        if let Some(amount) = money::find_amount(&window) {
            return Some(money::format_amount(amount));
        }

        // Whole-rupee totals are often printed without decimals.
        if let Some(token) = window
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_ascii_digit() && c != ',' && c != '.'))
            .find(|t| !t.is_empty() && t.chars().next().is_some_and(|c| c.is_ascii_digit()))
        {
            if let Some(amount) = money::parse_amount(token) {
                return Some(money::format_amount(amount));
            }
        }
    }
    None
}

fn tokens_after_separator(line: &str) -> Vec<&str> {
    line.trim_start_matches([':', '.', '-', '#', ' ', '\t'])
        .split_whitespace()
        .collect()
}

fn is_stop_token(token: &str, stop_words: &[&str]) -> bool {
    let bare: String = token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    if bare.is_empty() {
        return true;
    }

    let digits = bare.chars().filter(|c| c.is_ascii_digit()).count();
    if digits * 2 > bare.len() {
        return true;
    }

    stop_words.iter().any(|s| bare.starts_with(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: &[&str] = &["ph", "phone", "mob", "date", "dr", "address"];

    #[test]
    fn test_anchor_stops_at_other_anchor() {
        let text = "Patient Name: JOHN SMITH Ph.No. 9876543210";
        let value = anchor_tokens(text, &["patient name"], 3, STOPS).unwrap();
        assert_eq!(value, "JOHN SMITH");
    }

    #[test]
    fn test_anchor_stops_at_digit_run() {
        let text = "Patient Name: JOHN SMITH 9876543210";
        let value = anchor_tokens(text, &["patient name"], 3, STOPS).unwrap();
        assert_eq!(value, "JOHN SMITH");
    }

    #[test]
    fn test_anchor_reads_next_line() {
        let text = "Patient Name:\nJOHN SMITH\nAddress: 12 Main Rd";
        let value = anchor_tokens(text, &["patient name"], 3, STOPS).unwrap();
        assert_eq!(value, "JOHN SMITH");
    }

    #[test]
    fn test_anchor_amount() {
        let value = anchor_amount("Grand Total : Rs. 1,234.50", &["grand total"]).unwrap();
        assert_eq!(value, "1234.50");

        let value = anchor_amount("Total 450", &["total"]).unwrap();
        assert_eq!(value, "450.00");
    }

    #[test]
    fn test_strategy_order_and_source() {
        let text = "Bill No: INV-42";
        let strategies = [
            Strategy::Anchor {
                keywords: &["missing anchor"],
                take: 1,
            },
            Strategy::Pattern(&patterns::INVOICE_NUMBER),
        ];
        let (value, source) = resolve_field(text, &strategies, STOPS).unwrap();
        assert_eq!(value, "INV-42");
        assert_eq!(source, FieldSource::Pattern);
    }

    #[test]
    fn test_no_match() {
        assert!(resolve_field("nothing here", &[], STOPS).is_none());
    }
}
