//! Row classification: header / data / footer / noise.

use crate::layout::Row;
use crate::models::RowFilterConfig;
use crate::money;

/// Classification of a reconstructed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Part of the header block.
    Header,
    /// A line item.
    Data,
    /// Totals, signatures, terms.
    Footer,
    /// Too little content to be anything.
    Noise,
}

/// Keywords marking totals/signature/terms rows below the item table.
const FOOTER_KEYWORDS: &[&str] = &[
    "total",
    "subtotal",
    "sub total",
    "grand total",
    "net amount",
    "amount in words",
    "rupees",
    "round off",
    "thank you",
    "signature",
    "authorised",
    "authorized",
    "terms",
    "conditions",
    "e&oe",
    "e & oe",
    "gst summary",
    "continued",
    "page",
];

/// Labels rows after the header block.
///
/// The data rule is a deliberate conjunction: a plausible description
/// (alphabetic token longer than the configured minimum) AND a numeric or
/// currency-like token. This is what keeps header fragments and blank
/// separators from being read as line items.
#[derive(Debug, Clone)]
pub struct RowClassifier {
    config: RowFilterConfig,
}

impl RowClassifier {
    /// Create a classifier from configuration.
    pub fn new(config: &RowFilterConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Classify one row.
    pub fn classify(&self, row: &Row) -> RowKind {
        let non_empty = row.non_empty_cells().count();
        let joined = row.joined().to_lowercase();

        if FOOTER_KEYWORDS.iter().any(|k| joined.contains(k)) {
            return RowKind::Footer;
        }

        if non_empty < self.config.min_data_cells {
            return RowKind::Noise;
        }

        if self.has_description(row) && Self::has_numeric(row) {
            RowKind::Data
        } else {
            RowKind::Noise
        }
    }

    /// Whether any token is a plausible description word.
    pub fn has_description(&self, row: &Row) -> bool {
        row.non_empty_cells().any(|cell| {
            cell.split_whitespace().any(|token| {
                token.len() >= self.config.min_word_length
                    && token.chars().all(|c| c.is_alphabetic())
            })
        })
    }

    /// Whether any cell holds a number or currency-like value.
    pub fn has_numeric(row: &Row) -> bool {
        row.non_empty_cells().any(|cell| {
            money::is_amount_token(cell)
                || cell
                    .split_whitespace()
                    .any(|t| t.chars().all(|c| c.is_ascii_digit()) && !t.is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RowClassifier {
        RowClassifier::new(&RowFilterConfig::default())
    }

    fn row(cells: &[&str]) -> Row {
        Row::from_cells(cells.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_data_row() {
        let kind = classifier().classify(&row(&["PARACIP 650MG TAB", "1*10", "22.84", "10"]));
        assert_eq!(kind, RowKind::Data);
    }

    #[test]
    fn test_footer_row() {
        assert_eq!(
            classifier().classify(&row(&["Grand Total", "", "1,234.50", "extra"])),
            RowKind::Footer
        );
        assert_eq!(
            classifier().classify(&row(&["Authorised", "Signatory", "stamp"])),
            RowKind::Footer
        );
    }

    #[test]
    fn test_short_row_is_noise() {
        assert_eq!(classifier().classify(&row(&["stray"])), RowKind::Noise);
        assert_eq!(classifier().classify(&row(&["a", "b"])), RowKind::Noise);
    }

    #[test]
    fn test_header_fragments_are_not_data() {
        // Enough cells, but no numeric token: the conjunction rejects it.
        assert_eq!(
            classifier().classify(&row(&["Product", "Batch", "Quantity"])),
            RowKind::Noise
        );
        // Numbers but no plausible description word.
        assert_eq!(
            classifier().classify(&row(&["12", "34.50", "678"])),
            RowKind::Noise
        );
    }
}
