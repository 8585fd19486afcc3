//! Confidence scoring for extracted tables.
//!
//! Scores are derived from field completeness and pattern-match strength,
//! normalized to 0-100 so callers can apply acceptance thresholds without
//! knowing the scoring internals.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::models::InvoiceColumn;

/// Points per non-empty canonical field.
const POINTS_PER_FIELD: f32 = 10.0;

/// Bonus for a product description longer than this many characters.
const PRODUCT_BONUS: f32 = 5.0;
const PRODUCT_BONUS_MIN_LEN: usize = 5;

/// Bonus for a well-formed HSN code.
const HSN_BONUS: f32 = 5.0;

/// Bonus per positive monetary value in MRP/Rate/Amount.
const MONEY_BONUS: f32 = 5.0;
const MONEY_BONUS_COLUMNS: [InvoiceColumn; 3] = [
    InvoiceColumn::Mrp,
    InvoiceColumn::Rate,
    InvoiceColumn::Amount,
];

/// Scores rows and documents for field completeness.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    /// Score a single mapped row against the canonical columns of its
    /// table. Returns a value in [0, 100].
    ///
    /// The possible-points denominator counts only canonical columns the
    /// header actually declared, so placeholder-heavy tables are not
    /// penalized for fields they never promised.
    pub fn score_row(row: &Map<String, Value>, columns: &[InvoiceColumn]) -> f32 {
        let canonical: Vec<InvoiceColumn> =
            columns.iter().copied().filter(|c| c.is_canonical()).collect();
        if canonical.is_empty() {
            return 0.0;
        }

        let mut achieved = 0.0f32;
        let mut possible = 0.0f32;

        for column in &canonical {
            possible += POINTS_PER_FIELD;
            let value = row.get(&column.key());
            if value.is_some_and(|v| Self::is_filled(*column, v)) {
                achieved += POINTS_PER_FIELD;
            }
        }

        if canonical.contains(&InvoiceColumn::Product) {
            possible += PRODUCT_BONUS;
            if row
                .get("product")
                .and_then(Value::as_str)
                .is_some_and(|p| p.len() > PRODUCT_BONUS_MIN_LEN)
            {
                achieved += PRODUCT_BONUS;
            }
        }

        if canonical.contains(&InvoiceColumn::Hsn) {
            possible += HSN_BONUS;
            if row
                .get("hsn")
                .and_then(Value::as_str)
                .is_some_and(Self::is_well_formed_hsn)
            {
                achieved += HSN_BONUS;
            }
        }

        for column in MONEY_BONUS_COLUMNS {
            if !canonical.contains(&column) {
                continue;
            }
            possible += MONEY_BONUS;
            if row
                .get(&column.key())
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<Decimal>().ok())
                .is_some_and(|d| d > Decimal::ZERO)
            {
                achieved += MONEY_BONUS;
            }
        }

        (achieved / possible * 100.0).clamp(0.0, 100.0)
    }

    /// Score a document as the mean of its row scores. Zero data rows
    /// always yields zero.
    pub fn score_table(rows: &[Map<String, Value>], columns: &[InvoiceColumn]) -> f32 {
        if rows.is_empty() {
            return 0.0;
        }

        let sum: f32 = rows.iter().map(|r| Self::score_row(r, columns)).sum();
        (sum / rows.len() as f32).clamp(0.0, 100.0)
    }

    fn is_filled(column: InvoiceColumn, value: &Value) -> bool {
        match value {
            Value::String(s) => {
                if column.is_money() {
                    s.parse::<Decimal>().map(|d| d != Decimal::ZERO).unwrap_or(false)
                } else {
                    !s.trim().is_empty()
                }
            }
            Value::Number(n) => n.as_u64().is_some_and(|v| v > 0),
            _ => false,
        }
    }

    fn is_well_formed_hsn(hsn: &str) -> bool {
        (4..=8).contains(&hsn.len()) && hsn.chars().all(|c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Row;
    use crate::models::RowFilterConfig;
    use crate::table::fields::FieldMapper;

    fn mapped(cells: &[&str]) -> Map<String, Value> {
        let row = Row::from_cells(cells.iter().map(|s| s.to_string()).collect());
        FieldMapper::new(&RowFilterConfig::default()).map_row(&row, &InvoiceColumn::CANONICAL)
    }

    #[test]
    fn test_zero_rows_scores_zero() {
        assert_eq!(ConfidenceScorer::score_table(&[], &InvoiceColumn::CANONICAL), 0.0);
    }

    #[test]
    fn test_bounds() {
        let rows = vec![
            mapped(&["PARACIP 650MG TAB", "3004", "B123X", "10", "22.84", "228.40"]),
            mapped(&["DOLO 650 TAB", "5", "30.00"]),
        ];
        let score = ConfidenceScorer::score_table(&rows, &InvoiceColumn::CANONICAL);
        assert!((0.0..=100.0).contains(&score));
        assert!(score > 0.0);
    }

    #[test]
    fn test_fuller_row_scores_higher() {
        let full = mapped(&["PARACIP 650MG TAB", "3004", "B123X", "10", "22.84", "228.40"]);
        let sparse = mapped(&["DOLO TAB", "5"]);

        let full_score = ConfidenceScorer::score_row(&full, &InvoiceColumn::CANONICAL);
        let sparse_score = ConfidenceScorer::score_row(&sparse, &InvoiceColumn::CANONICAL);
        assert!(full_score > sparse_score);
    }

    #[test]
    fn test_bonuses_apply() {
        // Product(10)+5, HSN(10)+5, MRP(10)+5, Qty(10) = 55 achieved.
        // Possible: 9*10 + 5 + 5 + 15 = 115.
        let row = mapped(&["PARACIP 650MG TAB", "3004", "10", "22.84"]);
        let score = ConfidenceScorer::score_row(&row, &InvoiceColumn::CANONICAL);
        assert!((score - 55.0 / 115.0 * 100.0).abs() < 0.1);
    }

    #[test]
    fn test_denominator_follows_declared_columns() {
        let columns = [
            InvoiceColumn::Product,
            InvoiceColumn::Qty,
            InvoiceColumn::Other(2),
        ];
        let row = Row::from_cells(vec!["PARACIP TAB".into(), "10".into(), "x".into()]);
        let object =
            FieldMapper::new(&RowFilterConfig::default()).map_row(&row, &columns);

        // Possible: 2*10 + product bonus 5 = 25; achieved: all of it.
        let score = ConfidenceScorer::score_row(&object, &columns);
        assert!((score - 100.0).abs() < 0.1);
    }
}
