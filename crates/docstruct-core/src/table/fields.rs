//! Field mapping: assign data-row segments to canonical columns.
//!
//! A greedy, single-pass, first-fit assignment. Segments are consumed
//! left-to-right; each goes to the first rule (in fixed priority order)
//! whose type predicate matches and whose target slot is still open.
//! This is a heuristic, not a constraint solver: it is order-dependent by
//! design, and a misread early segment can claim a slot a later segment
//! deserved. The confidence scorer makes that visible downstream.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::layout::Row;
use crate::models::{InvoiceColumn, RowFilterConfig};
use crate::money;

/// The ordered mapping rules.
const RULES: [MapRule; 5] = [
    MapRule::FreeTextProduct,
    MapRule::HsnCode,
    MapRule::AlphanumericBatch,
    MapRule::DecimalMoney,
    MapRule::SmallIntQty,
];

/// One `{predicate, slot}` mapping rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapRule {
    /// Long free text with letters, first match only.
    FreeTextProduct,
    /// 4-8 digit classification code.
    HsnCode,
    /// Mixed letter/digit code.
    AlphanumericBatch,
    /// Decimal or currency-marked number.
    DecimalMoney,
    /// Bare small integer.
    SmallIntQty,
}

impl MapRule {
    fn matches(&self, segment: &str, config: &RowFilterConfig) -> bool {
        match self {
            MapRule::FreeTextProduct => is_free_text(segment),
            MapRule::HsnCode => is_hsn_code(segment),
            MapRule::AlphanumericBatch => is_batch_code(segment),
            MapRule::DecimalMoney => money::is_amount_token(segment),
            MapRule::SmallIntQty => segment
                .parse::<u32>()
                .is_ok_and(|n| n >= 1 && n <= config.qty_max),
        }
    }

    fn target(&self, slots: &SlotSet) -> Option<InvoiceColumn> {
        let single = |column: InvoiceColumn| slots.is_open(column).then_some(column);
        match self {
            MapRule::FreeTextProduct => single(InvoiceColumn::Product),
            MapRule::HsnCode => single(InvoiceColumn::Hsn),
            MapRule::AlphanumericBatch => single(InvoiceColumn::Batch),
            // Money values fill MRP, then Rate, then Amount, then SGST,
            // then CGST, one per occurrence.
            MapRule::DecimalMoney => InvoiceColumn::MONEY_FILL_ORDER
                .into_iter()
                .find(|c| slots.is_open(*c)),
            MapRule::SmallIntQty => single(InvoiceColumn::Qty),
        }
    }
}

/// Explicit per-row fill state: which canonical slots are open, which are
/// taken. First match wins; a filled slot is never reassigned.
#[derive(Debug)]
pub struct SlotSet {
    slots: BTreeMap<InvoiceColumn, Option<String>>,
}

impl SlotSet {
    /// Open slots for the canonical columns present in `columns`.
    pub fn for_columns(columns: &[InvoiceColumn]) -> Self {
        let slots = columns
            .iter()
            .filter(|c| c.is_canonical())
            .map(|c| (*c, None))
            .collect();
        Self { slots }
    }

    fn is_open(&self, column: InvoiceColumn) -> bool {
        matches!(self.slots.get(&column), Some(None))
    }

    fn fill(&mut self, column: InvoiceColumn, value: String) {
        if let Some(slot) = self.slots.get_mut(&column) {
            *slot = Some(value);
        }
    }

    fn get(&self, column: InvoiceColumn) -> Option<&str> {
        self.slots.get(&column).and_then(|v| v.as_deref())
    }
}

/// Long free text with letters: contains an alphabetic run of three or
/// more characters, is longer than three characters overall, and is not
/// purely numeric. The run requirement keeps codes like "B123X" out.
fn is_free_text(segment: &str) -> bool {
    segment.len() > 3
        && !segment
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_punctuation())
        && longest_alpha_run(segment) >= 3
}

/// A 4-8 digit classification code.
fn is_hsn_code(segment: &str) -> bool {
    (4..=8).contains(&segment.len()) && segment.chars().all(|c| c.is_ascii_digit())
}

/// An alphanumeric code mixing letters and digits, with no spaces.
fn is_batch_code(segment: &str) -> bool {
    (2..=15).contains(&segment.len())
        && !segment.contains(' ')
        && segment.chars().any(|c| c.is_ascii_digit())
        && segment.chars().any(|c| c.is_alphabetic())
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '/')
}

fn longest_alpha_run(segment: &str) -> usize {
    let mut best = 0usize;
    let mut run = 0usize;
    for c in segment.chars() {
        if c.is_alphabetic() {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

/// Maps one data row's segments onto the resolved column set.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    config: RowFilterConfig,
}

impl FieldMapper {
    /// Create a mapper from configuration.
    pub fn new(config: &RowFilterConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Map a data row to an output object carrying exactly the keys of
    /// `columns`. Unmatched segments are dropped, except that a
    /// positional placeholder column recovers the unconsumed segment at
    /// its own index.
    pub fn map_row(&self, row: &Row, columns: &[InvoiceColumn]) -> Map<String, Value> {
        let mut slots = SlotSet::for_columns(columns);
        let mut consumed = vec![false; row.cells.len()];

        for (i, cell) in row.cells.iter().enumerate() {
            let segment = cell.trim();
            if segment.is_empty() {
                continue;
            }

            for rule in RULES {
                if !rule.matches(segment, &self.config) {
                    continue;
                }
                if let Some(column) = rule.target(&slots) {
                    slots.fill(column, segment.to_string());
                    consumed[i] = true;
                    break;
                }
            }
        }

        let mut object = Map::new();
        for column in columns {
            let value = match column {
                InvoiceColumn::Other(i) => row
                    .cells
                    .get(*i)
                    .filter(|_| !consumed.get(*i).copied().unwrap_or(true))
                    .map(|c| Value::String(c.trim().to_string()))
                    .unwrap_or_else(|| column.empty_value()),
                canonical => match slots.get(*canonical) {
                    Some(raw) => Self::cell_value(*canonical, raw),
                    None => canonical.empty_value(),
                },
            };
            object.insert(column.key(), value);
        }

        object
    }

    /// Render a matched segment as the output value for its column.
    fn cell_value(column: InvoiceColumn, raw: &str) -> Value {
        match column {
            InvoiceColumn::Qty => raw
                .parse::<u32>()
                .map(Value::from)
                .unwrap_or_else(|_| column.empty_value()),
            c if c.is_money() => money::parse_amount(raw)
                .map(|d| Value::String(money::format_amount(d)))
                .unwrap_or_else(|| column.empty_value()),
            _ => Value::String(raw.to_string()),
        }
    }
}
