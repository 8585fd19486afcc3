//! Output models: extracted tables, extracted field documents, metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which extraction strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParsingMethod {
    /// Rows reconstructed from fragment coordinates.
    Spatial,
    /// Rows reconstructed from delimiter heuristics on plain lines.
    LineTokenized,
    /// Fields located by anchor keywords and patterns.
    AnchorExtraction,
}

impl ParsingMethod {
    /// Stable string form used in serialized metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParsingMethod::Spatial => "spatial",
            ParsingMethod::LineTokenized => "line-tokenized",
            ParsingMethod::AnchorExtraction => "anchor-extraction",
        }
    }
}

/// Canonical invoice table columns.
///
/// This vocabulary is closed: it is the contract between the engine and
/// downstream consumers. Header labels that map to none of the canonical
/// columns become positional `Other` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InvoiceColumn {
    /// Product or service description.
    Product,
    /// Batch/lot code.
    Batch,
    /// HSN/SAC classification code (4-8 digits).
    Hsn,
    /// Quantity.
    Qty,
    /// Maximum retail price.
    Mrp,
    /// Unit rate.
    Rate,
    /// Line amount.
    Amount,
    /// State GST component.
    Sgst,
    /// Central GST component.
    Cgst,
    /// Positional placeholder for an unmapped header label.
    Other(usize),
}

impl InvoiceColumn {
    /// The canonical vocabulary in output order.
    pub const CANONICAL: [InvoiceColumn; 9] = [
        InvoiceColumn::Product,
        InvoiceColumn::Batch,
        InvoiceColumn::Hsn,
        InvoiceColumn::Qty,
        InvoiceColumn::Mrp,
        InvoiceColumn::Rate,
        InvoiceColumn::Amount,
        InvoiceColumn::Sgst,
        InvoiceColumn::Cgst,
    ];

    /// Money-valued columns in fill order for the field mapper.
    pub const MONEY_FILL_ORDER: [InvoiceColumn; 5] = [
        InvoiceColumn::Mrp,
        InvoiceColumn::Rate,
        InvoiceColumn::Amount,
        InvoiceColumn::Sgst,
        InvoiceColumn::Cgst,
    ];

    /// Stable output key for this column.
    pub fn key(&self) -> String {
        match self {
            InvoiceColumn::Product => "product".to_string(),
            InvoiceColumn::Batch => "batch".to_string(),
            InvoiceColumn::Hsn => "hsn".to_string(),
            InvoiceColumn::Qty => "qty".to_string(),
            InvoiceColumn::Mrp => "mrp".to_string(),
            InvoiceColumn::Rate => "rate".to_string(),
            InvoiceColumn::Amount => "amount".to_string(),
            InvoiceColumn::Sgst => "sgst".to_string(),
            InvoiceColumn::Cgst => "cgst".to_string(),
            InvoiceColumn::Other(i) => format!("column_{}", i),
        }
    }

    /// Whether this is a money-valued canonical column.
    pub fn is_money(&self) -> bool {
        matches!(
            self,
            InvoiceColumn::Mrp
                | InvoiceColumn::Rate
                | InvoiceColumn::Amount
                | InvoiceColumn::Sgst
                | InvoiceColumn::Cgst
        )
    }

    /// Whether this is one of the nine canonical columns.
    pub fn is_canonical(&self) -> bool {
        !matches!(self, InvoiceColumn::Other(_))
    }

    /// The empty/zero value for a missing cell of this column.
    pub fn empty_value(&self) -> Value {
        match self {
            InvoiceColumn::Qty => Value::from(0u32),
            c if c.is_money() => Value::String("0.00".to_string()),
            _ => Value::String(String::new()),
        }
    }
}

/// Metadata attached to every extraction output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Which strategy produced the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsing_method: Option<ParsingMethod>,

    /// Human-readable extraction warnings.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,

    /// Fragments dropped for missing/invalid coordinates.
    #[serde(default)]
    pub dropped_fragments: usize,

    /// Which strategy resolved each field (anchor domains only).
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub field_sources: BTreeMap<String, String>,

    /// Processing time in milliseconds.
    #[serde(default)]
    pub processing_time_ms: u64,
}

impl ExtractionMetadata {
    /// Create metadata for the given parsing method.
    pub fn for_method(method: ParsingMethod) -> Self {
        Self {
            parsing_method: Some(method),
            ..Self::default()
        }
    }
}

/// A reconstructed table of line items.
///
/// Invariant: every row object carries exactly the keys in `headers`;
/// missing cells are empty/zero values, never absent keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedTable {
    /// Canonical column keys, in column order.
    pub headers: Vec<String>,

    /// Data rows keyed by header.
    pub rows: Vec<Map<String, Value>>,

    /// Number of data rows.
    pub row_count: usize,

    /// Number of columns.
    pub column_count: usize,

    /// Document confidence score, 0-100.
    pub confidence: f32,

    /// Extraction metadata.
    pub metadata: ExtractionMetadata,
}

impl ExtractedTable {
    /// An empty zero-confidence table for degenerate input.
    pub fn empty(method: ParsingMethod) -> Self {
        Self {
            headers: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
            column_count: 0,
            confidence: 0.0,
            metadata: ExtractionMetadata::for_method(method),
        }
    }
}

/// A flat field document for non-tabular domains (medical bill, payslip).
///
/// The field map always carries the full canonical vocabulary of its
/// domain; unresolved fields hold empty values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Canonical fields keyed by name.
    pub fields: Map<String, Value>,

    /// Extracted item lines, when the domain has any.
    #[serde(default)]
    pub items: Vec<Map<String, Value>>,

    /// Document confidence score, 0-100.
    pub confidence: f32,

    /// Extraction metadata.
    pub metadata: ExtractionMetadata,
}

impl ExtractedDocument {
    /// Whether no field resolved to a value.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self.fields.values().all(|v| match v {
                Value::String(s) => s.is_empty(),
                Value::Array(a) => a.is_empty(),
                Value::Null => true,
                _ => false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_keys() {
        assert_eq!(InvoiceColumn::Product.key(), "product");
        assert_eq!(InvoiceColumn::Other(4).key(), "column_4");
        assert!(InvoiceColumn::Mrp.is_money());
        assert!(!InvoiceColumn::Qty.is_money());
        assert!(!InvoiceColumn::Other(0).is_canonical());
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(InvoiceColumn::Qty.empty_value(), Value::from(0u32));
        assert_eq!(InvoiceColumn::Rate.empty_value(), Value::String("0.00".into()));
        assert_eq!(InvoiceColumn::Product.empty_value(), Value::String(String::new()));
    }

    #[test]
    fn test_parsing_method_serde() {
        let json = serde_json::to_string(&ParsingMethod::LineTokenized).unwrap();
        assert_eq!(json, r#""line-tokenized""#);
        assert_eq!(ParsingMethod::AnchorExtraction.as_str(), "anchor-extraction");
    }

    #[test]
    fn test_empty_table() {
        let table = ExtractedTable::empty(ParsingMethod::Spatial);
        assert_eq!(table.confidence, 0.0);
        assert!(table.headers.is_empty());
        assert_eq!(table.metadata.parsing_method, Some(ParsingMethod::Spatial));
    }
}
