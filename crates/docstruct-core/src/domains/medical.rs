//! Medical bill field extraction.
//!
//! Pharmacy and hospital bills rarely survive OCR as clean tables, so
//! this extractor works from anchors and patterns over the normalized
//! text, plus a line scan for medicine items.

use serde_json::{Map, Value};
use tracing::debug;

use crate::layout::{LineTokenizer, Row};
use crate::models::{EngineConfig, ExtractedDocument, ExtractionMetadata, InvoiceColumn, ParsingMethod};
use crate::money;
use crate::normalize::{fix_confusions, normalize};
use crate::table::FieldMapper;

use super::patterns;
use super::{resolve_field, FieldSource, Strategy};

/// Scalar canonical fields of a medical bill, in output order.
const SCALAR_FIELDS: &[&str] = &[
    "invoice_no",
    "date",
    "shop_name",
    "shop_address",
    "patient_name",
    "doctor_name",
    "total_amount",
    "discount",
    "net_amount",
];

/// Tokens that end an anchor read because they belong to another field.
const STOP_WORDS: &[&str] = &[
    "bill", "invoice", "receipt", "date", "dt", "patient", "dr", "doctor", "ph", "phone", "mob",
    "mobile", "address", "gstin", "total", "amount", "discount", "net", "qty", "mrp", "rs",
];

/// Columns used for medicine item lines.
const ITEM_COLUMNS: [InvoiceColumn; 5] = [
    InvoiceColumn::Product,
    InvoiceColumn::Batch,
    InvoiceColumn::Qty,
    InvoiceColumn::Mrp,
    InvoiceColumn::Amount,
];

/// Lines containing this many anchor keywords are labels, not items.
const KEYWORD_HEAVY_THRESHOLD: usize = 2;

/// Extracts canonical medical-bill fields from OCR text.
#[derive(Debug, Clone)]
pub struct MedicalBillExtractor {
    tokenizer: LineTokenizer,
    mapper: FieldMapper,
    min_word_length: usize,
}

impl MedicalBillExtractor {
    /// Create an extractor from configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tokenizer: LineTokenizer::new(&config.table),
            mapper: FieldMapper::new(&config.rows),
            min_word_length: config.rows.min_word_length,
        }
    }

    /// Extract all canonical fields. Never fails; unresolved fields stay
    /// empty and lower the confidence score.
    pub fn extract(&self, raw: &str) -> ExtractedDocument {
        // Anchors and labels read the fully-normalized text; the item
        // scan keeps original spacing so column gaps stay splittable.
        let spaced = fix_confusions(raw);
        let text = normalize(raw);
        let mut metadata = ExtractionMetadata::for_method(ParsingMethod::AnchorExtraction);
        let mut fields = Map::new();

        for field in SCALAR_FIELDS {
            fields.insert((*field).to_string(), Value::String(String::new()));
        }

        for (field, value, source) in [
            self.invoice_no(&text),
            self.date(&text),
            self.shop_name(&text),
            self.shop_address(&text),
            self.patient_name(&text),
            self.doctor_name(&text),
            self.total_amount(&text),
            self.discount(&text),
            self.net_amount(&text),
        ]
        .into_iter()
        .flatten()
        {
            fields.insert(field.to_string(), Value::String(value));
            metadata
                .field_sources
                .insert(field.to_string(), source.as_str().to_string());
        }

        let phones = self.phones(&text);
        if !phones.is_empty() {
            metadata
                .field_sources
                .insert("phones".to_string(), FieldSource::Pattern.as_str().to_string());
        }
        fields.insert(
            "phones".to_string(),
            Value::Array(phones.into_iter().map(Value::String).collect()),
        );

        let items = self.items(&spaced);
        debug!("medical bill: {} item lines", items.len());

        let confidence = Self::confidence(&fields, &items);
        if confidence == 0.0 {
            metadata
                .warnings
                .push("no recognizable fields; document flagged invalid".to_string());
        }

        ExtractedDocument {
            fields,
            items,
            confidence,
            metadata,
        }
    }

    fn invoice_no(&self, text: &str) -> Option<(&'static str, String, FieldSource)> {
        let strategies = [
            Strategy::Anchor {
                keywords: &["bill no", "invoice no", "bill number", "invoice number", "receipt no"],
                take: 1,
            },
            Strategy::Pattern(&patterns::INVOICE_NUMBER),
        ];
        resolve_field(text, &strategies, STOP_WORDS).map(|(v, s)| ("invoice_no", v, s))
    }

    fn date(&self, text: &str) -> Option<(&'static str, String, FieldSource)> {
        let strategies = [
            Strategy::Pattern(&patterns::LABELED_DATE),
            Strategy::Pattern(&patterns::DATE_DMY),
            Strategy::Pattern(&patterns::DATE_YMD),
        ];
        resolve_field(text, &strategies, STOP_WORDS)
            .map(|(v, s)| ("date", Self::to_iso_date(&v).unwrap_or(v), s))
    }

    fn patient_name(&self, text: &str) -> Option<(&'static str, String, FieldSource)> {
        let strategies = [Strategy::Anchor {
            keywords: &["patient name", "patient's name", "name of patient", "patient"],
            take: 3,
        }];
        resolve_field(text, &strategies, STOP_WORDS).map(|(v, s)| ("patient_name", v, s))
    }

    fn doctor_name(&self, text: &str) -> Option<(&'static str, String, FieldSource)> {
        let strategies = [Strategy::Anchor {
            keywords: &["prescribed by", "doctor", "dr."],
            take: 3,
        }];
        resolve_field(text, &strategies, STOP_WORDS).map(|(v, s)| ("doctor_name", v, s))
    }

    fn total_amount(&self, text: &str) -> Option<(&'static str, String, FieldSource)> {
        let strategies = [
            Strategy::AnchorAmount {
                keywords: &["grand total", "total amount", "amount payable", "total"],
            },
            Strategy::Pattern(&patterns::TOTAL_AMOUNT),
        ];
        resolve_field(text, &strategies, STOP_WORDS).map(|(v, s)| {
            let value = money::parse_amount(&v).map(money::format_amount).unwrap_or(v);
            ("total_amount", value, s)
        })
    }

    fn discount(&self, text: &str) -> Option<(&'static str, String, FieldSource)> {
        let strategies = [Strategy::AnchorAmount {
            keywords: &["discount", "less"],
        }];
        resolve_field(text, &strategies, STOP_WORDS).map(|(v, s)| ("discount", v, s))
    }

    fn net_amount(&self, text: &str) -> Option<(&'static str, String, FieldSource)> {
        let strategies = [Strategy::AnchorAmount {
            keywords: &["net amount", "net payable", "net amt"],
        }];
        resolve_field(text, &strategies, STOP_WORDS).map(|(v, s)| ("net_amount", v, s))
    }

    /// The shop name is almost always the first printable line.
    fn shop_name(&self, text: &str) -> Option<(&'static str, String, FieldSource)> {
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !Self::is_label_line(line) && Self::has_letters(line))
            .map(|line| ("shop_name", line.to_string(), FieldSource::Derived))
    }

    /// Address lines sit directly under the shop name, before the first
    /// labeled line.
    fn shop_address(&self, text: &str) -> Option<(&'static str, String, FieldSource)> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let address: Vec<&str> = lines
            .iter()
            .skip(1)
            .take_while(|l| {
                !Self::is_label_line(l)
                    && !patterns::PHONE.is_match(l)
                    && !patterns::GSTIN.is_match(l)
            })
            .take(2)
            .copied()
            .collect();

        if address.is_empty() {
            None
        } else {
            Some(("shop_address", address.join(", "), FieldSource::Derived))
        }
    }

    /// All distinct phone numbers in the document.
    fn phones(&self, text: &str) -> Vec<String> {
        let mut phones: Vec<String> = Vec::new();
        for caps in patterns::PHONE.captures_iter(text) {
            let number = caps[1].to_string();
            if !phones.contains(&number) {
                phones.push(number);
            }
        }
        phones
    }

    /// Scan physical lines for medicine items: skip label-heavy and
    /// footer lines, keep lines pairing a plausible name with a priced
    /// value. Mirrors the data-row conjunction of the table classifier,
    /// tightened to amounts so address lines with bare house numbers
    /// cannot pass.
    fn items(&self, spaced: &str) -> Vec<Map<String, Value>> {
        let mut items = Vec::new();

        for line in spaced.lines() {
            let line = line.trim();
            if line.is_empty() || Self::is_label_line(line) {
                continue;
            }

            let (cells, _) = self.tokenizer.split_line(line);
            let row = Row::from_cells(cells.iter().map(|c| normalize(c)).collect());

            let has_name = row.non_empty_cells().any(|cell| {
                cell.split_whitespace().any(|t| {
                    t.len() >= self.min_word_length && t.chars().all(|c| c.is_alphabetic())
                })
            });
            let has_price = row.non_empty_cells().any(money::is_amount_token);

            if has_name && has_price {
                items.push(self.mapper.map_row(&row, &ITEM_COLUMNS));
            }
        }

        items
    }

    fn confidence(fields: &Map<String, Value>, items: &[Map<String, Value>]) -> f32 {
        let mut filled = 0usize;
        let mut possible = 0usize;

        for (_, value) in fields {
            possible += 1;
            match value {
                Value::String(s) if !s.is_empty() => filled += 1,
                Value::Array(a) if !a.is_empty() => filled += 1,
                _ => {}
            }
        }

        possible += 1;
        if !items.is_empty() {
            filled += 1;
        }

        (filled as f32 / possible as f32 * 100.0).clamp(0.0, 100.0)
    }

    /// A line dominated by field labels rather than content.
    fn is_label_line(line: &str) -> bool {
        Self::keyword_count(line) >= 1 && line.contains(':')
            || Self::keyword_count(line) >= KEYWORD_HEAVY_THRESHOLD
    }

    fn keyword_count(line: &str) -> usize {
        let lower = line.to_ascii_lowercase();
        STOP_WORDS
            .iter()
            .filter(|k| {
                lower
                    .split(|c: char| !c.is_ascii_alphanumeric())
                    .any(|token| token == **k)
            })
            .count()
    }

    fn has_letters(line: &str) -> bool {
        line.chars().any(|c| c.is_alphabetic())
    }

    /// Render a matched date as ISO (yyyy-mm-dd).
    fn to_iso_date(raw: &str) -> Option<String> {
        use chrono::NaiveDate;

        const FORMATS: &[&str] = &[
            "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y", "%d-%m-%y", "%d.%m.%y", "%Y-%m-%d",
            "%Y/%m/%d",
        ];

        FORMATS
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
            .map(|d| d.format("%Y-%m-%d").to_string())
    }
}
