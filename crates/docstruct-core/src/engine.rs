//! The structuring engine: one entry point over all extraction paths.
//!
//! A pure, synchronous, CPU-bound transformation. The engine holds no
//! state across calls, performs no I/O, and never fails on bad documents:
//! degradation shows up as low confidence, warnings, and the
//! `parsing_method` tag, never as an error.

use std::time::Instant;

use tracing::{debug, info};

use crate::domains::{MedicalBillExtractor, PayslipExtractor};
use crate::layout::{BlockClusterer, LineTokenizer};
use crate::models::{
    EngineConfig, ExtractedDocument, ExtractedTable, ExtractionMetadata, OcrInput, ParsingMethod,
};
use crate::table::TableExtractor;

/// The document domains the engine can structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Tabular line-item invoice.
    Invoice,
    /// Pharmacy/hospital bill.
    MedicalBill,
    /// Salary slip.
    Payslip,
}

impl DocumentKind {
    /// Parse a kind name as used by CLI flags and job metadata.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "invoice" => Some(DocumentKind::Invoice),
            "medical" | "medical-bill" | "medical_bill" => Some(DocumentKind::MedicalBill),
            "payslip" | "salary-slip" | "salary_slip" => Some(DocumentKind::Payslip),
            _ => None,
        }
    }
}

/// Either output shape, for kind-dispatched extraction.
#[derive(Debug, Clone)]
pub enum ExtractionOutput {
    /// Invoice-like documents produce a table.
    Table(ExtractedTable),
    /// Anchor domains produce a flat field document.
    Document(ExtractedDocument),
}

impl ExtractionOutput {
    /// The confidence score of either shape.
    pub fn confidence(&self) -> f32 {
        match self {
            ExtractionOutput::Table(t) => t.confidence,
            ExtractionOutput::Document(d) => d.confidence,
        }
    }

    /// Serialize either shape to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ExtractionOutput::Table(t) => serde_json::to_value(t).unwrap_or_default(),
            ExtractionOutput::Document(d) => serde_json::to_value(d).unwrap_or_default(),
        }
    }
}

/// Structures OCR output into tables or labeled field sets.
#[derive(Debug, Clone, Default)]
pub struct StructuringEngine {
    config: EngineConfig,
}

impl StructuringEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract the structure for a document of the given kind.
    pub fn extract(&self, input: &OcrInput, kind: DocumentKind) -> ExtractionOutput {
        match kind {
            DocumentKind::Invoice => ExtractionOutput::Table(self.extract_invoice(input)),
            DocumentKind::MedicalBill => {
                ExtractionOutput::Document(self.extract_medical_bill(input))
            }
            DocumentKind::Payslip => ExtractionOutput::Document(self.extract_payslip(input)),
        }
    }

    /// Extract an invoice line-item table.
    ///
    /// Uses the spatial path when the input carries well-formed
    /// fragments, the line-tokenized path otherwise.
    pub fn extract_invoice(&self, input: &OcrInput) -> ExtractedTable {
        let start = Instant::now();

        let mut table = match input {
            OcrInput::Spatial(_) if input.well_formed_fragments().is_some() => {
                self.invoice_from_fragments(input)
            }
            _ => self.invoice_from_text(input.text()),
        };

        table.metadata.processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "invoice extraction: {} rows, confidence {:.1} ({})",
            table.row_count,
            table.confidence,
            table
                .metadata
                .parsing_method
                .map(|m| m.as_str())
                .unwrap_or("none")
        );
        table
    }

    /// Extract medical bill fields.
    pub fn extract_medical_bill(&self, input: &OcrInput) -> ExtractedDocument {
        let start = Instant::now();
        let extractor = MedicalBillExtractor::new(&self.config);
        let mut document = extractor.extract(&self.flat_text(input));
        document.metadata.processing_time_ms = start.elapsed().as_millis() as u64;
        document
    }

    /// Extract payslip fields.
    pub fn extract_payslip(&self, input: &OcrInput) -> ExtractedDocument {
        let start = Instant::now();
        let extractor = PayslipExtractor::new(&self.config);
        let mut document = extractor.extract(&self.flat_text(input));
        document.metadata.processing_time_ms = start.elapsed().as_millis() as u64;
        document
    }

    fn invoice_from_fragments(&self, input: &OcrInput) -> ExtractedTable {
        let OcrInput::Spatial(spatial) = input else {
            return ExtractedTable::empty(ParsingMethod::Spatial);
        };

        let clusterer = BlockClusterer::new(&self.config.cluster);
        let result = clusterer.cluster(&spatial.fragments);
        let rows = result.to_rows();

        debug!("spatial path: {} rows from {} fragments", rows.len(), spatial.fragments.len());

        let mut metadata = ExtractionMetadata::for_method(ParsingMethod::Spatial);
        metadata.dropped_fragments = result.dropped;
        if result.dropped > 0 {
            metadata.warnings.push(format!(
                "{} fragments dropped for invalid coordinates",
                result.dropped
            ));
        }

        TableExtractor::new(&self.config).extract(&rows, metadata)
    }

    fn invoice_from_text(&self, text: &str) -> ExtractedTable {
        let tokenizer = LineTokenizer::new(&self.config.table);
        let (rows, likelihood) = tokenizer.tokenize(text);

        let mut metadata = ExtractionMetadata::for_method(ParsingMethod::LineTokenized);
        if !likelihood.is_tabular && !rows.is_empty() {
            metadata.warnings.push(format!(
                "document does not look tabular (score {:.2}); scanning flat lines",
                likelihood.score
            ));
        }

        TableExtractor::new(&self.config).extract(&rows, metadata)
    }

    /// The best flat-text view of an input for the anchor domains:
    /// the provided full text, or rows reconstructed from fragments when
    /// the flat text is missing.
    fn flat_text(&self, input: &OcrInput) -> String {
        match input {
            OcrInput::Raw(s) => s.clone(),
            OcrInput::Spatial(spatial) => {
                if !spatial.full_text.trim().is_empty() {
                    spatial.full_text.clone()
                } else {
                    let clusterer = BlockClusterer::new(&self.config.cluster);
                    clusterer
                        .cluster(&spatial.fragments)
                        .rows
                        .iter()
                        .map(|row| {
                            row.iter()
                                .map(|f| f.text.as_str())
                                .collect::<Vec<_>>()
                                .join("  ")
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
        }
    }
}
