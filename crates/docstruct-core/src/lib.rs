//! Core library for document structuring.
//!
//! This crate rebuilds structured, field-labeled documents from raw OCR
//! output - either plain recognized text or spatially-positioned text
//! fragments. It provides:
//! - Text normalization for common OCR character confusions
//! - Spatial block clustering and delimiter-based line tokenization
//! - Header resolution, row classification and canonical field mapping
//!   for invoice line-item tables
//! - Anchor-based field extraction for medical bills and payslips
//! - Confidence scoring on every output
//!
//! The engine is a pure function of its input: no I/O, no shared state,
//! and no errors for bad documents - degradation is visible through the
//! confidence score, warnings, and the parsing-method tag.

pub mod domains;
pub mod engine;
pub mod error;
pub mod layout;
pub mod models;
pub mod money;
pub mod normalize;
pub mod table;

pub use engine::{DocumentKind, ExtractionOutput, StructuringEngine};
pub use error::{DocstructError, InputError, Result};
pub use layout::{BlockClusterer, LineTokenizer, Row};
pub use models::{
    EngineConfig, ExtractedDocument, ExtractedTable, ExtractionMetadata, InvoiceColumn, OcrInput,
    ParsingMethod, SpatialResult, TextFragment,
};
pub use normalize::normalize;
pub use table::{ConfidenceScorer, FieldMapper, HeaderResolver, RowClassifier, RowKind, TableExtractor};
