//! Data models for the structuring engine.

pub mod config;
pub mod fragment;
pub mod output;

pub use config::{ClusterConfig, EngineConfig, HeaderConfig, RowFilterConfig, TableConfig};
pub use fragment::{OcrInput, SpatialResult, TextFragment};
pub use output::{
    ExtractedDocument, ExtractedTable, ExtractionMetadata, InvoiceColumn, ParsingMethod,
};
