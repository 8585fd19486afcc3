//! Error types for the docstruct-core library.
//!
//! The structuring engine itself never fails on "bad" documents - degraded
//! input surfaces as low confidence and warnings on the output, not as
//! errors. The types here cover the boundaries only: reading OCR dumps,
//! parsing JSON, loading configuration.

use thiserror::Error;

/// Main error type for the docstruct library.
#[derive(Error, Debug)]
pub enum DocstructError {
    /// Input loading error.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to loading OCR input.
#[derive(Error, Debug)]
pub enum InputError {
    /// File extension is neither a text dump nor a spatial JSON result.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// Spatial JSON did not match the expected shape.
    #[error("malformed spatial result: {0}")]
    MalformedSpatial(String),
}

/// Result type for the docstruct library.
pub type Result<T> = std::result::Result<T, DocstructError>;
