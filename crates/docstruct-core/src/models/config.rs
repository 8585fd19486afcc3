//! Configuration for the structuring pipeline.
//!
//! Every numeric tolerance the heuristics depend on lives here with its
//! default, so callers can recalibrate against their own document corpus
//! without touching the pipeline code.

use serde::{Deserialize, Serialize};

use crate::error::{DocstructError, Result};

/// Main configuration for the structuring engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Spatial row clustering tunables.
    pub cluster: ClusterConfig,

    /// Table detection tunables for the line-tokenized path.
    pub table: TableConfig,

    /// Header resolution tunables.
    pub header: HeaderConfig,

    /// Row classification and field mapping tunables.
    pub rows: RowFilterConfig,
}

/// Spatial clustering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Maximum vertical distance for a fragment to join the current row,
    /// in the coordinate units of the OCR engine. Matches a typical line
    /// height at 150-300 DPI.
    pub row_tolerance: f32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self { row_tolerance: 18.0 }
    }
}

/// Table-likelihood scoring for documents without positional data.
///
/// The score is a weighted sum over four signals, normalized to [0, 1].
/// The weights sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Minimum score for a document to be treated as tabular.
    pub likelihood_threshold: f32,

    /// Minimum fraction of lines whose segment count sits within ±1 of the
    /// modal count.
    pub min_consistency: f32,

    /// Weight of the segment-count consistency signal.
    pub weight_consistency: f32,

    /// Weight of the pipe/tab delimiter presence signal.
    pub weight_delimiters: f32,

    /// Weight of the numeric-content signal.
    pub weight_numeric: f32,

    /// Weight of the header-looking-first-line signal.
    pub weight_header: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            likelihood_threshold: 0.4,
            min_consistency: 0.5,
            weight_consistency: 0.4,
            weight_delimiters: 0.2,
            weight_numeric: 0.25,
            weight_header: 0.15,
        }
    }
}

/// Header resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// A header cell shorter than this is considered a candidate for
    /// merging with the cell directly below it.
    pub merge_length_threshold: usize,

    /// Maximum number of physical rows a merged header may span.
    pub max_header_rows: usize,

    /// Minimum number of cells that must map to canonical columns for a
    /// row to be accepted as a header row at all.
    pub min_canonical_hits: usize,

    /// Maximum horizontal distance for a continuation fragment to merge
    /// into the header cell above it (spatial path only).
    pub column_tolerance: f32,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            merge_length_threshold: 8,
            max_header_rows: 3,
            min_canonical_hits: 2,
            column_tolerance: 40.0,
        }
    }
}

/// Row classification and field mapping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RowFilterConfig {
    /// Rows with fewer non-empty cells than this are noise.
    pub min_data_cells: usize,

    /// Minimum length of an alphabetic token for a row to count as having
    /// a plausible description.
    pub min_word_length: usize,

    /// Upper bound for a bare integer to be read as a quantity.
    pub qty_max: u32,
}

impl Default for RowFilterConfig {
    fn default() -> Self {
        Self {
            min_data_cells: 3,
            min_word_length: 4,
            qty_max: 999,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DocstructError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
