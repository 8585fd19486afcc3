//! Row reconstruction from OCR output.
//!
//! Two paths produce the same [`Row`] shape: spatial clustering when
//! fragment coordinates exist, delimiter tokenization when only line text
//! is available.

mod cluster;
mod tokenize;

pub use cluster::{BlockClusterer, ClusterResult};
pub use tokenize::{Delimiter, LineTokenizer, TableLikelihood};

/// One reconstructed row: ordered cells, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Cell texts in column order.
    pub cells: Vec<String>,

    /// Representative vertical position, when the row came from the
    /// spatial path.
    pub y: Option<f32>,

    /// Per-cell horizontal positions, when the row came from the spatial
    /// path. Used to align multi-line header fragments by column.
    pub xs: Option<Vec<f32>>,
}

impl Row {
    /// Build a row from plain cells with no position.
    pub fn from_cells(cells: Vec<String>) -> Self {
        Self {
            cells,
            y: None,
            xs: None,
        }
    }

    /// Cells that contain any non-whitespace text.
    pub fn non_empty_cells(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.trim()).filter(|c| !c.is_empty())
    }

    /// All cells joined with single spaces.
    pub fn joined(&self) -> String {
        self.non_empty_cells().collect::<Vec<_>>().join(" ")
    }
}
