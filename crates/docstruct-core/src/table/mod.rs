//! The tabular extraction pipeline.
//!
//! Rows in (from either layout path), canonical line-item table out:
//! header resolution, row classification, field mapping, confidence
//! scoring.

mod classify;
mod confidence;
mod fields;
mod header;

pub use classify::{RowClassifier, RowKind};
pub use confidence::ConfidenceScorer;
pub use fields::{FieldMapper, SlotSet};
pub use header::{HeaderResolution, HeaderResolver};

use tracing::debug;

use crate::layout::Row;
use crate::models::{EngineConfig, ExtractedTable, ExtractionMetadata, ParsingMethod};

/// Runs the header/classify/map/score stages over reconstructed rows.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    resolver: HeaderResolver,
    classifier: RowClassifier,
    mapper: FieldMapper,
}

impl TableExtractor {
    /// Create an extractor from configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            resolver: HeaderResolver::new(&config.header),
            classifier: RowClassifier::new(&config.rows),
            mapper: FieldMapper::new(&config.rows),
        }
    }

    /// Extract a table from reconstructed rows.
    ///
    /// Never fails: degenerate input produces an empty zero-confidence
    /// table, and partially-mappable rows keep their unresolved cells as
    /// empty/zero values.
    pub fn extract(&self, rows: &[Row], mut metadata: ExtractionMetadata) -> ExtractedTable {
        if rows.is_empty() {
            let method = metadata.parsing_method.unwrap_or(ParsingMethod::LineTokenized);
            let mut table = ExtractedTable::empty(method);
            table.metadata = metadata;
            return table;
        }

        let resolution = self.resolver.resolve(rows);
        let body = &rows[resolution.header_row_count..];

        let mut mapped = Vec::new();
        let mut footer_seen = 0usize;
        let mut noise_seen = 0usize;

        for row in body {
            match self.classifier.classify(row) {
                RowKind::Data => mapped.push(self.mapper.map_row(row, &resolution.columns)),
                RowKind::Footer => footer_seen += 1,
                RowKind::Noise | RowKind::Header => noise_seen += 1,
            }
        }

        debug!(
            "table extraction: {} data rows, {} footer, {} noise",
            mapped.len(),
            footer_seen,
            noise_seen
        );

        if mapped.is_empty() {
            metadata
                .warnings
                .push("no data rows recognized".to_string());
        }

        let confidence = ConfidenceScorer::score_table(&mapped, &resolution.columns);
        let headers: Vec<String> = resolution.columns.iter().map(|c| c.key()).collect();

        ExtractedTable {
            row_count: mapped.len(),
            column_count: headers.len(),
            headers,
            rows: mapped,
            confidence,
            metadata,
        }
    }
}
