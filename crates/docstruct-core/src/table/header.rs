//! Header detection, multi-line header merging, and canonical mapping.

use tracing::debug;

use crate::layout::Row;
use crate::models::{HeaderConfig, InvoiceColumn};
use crate::money;

/// Synonym table mapping header label keywords to canonical columns.
///
/// Checked in declaration order; the first column whose keyword is
/// contained in the lowercased label wins. More specific labels come
/// first so "Unit Price" resolves to `Rate` before the bare "price"
/// synonym of `Mrp` can claim it.
const SYNONYMS: &[(InvoiceColumn, &[&str])] = &[
    (InvoiceColumn::Sgst, &["sgst", "s.gst", "state gst"]),
    (InvoiceColumn::Cgst, &["cgst", "c.gst", "central gst"]),
    (InvoiceColumn::Hsn, &["hsn", "sac"]),
    (InvoiceColumn::Batch, &["batch", "lot", "b.no", "bno"]),
    (InvoiceColumn::Qty, &["qty", "quantity", "units", "nos", "pcs"]),
    (InvoiceColumn::Rate, &["unit price", "rate"]),
    (InvoiceColumn::Mrp, &["mrp", "m.r.p", "price"]),
    (InvoiceColumn::Amount, &["amount", "amt", "value", "total"]),
    (
        InvoiceColumn::Product,
        &[
            "product",
            "item",
            "description",
            "particulars",
            "medicine",
            "drug",
            "goods",
            "name",
        ],
    ),
];

/// Separators an incomplete header label may end with.
const TRAILING_SEPARATORS: &[char] = &['-', ':', '/', '.'];

/// Result of header resolution.
#[derive(Debug, Clone)]
pub struct HeaderResolution {
    /// Resolved columns in order. Canonical where a synonym matched,
    /// positional placeholders otherwise.
    pub columns: Vec<InvoiceColumn>,

    /// Physical rows consumed by the header block (0 when no header row
    /// was detected; the canonical vocabulary is then used instead).
    pub header_row_count: usize,
}

impl HeaderResolution {
    /// The full canonical vocabulary, for header-less tables.
    pub fn canonical_default() -> Self {
        Self {
            columns: InvoiceColumn::CANONICAL.to_vec(),
            header_row_count: 0,
        }
    }
}

/// Detects the header block in the first rows of a table and maps its
/// labels to the canonical vocabulary.
#[derive(Debug, Clone)]
pub struct HeaderResolver {
    config: HeaderConfig,
}

impl HeaderResolver {
    /// Create a resolver from configuration.
    pub fn new(config: &HeaderConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Map a single header label to a canonical column by keyword
    /// containment.
    pub fn map_label(label: &str) -> Option<InvoiceColumn> {
        let label = label.to_lowercase();
        if label.trim().is_empty() {
            return None;
        }

        for (column, keywords) in SYNONYMS {
            if keywords.iter().any(|k| label.contains(k)) {
                return Some(*column);
            }
        }
        None
    }

    /// Resolve the header block from the leading rows of a table.
    pub fn resolve(&self, rows: &[Row]) -> HeaderResolution {
        let Some(first) = rows.first() else {
            return HeaderResolution::canonical_default();
        };

        if !self.is_header_row(first) {
            return HeaderResolution::canonical_default();
        }

        let mut labels: Vec<String> = first.cells.clone();
        let label_xs = first.xs.clone();
        let mut consumed = 1usize;

        // Multi-line merge: pull continuation rows up into incomplete
        // labels at the same column. Columns align by x position on the
        // spatial path, by cell index otherwise.
        while consumed < self.config.max_header_rows {
            let Some(next) = rows.get(consumed) else { break };
            let pairs = self.aligned_pairs(label_xs.as_deref(), labels.len(), next);
            if !self.merges_into(&labels, next, &pairs) {
                break;
            }

            for (label_idx, cell_idx) in pairs {
                let below = next.cells[cell_idx].trim();
                let label = &mut labels[label_idx];
                if self.is_incomplete(label) && !below.is_empty() {
                    if label.is_empty() {
                        *label = below.to_string();
                    } else {
                        *label = format!("{} {}", label.trim(), below);
                    }
                }
            }
            consumed += 1;
        }

        let mut columns = Vec::with_capacity(labels.len());
        let mut seen: Vec<InvoiceColumn> = Vec::new();

        for (i, label) in labels.iter().enumerate() {
            match Self::map_label(label) {
                // Duplicate canonical hits degrade to placeholders so the
                // header key set stays unique.
                Some(column) if !seen.contains(&column) => {
                    seen.push(column);
                    columns.push(column);
                }
                _ => columns.push(InvoiceColumn::Other(i)),
            }
        }

        debug!(
            "resolved header spanning {} rows: {:?}",
            consumed,
            columns.iter().map(|c| c.key()).collect::<Vec<_>>()
        );

        HeaderResolution {
            columns,
            header_row_count: consumed,
        }
    }

    /// A row is a header when enough of its cells map to canonical
    /// columns and none of them reads as a monetary value.
    fn is_header_row(&self, row: &Row) -> bool {
        if row.cells.iter().any(|c| money::is_amount_token(c)) {
            return false;
        }

        let hits = row
            .non_empty_cells()
            .filter(|c| Self::map_label(c).is_some())
            .count();

        hits >= self.config.min_canonical_hits
    }

    /// Match continuation-row cells to header columns: nearest x within
    /// the column tolerance when both rows carry positions, same cell
    /// index otherwise.
    fn aligned_pairs(
        &self,
        label_xs: Option<&[f32]>,
        label_count: usize,
        row: &Row,
    ) -> Vec<(usize, usize)> {
        match (label_xs, row.xs.as_deref()) {
            (Some(lx), Some(cx)) => cx
                .iter()
                .enumerate()
                .filter_map(|(cell_idx, x)| {
                    let (label_idx, distance) = lx
                        .iter()
                        .enumerate()
                        .map(|(i, l)| (i, (l - x).abs()))
                        .min_by(|a, b| {
                            a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)
                        })?;
                    (distance <= self.config.column_tolerance).then_some((label_idx, cell_idx))
                })
                .collect(),
            _ => (0..label_count.min(row.cells.len())).map(|i| (i, i)).collect(),
        }
    }

    /// A continuation row holds header text, not data: no monetary or
    /// digit-only cells, and at least one cell sitting under an
    /// incomplete label.
    fn merges_into(&self, labels: &[String], row: &Row, pairs: &[(usize, usize)]) -> bool {
        let data_like = row.cells.iter().any(|c| {
            let c = c.trim();
            money::is_amount_token(c) || (!c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit()))
        });
        if data_like {
            return false;
        }

        pairs.iter().any(|(label_idx, cell_idx)| {
            self.is_incomplete(&labels[*label_idx]) && !row.cells[*cell_idx].trim().is_empty()
        })
    }

    /// An incomplete label: short, single-word, or cut off mid-token.
    fn is_incomplete(&self, label: &str) -> bool {
        let label = label.trim();
        label.len() < self.config.merge_length_threshold
            || !label.contains(' ')
            || label.ends_with(TRAILING_SEPARATORS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> HeaderResolver {
        HeaderResolver::new(&HeaderConfig::default())
    }

    fn row(cells: &[&str]) -> Row {
        Row::from_cells(cells.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_map_label_synonyms() {
        assert_eq!(HeaderResolver::map_label("Qty"), Some(InvoiceColumn::Qty));
        assert_eq!(HeaderResolver::map_label("Quantity"), Some(InvoiceColumn::Qty));
        assert_eq!(HeaderResolver::map_label("HSN Code"), Some(InvoiceColumn::Hsn));
        assert_eq!(HeaderResolver::map_label("Batch No"), Some(InvoiceColumn::Batch));
        assert_eq!(HeaderResolver::map_label("Unit Price"), Some(InvoiceColumn::Rate));
        assert_eq!(HeaderResolver::map_label("M.R.P"), Some(InvoiceColumn::Mrp));
        assert_eq!(HeaderResolver::map_label("Total Amount"), Some(InvoiceColumn::Amount));
        assert_eq!(HeaderResolver::map_label("Item Description"), Some(InvoiceColumn::Product));
        assert_eq!(HeaderResolver::map_label("SGST"), Some(InvoiceColumn::Sgst));
        assert_eq!(HeaderResolver::map_label("zzz"), None);
    }

    #[test]
    fn test_single_row_header() {
        let rows = vec![
            row(&["Product", "HSN", "Qty", "Rate", "Amount"]),
            row(&["PARACIP TAB", "3004", "10", "22.84", "228.40"]),
        ];
        let resolution = resolver().resolve(&rows);

        assert_eq!(resolution.header_row_count, 1);
        assert_eq!(
            resolution.columns,
            vec![
                InvoiceColumn::Product,
                InvoiceColumn::Hsn,
                InvoiceColumn::Qty,
                InvoiceColumn::Rate,
                InvoiceColumn::Amount,
            ]
        );
    }

    #[test]
    fn test_two_row_header_merge() {
        // "Unit" on the first physical row, "Price" directly below at the
        // same column index: merged into "Unit Price" -> Rate.
        let rows = vec![
            row(&["Product", "Qty", "Unit"]),
            row(&["", "", "Price"]),
            row(&["PARACIP TAB", "10", "22.84"]),
        ];
        let resolution = resolver().resolve(&rows);

        assert_eq!(resolution.header_row_count, 2);
        assert_eq!(resolution.columns[2], InvoiceColumn::Rate);
    }

    #[test]
    fn test_spatial_merge_aligns_by_x() {
        // "Price" sits alone on the second physical row, under "Unit"
        // by x position rather than by cell index.
        let mut first = row(&["Product", "Qty", "Unit"]);
        first.xs = Some(vec![10.0, 200.0, 300.0]);
        first.y = Some(50.0);

        let mut second = row(&["Price"]);
        second.xs = Some(vec![300.0]);
        second.y = Some(70.0);

        let rows = vec![first, second, row(&["PARACIP TAB", "10", "22.84"])];
        let resolution = resolver().resolve(&rows);

        assert_eq!(resolution.header_row_count, 2);
        assert_eq!(resolution.columns[2], InvoiceColumn::Rate);
        assert_eq!(resolution.columns[0], InvoiceColumn::Product);
    }

    #[test]
    fn test_data_row_not_merged() {
        let rows = vec![
            row(&["Product", "Qty", "Rate"]),
            row(&["PARACIP TAB", "10", "22.84"]),
        ];
        let resolution = resolver().resolve(&rows);
        assert_eq!(resolution.header_row_count, 1);
    }

    #[test]
    fn test_no_header_falls_back_to_canonical() {
        let rows = vec![row(&["PARACIP 650MG TAB", "1*10", "22.84", "10"])];
        let resolution = resolver().resolve(&rows);

        assert_eq!(resolution.header_row_count, 0);
        assert_eq!(resolution.columns, InvoiceColumn::CANONICAL.to_vec());
    }

    #[test]
    fn test_unmapped_label_becomes_placeholder() {
        let rows = vec![
            row(&["Product", "Qty", "Remarks", "Amount"]),
            row(&["PARACIP TAB", "10", "ok", "228.40"]),
        ];
        let resolution = resolver().resolve(&rows);
        assert_eq!(resolution.columns[2], InvoiceColumn::Other(2));
    }

    #[test]
    fn test_duplicate_canonical_degrades_to_placeholder() {
        let rows = vec![
            row(&["Amount", "Qty", "Total Amount"]),
            row(&["x", "y", "z"]),
        ];
        let resolution = resolver().resolve(&rows);
        assert_eq!(resolution.columns[0], InvoiceColumn::Amount);
        assert_eq!(resolution.columns[2], InvoiceColumn::Other(2));
    }
}
