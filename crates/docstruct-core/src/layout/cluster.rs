//! Spatial block clustering: group positioned fragments into rows.

use tracing::{debug, warn};

use crate::models::{ClusterConfig, TextFragment};
use crate::normalize::normalize;

use super::Row;

/// Result of clustering a fragment set.
#[derive(Debug, Clone)]
pub struct ClusterResult {
    /// Rows ordered top-to-bottom, fragments left-to-right within each.
    pub rows: Vec<Vec<TextFragment>>,

    /// Fragments dropped for missing/invalid coordinates.
    pub dropped: usize,
}

impl ClusterResult {
    /// Convert fragment rows into normalized cell rows for the table
    /// pipeline. The representative y of a row is the y of its first
    /// fragment in reading order.
    pub fn to_rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|frags| Row {
                cells: frags.iter().map(|f| normalize(&f.text)).collect(),
                y: frags.first().map(|f| f.y),
                xs: Some(frags.iter().map(|f| f.x).collect()),
            })
            .collect()
    }
}

/// Groups positioned text fragments into reading-order rows.
///
/// Fragments are sorted by `y` (ties by `x`) and walked once: a fragment
/// joins the open row while its vertical distance to the row's last
/// fragment stays within the tolerance, otherwise the row is closed and a
/// new one starts. Closed rows are re-sorted by `x`.
#[derive(Debug, Clone)]
pub struct BlockClusterer {
    row_tolerance: f32,
}

impl BlockClusterer {
    /// Create a clusterer from configuration.
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            row_tolerance: config.row_tolerance,
        }
    }

    /// Override the row tolerance.
    pub fn with_row_tolerance(mut self, tolerance: f32) -> Self {
        self.row_tolerance = tolerance;
        self
    }

    /// Cluster fragments into rows.
    ///
    /// A single mispositioned fragment produces a spurious one-fragment
    /// row here; the row classifier downstream filters those out.
    pub fn cluster(&self, fragments: &[TextFragment]) -> ClusterResult {
        let mut valid: Vec<TextFragment> = Vec::with_capacity(fragments.len());
        let mut dropped = 0usize;

        for fragment in fragments {
            if fragment.is_well_formed() {
                valid.push(fragment.clone());
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            warn!("dropped {} fragments with invalid coordinates", dropped);
        }

        valid.sort_by(|a, b| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });

        let mut rows: Vec<Vec<TextFragment>> = Vec::new();
        let mut current: Vec<TextFragment> = Vec::new();
        let mut last_row_y = f32::NEG_INFINITY;

        for fragment in valid {
            if current.is_empty() || (fragment.y - last_row_y).abs() <= self.row_tolerance {
                last_row_y = fragment.y;
                current.push(fragment);
            } else {
                Self::close_row(&mut current, &mut rows);
                last_row_y = fragment.y;
                current.push(fragment);
            }
        }
        Self::close_row(&mut current, &mut rows);

        debug!("clustered {} rows ({} fragments dropped)", rows.len(), dropped);

        ClusterResult { rows, dropped }
    }

    fn close_row(current: &mut Vec<TextFragment>, rows: &mut Vec<Vec<TextFragment>>) {
        if current.is_empty() {
            return;
        }
        let mut row = std::mem::take(current);
        row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32) -> TextFragment {
        TextFragment::new(text, x, y)
    }

    #[test]
    fn test_single_row() {
        let clusterer = BlockClusterer::new(&ClusterConfig::default());
        let fragments = vec![
            frag("22.84", 260.0, 100.0),
            frag("PARACIP 650MG TAB", 10.0, 100.0),
            frag("10", 320.0, 102.0),
            frag("1*10", 200.0, 99.0),
        ];

        let result = clusterer.cluster(&fragments);
        assert_eq!(result.rows.len(), 1);

        let texts: Vec<&str> = result.rows[0].iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, ["PARACIP 650MG TAB", "1*10", "22.84", "10"]);
    }

    #[test]
    fn test_row_split_beyond_tolerance() {
        let clusterer = BlockClusterer::new(&ClusterConfig::default());
        let fragments = vec![
            frag("a", 10.0, 100.0),
            frag("b", 50.0, 105.0),
            frag("c", 10.0, 140.0),
        ];

        let result = clusterer.cluster(&fragments);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].len(), 2);
        assert_eq!(result.rows[1][0].text, "c");
    }

    #[test]
    fn test_ordering_invariant() {
        let clusterer = BlockClusterer::new(&ClusterConfig::default());
        // Deliberately shuffled input.
        let fragments = vec![
            frag("r3c2", 200.0, 300.0),
            frag("r1c1", 10.0, 100.0),
            frag("r2c1", 10.0, 200.0),
            frag("r1c2", 150.0, 101.0),
            frag("r3c1", 10.0, 298.0),
            frag("r2c2", 90.0, 199.0),
        ];

        let result = clusterer.cluster(&fragments);

        let mut prev_row_y = f32::NEG_INFINITY;
        for row in &result.rows {
            let row_y = row[0].y;
            assert!(row_y >= prev_row_y, "rows not in y order");
            prev_row_y = row_y;

            let mut prev_x = f32::NEG_INFINITY;
            for fragment in row {
                assert!(fragment.x >= prev_x, "fragments not in x order");
                prev_x = fragment.x;
            }
        }
    }

    #[test]
    fn test_malformed_fragments_dropped() {
        let clusterer = BlockClusterer::new(&ClusterConfig::default());
        let fragments = vec![
            frag("ok", 10.0, 100.0),
            frag("bad", f32::NAN, 100.0),
            frag("also ok", 60.0, 100.0),
        ];

        let result = clusterer.cluster(&fragments);
        assert_eq!(result.dropped, 1);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].len(), 2);
    }

    #[test]
    fn test_stray_fragment_gets_own_row() {
        let clusterer = BlockClusterer::new(&ClusterConfig::default());
        let fragments = vec![
            frag("a", 10.0, 100.0),
            frag("stray", 400.0, 500.0),
            frag("b", 60.0, 100.0),
        ];

        let result = clusterer.cluster(&fragments);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].len(), 1);
        assert_eq!(result.rows[1][0].text, "stray");
    }

    #[test]
    fn test_to_rows_normalizes_cells() {
        let clusterer = BlockClusterer::new(&ClusterConfig::default());
        let result = clusterer.cluster(&[frag("  1O  ", 10.0, 100.0)]);
        let rows = result.to_rows();
        assert_eq!(rows[0].cells, vec!["10".to_string()]);
        assert_eq!(rows[0].y, Some(100.0));
    }

    #[test]
    fn test_empty_input() {
        let clusterer = BlockClusterer::new(&ClusterConfig::default());
        let result = clusterer.cluster(&[]);
        assert!(result.rows.is_empty());
        assert_eq!(result.dropped, 0);
    }
}
