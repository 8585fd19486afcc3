//! Line tokenization: the fallback path when no positional data exists.
//!
//! Splits raw lines into candidate columns with delimiter heuristics and
//! scores whether the document is tabular at all.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::TableConfig;
use crate::normalize::normalize;

use super::Row;

lazy_static! {
    static ref TWO_SPACES: Regex = Regex::new(r" {2,}").unwrap();
    static ref THREE_SPACES: Regex = Regex::new(r" {3,}").unwrap();
}

/// Column delimiter candidates, in priority order. Ties in segment count
/// break toward the earlier, single-character candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Tab character.
    Tab,
    /// Pipe character.
    Pipe,
    /// Two or more consecutive spaces.
    DoubleSpace,
    /// Three or more consecutive spaces.
    TripleSpace,
}

impl Delimiter {
    const CANDIDATES: [Delimiter; 4] = [
        Delimiter::Tab,
        Delimiter::Pipe,
        Delimiter::DoubleSpace,
        Delimiter::TripleSpace,
    ];

    /// Split a line into trimmed, non-empty segments.
    pub fn split(&self, line: &str) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Delimiter::Tab => line.split('\t').collect(),
            Delimiter::Pipe => line.split('|').collect(),
            Delimiter::DoubleSpace => TWO_SPACES.split(line).collect(),
            Delimiter::TripleSpace => THREE_SPACES.split(line).collect(),
        };

        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Table-likelihood assessment for a block of lines.
#[derive(Debug, Clone)]
pub struct TableLikelihood {
    /// Weighted score in [0, 1].
    pub score: f32,

    /// Most frequent segment count across lines.
    pub modal_count: usize,

    /// Fraction of lines within ±1 of the modal count.
    pub consistency: f32,

    /// Whether the block should be treated as tabular.
    pub is_tabular: bool,
}

/// Splits plain text lines into candidate columns and scores tabularity.
#[derive(Debug, Clone)]
pub struct LineTokenizer {
    config: TableConfig,
}

impl LineTokenizer {
    /// Create a tokenizer from configuration.
    pub fn new(config: &TableConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Split one line with the best-performing delimiter candidate.
    ///
    /// The winner is the candidate yielding the most non-empty segments;
    /// ties go to the earlier candidate in priority order.
    pub fn split_line(&self, line: &str) -> (Vec<String>, Delimiter) {
        let mut best = (Vec::new(), Delimiter::Tab);

        for candidate in Delimiter::CANDIDATES {
            let segments = candidate.split(line);
            if segments.len() > best.0.len() {
                best = (segments, candidate);
            }
        }

        if best.0.is_empty() && !line.trim().is_empty() {
            best.0 = vec![line.trim().to_string()];
        }

        best
    }

    /// Score how table-like a block of lines is.
    pub fn assess(&self, lines: &[&str]) -> TableLikelihood {
        let non_empty: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|l| !l.trim().is_empty())
            .collect();

        if non_empty.is_empty() {
            return TableLikelihood {
                score: 0.0,
                modal_count: 0,
                consistency: 0.0,
                is_tabular: false,
            };
        }

        let counts: Vec<usize> = non_empty
            .iter()
            .map(|l| self.split_line(l).0.len())
            .collect();

        let modal_count = Self::modal(&counts);
        let consistency = counts
            .iter()
            .filter(|&&c| c.abs_diff(modal_count) <= 1)
            .count() as f32
            / counts.len() as f32;

        let delimiter_fraction = non_empty
            .iter()
            .filter(|l| l.contains('|') || l.contains('\t'))
            .count() as f32
            / non_empty.len() as f32;

        let numeric_fraction = non_empty
            .iter()
            .filter(|l| l.chars().any(|c| c.is_ascii_digit()))
            .count() as f32
            / non_empty.len() as f32;

        let header_signal = if Self::looks_like_header_line(&self.split_line(non_empty[0]).0) {
            1.0
        } else {
            0.0
        };

        let score = self.config.weight_consistency * consistency
            + self.config.weight_delimiters * delimiter_fraction
            + self.config.weight_numeric * numeric_fraction
            + self.config.weight_header * header_signal;

        let is_tabular = score > self.config.likelihood_threshold
            && consistency >= self.config.min_consistency
            && modal_count > 1;

        debug!(
            "table likelihood {:.2} (modal {}, consistency {:.2}) -> tabular={}",
            score, modal_count, consistency, is_tabular
        );

        TableLikelihood {
            score,
            modal_count,
            consistency,
            is_tabular,
        }
    }

    /// Tokenize text into rows, with the tabularity verdict.
    ///
    /// When the block is not tabular the rows degrade to one whole-line
    /// cell each (the flat line list the caller can still scan).
    pub fn tokenize(&self, text: &str) -> (Vec<Row>, TableLikelihood) {
        let lines: Vec<&str> = text.lines().collect();
        let likelihood = self.assess(&lines);

        let rows = lines
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|line| {
                let cells = if likelihood.is_tabular {
                    self.split_line(line).0
                } else {
                    vec![line.trim().to_string()]
                };
                Row::from_cells(cells.into_iter().map(|c| normalize(&c)).collect())
            })
            .collect();

        (rows, likelihood)
    }

    fn modal(counts: &[usize]) -> usize {
        let mut best = (0usize, 0usize);
        for &count in counts {
            let freq = counts.iter().filter(|&&c| c == count).count();
            if freq > best.1 || (freq == best.1 && count > best.0) {
                best = (count, freq);
            }
        }
        best.0
    }

    /// A header-looking first line: short segments, none containing digits.
    fn looks_like_header_line(segments: &[String]) -> bool {
        segments.len() > 1
            && segments
                .iter()
                .all(|s| s.len() <= 16 && !s.chars().any(|c| c.is_ascii_digit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> LineTokenizer {
        LineTokenizer::new(&TableConfig::default())
    }

    #[test]
    fn test_delimiter_priority_on_ties() {
        // Pipe and double-space both yield 3 segments; pipe wins as the
        // earlier single-character candidate.
        let (segments, delimiter) = tokenizer().split_line("a  | b  | c");
        assert_eq!(segments, ["a", "b", "c"]);
        assert_eq!(delimiter, Delimiter::Pipe);
    }

    #[test]
    fn test_double_space_split() {
        let (segments, delimiter) = tokenizer().split_line("PARACIP TAB  10  22.84");
        assert_eq!(segments, ["PARACIP TAB", "10", "22.84"]);
        assert_eq!(delimiter, Delimiter::DoubleSpace);
    }

    #[test]
    fn test_pipe_document_is_tabular() {
        let lines = [
            "Product | HSN | Qty | Rate | Amount",
            "PARACIP 650MG TAB | 3004 | 10 | 22.84 | 228.40",
            "DOLO 650 TAB | 3004 | 5 | 30.00 | 150.00",
        ];
        let likelihood = tokenizer().assess(&lines);

        assert!(likelihood.score > 0.4, "score was {}", likelihood.score);
        assert!(likelihood.is_tabular);
        assert_eq!(likelihood.modal_count, 5);
        assert!(likelihood.consistency >= 0.5);
    }

    #[test]
    fn test_prose_is_not_tabular() {
        let lines = [
            "Thank you for visiting our store.",
            "Please retain this receipt for returns.",
            "Goods once sold are not taken back.",
        ];
        let likelihood = tokenizer().assess(&lines);
        assert!(!likelihood.is_tabular);
    }

    #[test]
    fn test_non_tabular_rows_are_flat_lines() {
        let (rows, likelihood) = tokenizer().tokenize("just a sentence\nand another one");
        assert!(!likelihood.is_tabular);
        assert!(rows.iter().all(|r| r.cells.len() == 1));
    }

    #[test]
    fn test_tabular_rows_are_split() {
        let text = "Product | Qty | Rate\nPARACIP TAB | 10 | 22.84\nDOLO TAB | 5 | 30.00";
        let (rows, likelihood) = tokenizer().tokenize(text);
        assert!(likelihood.is_tabular);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].cells, ["PARACIP TAB", "10", "22.84"]);
    }

    #[test]
    fn test_empty_input() {
        let likelihood = tokenizer().assess(&[]);
        assert_eq!(likelihood.score, 0.0);
        assert!(!likelihood.is_tabular);
    }
}
