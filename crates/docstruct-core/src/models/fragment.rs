//! Input models: OCR text fragments and the two accepted input shapes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocstructError, InputError, Result};

/// A single OCR-recognized token or phrase with its position.
///
/// Fragments are immutable: the clustering stage groups them into rows but
/// never rewrites them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFragment {
    /// Recognized text content.
    pub text: String,

    /// Horizontal position (left edge or anchor point).
    pub x: f32,

    /// Vertical position (top edge or anchor point).
    pub y: f32,

    /// Recognition confidence score (0.0 - 1.0).
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    /// Optional quadrilateral bounding box (x1, y1, ..., x4, y4).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f32; 8]>,
}

fn default_confidence() -> f32 {
    1.0
}

impl TextFragment {
    /// Create a fragment from text and an anchor point.
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            confidence: 1.0,
            bbox: None,
        }
    }

    /// Whether the fragment carries usable coordinates.
    ///
    /// Fragments failing this are dropped before clustering and counted in
    /// the output metadata.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Get the center point of the bounding box, falling back to the anchor.
    pub fn center(&self) -> (f32, f32) {
        match &self.bbox {
            Some(b) => (
                (b[0] + b[2] + b[4] + b[6]) / 4.0,
                (b[1] + b[3] + b[5] + b[7]) / 4.0,
            ),
            None => (self.x, self.y),
        }
    }

    /// Get the axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        match &self.bbox {
            Some(b) => {
                let xs = [b[0], b[2], b[4], b[6]];
                let ys = [b[1], b[3], b[5], b[7]];

                let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
                let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
                let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

                (min_x, min_y, max_x, max_y)
            }
            None => (self.x, self.y, self.x, self.y),
        }
    }
}

/// OCR result with spatial information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialResult {
    /// Full recognized text (fragments joined in engine reading order).
    #[serde(default)]
    pub full_text: String,

    /// Positioned text fragments.
    #[serde(default)]
    pub fragments: Vec<TextFragment>,
}

/// Input accepted from OCR collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OcrInput {
    /// A set of spatially-positioned fragments plus the flat text.
    Spatial(SpatialResult),

    /// Plain recognized text with no positional data.
    Raw(String),
}

impl OcrInput {
    /// The flat text view of the input.
    pub fn text(&self) -> &str {
        match self {
            OcrInput::Raw(s) => s,
            OcrInput::Spatial(s) => &s.full_text,
        }
    }

    /// Well-formed fragments, if the input carries any.
    pub fn well_formed_fragments(&self) -> Option<Vec<&TextFragment>> {
        match self {
            OcrInput::Raw(_) => None,
            OcrInput::Spatial(s) => {
                let ok: Vec<&TextFragment> =
                    s.fragments.iter().filter(|f| f.is_well_formed()).collect();
                if ok.is_empty() { None } else { Some(ok) }
            }
        }
    }

    /// Whether there is nothing to extract from.
    pub fn is_empty(&self) -> bool {
        match self {
            OcrInput::Raw(s) => s.trim().is_empty(),
            OcrInput::Spatial(s) => {
                s.full_text.trim().is_empty()
                    && !s.fragments.iter().any(|f| !f.text.trim().is_empty())
            }
        }
    }

    /// Load an input from a file: `.json` is parsed as a [`SpatialResult`],
    /// `.txt` (or no extension) as raw text.
    pub fn from_file(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("txt")
            .to_lowercase();

        let content = std::fs::read_to_string(path)?;

        match extension.as_str() {
            "json" => {
                let spatial: SpatialResult = serde_json::from_str(&content).map_err(|e| {
                    DocstructError::Input(InputError::MalformedSpatial(e.to_string()))
                })?;
                Ok(OcrInput::Spatial(spatial))
            }
            "txt" | "text" | "ocr" => Ok(OcrInput::Raw(content)),
            other => Err(InputError::UnsupportedFormat(other.to_string()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed() {
        assert!(TextFragment::new("a", 1.0, 2.0).is_well_formed());
        assert!(!TextFragment::new("a", f32::NAN, 2.0).is_well_formed());
        assert!(!TextFragment::new("a", 1.0, f32::INFINITY).is_well_formed());
    }

    #[test]
    fn test_rect_from_bbox() {
        let mut frag = TextFragment::new("a", 0.0, 0.0);
        frag.bbox = Some([10.0, 5.0, 50.0, 5.0, 50.0, 20.0, 10.0, 20.0]);
        assert_eq!(frag.rect(), (10.0, 5.0, 50.0, 20.0));
        assert_eq!(frag.center(), (30.0, 12.5));
    }

    #[test]
    fn test_input_emptiness() {
        assert!(OcrInput::Raw(String::new()).is_empty());
        assert!(OcrInput::Raw("  \n ".to_string()).is_empty());
        assert!(!OcrInput::Raw("text".to_string()).is_empty());
        assert!(OcrInput::Spatial(SpatialResult::default()).is_empty());

        let spatial = SpatialResult {
            full_text: String::new(),
            fragments: vec![TextFragment::new("x", 1.0, 1.0)],
        };
        assert!(!OcrInput::Spatial(spatial).is_empty());
    }

    #[test]
    fn test_spatial_json_roundtrip() {
        let json = r#"{"full_text":"a b","fragments":[{"text":"a","x":1.0,"y":2.0},{"text":"b","x":30.0,"y":2.0}]}"#;
        let spatial: SpatialResult = serde_json::from_str(json).unwrap();
        assert_eq!(spatial.fragments.len(), 2);
        assert_eq!(spatial.fragments[0].confidence, 1.0);
    }
}
