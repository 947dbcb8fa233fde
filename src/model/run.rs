//! Positioned text fragments.

use serde::{Deserialize, Serialize};

use super::Rect;

/// An atomic, positioned text fragment as emitted by one text-showing operator.
///
/// Coordinates are in page user-space units relative to the MediaBox origin.
/// `y` is measured downward from the top of the page to the run's top edge
/// (layout space); `baseline` is the run's baseline in PDF user space
/// (origin bottom-left). Runs are never merged or split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// Decoded text content
    pub text: String,
    /// Left edge
    pub x: f32,
    /// Distance from the page top to the top edge of the run
    pub y: f32,
    /// Baseline in user space
    pub baseline: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent (ascent + descent at the effective font size)
    pub height: f32,
    /// Font resource name or base font (e.g., "Helvetica-Bold")
    pub font: String,
    /// Where in the page content stream this run came from
    #[serde(skip)]
    pub origin: Option<RunOrigin>,
}

impl TextRun {
    /// Create a run without content-stream provenance.
    pub fn new(
        text: impl Into<String>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        font: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            baseline: 0.0,
            width,
            height,
            font: font.into(),
            origin: None,
        }
    }

    /// Set the user-space baseline.
    pub fn with_baseline(mut self, baseline: f32) -> Self {
        self.baseline = baseline;
        self
    }

    /// Attach content-stream provenance.
    pub fn with_origin(mut self, origin: RunOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Bounding box in PDF user space (origin bottom-left, relative to the
    /// MediaBox origin) for a page of the given height.
    pub fn user_space_bbox(&self, page_height: f32) -> Rect {
        Rect::new(
            self.x,
            page_height - self.y - self.height,
            self.width,
            self.height,
        )
    }
}

/// Content-stream provenance of a [`TextRun`].
///
/// `op_index` indexes the operations of the page's concatenated content
/// streams, in decode order. Used by content removal to rewrite the exact
/// operator that painted a matched run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOrigin {
    /// Index of the text-showing operation
    pub op_index: usize,
    /// Which operator showed the text
    pub operator: ShowOperator,
    /// Horizontal displacement in unscaled text space (before `Tz`)
    pub advance: f32,
    /// Font size operand of the active `Tf`
    pub font_size: f32,
}

/// Text-showing operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShowOperator {
    /// `Tj`
    ShowText,
    /// `TJ`
    ShowTextAdjusted,
    /// `'` (move to next line, show)
    NextLineShow,
    /// `"` (set word/char spacing, next line, show)
    SpacedNextLineShow {
        /// Word spacing operand
        word_spacing: f32,
        /// Character spacing operand
        char_spacing: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_space_bbox_flips_vertical_axis() {
        let run = TextRun::new("Jane Doe", 72.0, 100.0, 60.0, 12.0, "Helvetica");
        let bbox = run.user_space_bbox(792.0);
        assert_eq!(bbox.x, 72.0);
        assert_eq!(bbox.y, 680.0);
        assert_eq!(bbox.width, 60.0);
        assert_eq!(bbox.height, 12.0);
    }

    #[test]
    fn test_origin_is_not_serialized() {
        let run = TextRun::new("x", 0.0, 0.0, 1.0, 1.0, "F1").with_origin(RunOrigin {
            op_index: 4,
            operator: ShowOperator::ShowText,
            advance: 6.0,
            font_size: 12.0,
        });
        let json = serde_json::to_string(&run).unwrap();
        assert!(!json.contains("op_index"));
    }
}
