//! Page-level types.

use super::TextRun;
use serde::{Deserialize, Serialize};

/// A single page in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,

    /// Text runs in content-stream encounter order
    pub runs: Vec<TextRun>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            rotation: 0,
            runs: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Add a run to the page.
    pub fn add_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Check if the page has no text runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Whether the page carries a non-zero `/Rotate`.
    pub fn is_rotated(&self) -> bool {
        self.rotation % 360 != 0
    }

    /// Concatenated run text, one run per line.
    pub fn plain_text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::letter(1)
    }
}
