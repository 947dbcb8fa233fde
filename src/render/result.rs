//! Rendering result with the geometry that was drawn.

use super::StampPlacement;
use crate::model::RedactionMark;

/// Output document plus the marks and stamps drawn into it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    /// The redacted PDF
    pub bytes: Vec<u8>,

    /// Marks in page order, then match order
    pub marks: Vec<RedactionMark>,

    /// One stamp per page, in page order
    pub stamps: Vec<StampPlacement>,

    /// Text-showing operators replaced (content removal only)
    pub operators_removed: usize,
}

impl RenderOutput {
    /// Number of marks drawn on `page`.
    pub fn marks_on(&self, page: u32) -> usize {
        self.marks.iter().filter(|m| m.page == page).count()
    }

    /// Get the output length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the output is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
