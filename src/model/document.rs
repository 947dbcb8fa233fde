//! Document-level types.

use super::{Page, TextRun};
use serde::{Deserialize, Serialize};

/// The positioned-text view of a PDF document.
///
/// Built once per call by the extractor and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// PDF version from the file header (e.g., "1.7")
    pub version: String,

    /// Pages in the document
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of text runs across all pages.
    pub fn run_count(&self) -> usize {
        self.pages.iter().map(|p| p.runs.len()).sum()
    }

    /// Iterate `(page_number, run)` pairs in page then encounter order.
    pub fn runs(&self) -> impl Iterator<Item = (u32, &TextRun)> {
        self.pages
            .iter()
            .flat_map(|p| p.runs.iter().map(move |r| (p.number, r)))
    }
}
