//! PDF text layout extraction.
//!
//! Turns PDF bytes into a [`Document`](crate::model::Document) of positioned
//! [`TextRun`](crate::model::TextRun)s. Page-tree helpers here are shared
//! with the renderer.

mod afm;
mod extractor;
mod fonts;
mod options;
pub(crate) mod page_tree;
mod state;

pub use extractor::{extract, TextLayoutExtractor};
pub(crate) use extractor::load_document;
pub use options::ExtractOptions;
