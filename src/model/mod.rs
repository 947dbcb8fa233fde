//! Document model types for the redaction pipeline.
//!
//! The model is the data handed between components: the extractor produces
//! [`Document`]/[`Page`]/[`TextRun`], the matcher produces [`Match`], and the
//! renderer derives [`RedactionMark`] from matches.

mod document;
mod page;
mod redaction;
mod run;

pub use document::Document;
pub use page::Page;
pub use redaction::{Color, Match, Rect, RedactionMark};
pub use run::{RunOrigin, ShowOperator, TextRun};
