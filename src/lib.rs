//! # pdfredact
//!
//! Pattern-based redaction of personal information in PDF documents.
//!
//! The pipeline extracts positioned text runs from every page, matches each
//! run against an ordered [`RuleSet`], paints an opaque rectangle over every
//! matching run and draws a compliance stamp on every page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfredact::{redact, RuleSet, StampConfig};
//!
//! fn main() -> pdfredact::Result<()> {
//!     let input = std::fs::read("visit-summary.pdf").map_err(|e| pdfredact::Error::InvalidInput(e.to_string()))?;
//!     let rules = RuleSet::baseline()?;
//!
//!     let output = redact(&input, &rules, &StampConfig::default())?;
//!     println!("{} bytes", output.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Limitations
//!
//! The default [`RedactionStrategy::VisualOverlay`] only covers matched text;
//! the text itself stays in the document and can still be extracted. Use
//! [`RedactionStrategy::ContentRemoval`] to also strip the matched strings
//! from page content streams. Rules see one run at a time, so a name split
//! across several runs by the producer is not detected.
//!
//! ## Features
//!
//! - **Explicit rule sets**: immutable, cheap to clone, buildable in code or from JSON
//! - **Deterministic output**: identical input and configuration give identical marks
//! - **Parallel matching**: pages are matched on a rayon pool
//! - **Dry runs**: [`Redactor::scan`] reports matches without rendering

pub mod detect;
pub mod error;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod rules;
pub mod upload;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, is_pdf_bytes, PdfHeader};
pub use error::{Error, ErrorKind, Result, GENERIC_FAILURE_MESSAGE};
pub use matcher::{find_matches, SpanMatcher};
pub use model::{Color, Document, Match, Page, Rect, RedactionMark, TextRun};
pub use parser::{extract, ExtractOptions, TextLayoutExtractor};
pub use pipeline::{
    scan_with_options, MatchSummary, RedactOptions, RedactionReport, Redactor, ScanReport,
};
pub use render::{
    RedactionRenderer, RedactionStrategy, RenderOptions, RenderOutput, StampConfig,
    StampPlacement, DEFAULT_STAMP_TEXT,
};
pub use rules::{Category, Rule, RuleSet, RuleSetBuilder, RuleSetConfig};

/// Redact a PDF with default options.
///
/// Extraction, matching and rendering run in sequence; if any of them
/// fails the whole call fails and nothing is returned.
///
/// # Example
///
/// ```no_run
/// use pdfredact::{redact, RuleSet, StampConfig};
///
/// let input = std::fs::read("visit-summary.pdf").unwrap();
/// let output = redact(&input, &RuleSet::baseline().unwrap(), &StampConfig::default()).unwrap();
/// std::fs::write("redacted.pdf", output).unwrap();
/// ```
pub fn redact(input: &[u8], rules: &RuleSet, stamp: &StampConfig) -> Result<Vec<u8>> {
    Redactor::new(rules.clone(), stamp.clone())?.redact(input)
}

/// Redact a PDF with explicit options.
pub fn redact_with_options(
    input: &[u8],
    rules: &RuleSet,
    stamp: &StampConfig,
    options: RedactOptions,
) -> Result<Vec<u8>> {
    Redactor::with_options(rules.clone(), stamp.clone(), options)?.redact(input)
}

/// Report what [`redact`] would cover, without rendering.
pub fn scan(input: &[u8], rules: &RuleSet) -> Result<ScanReport> {
    scan_with_options(input, rules, &RedactOptions::default())
}
