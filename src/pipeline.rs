//! Pipeline orchestrator: extraction, matching, rendering behind one call.
//!
//! Any stage failing aborts the call; no partial output is ever returned.
//! The input bytes are only read, so calling [`Redactor::redact`] again on
//! the same input yields an equivalent result.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::matcher::SpanMatcher;
use crate::model::{Match, RedactionMark};
use crate::parser::{load_document, ExtractOptions, TextLayoutExtractor};
use crate::render::{
    RedactionRenderer, RedactionStrategy, RenderOptions, StampConfig, StampPlacement,
};
use crate::rules::{Category, RuleSet};

/// Options for a [`Redactor`].
#[derive(Debug, Clone, PartialEq)]
pub struct RedactOptions {
    /// Extraction options
    pub extract: ExtractOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// Match pages in parallel
    pub parallel: bool,

    /// Worker count for parallel matching (rayon's global pool when `None`)
    pub threads: Option<usize>,
}

impl Default for RedactOptions {
    fn default() -> Self {
        Self {
            extract: ExtractOptions::default(),
            render: RenderOptions::default(),
            parallel: true,
            threads: None,
        }
    }
}

impl RedactOptions {
    /// Create new redact options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set extraction options.
    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Set the redaction strategy.
    pub fn with_strategy(mut self, strategy: RedactionStrategy) -> Self {
        self.render.strategy = strategy;
        self
    }

    /// Set the mark height multiplier.
    pub fn with_margin_factor(mut self, factor: f32) -> Self {
        self.render.margin_factor = factor;
        self
    }

    /// Match pages on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Match pages on a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.parallel = true;
        self.threads = Some(threads);
        self
    }

    fn check_threads(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(Error::Configuration("thread count must be positive".to_string()));
        }
        Ok(())
    }

    fn matcher(&self) -> SpanMatcher {
        match (self.parallel, self.threads) {
            (false, _) => SpanMatcher::sequential(),
            (true, Some(threads)) => SpanMatcher::new().with_threads(threads),
            (true, None) => SpanMatcher::new(),
        }
    }
}

/// Outcome of a dry run: what would be redacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Pages in the document
    pub page_count: u32,
    /// Text runs examined
    pub runs_scanned: usize,
    /// Matches in page order, then run order
    pub matches: Vec<Match>,
}

impl ScanReport {
    /// Number of matches on `page`.
    pub fn matches_on(&self, page: u32) -> usize {
        self.matches.iter().filter(|m| m.page == page).count()
    }
}

/// A match without its text, safe to log or persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// 1-based page number
    pub page: u32,
    /// Rule that matched
    pub rule: String,
    /// Category of that rule
    pub category: Category,
}

impl From<&Match> for MatchSummary {
    fn from(m: &Match) -> Self {
        Self {
            page: m.page,
            rule: m.rule.clone(),
            category: m.category.clone(),
        }
    }
}

/// What a redaction call did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionReport {
    /// Pages in the input and output
    pub page_count: u32,
    /// Text runs examined
    pub runs_scanned: usize,
    /// Matches, without their text
    pub matches: Vec<MatchSummary>,
    /// Marks drawn
    pub marks: Vec<RedactionMark>,
    /// Stamps drawn, one per page
    pub stamps: Vec<StampPlacement>,
    /// Strategy used
    pub strategy: RedactionStrategy,
    /// What the strategy does and does not promise
    pub guarantee: String,
    /// Text-showing operators replaced
    pub operators_removed: usize,
}

/// Extract and match without rendering.
///
/// Nothing is drawn, so no stamp is involved: a rule set that a [`Redactor`]
/// would reject for matching its stamp can still be scanned. Render options
/// are ignored.
///
/// # Errors
/// [`Error::Configuration`] for a zero thread count, otherwise any
/// extraction or matching error.
pub fn scan_with_options(
    input: &[u8],
    rules: &RuleSet,
    options: &RedactOptions,
) -> Result<ScanReport> {
    options.check_threads()?;
    let doc = load_document(input)?;
    let extracted = TextLayoutExtractor::new(options.extract.clone()).extract_loaded(&doc)?;
    let matches = options.matcher().find_matches(&extracted.pages, rules)?;
    log::debug!(
        "scanned {} pages: {} runs, {} matches",
        extracted.page_count(),
        extracted.run_count(),
        matches.len()
    );

    Ok(ScanReport {
        page_count: extracted.page_count(),
        runs_scanned: extracted.run_count(),
        matches,
    })
}

/// Redacts documents with a fixed rule set, stamp and options.
///
/// # Example
///
/// ```no_run
/// use pdfredact::{Redactor, RuleSet, StampConfig};
///
/// let redactor = Redactor::new(RuleSet::baseline()?, StampConfig::default())?;
/// let input = std::fs::read("visit-summary.pdf")?;
/// let (output, report) = redactor.redact_with_report(&input)?;
/// println!("{} marks on {} pages", report.marks.len(), report.page_count);
/// std::fs::write("redacted-visit-summary.pdf", output)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Redactor {
    rules: RuleSet,
    stamp: StampConfig,
    options: RedactOptions,
}

impl Redactor {
    /// Create a redactor with default options.
    ///
    /// # Errors
    /// [`Error::Configuration`] if the stamp is invalid or its text would
    /// itself be matched by `rules`.
    pub fn new(rules: RuleSet, stamp: StampConfig) -> Result<Self> {
        Self::with_options(rules, stamp, RedactOptions::default())
    }

    /// Create a redactor with explicit options.
    pub fn with_options(rules: RuleSet, stamp: StampConfig, options: RedactOptions) -> Result<Self> {
        stamp.validate()?;
        options.render.validate()?;
        options.check_threads()?;

        let normalized: String = stamp.text.nfkc().collect();
        if let Some(rule) = rules.first_match(&normalized) {
            return Err(Error::Configuration(format!(
                "stamp text would be redacted by rule '{}'",
                rule.name()
            )));
        }

        Ok(Self {
            rules,
            stamp,
            options,
        })
    }

    /// The active rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The stamp drawn on every page.
    pub fn stamp(&self) -> &StampConfig {
        &self.stamp
    }

    /// The redactor's options.
    pub fn options(&self) -> &RedactOptions {
        &self.options
    }

    /// Extract and match without rendering.
    pub fn scan(&self, input: &[u8]) -> Result<ScanReport> {
        scan_with_options(input, &self.rules, &self.options)
    }

    /// Redact `input`, returning the new document.
    pub fn redact(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.redact_with_report(input).map(|(bytes, _)| bytes)
    }

    /// Redact `input`, returning the new document and a report.
    ///
    /// # Errors
    /// Any extraction, matching or rendering error; see [`Error::kind`].
    pub fn redact_with_report(&self, input: &[u8]) -> Result<(Vec<u8>, RedactionReport)> {
        let mut doc = load_document(input)?;
        let extracted = TextLayoutExtractor::new(self.options.extract.clone()).extract_loaded(&doc)?;
        let matches = self.options.matcher().find_matches(&extracted.pages, &self.rules)?;

        let renderer = RedactionRenderer::new(self.stamp.clone(), self.options.render.clone());
        let output = renderer.render_loaded(&mut doc, &matches)?;

        let strategy = self.options.render.strategy;
        log::info!(
            "redacted {} pages: {} runs scanned, {} matches, {} marks ({})",
            extracted.page_count(),
            extracted.run_count(),
            matches.len(),
            output.marks.len(),
            strategy
        );

        let report = RedactionReport {
            page_count: extracted.page_count(),
            runs_scanned: extracted.run_count(),
            matches: matches.iter().map(MatchSummary::from).collect(),
            marks: output.marks,
            stamps: output.stamps,
            strategy,
            guarantee: strategy.guarantee().to_string(),
            operators_removed: output.operators_removed,
        };
        Ok((output.bytes, report))
    }
}
