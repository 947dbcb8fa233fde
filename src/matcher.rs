//! Span matcher.
//!
//! Every run is tested against the rules in declaration order and the first
//! rule that matches wins, so a run yields at most one [`Match`]. Pages are
//! independent of each other and can be matched in parallel; the output
//! order is always page ascending, then run encounter order.

use rayon::prelude::*;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::model::{Match, Page, TextRun};
use crate::rules::RuleSet;

/// Match all pages sequentially.
pub fn find_matches(pages: &[Page], rules: &RuleSet) -> Vec<Match> {
    pages.iter().flat_map(|page| match_page(page, rules)).collect()
}

/// Match the runs of a single page.
pub fn match_page(page: &Page, rules: &RuleSet) -> Vec<Match> {
    let matches: Vec<Match> = page
        .runs
        .iter()
        .filter_map(|run| match_run(page.number, run, rules))
        .collect();

    log::debug!(
        "page {}: {} of {} runs matched",
        page.number,
        matches.len(),
        page.runs.len()
    );
    matches
}

fn match_run(page: u32, run: &TextRun, rules: &RuleSet) -> Option<Match> {
    // Compatibility forms (ligatures, full-width digits) match like their plain text
    let normalized: String = run.text.nfkc().collect();
    let rule = rules.first_match(&normalized)?;

    log::trace!("page {}: rule '{}' matched {:?}", page, rule.name(), run.text);
    Some(Match {
        page,
        rule: rule.name().to_string(),
        category: rule.category().clone(),
        run: run.clone(),
    })
}

/// Configurable span matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanMatcher {
    parallel: bool,
    threads: Option<usize>,
}

impl Default for SpanMatcher {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
        }
    }
}

impl SpanMatcher {
    /// Parallel matcher on rayon's global pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match pages one after another on the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            threads: None,
        }
    }

    /// Use a dedicated pool with at most `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.parallel = true;
        self.threads = Some(threads);
        self
    }

    /// Whether pages are matched in parallel.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Match all pages.
    ///
    /// # Errors
    /// [`Error::Configuration`] if a dedicated thread pool cannot be built.
    pub fn find_matches(&self, pages: &[Page], rules: &RuleSet) -> Result<Vec<Match>> {
        if !self.parallel || pages.len() < 2 {
            return Ok(find_matches(pages, rules));
        }

        let run = || -> Vec<Match> {
            // collect() keeps page order regardless of scheduling
            let per_page: Vec<Vec<Match>> =
                pages.par_iter().map(|page| match_page(page, rules)).collect();
            per_page.into_iter().flatten().collect()
        };

        match self.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| Error::Configuration(format!("cannot build thread pool: {}", e)))?;
                Ok(pool.install(run))
            }
            None => Ok(run()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Category;

    fn page(number: u32, texts: &[&str]) -> Page {
        let mut page = Page::letter(number);
        for (i, text) in texts.iter().enumerate() {
            page.add_run(TextRun::new(*text, 72.0, 72.0 + i as f32 * 14.0, 100.0, 12.0, "Helvetica"));
        }
        page
    }

    #[test]
    fn test_first_rule_wins() {
        let rules = RuleSet::baseline().unwrap();
        let pages = vec![page(1, &["Patient: Dr. Jane Doe, Visit Date: 01/15/2023"])];

        let matches = find_matches(&pages, &rules);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule, "honorific_name");
        assert_eq!(matches[0].category, Category::Name);
    }

    #[test]
    fn test_non_matching_runs_skipped() {
        let rules = RuleSet::baseline().unwrap();
        let pages = vec![page(1, &["blood pressure", "2023-01-15", "normal"])];

        let matches = find_matches(&pages, &rules);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text(), "2023-01-15");
        assert_eq!(matches[0].run.y, 86.0);
    }

    #[test]
    fn test_order_page_then_encounter() {
        let rules = RuleSet::baseline().unwrap();
        let pages = vec![
            page(1, &["01/02/2020", "filler", "03/04/2021"]),
            page(2, &["Mercy Hospital"]),
            page(3, &["nothing here"]),
        ];

        let matches = find_matches(&pages, &rules);
        let seen: Vec<(u32, &str)> = matches.iter().map(|m| (m.page, m.text())).collect();
        assert_eq!(
            seen,
            vec![(1, "01/02/2020"), (1, "03/04/2021"), (2, "Mercy Hospital")]
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rules = RuleSet::baseline().unwrap();
        let pages: Vec<Page> = (1..=12)
            .map(|n| page(n, &["Jane Doe", "no match", "1999-12-31"]))
            .collect();

        let sequential = SpanMatcher::sequential().find_matches(&pages, &rules).unwrap();
        let parallel = SpanMatcher::new().with_threads(4).find_matches(&pages, &rules).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.len(), 24);
    }

    #[test]
    fn test_compatibility_forms_normalized() {
        let rules = RuleSet::baseline().unwrap();
        // full-width digits
        let pages = vec![page(1, &["\u{FF10}\u{FF11}/15/2023"])];

        let matches = find_matches(&pages, &rules);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].run.text, "\u{FF10}\u{FF11}/15/2023");
    }

    #[test]
    fn test_empty_rule_set_matches_nothing() {
        let pages = vec![page(1, &["Jane Doe"])];
        assert!(find_matches(&pages, &RuleSet::empty()).is_empty());
    }
}
