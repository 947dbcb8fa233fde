//! Detection rules.
//!
//! A [`RuleSet`] is an immutable, ordered list of named regular expressions
//! grouped by [`Category`]. It is built explicitly and passed into every call,
//! so concurrent callers can use different configurations. Rules are evaluated
//! against a single run's text in isolation.
//!
//! # Example
//!
//! ```
//! use pdfredact::rules::{Category, RuleSet};
//!
//! let rules = RuleSet::builder()
//!     .with_defaults()
//!     .add_pattern("mrn", Category::Other("record".into()), r"\bMRN[- ]?\d{6,}\b")
//!     .remove("bare_name")
//!     .build()?;
//!
//! assert!(rules.first_match("MRN-0012345").is_some());
//! # Ok::<(), pdfredact::Error>(())
//! ```

mod builtin;
mod config;

pub use builtin::{
    DEFAULT_INSTITUTION_TERMS, ISO_DATE, LONG_DATE_DAY_FIRST, LONG_DATE_MONTH_FIRST,
    BARE_NAME, HONORIFIC_NAME, SLASH_DATE,
};
pub use config::{LiteralRuleConfig, PatternRuleConfig, RuleSetConfig};

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Category label of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Personal names
    Name,
    /// Calendar dates
    Date,
    /// Institution and organization names
    Institution,
    /// Anything else, by label
    Other(String),
}

impl Category {
    /// Lowercase label.
    pub fn as_str(&self) -> &str {
        match self {
            Category::Name => "name",
            Category::Date => "date",
            Category::Institution => "institution",
            Category::Other(label) => label,
        }
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "name" => Category::Name,
            "date" => Category::Date,
            "institution" => Category::Institution,
            _ => Category::Other(label),
        }
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Category::from(label.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, compiled detection pattern.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    category: Category,
    regex: Regex,
}

impl Rule {
    /// Compile a rule.
    ///
    /// # Errors
    /// [`Error::InvalidPattern`] if the pattern does not compile.
    pub fn new(name: impl Into<String>, category: Category, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
            rule: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            category,
            regex,
        })
    }

    /// Rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rule category.
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Source pattern.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the rule matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Immutable, ordered collection of rules. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Arc<[Rule]>,
}

impl RuleSet {
    /// Start building a rule set.
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    /// The baseline rule set: names, dates and institution terms.
    pub fn baseline() -> Result<Self> {
        RuleSetBuilder::new().with_defaults().build()
    }

    /// A rule set with no rules (matches nothing).
    pub fn empty() -> Self {
        Self {
            rules: Arc::from(Vec::new()),
        }
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Look up a rule by name.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// First rule, in declaration order, that matches `text`.
    pub fn first_match(&self, text: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.is_match(text))
    }

    /// A builder pre-populated with this set's rules.
    pub fn to_builder(&self) -> RuleSetBuilder {
        RuleSetBuilder {
            specs: self
                .rules
                .iter()
                .map(|r| RuleSpec {
                    name: r.name.clone(),
                    category: r.category.clone(),
                    pattern: r.pattern().to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct RuleSpec {
    name: String,
    category: Category,
    pattern: String,
}

/// Builder for [`RuleSet`]. Patterns are compiled in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct RuleSetBuilder {
    specs: Vec<RuleSpec>,
}

impl RuleSetBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the baseline rules.
    pub fn with_defaults(mut self) -> Self {
        for (name, category, pattern) in builtin::default_patterns() {
            self = self.add_pattern(name, category, pattern);
        }
        self.add_literals(
            "institution_terms",
            Category::Institution,
            DEFAULT_INSTITUTION_TERMS,
            false,
        )
    }

    /// Append a regular-expression rule.
    pub fn add_pattern(
        mut self,
        name: impl Into<String>,
        category: Category,
        pattern: impl Into<String>,
    ) -> Self {
        self.specs.push(RuleSpec {
            name: name.into(),
            category,
            pattern: pattern.into(),
        });
        self
    }

    /// Append a rule matching any of the literal `terms` on word boundaries.
    pub fn add_literals<S: AsRef<str>>(
        self,
        name: impl Into<String>,
        category: Category,
        terms: &[S],
        case_sensitive: bool,
    ) -> Self {
        let pattern = literal_pattern(terms, case_sensitive);
        self.add_pattern(name, category, pattern)
    }

    /// Remove every rule with the given name.
    pub fn remove(mut self, name: &str) -> Self {
        self.specs.retain(|s| s.name != name);
        self
    }

    /// Whether a rule with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.specs.iter().any(|s| s.name == name)
    }

    /// Compile all rules.
    ///
    /// # Errors
    /// [`Error::InvalidPattern`] for a pattern that does not compile,
    /// [`Error::Configuration`] for duplicate names or an empty literal list.
    pub fn build(self) -> Result<RuleSet> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(self.specs.len());

        for spec in self.specs {
            if spec.name.trim().is_empty() {
                return Err(Error::Configuration("rule name is empty".to_string()));
            }
            if !seen.insert(spec.name.clone()) {
                return Err(Error::Configuration(format!(
                    "duplicate rule name '{}'",
                    spec.name
                )));
            }
            if spec.pattern.is_empty() {
                return Err(Error::Configuration(format!(
                    "rule '{}' has an empty pattern",
                    spec.name
                )));
            }
            rules.push(Rule::new(spec.name, spec.category, &spec.pattern)?);
        }

        Ok(RuleSet {
            rules: Arc::from(rules),
        })
    }
}

/// Alternation of escaped terms, anchored on word boundaries where the term
/// edge is a word character.
fn literal_pattern<S: AsRef<str>>(terms: &[S], case_sensitive: bool) -> String {
    let alternatives: Vec<String> = terms
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .map(|term| {
            let lead = if term.starts_with(is_word_char) { r"\b" } else { "" };
            let trail = if term.ends_with(is_word_char) { r"\b" } else { "" };
            format!("{}{}{}", lead, regex::escape(term), trail)
        })
        .collect();

    if alternatives.is_empty() {
        return String::new();
    }

    let flags = if case_sensitive { "" } else { "(?i)" };
    format!("{}(?:{})", flags, alternatives.join("|"))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
