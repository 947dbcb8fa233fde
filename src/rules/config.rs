//! JSON rule-set configuration.
//!
//! ```json
//! {
//!   "include_defaults": true,
//!   "disable": ["bare_name"],
//!   "rules": [{ "name": "mrn", "category": "identifier", "pattern": "\\bMRN\\d{7}\\b" }],
//!   "literals": [{ "name": "local_orgs", "category": "institution", "terms": ["Mercy West"] }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::{Category, RuleSet, RuleSetBuilder};
use crate::error::{Error, Result};

/// Serializable description of a [`RuleSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSetConfig {
    /// Start from the baseline rules
    pub include_defaults: bool,
    /// Names of rules to drop (applied after defaults, before additions)
    pub disable: Vec<String>,
    /// Extra regular-expression rules, appended in order
    pub rules: Vec<PatternRuleConfig>,
    /// Extra literal-term rules, appended after `rules`
    pub literals: Vec<LiteralRuleConfig>,
}

impl Default for RuleSetConfig {
    fn default() -> Self {
        Self {
            include_defaults: true,
            disable: Vec::new(),
            rules: Vec::new(),
            literals: Vec::new(),
        }
    }
}

/// A regular-expression rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternRuleConfig {
    /// Unique rule name
    pub name: String,
    /// Category label
    pub category: Category,
    /// Regular expression (Rust `regex` syntax)
    pub pattern: String,
}

/// A literal-term rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LiteralRuleConfig {
    /// Unique rule name
    pub name: String,
    /// Category label
    pub category: Category,
    /// Terms matched on word boundaries
    pub terms: Vec<String>,
    /// Match case exactly
    #[serde(default)]
    pub case_sensitive: bool,
}

impl RuleSetConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    /// [`Error::Configuration`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("invalid rule configuration: {}", e)))
    }

    /// Convert into a builder.
    ///
    /// # Errors
    /// [`Error::Configuration`] if `disable` names a rule that does not exist.
    pub fn into_builder(self) -> Result<RuleSetBuilder> {
        let mut builder = if self.include_defaults {
            RuleSetBuilder::new().with_defaults()
        } else {
            RuleSetBuilder::new()
        };

        for name in &self.disable {
            if !builder.contains(name) {
                return Err(Error::Configuration(format!(
                    "cannot disable unknown rule '{}'",
                    name
                )));
            }
            builder = builder.remove(name);
        }

        for rule in self.rules {
            builder = builder.add_pattern(rule.name, rule.category, rule.pattern);
        }
        for literal in self.literals {
            builder = builder.add_literals(
                literal.name,
                literal.category,
                literal.terms.as_slice(),
                literal.case_sensitive,
            );
        }

        Ok(builder)
    }

    /// Compile the configured rule set.
    pub fn build(self) -> Result<RuleSet> {
        self.into_builder()?.build()
    }
}

impl RuleSet {
    /// Parse and compile a rule set from JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        RuleSetConfig::from_json(json)?.build()
    }
}
