//! Rendering options and configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Color;

/// How matched text is redacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionStrategy {
    /// Paint opaque rectangles over matched runs. The text stays in the
    /// content stream and can still be selected or extracted.
    #[default]
    VisualOverlay,
    /// Paint the rectangles and also replace the operators that showed the
    /// matched runs, so the strings are gone from the page content.
    ContentRemoval,
}

impl RedactionStrategy {
    /// Whether matched strings are removed from page content.
    pub fn removes_text(self) -> bool {
        matches!(self, RedactionStrategy::ContentRemoval)
    }

    /// What the strategy does and does not promise.
    pub fn guarantee(self) -> &'static str {
        match self {
            RedactionStrategy::VisualOverlay => {
                "visual occlusion only: matched text remains in the document and can be extracted"
            }
            RedactionStrategy::ContentRemoval => {
                "matched text is removed from page content streams; form XObjects, annotations and metadata are not modified"
            }
        }
    }

    /// Short name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            RedactionStrategy::VisualOverlay => "overlay",
            RedactionStrategy::ContentRemoval => "remove",
        }
    }
}

impl fmt::Display for RedactionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedactionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overlay" | "visual_overlay" => Ok(RedactionStrategy::VisualOverlay),
            "remove" | "content_removal" => Ok(RedactionStrategy::ContentRemoval),
            other => Err(Error::Configuration(format!(
                "unknown redaction strategy '{}'",
                other
            ))),
        }
    }
}

/// Options for the redaction renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Redaction strategy
    pub strategy: RedactionStrategy,

    /// Height multiplier for marks (at least 1.0)
    pub margin_factor: f32,

    /// Mark fill color
    pub fill: Color,

    /// How far (in points) a run may extend past the page before rendering fails
    pub bounds_tolerance: f32,

    /// Flate-compress generated content streams
    pub compress: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the redaction strategy.
    pub fn with_strategy(mut self, strategy: RedactionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the mark height multiplier.
    pub fn with_margin_factor(mut self, factor: f32) -> Self {
        self.margin_factor = factor;
        self
    }

    /// Set the mark fill color.
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    /// Set the out-of-page tolerance.
    pub fn with_bounds_tolerance(mut self, tolerance: f32) -> Self {
        self.bounds_tolerance = tolerance;
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Check option values.
    ///
    /// # Errors
    /// [`Error::Configuration`] for a margin factor below 1.0, a negative
    /// tolerance or a fill color outside `0.0..=1.0`.
    pub fn validate(&self) -> Result<()> {
        if !self.margin_factor.is_finite() || self.margin_factor < 1.0 {
            return Err(Error::Configuration(format!(
                "margin factor must be at least 1.0, got {}",
                self.margin_factor
            )));
        }
        if !self.bounds_tolerance.is_finite() || self.bounds_tolerance < 0.0 {
            return Err(Error::Configuration(format!(
                "bounds tolerance must be non-negative, got {}",
                self.bounds_tolerance
            )));
        }
        if !self.fill.is_valid() {
            return Err(Error::Configuration(
                "fill color components must be within 0.0..=1.0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strategy: RedactionStrategy::VisualOverlay,
            margin_factor: 1.2,
            fill: Color::BLACK,
            bounds_tolerance: 2.0,
            compress: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            "overlay".parse::<RedactionStrategy>().unwrap(),
            RedactionStrategy::VisualOverlay
        );
        assert_eq!(
            "Remove".parse::<RedactionStrategy>().unwrap(),
            RedactionStrategy::ContentRemoval
        );
        assert!("shred".parse::<RedactionStrategy>().is_err());
    }

    #[test]
    fn test_overlay_does_not_claim_removal() {
        let strategy = RedactionStrategy::default();
        assert!(!strategy.removes_text());
        assert!(strategy.guarantee().contains("remains"));
        assert!(RedactionStrategy::ContentRemoval.removes_text());
    }

    #[test]
    fn test_validate() {
        assert!(RenderOptions::default().validate().is_ok());
        assert!(RenderOptions::new().with_margin_factor(0.9).validate().is_err());
        assert!(RenderOptions::new().with_bounds_tolerance(-1.0).validate().is_err());
        assert!(RenderOptions::new()
            .with_fill(Color::rgb(2.0, 0.0, 0.0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_strategy_serializes_snake_case() {
        let json = serde_json::to_string(&RedactionStrategy::ContentRemoval).unwrap();
        assert_eq!(json, "\"content_removal\"");
    }
}
