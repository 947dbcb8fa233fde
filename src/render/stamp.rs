//! Compliance stamp drawn on every output page.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Color;

/// Default stamp text.
pub const DEFAULT_STAMP_TEXT: &str = "HIPAA COMPLIANT";

/// Stamp text, style and position.
///
/// The stamp's left edge sits at `page_width / 2 - half_width_offset`, an
/// approximate centering for the default text, and its baseline at
/// `baseline_offset` above the bottom of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampConfig {
    /// Text to draw (printable ASCII)
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Fill color
    pub color: Color,
    /// Fill opacity in `(0.0, 1.0]`
    pub opacity: f32,
    /// Offset subtracted from the horizontal page center
    pub half_width_offset: f32,
    /// Baseline distance from the page bottom
    pub baseline_offset: f32,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            text: DEFAULT_STAMP_TEXT.to_string(),
            font_size: 20.0,
            color: Color::rgb(0.0, 0.5, 0.0),
            opacity: 0.7,
            half_width_offset: 80.0,
            baseline_offset: 30.0,
        }
    }
}

impl StampConfig {
    /// Default style with different text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set the fill color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the fill opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the position offsets.
    pub fn with_offsets(mut self, half_width_offset: f32, baseline_offset: f32) -> Self {
        self.half_width_offset = half_width_offset;
        self.baseline_offset = baseline_offset;
        self
    }

    /// Check the stamp can be drawn with the built-in Helvetica font.
    ///
    /// # Errors
    /// [`Error::Configuration`] if the text is empty or not printable ASCII,
    /// the font size is not positive, or the opacity is outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::Configuration("stamp text is empty".to_string()));
        }
        if !self.text.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
            return Err(Error::Configuration(
                "stamp text must be printable ASCII".to_string(),
            ));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(Error::Configuration(format!(
                "stamp font size must be positive, got {}",
                self.font_size
            )));
        }
        if !(self.opacity > 0.0 && self.opacity <= 1.0) {
            return Err(Error::Configuration(format!(
                "stamp opacity must be within (0, 1], got {}",
                self.opacity
            )));
        }
        if !self.color.is_valid() {
            return Err(Error::Configuration(
                "stamp color components must be within 0.0..=1.0".to_string(),
            ));
        }
        Ok(())
    }

    /// Where the stamp lands on a page of the given width.
    pub fn placement(&self, page: u32, page_width: f32) -> StampPlacement {
        StampPlacement {
            page,
            x: page_width / 2.0 - self.half_width_offset,
            y: self.baseline_offset,
        }
    }
}

/// A drawn stamp: page and baseline origin relative to the MediaBox origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StampPlacement {
    /// 1-based page number
    pub page: u32,
    /// Left edge
    pub x: f32,
    /// Baseline
    pub y: f32,
}
