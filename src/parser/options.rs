//! Extraction options.

/// Options for the text layout extractor.
///
/// Glyph metrics are in thousandths of an em, like PDF font `Widths`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Ascent above the baseline, as a fraction of the font size
    pub ascent: f32,

    /// Descent below the baseline, as a fraction of the font size
    pub descent: f32,

    /// Glyph width used when a font carries no width information and is not
    /// one of the standard 14. Errs wide so marks over-cover.
    pub default_glyph_width: f32,

    /// `TJ` adjustment (thousandths of an em) treated as a word break
    pub tj_space_threshold: f32,

    /// Read `Ascent`/`Descent` from font descriptors when present
    pub use_font_descriptor: bool,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ascent and descent fractions.
    pub fn with_vertical_metrics(mut self, ascent: f32, descent: f32) -> Self {
        self.ascent = ascent.max(0.0);
        self.descent = descent.max(0.0);
        self
    }

    /// Set the fallback glyph width.
    pub fn with_default_glyph_width(mut self, width: f32) -> Self {
        self.default_glyph_width = width.max(0.0);
        self
    }

    /// Set the `TJ` word-break threshold.
    pub fn with_tj_space_threshold(mut self, threshold: f32) -> Self {
        self.tj_space_threshold = threshold;
        self
    }

    /// Ignore font descriptors and always use the fixed ascent/descent.
    pub fn fixed_vertical_metrics(mut self) -> Self {
        self.use_font_descriptor = false;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            ascent: 0.8,
            descent: 0.2,
            default_glyph_width: 1000.0,
            tj_space_threshold: 200.0,
            use_font_descriptor: true,
        }
    }
}
