//! Detection results and the occlusion geometry derived from them.

use serde::{Deserialize, Serialize};

use super::TextRun;
use crate::rules::Category;

/// Axis-aligned rectangle `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Lower edge in user space (or upper edge in layout space)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Upper edge in user space.
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.top() <= self.top()
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[x={:.2} y={:.2} w={:.2} h={:.2}]",
            self.x, self.y, self.width, self.height
        )
    }
}

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    /// Create a color from components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub(crate) fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// A text run that satisfied a detection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// 1-based page number
    pub page: u32,
    /// Name of the rule that matched
    pub rule: String,
    /// Category of the rule that matched
    pub category: Category,
    /// Copy of the originating run (text and geometry)
    pub run: TextRun,
}

impl Match {
    /// The matched run's text.
    pub fn text(&self) -> &str {
        &self.run.text
    }
}

/// Geometric occlusion instruction derived from a [`Match`].
///
/// `rect` is in PDF user space (origin bottom-left) relative to the MediaBox
/// origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RedactionMark {
    /// 1-based page number
    pub page: u32,
    /// Painted rectangle
    pub rect: Rect,
    /// Fill color
    pub color: Color,
    /// Fill opacity, always 1.0
    pub opacity: f32,
}

impl RedactionMark {
    /// Derive a mark from a match on a page of the given height.
    ///
    /// `rect_y = page_height - run_y - run_height`, then the height is scaled
    /// by `margin_factor` around the run's vertical center so ascenders and
    /// descenders are covered.
    pub fn from_match(m: &Match, page_height: f32, margin_factor: f32, color: Color) -> Self {
        let bbox = m.run.user_space_bbox(page_height);
        let factor = margin_factor.max(1.0);
        let height = bbox.height * factor;
        let y = bbox.y - (height - bbox.height) / 2.0;

        Self {
            page: m.page,
            rect: Rect::new(bbox.x, y, bbox.width, height),
            color,
            opacity: 1.0,
        }
    }
}
