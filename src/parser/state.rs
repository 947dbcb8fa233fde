//! Matrices and graphics/text state for content-stream interpretation.

use lopdf::Object;

use super::page_tree::get_number;

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32, // X translation
    pub f: f32, // Y translation
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// Read six numeric operands; `None` if any is missing.
    pub fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6].iter().filter_map(get_number).collect();
        if n.len() < 6 {
            return None;
        }
        Some(Self {
            a: n[0],
            b: n[1],
            c: n[2],
            d: n[3],
            e: n[4],
            f: n[5],
        })
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn transform(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Text state parameters, saved and restored with `q`/`Q`.
#[derive(Debug, Clone)]
pub(crate) struct TextState {
    pub char_spacing: f32,
    pub word_spacing: f32,
    /// `Tz / 100`
    pub horizontal_scale: f32,
    pub leading: f32,
    pub rise: f32,
    pub font: Option<Vec<u8>>,
    pub font_size: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
            font: None,
            font_size: 12.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct GraphicsState {
    pub ctm: Matrix,
    pub text: TextState,
}

/// Text and line matrices of the current `BT`/`ET` block.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TextObject {
    pub tm: Matrix,
    pub tlm: Matrix,
}

impl TextObject {
    /// `Td`: move to the start of the next line, offset by `(tx, ty)`.
    pub fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    /// `Tm`
    pub fn set(&mut self, m: Matrix) {
        self.tlm = m;
        self.tm = m;
    }

    /// Advance the text matrix horizontally after showing glyphs.
    pub fn advance(&mut self, tx: f32) {
        self.tm = Matrix::translation(tx, 0.0).multiply(&self.tm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_translation_then_scale() {
        let m = Matrix::translation(10.0, 20.0).multiply(&Matrix {
            a: 2.0,
            d: 2.0,
            ..Matrix::IDENTITY
        });
        assert_eq!(m.transform(0.0, 0.0), (20.0, 40.0));
        assert_eq!(m.transform(1.0, 1.0), (22.0, 42.0));
    }

    #[test]
    fn test_text_object_moves() {
        let mut text = TextObject::default();
        text.move_line(72.0, 700.0);
        text.advance(30.0);
        assert_eq!(text.tm.transform(0.0, 0.0), (102.0, 700.0));
        assert_eq!(text.tlm.transform(0.0, 0.0), (72.0, 700.0));

        text.move_line(0.0, -14.0);
        assert_eq!(text.tm.transform(0.0, 0.0), (72.0, 686.0));
    }

    #[test]
    fn test_from_operands() {
        let ops: Vec<Object> = vec![1.into(), 0.into(), 0.into(), 1.into(), 5.into(), Object::Real(6.5)];
        let m = Matrix::from_operands(&ops).unwrap();
        assert_eq!(m.transform(0.0, 0.0), (5.0, 6.5));
        assert!(Matrix::from_operands(&ops[..3]).is_none());
    }
}
