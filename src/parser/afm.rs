//! Built-in widths for the standard 14 fonts.
//!
//! Producers may reference a standard font by `BaseFont` alone, without a
//! `Widths` array. Widths below come from the Adobe AFM files and cover the
//! printable ASCII codes 32..=126. Where `StandardEncoding` and
//! `WinAnsiEncoding` name different glyphs (codes 39 and 96), the wider one is
//! used.

const FIRST: u32 = 32;
const LAST: u32 = 126;

/// A standard font's width table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StandardWidths {
    Table(&'static [u16; 95]),
    /// Courier family
    Monospaced(u16),
}

impl StandardWidths {
    /// Width of `code`, or `None` outside the covered range.
    pub fn width(&self, code: u32) -> Option<f32> {
        if !(FIRST..=LAST).contains(&code) {
            return None;
        }
        match self {
            Self::Table(widths) => Some(f32::from(widths[(code - FIRST) as usize])),
            Self::Monospaced(width) => Some(f32::from(*width)),
        }
    }
}

/// Look up a standard font by `BaseFont` name.
///
/// A subset tag (`ABCDEF+`) is ignored. Symbol and ZapfDingbats are not
/// covered: their codes do not map to the Latin glyphs above.
pub(crate) fn standard_widths(base_font: &str) -> Option<StandardWidths> {
    let name = strip_subset_prefix(base_font);
    let widths = match name {
        "Helvetica" | "Helvetica-Oblique" | "Arial" | "ArialMT" | "Arial-ItalicMT" => {
            StandardWidths::Table(&HELVETICA)
        }
        "Helvetica-Bold" | "Helvetica-BoldOblique" | "Arial-BoldMT" | "Arial-BoldItalicMT" => {
            StandardWidths::Table(&HELVETICA_BOLD)
        }
        "Times-Roman" | "TimesNewRomanPSMT" => StandardWidths::Table(&TIMES_ROMAN),
        "Times-Bold" | "TimesNewRomanPS-BoldMT" => StandardWidths::Table(&TIMES_BOLD),
        "Times-Italic" | "TimesNewRomanPS-ItalicMT" => StandardWidths::Table(&TIMES_ITALIC),
        "Times-BoldItalic" | "TimesNewRomanPS-BoldItalicMT" => {
            StandardWidths::Table(&TIMES_BOLD_ITALIC)
        }
        "Courier" | "Courier-Bold" | "Courier-Oblique" | "Courier-BoldOblique" | "CourierNewPSMT" => {
            StandardWidths::Monospaced(600)
        }
        _ => return None,
    };
    Some(widths)
}

fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

/// Helvetica and Helvetica-Oblique.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 222, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold and Helvetica-BoldOblique.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 278, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Times-Roman.
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 333, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

/// Times-Bold.
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 333, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

/// Times-Italic.
const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 333, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

/// Times-BoldItalic.
const TIMES_BOLD_ITALIC: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 333, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    832, 667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722,
    611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333, 278, 333, 570, 500,
    333, 500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500,
    500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn text_width(widths: StandardWidths, text: &str) -> f32 {
        text.bytes().filter_map(|b| widths.width(u32::from(b))).sum()
    }

    #[test]
    fn test_helvetica_widths() {
        let widths = standard_widths("Helvetica").unwrap();
        assert_eq!(widths.width(u32::from(b'W')), Some(944.0));
        assert_eq!(widths.width(u32::from(b'i')), Some(222.0));
        assert_eq!(widths.width(u32::from(b' ')), Some(278.0));
        assert_eq!(text_width(widths, "Jane Doe"), 4280.0);
    }

    #[test]
    fn test_variants_and_subsets() {
        assert_eq!(standard_widths("Helvetica-Oblique"), standard_widths("Helvetica"));
        assert_eq!(standard_widths("ABCDEF+Times-Bold"), standard_widths("Times-Bold"));
        assert_eq!(
            standard_widths("Courier-BoldOblique"),
            Some(StandardWidths::Monospaced(600))
        );
        // Not a subset tag
        assert_eq!(standard_widths("abc+Helvetica"), None);
    }

    #[test]
    fn test_uncovered_fonts_and_codes() {
        assert_eq!(standard_widths("Symbol"), None);
        assert_eq!(standard_widths("ZapfDingbats"), None);
        assert_eq!(standard_widths("NotoSans-Regular"), None);

        let widths = standard_widths("Times-Roman").unwrap();
        assert_eq!(widths.width(31), None);
        assert_eq!(widths.width(0xE9), None);
        assert_eq!(widths.width(126), Some(541.0));
    }
}
