//! Font metrics and text decoding.

use std::collections::HashMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use super::afm::{standard_widths, StandardWidths};
use super::options::ExtractOptions;
use super::page_tree::{get_number, resolve};

/// Horizontal and vertical metrics of one font resource.
///
/// Widths are in thousandths of an em.
#[derive(Debug, Clone)]
pub(crate) struct FontMetrics {
    /// `BaseFont`, or the resource name when missing
    pub name: String,
    /// Two-byte codes (Type0 fonts)
    pub composite: bool,
    first_char: u32,
    widths: Vec<f32>,
    cid_widths: HashMap<u32, f32>,
    /// Built-in widths when a standard font has no `Widths` array
    standard: Option<StandardWidths>,
    default_width: f32,
    /// Ascent and descent as fractions of the font size
    pub ascent: f32,
    pub descent: f32,
}

impl FontMetrics {
    /// Metrics used when the font cannot be found or described.
    pub fn fallback(name: impl Into<String>, options: &ExtractOptions) -> Self {
        Self {
            name: name.into(),
            composite: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            standard: None,
            default_width: options.default_glyph_width,
            ascent: options.ascent,
            descent: options.descent,
        }
    }

    /// Read metrics from a font dictionary.
    pub fn from_dict(
        doc: &LopdfDocument,
        resource_name: &[u8],
        dict: &Dictionary,
        options: &ExtractOptions,
    ) -> Self {
        let name = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| resolve(doc, o).as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| String::from_utf8_lossy(resource_name).to_string());

        let mut metrics = Self::fallback(name, options);

        let subtype = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or_default();

        if subtype == b"Type0" {
            metrics.composite = true;
            if let Some(descendant) = descendant_font(doc, dict) {
                metrics.read_cid_widths(doc, descendant);
                metrics.read_descriptor(doc, descendant, options);
            }
        } else {
            metrics.read_simple_widths(doc, dict);
            metrics.read_descriptor(doc, dict, options);
        }

        metrics
    }

    fn read_simple_widths(&mut self, doc: &LopdfDocument, dict: &Dictionary) {
        self.first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| get_number(resolve(doc, o)))
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);

        if let Some(Object::Array(widths)) = dict.get(b"Widths").ok().map(|o| resolve(doc, o)) {
            self.widths = widths
                .iter()
                .map(|w| get_number(resolve(doc, w)).unwrap_or(self.default_width))
                .collect();
        } else {
            self.standard = standard_widths(&self.name);
            if self.standard.is_none() {
                log::debug!(
                    "font '{}' has no widths, using {} per glyph",
                    self.name,
                    self.default_width
                );
            }
        }
    }

    fn read_cid_widths(&mut self, doc: &LopdfDocument, cid_font: &Dictionary) {
        if let Some(dw) = cid_font.get(b"DW").ok().and_then(|o| get_number(resolve(doc, o))) {
            self.default_width = dw;
        }

        let Some(Object::Array(entries)) = cid_font.get(b"W").ok().map(|o| resolve(doc, o))
        else {
            return;
        };

        // Either `c [w1 w2 ...]` or `c_first c_last w`.
        let mut i = 0;
        while i < entries.len() {
            let Some(start) = get_number(resolve(doc, &entries[i])) else {
                break;
            };
            let start = start.max(0.0) as u32;
            match entries.get(i + 1).map(|o| resolve(doc, o)) {
                Some(Object::Array(widths)) => {
                    for (offset, w) in widths.iter().enumerate() {
                        if let Some(w) = get_number(resolve(doc, w)) {
                            self.cid_widths.insert(start + offset as u32, w);
                        }
                    }
                    i += 2;
                }
                Some(last) => {
                    let last = get_number(last).unwrap_or(start as f32).max(0.0) as u32;
                    let w = entries
                        .get(i + 2)
                        .and_then(|o| get_number(resolve(doc, o)))
                        .unwrap_or(self.default_width);
                    for cid in start..=last.max(start) {
                        self.cid_widths.insert(cid, w);
                    }
                    i += 3;
                }
                None => break,
            }
        }
    }

    fn read_descriptor(&mut self, doc: &LopdfDocument, dict: &Dictionary, options: &ExtractOptions) {
        let Some(Object::Dictionary(descriptor)) =
            dict.get(b"FontDescriptor").ok().map(|o| resolve(doc, o))
        else {
            return;
        };

        let value = |key: &[u8]| {
            descriptor
                .get(key)
                .ok()
                .and_then(|o| get_number(resolve(doc, o)))
        };

        if !self.composite {
            if let Some(missing) = value(b"MissingWidth") {
                self.default_width = missing;
            }
        }

        if options.use_font_descriptor {
            if let (Some(ascent), Some(descent)) = (value(b"Ascent"), value(b"Descent")) {
                if ascent > 0.0 {
                    self.ascent = ascent / 1000.0;
                    self.descent = descent.abs() / 1000.0;
                }
            }
        }
    }

    /// Split shown bytes into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.composite {
            bytes
                .chunks(2)
                .map(|c| match c {
                    [hi, lo] => u32::from(*hi) << 8 | u32::from(*lo),
                    [b] => u32::from(*b),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|&b| u32::from(b)).collect()
        }
    }

    /// Glyph width of `code` in thousandths of an em.
    pub fn width(&self, code: u32) -> f32 {
        if self.composite {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.default_width);
        }

        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .or_else(|| self.standard.and_then(|s| s.width(code)))
            .unwrap_or(self.default_width)
    }
}

fn descendant_font<'a>(doc: &'a LopdfDocument, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    match resolve(doc, dict.get(b"DescendantFonts").ok()?) {
        Object::Array(fonts) => resolve(doc, fonts.first()?).as_dict().ok(),
        _ => None,
    }
}

/// Decode shown bytes to text.
///
/// Uses the font's encoding when lopdf can provide one, otherwise
/// [`decode_text_simple`].
pub(crate) fn decode_shown_text(
    doc: &LopdfDocument,
    font: Option<&Dictionary>,
    bytes: &[u8],
) -> String {
    let encoding = font.and_then(|f| f.get_font_encoding(doc).ok());
    match encoding {
        Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
            .unwrap_or_else(|_| decode_text_simple(bytes)),
        None => decode_text_simple(bytes),
    }
}

/// Simple text decoding fallback when no encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK Symbols and Punctuation
        || (0x3000..=0x303F).contains(&code)
}
