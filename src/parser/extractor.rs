//! Text layout extraction.
//!
//! Interprets each page's content stream and emits one [`TextRun`] per
//! text-showing operator, positioned by the text matrix and CTM in effect
//! when the operator ran.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::fonts::{decode_shown_text, is_spaceless_script_char, FontMetrics};
use super::options::ExtractOptions;
use super::page_tree::{self, get_number, PageBox};
use super::state::{GraphicsState, Matrix, TextObject};
use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::{Document, Page, RunOrigin, ShowOperator, TextRun};

/// Extract positioned text runs from PDF bytes with default options.
///
/// # Example
///
/// ```no_run
/// let bytes = std::fs::read("visit-summary.pdf").unwrap();
/// let doc = pdfredact::parser::extract(&bytes).unwrap();
/// for (page, run) in doc.runs() {
///     println!("p{} ({:.1}, {:.1}) {}", page, run.x, run.y, run.text);
/// }
/// ```
pub fn extract(data: &[u8]) -> Result<Document> {
    TextLayoutExtractor::default().extract(data)
}

/// Load a PDF, rejecting encrypted documents.
pub(crate) fn load_document(data: &[u8]) -> Result<LopdfDocument> {
    detect_format_from_bytes(data)?;
    let doc = LopdfDocument::load_mem(data)?;
    if doc.is_encrypted() {
        return Err(Error::Encrypted);
    }
    Ok(doc)
}

/// Text layout extractor.
#[derive(Debug, Clone, Default)]
pub struct TextLayoutExtractor {
    options: ExtractOptions,
}

impl TextLayoutExtractor {
    /// Create an extractor with the given options.
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// The extractor's options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract every page of a PDF.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] or [`Error::Encrypted`] if the bytes cannot be
    /// opened, [`Error::Extraction`] if a page's content cannot be interpreted.
    pub fn extract(&self, data: &[u8]) -> Result<Document> {
        let doc = load_document(data)?;
        self.extract_loaded(&doc)
    }

    /// Extract from an already loaded document.
    pub(crate) fn extract_loaded(&self, doc: &LopdfDocument) -> Result<Document> {
        let mut document = Document::new();
        document.version = doc.version.clone();

        for (page_num, page_id) in doc.get_pages() {
            let page = self.extract_page(doc, page_num, page_id)?;
            log::debug!("page {}: {} text runs", page_num, page.runs.len());
            document.add_page(page);
        }

        Ok(document)
    }

    fn extract_page(&self, doc: &LopdfDocument, page_num: u32, page_id: ObjectId) -> Result<Page> {
        let page_box = page_tree::media_box(doc, page_id);
        let mut page = Page::new(page_num, page_box.width, page_box.height);
        page.rotation = page_tree::rotation(doc, page_id);

        if page.is_rotated() {
            log::warn!(
                "page {} has /Rotate {}; positions are reported in unrotated user space",
                page_num,
                page.rotation
            );
        }

        let content = page_tree::page_content(doc, page_num, page_id)?;
        if content.is_empty() {
            return Ok(page);
        }

        let fonts = doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::extraction(page_num, format!("cannot read fonts: {}", e)))?;

        let operations = Content::decode(&content)
            .map_err(|e| Error::extraction(page_num, format!("cannot decode content: {}", e)))?
            .operations;

        let mut interpreter = ContentInterpreter::new(doc, &fonts, &self.options, page_box);
        for (index, op) in operations.iter().enumerate() {
            interpreter.apply(index, &op.operator, &op.operands);
        }

        page.runs = interpreter.runs;
        Ok(page)
    }
}

/// Walks the operations of one page.
struct ContentInterpreter<'a> {
    doc: &'a LopdfDocument,
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
    metrics: HashMap<Vec<u8>, Rc<FontMetrics>>,
    options: &'a ExtractOptions,
    page_box: PageBox,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text: TextObject,
    in_text_block: bool,
    runs: Vec<TextRun>,
}

impl<'a> ContentInterpreter<'a> {
    fn new(
        doc: &'a LopdfDocument,
        fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
        options: &'a ExtractOptions,
        page_box: PageBox,
    ) -> Self {
        Self {
            doc,
            fonts,
            metrics: HashMap::new(),
            options,
            page_box,
            state: GraphicsState::default(),
            stack: Vec::new(),
            text: TextObject::default(),
            in_text_block: false,
            runs: Vec::new(),
        }
    }

    fn apply(&mut self, index: usize, operator: &str, operands: &[Object]) {
        let number = |i: usize| operands.get(i).and_then(get_number);

        match operator {
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(saved) = self.stack.pop() {
                    self.state = saved;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.state.ctm = m.multiply(&self.state.ctm);
                }
            }
            "BT" => {
                self.in_text_block = true;
                self.text = TextObject::default();
            }
            "ET" => self.in_text_block = false,
            "Tf" => {
                if let Some(Object::Name(font_name)) = operands.first() {
                    self.state.text.font = Some(font_name.clone());
                }
                if let Some(size) = number(1) {
                    self.state.text.font_size = size;
                }
            }
            "Tc" => {
                if let Some(v) = number(0) {
                    self.state.text.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = number(0) {
                    self.state.text.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = number(0) {
                    self.state.text.horizontal_scale = v / 100.0;
                }
            }
            "TL" => {
                if let Some(v) = number(0) {
                    self.state.text.leading = v;
                }
            }
            "Ts" => {
                if let Some(v) = number(0) {
                    self.state.text.rise = v;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (number(0), number(1)) {
                    if operator == "TD" {
                        self.state.text.leading = -ty;
                    }
                    self.text.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.text.set(m);
                }
            }
            "T*" => self.next_line(),
            "Tj" => self.show(index, ShowOperator::ShowText, &operands[..operands.len().min(1)]),
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show(index, ShowOperator::ShowTextAdjusted, items);
                }
            }
            "'" => {
                self.next_line();
                self.show(index, ShowOperator::NextLineShow, &operands[..operands.len().min(1)]);
            }
            "\"" => {
                let (Some(word_spacing), Some(char_spacing)) = (number(0), number(1)) else {
                    return;
                };
                self.state.text.word_spacing = word_spacing;
                self.state.text.char_spacing = char_spacing;
                self.next_line();
                let shown = operands.get(2..3).unwrap_or_default();
                self.show(
                    index,
                    ShowOperator::SpacedNextLineShow {
                        word_spacing,
                        char_spacing,
                    },
                    shown,
                );
            }
            _ => {}
        }
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.text.move_line(0.0, -leading);
    }

    /// Metrics of the current font, computed once per resource name.
    fn current_metrics(&mut self) -> Rc<FontMetrics> {
        let key = self.state.text.font.clone().unwrap_or_default();
        let (doc, fonts, options) = (self.doc, self.fonts, self.options);
        let metrics = self.metrics.entry(key).or_insert_with_key(|key| {
            let metrics = match fonts.get(key) {
                Some(dict) => FontMetrics::from_dict(doc, key, dict, options),
                None => {
                    log::debug!(
                        "font resource '{}' not found, using fallback metrics",
                        String::from_utf8_lossy(key)
                    );
                    FontMetrics::fallback(String::from_utf8_lossy(key), options)
                }
            };
            Rc::new(metrics)
        });
        Rc::clone(metrics)
    }

    /// Show strings (and `TJ` adjustments), emit a run, advance the text matrix.
    fn show(&mut self, index: usize, operator: ShowOperator, elements: &[Object]) {
        let metrics = self.current_metrics();
        let font_dict = self
            .state
            .text
            .font
            .as_ref()
            .and_then(|name| self.fonts.get(name))
            .copied();

        let ts = &self.state.text;
        let size = ts.font_size;
        let mut text = String::new();
        let mut advance = 0.0f32;

        for element in elements {
            match element {
                Object::String(bytes, _) => {
                    text.push_str(&decode_shown_text(self.doc, font_dict, bytes));
                    for code in metrics.codes(bytes) {
                        advance += metrics.width(code) / 1000.0 * size + ts.char_spacing;
                        if code == 32 && !metrics.composite {
                            advance += ts.word_spacing;
                        }
                    }
                }
                Object::Integer(_) | Object::Real(_) => {
                    let n = get_number(element).unwrap_or(0.0);
                    advance -= n / 1000.0 * size;
                    // Large negative adjustments usually stand in for word spaces
                    if -n > self.options.tj_space_threshold
                        && !text.is_empty()
                        && !text.ends_with(' ')
                        && !text.ends_with('\u{00A0}')
                        && !text.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        text.push(' ');
                    }
                }
                _ => {}
            }
        }

        let start = self.text.tm;
        let horizontal_scale = ts.horizontal_scale;
        let rise = ts.rise;
        self.text.advance(advance * horizontal_scale);

        if !self.in_text_block || text.trim().is_empty() {
            return;
        }

        let trm = start.multiply(&self.state.ctm);
        let right = advance * horizontal_scale;
        let bottom = rise - metrics.descent * size;
        let top = rise + metrics.ascent * size;
        let corners = [
            trm.transform(0.0, bottom),
            trm.transform(right, bottom),
            trm.transform(0.0, top),
            trm.transform(right, top),
        ];

        let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);
        let (_, baseline) = trm.transform(0.0, rise);

        let run = TextRun::new(
            text,
            min_x - self.page_box.x0,
            self.page_box.height - (max_y - self.page_box.y0),
            max_x - min_x,
            max_y - min_y,
            metrics.name.clone(),
        )
        .with_baseline(baseline - self.page_box.y0)
        .with_origin(RunOrigin {
            op_index: index,
            operator,
            advance,
            font_size: size,
        });

        log::trace!("run {:?} at ({:.1}, {:.1})", run.text, run.x, run.y);
        self.runs.push(run);
    }
}
