//! Overlay content streams and the page resources they need.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use super::stamp::{StampConfig, StampPlacement};
use crate::error::{Error, Result};
use crate::model::{Color, RedactionMark};
use crate::parser::page_tree::{effective_resources, page_content, resolve};

/// Resource name of the stamp font on every page.
pub(crate) const STAMP_FONT: &str = "RdxStampFont";
/// Resource name of the stamp transparency state on every page.
pub(crate) const STAMP_GS: &str = "RdxStampGS";

/// Shared objects referenced by every page's overlay.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OverlayResources {
    font_id: ObjectId,
    gs_id: ObjectId,
}

impl OverlayResources {
    /// Add the stamp font and graphics state to the document once.
    pub fn install(doc: &mut LopdfDocument, stamp: &StampConfig) -> Self {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let gs_id = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => Object::Real(stamp.opacity),
            "CA" => Object::Real(stamp.opacity),
        });
        Self { font_id, gs_id }
    }

    /// Wrap the page's existing content in `q`/`Q`, append `overlay`, and
    /// give the page its own resource dictionary with the stamp entries.
    ///
    /// Saves the page content leaves open are restored before the wrapper's
    /// own `Q`, so the overlay always runs under the default CTM.
    pub fn attach(
        &self,
        doc: &mut LopdfDocument,
        page_num: u32,
        page_id: ObjectId,
        overlay: Vec<Operation>,
        compress: bool,
    ) -> Result<()> {
        let open_saves = open_save_depth(doc, page_num, page_id)?;
        if open_saves > 0 {
            log::debug!("page {}: closing {} unbalanced q", page_num, open_saves);
        }

        let mut resources = effective_resources(doc, page_id);
        let fonts = merged_subdict(doc, &resources, b"Font", STAMP_FONT, self.font_id);
        let states = merged_subdict(doc, &resources, b"ExtGState", STAMP_GS, self.gs_id);
        resources.set("Font", fonts);
        resources.set("ExtGState", states);

        let existing = existing_contents(doc, page_id);

        let open_id = doc.add_object(content_stream(vec![Operation::new("q", vec![])], compress)?);
        let mut closing = Vec::with_capacity(overlay.len() + open_saves + 1);
        closing.extend((0..=open_saves).map(|_| Operation::new("Q", vec![])));
        closing.extend(overlay);
        let close_id = doc.add_object(content_stream(closing, compress)?);

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(open_id));
        contents.extend(existing);
        contents.push(Object::Reference(close_id));

        let page = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| Error::Serialize(format!("cannot update page object: {}", e)))?;
        page.set("Resources", resources);
        page.set("Contents", contents);
        Ok(())
    }
}

fn merged_subdict(
    doc: &LopdfDocument,
    resources: &Dictionary,
    key: &[u8],
    name: &str,
    id: ObjectId,
) -> Dictionary {
    let mut dict = resources
        .get(key)
        .ok()
        .and_then(|o| resolve(doc, o).as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new);
    dict.set(name, id);
    dict
}

/// Graphics states the page's content saves but never restores.
fn open_save_depth(doc: &LopdfDocument, page_num: u32, page_id: ObjectId) -> Result<usize> {
    let content = page_content(doc, page_num, page_id)?;
    if content.is_empty() {
        return Ok(0);
    }
    let operations = Content::decode(&content)
        .map_err(|e| Error::extraction(page_num, format!("cannot decode content: {}", e)))?
        .operations;
    Ok(unbalanced_saves(&operations))
}

/// Depth of the `q` stack after `operations`. Stray `Q`s are ignored, as
/// viewers do.
pub(crate) fn unbalanced_saves(operations: &[Operation]) -> usize {
    operations
        .iter()
        .fold(0usize, |depth, op| match op.operator.as_str() {
            "q" => depth + 1,
            "Q" => depth.saturating_sub(1),
            _ => depth,
        })
}

/// The page's content streams as references, in paint order.
fn existing_contents(doc: &LopdfDocument, page_id: ObjectId) -> Vec<Object> {
    let Ok(contents) = doc.get_dictionary(page_id).and_then(|d| d.get(b"Contents")) else {
        return Vec::new();
    };
    match resolve(doc, contents) {
        Object::Array(parts) => parts.clone(),
        Object::Stream(_) => vec![contents.clone()],
        _ => Vec::new(),
    }
}

/// Operations painting the marks, then the stamp on top of them.
pub(crate) fn overlay_operations(
    marks: &[RedactionMark],
    stamp: &StampConfig,
    placement: &StampPlacement,
    origin: (f32, f32),
) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(marks.len() * 5 + 9);

    for mark in marks {
        ops.push(Operation::new("q", vec![]));
        ops.push(fill_color(mark.color));
        ops.push(Operation::new(
            "re",
            vec![
                Object::Real(mark.rect.x + origin.0),
                Object::Real(mark.rect.y + origin.1),
                Object::Real(mark.rect.width),
                Object::Real(mark.rect.height),
            ],
        ));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("gs", vec![Object::Name(STAMP_GS.as_bytes().to_vec())]));
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![
            Object::Name(STAMP_FONT.as_bytes().to_vec()),
            Object::Real(stamp.font_size),
        ],
    ));
    ops.push(fill_color(stamp.color));
    ops.push(Operation::new(
        "Td",
        vec![
            Object::Real(placement.x + origin.0),
            Object::Real(placement.y + origin.1),
        ],
    ));
    ops.push(Operation::new("Tj", vec![Object::string_literal(stamp.text.as_str())]));
    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));

    ops
}

fn fill_color(color: Color) -> Operation {
    Operation::new(
        "rg",
        vec![
            Object::Real(color.r),
            Object::Real(color.g),
            Object::Real(color.b),
        ],
    )
}

/// Encode operations as a content stream, Flate-compressed if requested.
pub(crate) fn content_stream(operations: Vec<Operation>, compress: bool) -> Result<Stream> {
    let data = Content { operations }
        .encode()
        .map_err(|e| Error::Serialize(format!("cannot encode content stream: {}", e)))?;

    if !compress {
        return Ok(Stream::new(dictionary! {}, data));
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&data)
        .map_err(|e| Error::Serialize(format!("cannot compress content stream: {}", e)))?;
    let compressed = encoder
        .finish()
        .map_err(|e| Error::Serialize(format!("cannot compress content stream: {}", e)))?;

    Ok(Stream::new(
        dictionary! { "Filter" => "FlateDecode" },
        compressed,
    ))
}
