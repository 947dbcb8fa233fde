//! Page-tree helpers shared by the extractor and the renderer.

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

/// Guards against reference cycles in malformed files.
const MAX_DEPTH: usize = 32;

/// Letter size, used when no MediaBox can be found.
const DEFAULT_MEDIA_BOX: PageBox = PageBox {
    x0: 0.0,
    y0: 0.0,
    width: 612.0,
    height: 792.0,
};

/// Normalized MediaBox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PageBox {
    pub x0: f32,
    pub y0: f32,
    pub width: f32,
    pub height: f32,
}

/// Follow indirect references to the underlying object.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    for _ in 0..MAX_DEPTH {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(target) => current = target,
                Err(_) => break,
            },
            _ => break,
        }
    }
    current
}

/// Look up `key` on the page or, failing that, on its ancestors.
pub(crate) fn inherited<'a>(
    doc: &'a LopdfDocument,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = page_id;
    for _ in 0..MAX_DEPTH {
        let dict = doc.get_dictionary(node).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(resolve(doc, value));
        }
        node = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

/// Helper to extract number from PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// The page's MediaBox, inherited if necessary.
pub(crate) fn media_box(doc: &LopdfDocument, page_id: ObjectId) -> PageBox {
    let Some(Object::Array(values)) = inherited(doc, page_id, b"MediaBox") else {
        return DEFAULT_MEDIA_BOX;
    };

    let coords: Vec<f32> = values
        .iter()
        .filter_map(|v| get_number(resolve(doc, v)))
        .collect();
    if coords.len() < 4 {
        return DEFAULT_MEDIA_BOX;
    }

    let (x0, x1) = (coords[0].min(coords[2]), coords[0].max(coords[2]));
    let (y0, y1) = (coords[1].min(coords[3]), coords[1].max(coords[3]));
    if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 {
        return DEFAULT_MEDIA_BOX;
    }

    PageBox {
        x0,
        y0,
        width: x1 - x0,
        height: y1 - y0,
    }
}

/// The page's `/Rotate`, normalized to 0, 90, 180 or 270.
pub(crate) fn rotation(doc: &LopdfDocument, page_id: ObjectId) -> u16 {
    inherited(doc, page_id, b"Rotate")
        .and_then(get_number)
        .map(|r| (((r as i64) % 360 + 360) % 360) as u16)
        .unwrap_or(0)
}

/// Decoded content of the page's content stream(s).
///
/// Multiple streams are concatenated with a separating space. Unfiltered
/// streams are used verbatim; a filtered stream that fails to decode is an
/// error. A page without `/Contents` has empty content.
pub(crate) fn page_content(
    doc: &LopdfDocument,
    page_num: u32,
    page_id: ObjectId,
) -> Result<Vec<u8>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::extraction(page_num, e))?;

    let contents = match page_dict.get(b"Contents") {
        Ok(obj) => resolve(doc, obj),
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Stream(_) => stream_content(doc, page_num, contents),
        Object::Array(parts) => {
            let mut content = Vec::new();
            for part in parts {
                let data = stream_content(doc, page_num, resolve(doc, part))?;
                content.extend_from_slice(&data);
                content.push(b' ');
            }
            Ok(content)
        }
        _ => Err(Error::extraction(page_num, "invalid content stream")),
    }
}

fn stream_content(doc: &LopdfDocument, page_num: u32, obj: &Object) -> Result<Vec<u8>> {
    let Object::Stream(stream) = resolve(doc, obj) else {
        return Err(Error::extraction(page_num, "content entry is not a stream"));
    };

    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| Error::extraction(page_num, format!("cannot decode content stream: {}", e)))
}

/// Clone of the page's effective resource dictionary, inherited if necessary.
pub(crate) fn effective_resources(doc: &LopdfDocument, page_id: ObjectId) -> Dictionary {
    match inherited(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn doc_with_inherited_box() -> (LopdfDocument, ObjectId) {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Rotate" => -90,
                "MediaBox" => vec![10.into(), 20.into(), 310.into(), 420.into()],
            }),
        );
        (doc, page_id)
    }

    #[test]
    fn test_media_box_inherited_and_normalized() {
        let (doc, page_id) = doc_with_inherited_box();
        let page_box = media_box(&doc, page_id);
        assert_eq!(
            page_box,
            PageBox {
                x0: 10.0,
                y0: 20.0,
                width: 300.0,
                height: 400.0
            }
        );
    }

    #[test]
    fn test_rotation_normalized() {
        let (doc, page_id) = doc_with_inherited_box();
        assert_eq!(rotation(&doc, page_id), 270);
    }

    #[test]
    fn test_unfiltered_content_used_verbatim() {
        let (doc, page_id) = doc_with_inherited_box();
        assert_eq!(page_content(&doc, 1, page_id).unwrap(), b"BT ET".to_vec());
    }

    #[test]
    fn test_get_number() {
        assert_eq!(get_number(&Object::Integer(42)), Some(42.0));
        assert_eq!(get_number(&Object::Real(1.5)), Some(1.5));
        assert_eq!(get_number(&Object::Null), None);
    }
}
