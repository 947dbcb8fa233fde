//! Content removal: replace the text-showing operators of matched runs.
//!
//! Each replaced operator becomes a `TJ` with a single displacement equal to
//! the original advance, so text painted later on the same line keeps its
//! position.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Document as LopdfDocument, Object, ObjectId};

use super::overlay::content_stream;
use crate::error::{Error, Result};
use crate::model::{Match, RunOrigin, ShowOperator};
use crate::parser::page_tree::page_content;

/// Rewrite a page's content without the matched strings.
///
/// Returns the number of operators replaced.
pub(crate) fn strip_matched_text(
    doc: &mut LopdfDocument,
    page_num: u32,
    page_id: ObjectId,
    matches: &[&Match],
    compress: bool,
) -> Result<usize> {
    let mut targets: BTreeMap<usize, RunOrigin> = BTreeMap::new();
    for m in matches {
        match m.run.origin {
            Some(origin) => {
                targets.insert(origin.op_index, origin);
            }
            None => log::warn!(
                "page {}: match for rule '{}' has no operator provenance; overlay only",
                page_num,
                m.rule
            ),
        }
    }
    if targets.is_empty() {
        return Ok(0);
    }

    let content = page_content(doc, page_num, page_id)?;
    let operations = Content::decode(&content)
        .map_err(|e| Error::extraction(page_num, format!("cannot decode content: {}", e)))?
        .operations;

    let mut rewritten = Vec::with_capacity(operations.len());
    let mut replaced = 0;
    for (index, op) in operations.into_iter().enumerate() {
        match targets.get(&index) {
            Some(origin) if is_show_operator(&op.operator) => {
                rewritten.extend(replacement(origin));
                replaced += 1;
            }
            _ => rewritten.push(op),
        }
    }

    let stream_id = doc.add_object(content_stream(rewritten, compress)?);
    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| Error::Serialize(format!("cannot update page object: {}", e)))?;
    page.set("Contents", Object::Reference(stream_id));

    log::debug!("page {}: removed {} text operators", page_num, replaced);
    Ok(replaced)
}

fn is_show_operator(operator: &str) -> bool {
    matches!(operator, "Tj" | "TJ" | "'" | "\"")
}

/// Operators with the same effect on the text state as the original, minus
/// the glyphs.
fn replacement(origin: &RunOrigin) -> Vec<Operation> {
    let displacement = if origin.font_size.abs() > f32::EPSILON {
        -origin.advance * 1000.0 / origin.font_size
    } else {
        0.0
    };
    let shift = Operation::new("TJ", vec![Object::Array(vec![Object::Real(displacement)])]);

    match origin.operator {
        ShowOperator::ShowText | ShowOperator::ShowTextAdjusted => vec![shift],
        ShowOperator::NextLineShow => vec![Operation::new("T*", vec![]), shift],
        ShowOperator::SpacedNextLineShow {
            word_spacing,
            char_spacing,
        } => vec![
            Operation::new("Tw", vec![Object::Real(word_spacing)]),
            Operation::new("Tc", vec![Object::Real(char_spacing)]),
            Operation::new("T*", vec![]),
            shift,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(operator: ShowOperator) -> RunOrigin {
        RunOrigin {
            op_index: 0,
            operator,
            advance: 48.0,
            font_size: 12.0,
        }
    }

    #[test]
    fn test_show_text_becomes_displacement() {
        let ops = replacement(&origin(ShowOperator::ShowText));
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operator, "TJ");
        match &ops[0].operands[0] {
            Object::Array(items) => match items[0] {
                Object::Real(n) => assert!((n + 4000.0).abs() < 1e-3),
                _ => panic!("expected a real displacement"),
            },
            _ => panic!("expected an array operand"),
        }
    }

    #[test]
    fn test_line_moving_operators_keep_line_feed() {
        let ops = replacement(&origin(ShowOperator::NextLineShow));
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names, vec!["T*", "TJ"]);

        let ops = replacement(&origin(ShowOperator::SpacedNextLineShow {
            word_spacing: 1.0,
            char_spacing: 0.5,
        }));
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names, vec!["Tw", "Tc", "T*", "TJ"]);
    }

    #[test]
    fn test_zero_font_size() {
        let mut o = origin(ShowOperator::ShowText);
        o.font_size = 0.0;
        let ops = replacement(&o);
        match &ops[0].operands[0] {
            Object::Array(items) => assert!(matches!(items[0], Object::Real(n) if n == 0.0)),
            _ => panic!("expected an array operand"),
        }
    }
}
