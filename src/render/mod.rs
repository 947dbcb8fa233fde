//! Redaction renderer.
//!
//! Draws one opaque rectangle per match and the compliance stamp on every
//! page, then re-serializes the document. With
//! [`RedactionStrategy::ContentRemoval`] the operators that showed matched
//! runs are also replaced.

mod options;
mod overlay;
mod removal;
mod result;
mod stamp;

pub use options::{RedactionStrategy, RenderOptions};
pub use result::RenderOutput;
pub use stamp::{StampConfig, StampPlacement, DEFAULT_STAMP_TEXT};

use std::collections::BTreeMap;

use lopdf::{Document as LopdfDocument, ObjectId};

use crate::error::{Error, Result};
use crate::model::{Match, Rect, RedactionMark};
use crate::parser::load_document;
use crate::parser::page_tree::{self, PageBox};
use overlay::{overlay_operations, OverlayResources};

/// Render `matches` into `original` with default options.
pub fn render(original: &[u8], matches: &[Match], stamp: &StampConfig) -> Result<Vec<u8>> {
    RedactionRenderer::new(stamp.clone(), RenderOptions::default())
        .render(original, matches)
        .map(|output| output.bytes)
}

/// Redaction renderer.
#[derive(Debug, Clone, Default)]
pub struct RedactionRenderer {
    stamp: StampConfig,
    options: RenderOptions,
}

impl RedactionRenderer {
    /// Create a renderer.
    pub fn new(stamp: StampConfig, options: RenderOptions) -> Self {
        Self { stamp, options }
    }

    /// The renderer's options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// The stamp drawn on every page.
    pub fn stamp(&self) -> &StampConfig {
        &self.stamp
    }

    /// Produce a redacted copy of `original`.
    ///
    /// `original` is not modified. Output has the same pages, in the same
    /// order and with the same MediaBoxes.
    ///
    /// # Errors
    /// - [`Error::Configuration`] for invalid options or stamp
    /// - [`Error::PageOutOfRange`] if a match names a page the document lacks
    /// - [`Error::GeometryOutOfBounds`] if a matched run lies outside its page
    /// - [`Error::Serialize`] if the output cannot be written
    pub fn render(&self, original: &[u8], matches: &[Match]) -> Result<RenderOutput> {
        self.options.validate()?;
        self.stamp.validate()?;
        let mut doc = load_document(original)?;
        self.render_loaded(&mut doc, matches)
    }

    pub(crate) fn render_loaded(
        &self,
        doc: &mut LopdfDocument,
        matches: &[Match],
    ) -> Result<RenderOutput> {
        let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
        let page_count = pages.len() as u32;

        let mut by_page: BTreeMap<u32, Vec<&Match>> = BTreeMap::new();
        for m in matches {
            if m.page == 0 || m.page > page_count {
                return Err(Error::PageOutOfRange(m.page, page_count));
            }
            by_page.entry(m.page).or_default().push(m);
        }

        // Plan every mark before touching the document
        let mut planned: BTreeMap<u32, Vec<RedactionMark>> = BTreeMap::new();
        for &(page_num, page_id) in &pages {
            let Some(page_matches) = by_page.get(&page_num) else {
                continue;
            };
            let page_box = page_tree::media_box(doc, page_id);
            let marks = page_matches
                .iter()
                .map(|m| self.plan_mark(m, &page_box))
                .collect::<Result<Vec<_>>>()?;
            planned.insert(page_num, marks);
        }

        if !matches.is_empty() && !self.options.strategy.removes_text() {
            log::warn!(
                "{} matches redacted by visual overlay only; underlying text remains extractable",
                matches.len()
            );
        }

        let resources = OverlayResources::install(doc, &self.stamp);
        let mut output_marks = Vec::with_capacity(matches.len());
        let mut stamps = Vec::with_capacity(pages.len());
        let mut operators_removed = 0;

        for &(page_num, page_id) in &pages {
            let marks = planned.remove(&page_num).unwrap_or_default();

            if self.options.strategy.removes_text() {
                if let Some(page_matches) = by_page.get(&page_num) {
                    operators_removed += removal::strip_matched_text(
                        doc,
                        page_num,
                        page_id,
                        page_matches,
                        self.options.compress,
                    )?;
                }
            }

            let page_box = page_tree::media_box(doc, page_id);
            let placement = self.stamp.placement(page_num, page_box.width);
            let ops = overlay_operations(&marks, &self.stamp, &placement, (page_box.x0, page_box.y0));
            resources.attach(doc, page_num, page_id, ops, self.options.compress)?;

            log::debug!("page {}: {} marks, stamp at ({:.1}, {:.1})", page_num, marks.len(), placement.x, placement.y);
            output_marks.extend(marks);
            stamps.push(placement);
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| Error::Serialize(format!("cannot write document: {}", e)))?;

        Ok(RenderOutput {
            bytes,
            marks: output_marks,
            stamps,
            operators_removed,
        })
    }

    fn plan_mark(&self, m: &Match, page_box: &PageBox) -> Result<RedactionMark> {
        let bbox = m.run.user_space_bbox(page_box.height);
        let bounds = Rect::new(0.0, 0.0, page_box.width, page_box.height)
            .expand(self.options.bounds_tolerance);

        let finite = [bbox.x, bbox.y, bbox.width, bbox.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || !bounds.contains(&bbox) {
            return Err(Error::GeometryOutOfBounds {
                page: m.page,
                rect: bbox.to_string(),
            });
        }

        Ok(RedactionMark::from_match(
            m,
            page_box.height,
            self.options.margin_factor,
            self.options.fill,
        ))
    }
}
