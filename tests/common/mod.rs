//! Synthetic PDF fixtures shared by the integration tests.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};

/// One line of text drawn with Helvetica at a baseline position.
#[derive(Debug, Clone)]
pub struct Line {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: String,
}

/// A page of the fixture document.
#[derive(Debug, Clone)]
pub struct TestPage {
    pub width: f32,
    pub height: f32,
    pub rotate: Option<i64>,
    /// Raw operators emitted before the lines
    pub prefix: String,
    pub lines: Vec<Line>,
}

impl TestPage {
    pub fn letter() -> Self {
        Self::sized(612.0, 792.0)
    }

    pub fn a4() -> Self {
        Self::sized(595.0, 842.0)
    }

    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            rotate: None,
            prefix: String::new(),
            lines: Vec::new(),
        }
    }

    pub fn rotated(mut self, degrees: i64) -> Self {
        self.rotate = Some(degrees);
        self
    }

    pub fn prefix(mut self, operators: &str) -> Self {
        self.prefix = operators.to_string();
        self
    }

    pub fn line(mut self, x: f32, y: f32, size: f32, text: &str) -> Self {
        self.lines.push(Line {
            x,
            y,
            size,
            text: text.to_string(),
        });
        self
    }

    fn content(&self) -> Vec<u8> {
        let mut content = self.prefix.clone();
        if !content.is_empty() {
            content.push('\n');
        }
        for line in &self.lines {
            content.push_str(&format!(
                "BT /F1 {} Tf {} {} Td ({}) Tj ET\n",
                line.size,
                line.x,
                line.y,
                escape(&line.text)
            ));
        }
        content.into_bytes()
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Build a PDF with one page per entry, every page sharing one Helvetica font.
pub fn build_pdf(pages: &[TestPage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for page in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page.content()));
        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), page.width.into(), page.height.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        };
        if let Some(rotate) = page.rotate {
            page_dict.set("Rotate", rotate);
        }
        kids.push(Object::Reference(doc.add_object(page_dict)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// A two-page visit summary with names, dates and an institution.
pub fn visit_summary() -> Vec<u8> {
    build_pdf(&[
        TestPage::letter()
            .line(72.0, 720.0, 14.0, "VISIT SUMMARY")
            .line(72.0, 690.0, 12.0, "Dr. Alice Morgan")
            .line(72.0, 670.0, 12.0, "Seen on 01/15/2023")
            .line(72.0, 650.0, 12.0, "follow up in two weeks"),
        TestPage::letter()
            .line(72.0, 700.0, 12.0, "transferred to county hospital")
            .line(72.0, 680.0, 12.0, "no further notes"),
    ])
}

/// Media box `[x0 y0 x1 y1]` of every page of `pdf`, in page order.
pub fn media_boxes(pdf: &[u8]) -> Vec<Vec<f32>> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).unwrap();
            page.get(b"MediaBox")
                .unwrap()
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_float().unwrap())
                .collect()
        })
        .collect()
}
