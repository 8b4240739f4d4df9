//! PDF writer: serializes a laid-out document with `lopdf`.
//!
//! Fonts are the base-14 Type1 faces (no embedding), referenced as `/F1`
//! (regular) and `/F2` (bold) with WinAnsi encoding. Content streams are left
//! uncompressed. Nothing time-dependent is written, so the same input always
//! yields the same bytes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::errors::ExportError;
use crate::layout::font_metrics::{encode_win_ansi, FontFace};
use crate::render::document::{DrawOp, LaidOutDocument};

/// Control-point factor approximating a quarter circle with a cubic Bézier.
const KAPPA: f32 = 0.552_284_8;

/// Values for the document `Info` dictionary.
#[derive(Debug, Clone)]
pub struct PdfInfo<'a> {
    pub title: &'a str,
    pub producer: &'a str,
}

pub fn write_pdf(doc: &LaidOutDocument, info: &PdfInfo<'_>) -> Result<Vec<u8>, ExportError> {
    let mut document = Document::with_version("1.7");
    let pages_id = document.new_object_id();

    let mut fonts = Dictionary::new();
    for face in [FontFace::Regular, FontFace::Bold] {
        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = document.add_object(dictionary! { "Font" => fonts });

    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(doc.pages.len());
    for page in &doc.pages {
        let mut ctx = PageContext::new(doc.page_height);
        for op in page.ops.iter().chain(page.footer.iter()) {
            ctx.draw(op);
        }
        let content_id = document.add_object(Stream::new(dictionary! {}, ctx.finish().encode()?));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), doc.page_width.into(), doc.page_height.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        page_ids.push(page_id);
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::from(*id)).collect();
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let catalog_id = document.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    let info_id = document.add_object(dictionary! {
        "Title" => text_string(info.title),
        "Producer" => text_string(info.producer),
    });
    document.trailer.set("Root", catalog_id);
    document.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    document.save_to(&mut bytes)?;
    Ok(bytes)
}

fn text_string(s: &str) -> Object {
    Object::String(encode_win_ansi(s), StringFormat::Literal)
}

/// Accumulates one page's content stream, flipping top-down y into PDF space.
struct PageContext {
    page_height: f32,
    content: Content,
}

impl PageContext {
    fn new(page_height: f32) -> Self {
        PageContext {
            page_height,
            content: Content { operations: vec![] },
        }
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    fn draw(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Text {
                x,
                baseline,
                face,
                size,
                gray,
                text,
            } => {
                self.push("g", vec![(*gray).into()]);
                self.push("BT", vec![]);
                self.push("Tf", vec![face.resource_name().into(), (*size).into()]);
                self.push("Td", vec![(*x).into(), (self.page_height - baseline).into()]);
                self.push(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                );
                self.push("ET", vec![]);
            }
            DrawOp::Rule {
                x1,
                x2,
                y,
                thickness,
                gray,
            } => {
                // Stroke along the rule's vertical center.
                let center = self.page_height - (y + thickness / 2.0);
                self.push("G", vec![(*gray).into()]);
                self.push("w", vec![(*thickness).into()]);
                self.push("m", vec![(*x1).into(), center.into()]);
                self.push("l", vec![(*x2).into(), center.into()]);
                self.push("S", vec![]);
            }
            DrawOp::RoundedRect {
                x,
                y,
                width,
                height,
                radius,
                gray,
            } => {
                self.push("G", vec![(*gray).into()]);
                self.push("w", vec![0.75.into()]);
                self.rounded_rect_path(*x, self.page_height - (y + height), *width, *height, *radius);
                self.push("S", vec![]);
            }
        }
    }

    /// Appends a closed rounded-rectangle path with its bottom-left at `(x, y)`.
    fn rounded_rect_path(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32) {
        let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        if r == 0.0 {
            self.push("re", vec![x.into(), y.into(), w.into(), h.into()]);
            return;
        }
        let k = r * KAPPA;
        let (right, top) = (x + w, y + h);

        self.push("m", vec![(x + r).into(), y.into()]);
        self.push("l", vec![(right - r).into(), y.into()]);
        self.curve([right - r + k, y], [right, y + r - k], [right, y + r]);
        self.push("l", vec![right.into(), (top - r).into()]);
        self.curve([right, top - r + k], [right - r + k, top], [right - r, top]);
        self.push("l", vec![(x + r).into(), top.into()]);
        self.curve([x + r - k, top], [x, top - r + k], [x, top - r]);
        self.push("l", vec![x.into(), (y + r).into()]);
        self.curve([x, y + r - k], [x + r - k, y], [x + r, y]);
        self.push("h", vec![]);
    }

    fn curve(&mut self, c1: [f32; 2], c2: [f32; 2], end: [f32; 2]) {
        self.push(
            "c",
            vec![
                c1[0].into(),
                c1[1].into(),
                c2[0].into(),
                c2[1].into(),
                end[0].into(),
                end[1].into(),
            ],
        );
    }

    fn finish(self) -> Content {
        self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::LayoutConfig;
    use crate::layout::model::Line;
    use crate::render::document::layout_document;

    fn info() -> PdfInfo<'static> {
        PdfInfo {
            title: "Tour plan",
            producer: "Wavewright",
        }
    }

    fn page_strings(doc: &Document, page_id: ObjectId) -> Vec<String> {
        let bytes = doc.get_page_content(page_id).unwrap();
        let content = Content::decode(&bytes).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(s, _)) => Some(String::from_utf8_lossy(s).into_owned()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_written_pdf_parses_with_page_count() {
        let lines: Vec<Line> = (0..5)
            .map(|_| Line::Body {
                text: "riff ".repeat(500),
            })
            .collect();
        let laid_out = layout_document(&lines, &LayoutConfig::default(), "Wavewright").unwrap();
        let bytes = write_pdf(&laid_out, &info()).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.7"));
        let parsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), laid_out.page_count());
    }

    #[test]
    fn test_page_text_and_footer_read_back() {
        let lines = vec![
            Line::Title {
                text: "Spring Tour".to_string(),
            },
            Line::Body {
                text: "Ten cities.".to_string(),
            },
        ];
        let laid_out = layout_document(&lines, &LayoutConfig::default(), "Wavewright").unwrap();
        let bytes = write_pdf(&laid_out, &info()).unwrap();
        let parsed = Document::load_mem(&bytes).unwrap();
        let (_, page_id) = parsed.get_pages().into_iter().next().unwrap();

        let strings = page_strings(&parsed, page_id);
        assert_eq!(strings, vec!["Spring Tour", "Ten cities.", "Wavewright", "Page 1 / 1"]);
    }

    #[test]
    fn test_info_dictionary_has_title_and_producer() {
        let laid_out = layout_document(
            &[Line::Divider],
            &LayoutConfig::default(),
            "Wavewright",
        )
        .unwrap();
        let parsed = Document::load_mem(&write_pdf(&laid_out, &info()).unwrap()).unwrap();
        let info_ref = parsed.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let dict = parsed.get_dictionary(info_ref).unwrap();
        assert_eq!(dict.get(b"Title").unwrap().as_str().unwrap(), b"Tour plan");
        assert_eq!(dict.get(b"Producer").unwrap().as_str().unwrap(), b"Wavewright");
    }

    #[test]
    fn test_output_is_deterministic() {
        let lines = vec![Line::Body {
            text: "Same every time".to_string(),
        }];
        let laid_out = layout_document(&lines, &LayoutConfig::default(), "Wavewright").unwrap();
        let a = write_pdf(&laid_out, &info()).unwrap();
        let b = write_pdf(&laid_out, &info()).unwrap();
        assert_eq!(a, b, "identical input must give identical bytes");
    }

    #[test]
    fn test_rounded_rect_uses_curves() {
        let mut ctx = PageContext::new(800.0);
        ctx.draw(&DrawOp::RoundedRect {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 40.0,
            radius: 6.0,
            gray: 0.8,
        });
        let ops: Vec<&str> = ctx.content.operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(ops.iter().filter(|o| **o == "c").count(), 4);
        assert_eq!(ops.last(), Some(&"S"));
    }

    #[test]
    fn test_text_y_is_flipped() {
        let mut ctx = PageContext::new(800.0);
        ctx.draw(&DrawOp::Text {
            x: 48.0,
            baseline: 100.0,
            face: FontFace::Bold,
            size: 12.0,
            gray: 0.1,
            text: "Hi".to_string(),
        });
        let td = ctx
            .content
            .operations
            .iter()
            .find(|op| op.operator == "Td")
            .unwrap();
        assert_eq!(td.operands[1].as_float().unwrap(), 700.0);
        let tf = ctx
            .content
            .operations
            .iter()
            .find(|op| op.operator == "Tf")
            .unwrap();
        assert_eq!(tf.operands[0].as_name().unwrap(), b"F2");
    }
}
