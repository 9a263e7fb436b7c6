//! PDF emission backend: `LayoutDocument` → PDF 1.5 bytes via `lopdf`.
//!
//! Only the three standard Helvetica faces are used, so no font programs are
//! embedded. Text is encoded as WinAnsi; characters outside it become `?`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;
use tracing::debug;

use crate::layout::engine::{DrawOp, LayoutDocument};
use crate::layout::font_metrics::FontFace;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF encoding failed: {0}")]
    Encode(String),
}

impl From<lopdf::Error> for PdfError {
    fn from(e: lopdf::Error) -> Self {
        PdfError::Encode(e.to_string())
    }
}

const FONT_FACES: [FontFace; 3] = [
    FontFace::Helvetica,
    FontFace::HelveticaBold,
    FontFace::HelveticaOblique,
];

/// Renders the draw sequence into a complete PDF file.
pub fn render_pdf(layout: &LayoutDocument) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for face in FONT_FACES {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let page_count = layout.page_count.max(1);
    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for page in 0..page_count {
        let content = page_content(layout, page);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = add_page(&mut doc, pages_id, content_id);
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            layout.page_width.into(),
            layout.page_height.into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PdfError::Encode(e.to_string()))?;

    debug!(pages = page_count, bytes = bytes.len(), "Rendered PDF");
    Ok(bytes)
}

fn add_page(doc: &mut Document, pages_id: ObjectId, content_id: ObjectId) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    })
}

/// Content stream for one page, in draw order.
fn page_content(layout: &LayoutDocument, page: usize) -> Content {
    let mut operations = Vec::new();
    for op in layout.ops.iter().filter(|op| op.page() == page) {
        match op {
            DrawOp::Text {
                x,
                y,
                text,
                font_size,
                weight,
                style,
                ..
            } => {
                let face = FontFace::for_style(*weight, *style);
                let baseline = layout.page_height - y;
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![face.resource_name().into(), (*font_size).into()],
                ));
                operations.push(Operation::new("Td", vec![(*x).into(), baseline.into()]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            DrawOp::Rule {
                x1,
                x2,
                y,
                thickness,
                ..
            } => {
                let flipped = layout.page_height - y;
                operations.push(Operation::new("w", vec![(*thickness).into()]));
                operations.push(Operation::new("m", vec![(*x1).into(), flipped.into()]));
                operations.push(Operation::new("l", vec![(*x2).into(), flipped.into()]));
                operations.push(Operation::new("S", vec![]));
            }
        }
    }
    Content { operations }
}

/// Maps text onto WinAnsiEncoding (Windows-1252).
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '…' => 0x85,
            '€' => 0x80,
            c if (c as u32) < 0x80 => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}
