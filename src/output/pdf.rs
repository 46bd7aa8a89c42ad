//! PDF export of generated notes.
//!
//! Layout mirrors a simple single-column document: A4 portrait, 12pt Helvetica,
//! one fixed-height cell per line of the summary, new page when the bottom
//! margin is reached. Long lines are not wrapped.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::{NotesError, Result};

pub const NOTES_FILE_NAME: &str = "notes.pdf";
pub const PDF_MIME_TYPE: &str = "application/pdf";

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MM: f32 = 72.0 / 25.4;
const MARGIN: f32 = 10.0 * MM;
const BOTTOM_MARGIN: f32 = 20.0 * MM;
const LINE_HEIGHT: f32 = 10.0 * MM;
const FONT_SIZE: f32 = 12.0;

/// One line of text placed on a page
#[derive(Debug, Clone, PartialEq)]
pub struct LineCell {
    /// Zero-based page index
    pub page: usize,
    /// Baseline position in PDF user space (origin bottom-left)
    pub x: f32,
    pub y: f32,
    pub text: String,
    /// Latin-1 bytes written into the content stream
    pub bytes: Vec<u8>,
}

/// Encode text as Latin-1, failing on the first character outside U+0000..=U+00FF
pub fn encode_latin1(text: &str) -> std::result::Result<Vec<u8>, NotesError> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| NotesError::Encoding(c)))
        .collect()
}

/// Place every `\n`-separated line of the summary, in order
pub fn layout_lines(summary: &str) -> std::result::Result<Vec<LineCell>, NotesError> {
    let mut cells = Vec::new();
    let mut page = 0;
    let mut top = MARGIN;

    for line in summary.split('\n') {
        let bytes = encode_latin1(line)?;

        if top + LINE_HEIGHT > PAGE_HEIGHT - BOTTOM_MARGIN {
            page += 1;
            top = MARGIN;
        }

        cells.push(LineCell {
            page,
            x: MARGIN,
            y: PAGE_HEIGHT - (top + 0.5 * LINE_HEIGHT + 0.3 * FONT_SIZE),
            text: line.to_string(),
            bytes,
        });
        top += LINE_HEIGHT;
    }

    Ok(cells)
}

/// Render the summary as a PDF document and return its bytes
pub fn render_pdf(summary: &str) -> Result<Vec<u8>> {
    let cells = layout_lines(summary)?;
    let page_count = cells.last().map(|cell| cell.page + 1).unwrap_or(1);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids: Vec<Object> = Vec::with_capacity(page_count);
    for page in 0..page_count {
        let operations: Vec<Operation> = cells
            .iter()
            .filter(|cell| cell.page == page)
            .flat_map(|cell| {
                [
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
                    Operation::new("Td", vec![cell.x.into(), cell.y.into()]),
                    Operation::new("Tj", vec![Object::string_literal(cell.bytes.clone())]),
                    Operation::new("ET", vec![]),
                ]
            })
            .collect();

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids,
        "Count" => page_count as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    tracing::debug!(
        "Rendered {} lines into {} page(s), {} bytes",
        cells.len(),
        page_count,
        bytes.len()
    );

    Ok(bytes)
}
