//! PDF-like export
//!
//! Lays out a book as plain text on US Letter pages. There are no font
//! metrics: text is cut into fixed-width lines and pages hold a fixed number
//! of lines. Stream lengths and cross-reference offsets are exact.

use super::ExportOptions;
use crate::book::Book;
use crate::html::{escape_pdf_literal, sanitize_html, to_plain_text};

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN_LEFT: u32 = 72;
const TOP_BASELINE: u32 = 720;
const LINE_HEIGHT: u32 = 18;

const TITLE_SIZE: u32 = 24;
const AUTHOR_SIZE: u32 = 16;
const HEADING_SIZE: u32 = 14;
const BODY_SIZE: u32 = 12;

/// Object numbers of the fixed objects; pages follow from 4 onwards
const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_ID: usize = 3;

/// One line of laid-out text
#[derive(Debug, Clone, PartialEq)]
enum Line {
    Heading(String),
    Body(String),
    Blank,
}

/// Render the whole PDF-like document for a book
pub fn render_pdf(book: &Book, options: &ExportOptions) -> String {
    let mut pages = vec![title_page(book)];
    pages.extend(
        paginate(layout_chapters(book, options), options.lines_per_page)
            .iter()
            .map(|lines| page_stream(lines)),
    );

    tracing::debug!(pages = pages.len(), "Laid out PDF pages");
    write_document(&pages)
}

/// Content stream for the title page
fn title_page(book: &Book) -> String {
    let count = book.chapters.len();
    let chapters = format!("{} {}", count, if count == 1 { "chapter" } else { "chapters" });

    [
        "BT".to_string(),
        format!("/F1 {} Tf", TITLE_SIZE),
        format!("{} 700 Td", MARGIN_LEFT),
        show_text(&book.title),
        format!("/F1 {} Tf", AUTHOR_SIZE),
        "0 -30 Td".to_string(),
        show_text(&format!("by {}", book.author)),
        format!("/F1 {} Tf", BODY_SIZE),
        "0 -50 Td".to_string(),
        show_text(&chapters),
        "ET".to_string(),
    ]
    .join("\n")
}

/// Heading and wrapped body lines for every chapter, in order
fn layout_chapters(book: &Book, options: &ExportOptions) -> Vec<Line> {
    let width = options.line_width.max(1);
    let mut lines = Vec::new();

    for (index, chapter) in book.chapters.iter().enumerate() {
        if index > 0 {
            lines.push(Line::Blank);
        }

        let heading = format!("Chapter {}: {}", index + 1, chapter.title);
        lines.extend(chunk_chars(&heading, width).into_iter().map(Line::Heading));

        let text = to_plain_text(
            &sanitize_html(&chapter.content),
            Some(options.max_chapter_chars),
        );
        lines.extend(chunk_chars(&text, width).into_iter().map(Line::Body));
    }

    lines
}

/// Cut text into chunks of at most `width` characters
fn chunk_chars(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Group lines into pages of at most `lines_per_page` lines
///
/// A blank separator never opens a page.
fn paginate(lines: Vec<Line>, lines_per_page: usize) -> Vec<Vec<Line>> {
    let budget = lines_per_page.max(1);
    let mut pages = Vec::new();
    let mut current: Vec<Line> = Vec::with_capacity(budget);

    for line in lines {
        if current.len() == budget {
            pages.push(std::mem::take(&mut current));
        }
        if current.is_empty() && line == Line::Blank {
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        pages.push(current);
    }

    pages
}

/// Content stream for one page of lines
fn page_stream(lines: &[Line]) -> String {
    let mut ops = vec!["BT".to_string()];
    let mut size = 0;

    for (index, line) in lines.iter().enumerate() {
        let (line_size, text) = match line {
            Line::Heading(text) => (HEADING_SIZE, Some(text)),
            Line::Body(text) => (BODY_SIZE, Some(text)),
            Line::Blank => (size.max(BODY_SIZE), None),
        };
        if line_size != size {
            ops.push(format!("/F1 {} Tf", line_size));
            size = line_size;
        }
        if index == 0 {
            ops.push(format!("{} {} Td", MARGIN_LEFT, TOP_BASELINE));
        } else {
            ops.push(format!("0 -{} Td", LINE_HEIGHT));
        }
        if let Some(text) = text {
            ops.push(show_text(text));
        }
    }

    ops.push("ET".to_string());
    ops.join("\n")
}

fn show_text(text: &str) -> String {
    format!("({}) Tj", escape_pdf_literal(text))
}

/// Assemble header, objects, cross-reference table and trailer
fn write_document(page_streams: &[String]) -> String {
    let page_ids: Vec<usize> = (0..page_streams.len()).map(|i| FONT_ID + 1 + i * 2).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_streams.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for (page_id, stream) in page_ids.iter().zip(page_streams) {
        objects.push(format!(
            "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
            PAGES_ID,
            PAGE_WIDTH,
            PAGE_HEIGHT,
            FONT_ID,
            page_id + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut output = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, object) in objects.iter().enumerate() {
        offsets.push(output.len());
        output.push_str(&format!("{} 0 obj\n{}\nendobj\n", index + 1, object));
    }

    let xref_offset = output.len();
    output.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    output.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        output.push_str(&format!("{:010} 00000 n \n", offset));
    }
    output.push_str(&format!(
        "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        CATALOG_ID,
        xref_offset
    ));

    output
}
