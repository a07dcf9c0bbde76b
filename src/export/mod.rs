//! Book export
//!
//! Builds a complete PDF-like or EPUB-like document from a [`Book`]. Each
//! chapter body is passed through the HTML sanitizer first. Building is pure,
//! synchronous string work: no I/O and no shared state, so independent books
//! can be exported concurrently.

mod epub;
mod error;
mod pdf;

pub use epub::render_epub;
pub use error::{ExportError, Result};
pub use pdf::render_pdf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::book::{Book, BookFormat};

static RE_WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// File stem used when the title is blank
const UNTITLED_FILE_STEM: &str = "untitled";

/// Layout heuristics for the PDF path
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Plain-text characters kept per chapter; the rest is dropped
    pub max_chapter_chars: usize,
    /// Characters per PDF text line
    pub line_width: usize,
    /// Lines per PDF page before a page break
    pub lines_per_page: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            max_chapter_chars: 3000,
            line_width: 80,
            lines_per_page: 35,
        }
    }
}

/// A finished export, ready to be handed to the caller
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Build a book with the default layout options
pub fn build_document(book: &Book) -> Result<ExportedDocument> {
    build_document_with(book, &ExportOptions::default())
}

/// Build a book, dispatching on its format
///
/// Fails with [`ExportError::InvalidInput`] when the book has no chapters.
/// Either a complete document is returned or nothing is.
pub fn build_document_with(book: &Book, options: &ExportOptions) -> Result<ExportedDocument> {
    if book.chapters.is_empty() {
        return Err(ExportError::InvalidInput(
            "Book must contain at least one chapter".to_string(),
        ));
    }

    let content = match book.format {
        BookFormat::Pdf => render_pdf(book, options),
        BookFormat::Epub => render_epub(book)?,
    };

    tracing::info!(
        title = %book.title,
        format = %book.format,
        chapters = book.chapters.len(),
        bytes = content.len(),
        "Built book"
    );

    Ok(ExportedDocument {
        file_name: file_name(&book.title, book.format),
        mime_type: book.format.mime_type(),
        bytes: content.into_bytes(),
    })
}

/// Download name: lowercased title with each whitespace run replaced by `-`
///
/// No other characters are substituted and nothing is trimmed, so
/// `"My Book!"` becomes `my-book!.epub` and `" Notes "` becomes
/// `-notes-.pdf`. A blank title falls back to `untitled`.
pub fn file_name(title: &str, format: BookFormat) -> String {
    let stem = if title.trim().is_empty() {
        UNTITLED_FILE_STEM.to_string()
    } else {
        RE_WHITESPACE_RUN.replace_all(title, "-").to_lowercase()
    };
    format!("{}.{}", stem, format.extension())
}


#[cfg(test)]
mod tests {
    use super::test_helpers::sample_book;
    use super::*;

    #[test]
    fn test_file_name_replaces_whitespace_only() {
        assert_eq!(file_name("My Book!", BookFormat::Epub), "my-book!.epub");
        assert_eq!(file_name("Deep\tWork  Notes", BookFormat::Pdf), "deep-work-notes.pdf");
        assert_eq!(file_name("C++ & Rust: 2024", BookFormat::Pdf), "c++-&-rust:-2024.pdf");
    }

    #[test]
    fn test_file_name_keeps_edge_whitespace_runs() {
        assert_eq!(file_name("  My Book ", BookFormat::Epub), "-my-book-.epub");
    }

    #[test]
    fn test_file_name_blank_title_falls_back() {
        assert_eq!(file_name("", BookFormat::Epub), "untitled.epub");
        assert_eq!(file_name(" \t ", BookFormat::Pdf), "untitled.pdf");
    }

    #[test]
    fn test_build_pdf_document() {
        let book = sample_book(BookFormat::Pdf, 3);
        let doc = build_document(&book).unwrap();

        assert!(doc.bytes.starts_with(b"%PDF-1.4"));
        assert_eq!(doc.file_name, "my-blog-book.pdf");
        assert_eq!(doc.mime_type, "application/pdf");
    }

    #[test]
    fn test_build_epub_document() {
        let book = sample_book(BookFormat::Epub, 3);
        let doc = build_document(&book).unwrap();
        let text = String::from_utf8(doc.bytes).unwrap();

        assert_eq!(doc.file_name, "my-blog-book.epub");
        assert_eq!(doc.mime_type, "application/epub+zip");
        assert_eq!(text.matches("<item id=\"chapter").count(), 3);
        assert_eq!(text.matches("<itemref idref=\"chapter").count(), 3);
        for n in 1..=3 {
            assert!(text.contains(&format!("<item id=\"chapter{}\"", n)));
            assert!(text.contains(&format!("<itemref idref=\"chapter{}\"/>", n)));
        }
    }

    #[test]
    fn test_empty_book_is_invalid_input() {
        for format in [BookFormat::Pdf, BookFormat::Epub] {
            let book = sample_book(format, 0);
            assert!(matches!(
                build_document(&book),
                Err(ExportError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_build_does_not_mutate_book() {
        let book = sample_book(BookFormat::Epub, 2);
        let before = format!("{:?}", book);
        build_document(&book).unwrap();
        assert_eq!(format!("{:?}", book), before);
    }
}
