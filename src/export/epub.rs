//! EPUB-like export
//!
//! Produces a single stream holding the OPF package document, the navigation
//! document and one XHTML document per chapter, in that order. The parts are
//! not zipped into an OCF container.

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use std::io::Cursor;
use uuid::Uuid;

use super::error::Result;
use crate::book::{Book, Chapter};
use crate::html::{escape_for_markup, sanitize_html};

const OPF_NAMESPACE: &str = "http://www.idpf.org/2007/opf";
const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
const OPS_NAMESPACE: &str = "http://www.idpf.org/2007/ops";
const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";

/// Render the whole EPUB-like stream for a book
pub fn render_epub(book: &Book) -> Result<String> {
    let identifier = format!("urn:uuid:{}", Uuid::new_v4());
    let mut output = package_document(book, &identifier, Utc::now())?;

    output.push_str("\n\n<!-- Table of Contents -->\n");
    output.push_str(&toc_document(book));

    for (index, chapter) in book.chapters.iter().enumerate() {
        let number = index + 1;
        output.push_str(&format!("\n\n<!-- Chapter {} -->\n", number));
        output.push_str(&chapter_document(number, chapter));
    }

    tracing::debug!(identifier = %identifier, "Rendered EPUB stream");
    Ok(output)
}

/// OPF 3.0 package document with metadata, manifest and spine
fn package_document(book: &Book, identifier: &str, modified: DateTime<Utc>) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut package = BytesStart::new("package");
    package.push_attribute(("xmlns", OPF_NAMESPACE));
    package.push_attribute(("version", "3.0"));
    package.push_attribute(("unique-identifier", "uid"));
    writer.write_event(Event::Start(package))?;

    // Metadata
    let mut metadata = BytesStart::new("metadata");
    metadata.push_attribute(("xmlns:dc", DC_NAMESPACE));
    writer.write_event(Event::Start(metadata))?;
    write_text_element(&mut writer, "dc:title", &[], &book.title)?;
    write_text_element(&mut writer, "dc:creator", &[], &book.author)?;
    write_text_element(&mut writer, "dc:language", &[], "en")?;
    write_text_element(&mut writer, "dc:identifier", &[("id", "uid")], identifier)?;
    write_text_element(
        &mut writer,
        "meta",
        &[("property", "dcterms:modified")],
        &modified.to_rfc3339_opts(SecondsFormat::Secs, true),
    )?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;

    // Manifest
    writer.write_event(Event::Start(BytesStart::new("manifest")))?;
    let mut nav = BytesStart::new("item");
    nav.push_attribute(("id", "toc"));
    nav.push_attribute(("href", "toc.xhtml"));
    nav.push_attribute(("media-type", XHTML_MEDIA_TYPE));
    nav.push_attribute(("properties", "nav"));
    writer.write_event(Event::Empty(nav))?;

    for number in 1..=book.chapters.len() {
        let id = chapter_id(number);
        let href = format!("{}.xhtml", id);
        let mut item = BytesStart::new("item");
        item.push_attribute(("id", id.as_str()));
        item.push_attribute(("href", href.as_str()));
        item.push_attribute(("media-type", XHTML_MEDIA_TYPE));
        writer.write_event(Event::Empty(item))?;
    }
    writer.write_event(Event::End(BytesEnd::new("manifest")))?;

    // Spine
    writer.write_event(Event::Start(BytesStart::new("spine")))?;
    for number in 1..=book.chapters.len() {
        let id = chapter_id(number);
        let mut itemref = BytesStart::new("itemref");
        itemref.push_attribute(("idref", id.as_str()));
        writer.write_event(Event::Empty(itemref))?;
    }
    writer.write_event(Event::End(BytesEnd::new("spine")))?;

    writer.write_event(Event::End(BytesEnd::new("package")))?;

    let result = writer.into_inner().into_inner();
    Ok(String::from_utf8(result)?)
}

/// Write `<name attrs>text</name>`, escaping the text for markup
fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
    value: &str,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    for attribute in attributes {
        start.push_attribute(*attribute);
    }
    writer.write_event(Event::Start(start))?;
    let escaped = escape_for_markup(value);
    writer.write_event(Event::Text(BytesText::from_escaped(escaped.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Navigation document listing every chapter in order
fn toc_document(book: &Book) -> String {
    let title = escape_for_markup(&book.title);
    let author = escape_for_markup(&book.author);

    let entries: Vec<String> = book
        .chapters
        .iter()
        .enumerate()
        .map(|(index, chapter)| {
            let number = index + 1;
            format!(
                "      <li><a href=\"{}.xhtml\">Chapter {}: {}</a></li>",
                chapter_id(number),
                number,
                escape_for_markup(&chapter.title)
            )
        })
        .collect();

    format!(
        "<html xmlns=\"{xhtml}\" xmlns:epub=\"{ops}\">\n\
         <head>\n  <title>{title}</title>\n</head>\n\
         <body>\n  <h1>{title}</h1>\n  <h2>by {author}</h2>\n\
         \x20 <nav epub:type=\"toc\" id=\"toc\">\n    <ol>\n{entries}\n    </ol>\n  </nav>\n\
         </body>\n</html>",
        xhtml = XHTML_NAMESPACE,
        ops = OPS_NAMESPACE,
        title = title,
        author = author,
        entries = entries.join("\n"),
    )
}

/// XHTML document for chapter `number` (1-based)
fn chapter_document(number: usize, chapter: &Chapter) -> String {
    let title = escape_for_markup(&chapter.title);
    let content = sanitize_html(&chapter.content);

    let mut body = String::new();
    body.push_str(&format!(
        "  <section id=\"{}\" epub:type=\"chapter\">\n",
        chapter_id(number)
    ));
    body.push_str(&format!(
        "    <p class=\"chapter-number\">Chapter {}</p>\n",
        number
    ));
    body.push_str(&format!("    <h1>{}</h1>\n", title));
    if !content.is_empty() {
        body.push_str(&format!("    {}\n", content));
    }
    for (url, alt) in chapter.images() {
        body.push_str(&format!(
            "    <img src=\"{}\" alt=\"{}\"/>\n",
            escape_for_markup(url),
            escape_for_markup(alt)
        ));
    }
    body.push_str("  </section>\n");

    format!(
        "<html xmlns=\"{xhtml}\" xmlns:epub=\"{ops}\">\n\
         <head>\n  <title>{title}</title>\n</head>\n\
         <body>\n{body}</body>\n</html>",
        xhtml = XHTML_NAMESPACE,
        ops = OPS_NAMESPACE,
        title = title,
        body = body,
    )
}

fn chapter_id(number: usize) -> String {
    format!("chapter{}", number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{BookFormat, Media, MediaType};
    use crate::export::test_helpers::sample_book;

    #[test]
    fn test_parts_are_in_order() {
        let book = sample_book(BookFormat::Epub, 2);
        let stream = render_epub(&book).unwrap();

        let package = stream.find("<package").unwrap();
        let toc = stream.find("<!-- Table of Contents -->").unwrap();
        let first = stream.find("<!-- Chapter 1 -->").unwrap();
        let second = stream.find("<!-- Chapter 2 -->").unwrap();
        assert!(package < toc && toc < first && first < second);
        assert!(stream.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    }

    #[test]
    fn test_package_metadata_is_escaped() {
        let mut book = sample_book(BookFormat::Epub, 1);
        book.title = "Rust & <Friends>".to_string();
        book.author = "\"Ferris\"".to_string();

        let stream = render_epub(&book).unwrap();
        assert!(stream.contains("<dc:title>Rust &amp; &lt;Friends&gt;</dc:title>"));
        assert!(stream.contains("<dc:creator>&quot;Ferris&quot;</dc:creator>"));
        assert!(!stream.contains("<Friends>"));
    }

    #[test]
    fn test_identifier_is_unique_per_build() {
        let book = sample_book(BookFormat::Epub, 1);
        let extract = |s: &str| {
            let start = s.find("urn:uuid:").unwrap();
            s[start..start + 45].to_string()
        };

        let first = extract(&render_epub(&book).unwrap());
        let second = extract(&render_epub(&book).unwrap());
        assert_ne!(first, second);
    }

    #[test]
    fn test_toc_lists_numbered_chapters() {
        let mut book = sample_book(BookFormat::Epub, 2);
        book.chapters[1].title = "Q&A".to_string();

        let toc = toc_document(&book);
        assert!(toc.contains("<li><a href=\"chapter1.xhtml\">Chapter 1: Post 1</a></li>"));
        assert!(toc.contains("<li><a href=\"chapter2.xhtml\">Chapter 2: Q&amp;A</a></li>"));
        assert!(toc.contains("<h2>by Ada Lovelace</h2>"));
    }

    #[test]
    fn test_chapter_document_uses_sanitized_content() {
        let book = sample_book(BookFormat::Epub, 1);
        let doc = chapter_document(1, &book.chapters[0]);

        assert!(doc.contains("<p class=\"chapter-number\">Chapter 1</p>"));
        assert!(doc.contains("<h1>Post 1</h1>"));
        assert!(doc.contains("<p>Body of post 1</p>"));
        assert!(!doc.contains("<script"));
        assert!(!doc.contains("style="));
    }

    #[test]
    fn test_chapter_document_renders_only_images() {
        let mut book = sample_book(BookFormat::Epub, 1);
        let chapter = &mut book.chapters[0];
        chapter.media = vec![
            Media::image("https://img.example.com/a.png?x=1&y=2", "A \"quoted\" alt"),
            Media {
                media_type: MediaType::Table,
                url: Some("https://img.example.com/table".to_string()),
                content: Some("<table></table>".to_string()),
                alt: None,
            },
            Media {
                media_type: MediaType::Image,
                url: Some("https://img.example.com/b.png".to_string()),
                content: None,
                alt: None,
            },
        ];

        let doc = chapter_document(1, chapter);
        assert_eq!(doc.matches("<img ").count(), 2);
        assert!(doc.contains(
            "<img src=\"https://img.example.com/a.png?x=1&amp;y=2\" alt=\"A &quot;quoted&quot; alt\"/>"
        ));
        assert!(doc.contains("<img src=\"https://img.example.com/b.png\" alt=\"\"/>"));
        assert!(!doc.contains("table"));
    }

    #[test]
    fn test_numbers_follow_position_not_id() {
        let book = sample_book(BookFormat::Epub, 3);
        let stream = render_epub(&book).unwrap();

        assert!(stream.contains("<section id=\"chapter3\""));
        assert!(!stream.contains("chapter97"));
    }
}
