//! Request payloads as sent by the editor
//!
//! The editor works with loosely typed chapters (still loading, failed,
//! content missing). These are validated and coerced into a [`Book`] here,
//! before anything reaches the exporters.

use serde::Deserialize;

use super::types::{Book, BookCover, BookFormat, Chapter, Media};
use crate::export::ExportError;

/// Book as submitted for export
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub format: String,
    #[serde(default)]
    pub chapters: Vec<ChapterPayload>,
    #[serde(default)]
    pub cover_image: Option<BookCover>,
}

/// Chapter as tracked by the editor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPayload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl TryFrom<ChapterPayload> for Chapter {
    type Error = ExportError;

    fn try_from(payload: ChapterPayload) -> Result<Self, Self::Error> {
        if payload.is_loading {
            return Err(ExportError::InvalidInput(format!(
                "Chapter '{}' is still loading",
                payload.title
            )));
        }

        let fetched = payload
            .content
            .filter(|c| !c.trim().is_empty() && payload.error.is_none());
        let content = match fetched {
            Some(content) => content,
            None => {
                tracing::warn!(
                    chapter = %payload.id,
                    error = payload.error.as_deref().unwrap_or("no content"),
                    "Rendering placeholder for unfetched chapter"
                );
                Chapter::placeholder_content(payload.url.as_deref())
            }
        };

        Ok(Chapter {
            id: payload.id,
            title: payload.title,
            description: payload.description,
            url: payload.url,
            content,
            media: payload.media,
        })
    }
}

impl TryFrom<BookPayload> for Book {
    type Error = ExportError;

    fn try_from(payload: BookPayload) -> Result<Self, Self::Error> {
        let format = payload
            .format
            .parse::<BookFormat>()
            .map_err(|e| ExportError::InvalidInput(e.to_string()))?;

        let chapters = payload
            .chapters
            .into_iter()
            .map(Chapter::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Book {
            title: payload.title,
            author: payload.author,
            format,
            chapters,
            cover_image: payload.cover_image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(id: &str, content: Option<&str>) -> ChapterPayload {
        ChapterPayload {
            id: id.to_string(),
            title: format!("Title {}", id),
            url: Some(format!("https://blog.example.com/{}", id)),
            content: content.map(str::to_string),
            ..ChapterPayload::default()
        }
    }

    #[test]
    fn test_payload_from_editor_json() {
        let json = r#"{
            "title": "My Book",
            "author": "Ada",
            "format": "EPUB",
            "coverImage": {"id": "template-1", "type": "template", "url": "https://img/1.jpg"},
            "chapters": [{
                "id": "1",
                "title": "First",
                "description": "Summary",
                "url": "https://blog.example.com/first",
                "content": "<p>Hello</p>",
                "media": [{"type": "image", "url": "https://img/a.png", "alt": "A"}],
                "isLoading": false
            }]
        }"#;
        let payload: BookPayload = serde_json::from_str(json).unwrap();
        let book = Book::try_from(payload).unwrap();

        assert_eq!(book.format, BookFormat::Epub);
        assert_eq!(book.chapters.len(), 1);
        assert_eq!(book.chapters[0].content, "<p>Hello</p>");
        assert_eq!(book.chapters[0].media.len(), 1);
        assert!(book.cover_image.is_some());
    }

    #[test]
    fn test_unknown_format_is_invalid_input() {
        let payload = BookPayload {
            title: "Book".to_string(),
            author: String::new(),
            format: "DOCX".to_string(),
            chapters: vec![chapter("1", Some("<p>x</p>"))],
            cover_image: None,
        };

        let err = Book::try_from(payload).unwrap_err();
        assert!(matches!(err, ExportError::InvalidInput(ref msg) if msg.contains("DOCX")));
    }

    #[test]
    fn test_failed_chapter_gets_placeholder() {
        let mut failed = chapter("broken", Some("<p>stale</p>"));
        failed.error = Some("Failed to fetch article after 4 attempts".to_string());

        let chapter = Chapter::try_from(failed).unwrap();
        assert_eq!(
            chapter.content,
            "<p>Content could not be fetched for this chapter. URL: https://blog.example.com/broken</p>"
        );
    }

    #[test]
    fn test_missing_content_gets_placeholder() {
        let blank = Chapter::try_from(chapter("empty", Some("   "))).unwrap();
        assert!(blank.content.contains("Content could not be fetched"));

        let no_url = ChapterPayload {
            id: "nourl".to_string(),
            ..ChapterPayload::default()
        };
        let no_url = Chapter::try_from(no_url).unwrap();
        assert!(no_url.content.ends_with("URL: unknown</p>"));
    }

    #[test]
    fn test_loading_chapter_is_rejected() {
        let mut loading = chapter("1", None);
        loading.is_loading = true;

        assert!(matches!(
            Chapter::try_from(loading),
            Err(ExportError::InvalidInput(_))
        ));
    }
}
