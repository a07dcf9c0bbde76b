//! Book types assembled by the editor and consumed by the exporters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::html::escape_for_markup;

/// A book ready for export
#[derive(Debug, Clone)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub format: BookFormat,
    /// Chapters in reading order
    pub chapters: Vec<Chapter>,
    /// Cover chosen in the editor; carried along but not rendered
    pub cover_image: Option<BookCover>,
}

/// Export format, named `PDF` or `EPUB` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookFormat {
    Pdf,
    Epub,
}

impl BookFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            BookFormat::Pdf => "pdf",
            BookFormat::Epub => "epub",
        }
    }

    /// Get MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            BookFormat::Pdf => "application/pdf",
            BookFormat::Epub => "application/epub+zip",
        }
    }
}

impl fmt::Display for BookFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookFormat::Pdf => f.write_str("PDF"),
            BookFormat::Epub => f.write_str("EPUB"),
        }
    }
}

/// Error for format names other than PDF and EPUB
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported book format: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for BookFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PDF" => Ok(BookFormat::Pdf),
            "EPUB" => Ok(BookFormat::Epub),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// One chapter, built from one source article
#[derive(Debug, Clone)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Source article URL
    pub url: Option<String>,
    /// Raw HTML extracted from the article
    pub content: String,
    pub media: Vec<Media>,
}

impl Chapter {
    /// Paragraph rendered in place of content that could not be fetched
    pub fn placeholder_content(url: Option<&str>) -> String {
        format!(
            "<p>Content could not be fetched for this chapter. URL: {}</p>",
            escape_for_markup(url.unwrap_or("unknown"))
        )
    }

    /// Image media with a usable URL, as `(url, alt)` pairs
    pub fn images(&self) -> impl Iterator<Item = (&str, &str)> {
        self.media.iter().filter_map(|m| match (m.media_type, m.url.as_deref()) {
            (MediaType::Image, Some(url)) if !url.trim().is_empty() => {
                Some((url, m.alt.as_deref().unwrap_or("")))
            }
            _ => None,
        })
    }
}

/// Media found in an article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Inline content (e.g. table markup)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl Media {
    /// Create an image entry
    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            media_type: MediaType::Image,
            url: Some(url.into()),
            content: None,
            alt: Some(alt.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Table,
}

/// Cover selected for the book
#[derive(Debug, Clone, Deserialize)]
pub struct BookCover {
    pub id: String,
    #[serde(rename = "type")]
    pub cover_type: CoverType,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverType {
    Upload,
    Template,
    Generated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("PDF".parse::<BookFormat>(), Ok(BookFormat::Pdf));
        assert_eq!("epub".parse::<BookFormat>(), Ok(BookFormat::Epub));
        assert_eq!(
            "MOBI".parse::<BookFormat>(),
            Err(UnknownFormat("MOBI".to_string()))
        );
    }

    #[test]
    fn test_format_display_matches_wire_names() {
        for name in ["PDF", "EPUB"] {
            assert_eq!(name.parse::<BookFormat>().unwrap().to_string(), name);
        }
    }

    #[test]
    fn test_images_skip_other_media() {
        let chapter = Chapter {
            id: "c1".to_string(),
            title: "Chapter".to_string(),
            description: String::new(),
            url: None,
            content: String::new(),
            media: vec![
                Media::image("https://example.com/a.png", "A"),
                Media {
                    media_type: MediaType::Video,
                    url: Some("https://example.com/v.mp4".to_string()),
                    content: None,
                    alt: None,
                },
                Media {
                    media_type: MediaType::Image,
                    url: Some("https://example.com/b.png".to_string()),
                    content: None,
                    alt: None,
                },
                Media {
                    media_type: MediaType::Image,
                    url: None,
                    content: None,
                    alt: Some("missing".to_string()),
                },
            ],
        };

        let images: Vec<_> = chapter.images().collect();
        assert_eq!(
            images,
            vec![
                ("https://example.com/a.png", "A"),
                ("https://example.com/b.png", "")
            ]
        );
    }

    #[test]
    fn test_placeholder_content_escapes_url() {
        let html = Chapter::placeholder_content(Some("https://example.com/?a=1&b=2"));
        assert_eq!(
            html,
            "<p>Content could not be fetched for this chapter. URL: https://example.com/?a=1&amp;b=2</p>"
        );
    }

    #[test]
    fn test_media_deserializes_from_editor_json() {
        let media: Media =
            serde_json::from_str(r#"{"type": "image", "url": "https://x/y.jpg"}"#).unwrap();
        assert_eq!(media.media_type, MediaType::Image);
        assert_eq!(media.alt, None);
    }
}
