//! Article extraction from a downloaded page
//!
//! Pulls a title, the main content and a handful of images out of an
//! arbitrary blog page. Content HTML is kept as-is; it is sanitized later,
//! at export time.

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use serde::Serialize;

use super::FetchError;
use crate::book::Media;
use crate::html::{remove_scripts_and_styles, to_plain_text};

/// Paragraphs with this much text or less are treated as boilerplate
const MIN_PARAGRAPH_CHARS: usize = 20;
/// Minimum amount of text for a page to count as an article
const MIN_ARTICLE_CHARS: usize = 100;
/// A content region needs this much text to be preferred over paragraphs
const MIN_REGION_CHARS: usize = 200;

/// Main-content containers, most specific first
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role=\"main\"]",
    ".post-content",
    ".article-content",
    ".content",
    ".entry-content",
    ".post-body",
    ".article-body",
    "main p",
    ".story-body",
];

static RE_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap());
static RE_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>").unwrap());
static RE_PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>").unwrap());
static RE_REGION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--blog-book-region:\d+:(?:start|end)-->").unwrap());
static RE_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\w+$").unwrap());

/// Content extracted from one article page
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub title: String,
    /// Main content region HTML, or the substantial `<p>` blocks one per line
    pub content: String,
    pub media: Vec<Media>,
}

/// Extract an article from page HTML fetched from `url`
///
/// Common main-content containers (`article`, `[role="main"]`, ...) are
/// tried first.
/// When no region holds enough text, the substantial `<p>` blocks of the
/// whole page are used instead.
pub fn extract_article(html: &str, url: &Url, max_images: usize) -> Result<Article, FetchError> {
    let page = remove_scripts_and_styles(html);

    let (content, text_length) = match main_region(&page)? {
        Some((region, length)) => (region, length),
        None => substantial_paragraphs(&page),
    };

    if text_length < MIN_ARTICLE_CHARS {
        return Err(FetchError::NoContent(url.to_string()));
    }

    let title = first_text(&RE_TITLE, &page)
        .or_else(|| first_text(&RE_H1, &page))
        .unwrap_or_else(|| title_from_url(url));

    Ok(Article {
        title,
        content,
        media: extract_images(&page, url, max_images)?,
    })
}

/// Inner HTML and text length of the best content region, if substantial
///
/// Selectors are tried in priority order. The longest region seen so far
/// wins, and the search stops once it exceeds [`MIN_REGION_CHARS`].
fn main_region(page: &str) -> Result<Option<(String, usize)>, FetchError> {
    let mut best: Option<(String, usize)> = None;

    for selector in CONTENT_SELECTORS {
        for region in select_regions(page, selector)? {
            let length = to_plain_text(&region, None).chars().count();
            if best.as_ref().map_or(true, |(_, best_length)| length > *best_length) {
                best = Some((region, length));
            }
        }
        if best.as_ref().is_some_and(|(_, length)| *length > MIN_REGION_CHARS) {
            break;
        }
    }

    if let Some((_, length)) = &best {
        tracing::debug!("Best content region has {} characters", length);
    }
    Ok(best.filter(|(_, length)| *length >= MIN_REGION_CHARS))
}

/// Inner HTML of every element matching `selector`, in document order
///
/// Matches are bracketed with numbered comment markers in one rewrite pass,
/// then cut out of the rewritten page. Markers of nested matches are removed
/// from the outer region.
fn select_regions(page: &str, selector: &str) -> Result<Vec<String>, FetchError> {
    let mut count = 0usize;
    let marked = rewrite_str(
        page,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, |el| {
                el.prepend(&region_marker(count, "start"), ContentType::Html);
                el.append(&region_marker(count, "end"), ContentType::Html);
                count += 1;
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| FetchError::Parse(e.to_string()))?;

    let regions = (0..count)
        .filter_map(|id| {
            let start = region_marker(id, "start");
            let from = marked.find(&start)? + start.len();
            let to = marked.find(&region_marker(id, "end"))?;
            let inner = marked.get(from..to)?;
            Some(RE_REGION_MARKER.replace_all(inner, "").trim().to_string())
        })
        .collect();

    Ok(regions)
}

fn region_marker(id: usize, edge: &str) -> String {
    format!("<!--blog-book-region:{}:{}-->", id, edge)
}

/// `<p>` blocks with more than [`MIN_PARAGRAPH_CHARS`] of text, one per line
fn substantial_paragraphs(page: &str) -> (String, usize) {
    let mut text_length = 0;
    let paragraphs: Vec<&str> = RE_PARAGRAPH
        .captures_iter(page)
        .filter_map(|caps| {
            let text = to_plain_text(&caps[1], None);
            let length = text.chars().count();
            if length > MIN_PARAGRAPH_CHARS {
                text_length += length;
                caps.get(0).map(|m| m.as_str())
            } else {
                None
            }
        })
        .collect();

    (paragraphs.join("\n"), text_length)
}

/// Derive a readable title from a URL
///
/// Uses the last path segment (`my-first_post.html` → `My First Post`), or
/// the host name without its top-level domain when the path is empty.
pub fn title_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last());

    let words = match segment {
        Some(segment) => {
            let spaced = segment.replace(['-', '_'], " ");
            RE_EXTENSION.replace(&spaced, "").into_owned()
        }
        None => {
            let host = url.host_str().unwrap_or_default();
            let host = host.strip_prefix("www.").unwrap_or(host);
            let mut parts: Vec<&str> = host.split('.').collect();
            parts.pop();
            parts.join(" ")
        }
    };

    let title = words
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    if title.trim().is_empty() {
        "Untitled Article".to_string()
    } else {
        title
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn first_text(pattern: &Regex, html: &str) -> Option<String> {
    pattern
        .captures(html)
        .map(|caps| to_plain_text(&caps[1], None))
        .filter(|text| !text.is_empty())
}

/// Collect `<img>` sources resolved against the page URL
fn extract_images(html: &str, base: &Url, max_images: usize) -> Result<Vec<Media>, FetchError> {
    let mut media = Vec::new();

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img[src]", |el| {
                if media.len() >= max_images {
                    return Ok(());
                }
                if let Some(src) = el.get_attribute("src") {
                    match base.join(src.trim()) {
                        Ok(resolved) => {
                            let alt = el.get_attribute("alt").unwrap_or_default();
                            media.push(Media::image(resolved.to_string(), alt));
                        }
                        Err(e) => tracing::debug!("Skipping image {}: {}", src, e),
                    }
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| FetchError::Parse(e.to_string()))?;

    Ok(media)
}
