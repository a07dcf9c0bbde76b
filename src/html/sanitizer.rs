//! Chapter HTML sanitization using lol_html for streaming rewrites
//!
//! Scraped article HTML is cleaned into paragraph-structured markup that can
//! be embedded in an exported document, and reduced to plain text for the
//! PDF layout.

use lol_html::{element, rewrite_str, RewriteStrSettings};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RE_SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>").unwrap()
});
static RE_EMPTY_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<p\b[^>]*>\s*</p\s*>").unwrap());
static RE_PARAGRAPH_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(/?)p\b[^>]*>").unwrap());
static RE_NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\r?\n[ \t]*){2,}").unwrap());
static RE_BLOCK_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)<(?:p|h[1-6]|ul|ol|li|blockquote|pre|table|figure|section|article|header|footer|nav|aside|hr)\b",
    )
    .unwrap()
});
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(nbsp|amp|lt|gt|quot);").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clean raw chapter HTML into a safe, paragraph-structured fragment.
///
/// Script and style elements are dropped with their content, inline `style`
/// attributes are stripped, `div`/`span` containers become paragraphs, and
/// blank-line runs inside a paragraph split it in two. Entities are left
/// encoded. The result is trimmed and may be empty.
pub fn sanitize_html(raw: &str) -> String {
    let rewritten = match rewrite_containers(raw) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("HTML rewrite failed, falling back to plain text: {}", e);
            return plain_text_paragraph(raw);
        }
    };

    let mut html = remove_empty_paragraphs(&rewritten);
    if !RE_BLOCK_TAG.is_match(&html) && !html.trim().is_empty() {
        html = format!("<p>{}</p>", html.trim());
    }
    let html = split_paragraphs(&html);

    remove_empty_paragraphs(&html).trim().to_string()
}

/// Remove `<script>` and `<style>` elements, including their content.
pub fn remove_scripts_and_styles(html: &str) -> String {
    RE_SCRIPT_STYLE.replace_all(html, "").into_owned()
}

/// Reduce HTML to single-spaced plain text.
///
/// Tags are stripped, the five common entities are decoded, whitespace is
/// collapsed and the result is hard-cut to `max_length` characters. The
/// output never contains `<` or `>`.
pub fn to_plain_text(html: &str, max_length: Option<usize>) -> String {
    let stripped = RE_TAG.replace_all(html, " ");
    // Decoded brackets are text, not markup; only the characters go
    let bare = decode_entities(&stripped).replace(['<', '>'], "");
    let collapsed = RE_WHITESPACE.replace_all(&bare, " ");
    let text = collapsed.trim();

    match max_length {
        Some(limit) => text.chars().take(limit).collect(),
        None => text.to_string(),
    }
}

/// Escape `&`, `<`, `>` and `"` for interpolation into generated markup.
pub fn escape_for_markup(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Escape a string for use inside a PDF literal string `( ... )`.
pub fn escape_pdf_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '(' | ')') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn rewrite_containers(html: &str) -> Result<String, lol_html::errors::RewritingError> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("script", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("style", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("[style]", |el| {
                    el.remove_attribute("style");
                    Ok(())
                }),
                element!("div, span", |el| {
                    el.set_tag_name("p")?;
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
}

fn remove_empty_paragraphs(html: &str) -> String {
    let mut result = html.to_string();
    // Removing an inner paragraph can leave its parent empty
    while RE_EMPTY_PARAGRAPH.is_match(&result) {
        result = RE_EMPTY_PARAGRAPH.replace_all(&result, "").into_owned();
    }
    result
}

/// Turn blank-line runs inside an open paragraph into `</p><p>`.
fn split_paragraphs(html: &str) -> String {
    let mut output = String::with_capacity(html.len());
    let mut in_paragraph = false;
    let mut last = 0;

    for run in RE_NEWLINE_RUN.find_iter(html) {
        let segment = &html[last..run.start()];
        if let Some(tag) = RE_PARAGRAPH_TAG.captures_iter(segment).last() {
            in_paragraph = tag[1].is_empty();
        }
        output.push_str(segment);
        if in_paragraph {
            output.push_str("</p><p>");
        } else {
            output.push_str(run.as_str());
        }
        last = run.end();
    }
    output.push_str(&html[last..]);
    output
}

fn decode_entities(text: &str) -> String {
    RE_ENTITY
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "nbsp" => " ",
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            _ => "\"",
        })
        .into_owned()
}

fn plain_text_paragraph(raw: &str) -> String {
    let text = to_plain_text(&remove_scripts_and_styles(raw), None);
    if text.is_empty() {
        String::new()
    } else {
        format!("<p>{}</p>", escape_for_markup(&text))
    }
}
