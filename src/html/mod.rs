//! HTML processing module
//!
//! Turns scraped article HTML into content that can be embedded in an
//! exported book:
//! - Script/style removal and container normalization
//! - Plain-text derivation for the PDF layout
//! - Escaping for markup and PDF string literals
//!
//! Uses lol_html for efficient streaming HTML processing.

mod sanitizer;

pub use sanitizer::{
    escape_for_markup, escape_pdf_literal, remove_scripts_and_styles, sanitize_html,
    to_plain_text,
};
