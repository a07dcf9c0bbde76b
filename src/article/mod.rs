//! Article module
//!
//! Downloads blog articles and extracts the title, readable content and
//! images that become a chapter.

mod extract;
mod fetcher;

pub use extract::{extract_article, title_from_url, Article};
pub use fetcher::{ArticleFetcher, HttpPageSource, PageSource};

use thiserror::Error;

/// Errors while fetching an article
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Could not extract meaningful content from {0}")]
    NoContent(String),

    #[error("HTML parse error: {0}")]
    Parse(String),

    #[error("Failed to fetch article after {attempts} attempts: {reason}")]
    RetriesExhausted { attempts: u32, reason: String },
}
