//! Article fetching with a bounded retry loop

use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

use super::extract::{extract_article, Article};
use super::FetchError;
use crate::config::FetchConfig;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Source of raw page HTML
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Download the page at `url`
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError>;
}

/// Page source backed by a reqwest client
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// Fetches articles, retrying failed attempts with a linearly growing delay
#[derive(Clone)]
pub struct ArticleFetcher {
    source: Arc<dyn PageSource>,
    max_retries: u32,
    retry_delay: Duration,
    max_images: usize,
}

impl ArticleFetcher {
    /// Create a fetcher that downloads pages over HTTP
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let source = HttpPageSource::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_source(Arc::new(source), config))
    }

    /// Create a fetcher over any page source
    pub fn with_source(source: Arc<dyn PageSource>, config: &FetchConfig) -> Self {
        Self {
            source,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            max_images: config.max_images,
        }
    }

    /// Fetch and extract the article at `url`
    ///
    /// Invalid URLs fail immediately. Any other failure is retried up to
    /// `max_retries` times, waiting `retry_delay * attempt` before each retry.
    pub async fn fetch(&self, url: &str) -> Result<Article, FetchError> {
        let url = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        tracing::info!("Fetching article from {}", url);

        let mut retries = 0;
        loop {
            match self.fetch_once(&url).await {
                Ok(article) => {
                    tracing::info!(
                        "Extracted {} characters from {}",
                        article.content.len(),
                        url
                    );
                    return Ok(article);
                }
                Err(e) if retries < self.max_retries => {
                    retries += 1;
                    tracing::warn!(
                        "Fetch attempt {} for {} failed: {}. Retry {}/{}",
                        retries,
                        url,
                        e,
                        retries,
                        self.max_retries
                    );
                    tokio::time::sleep(self.delay_before_retry(retries)).await;
                }
                Err(e) => {
                    tracing::error!("Giving up on {}: {}", url, e);
                    return Err(FetchError::RetriesExhausted {
                        attempts: retries + 1,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Wait before retry `retry` (1-based), saturating on overflow
    fn delay_before_retry(&self, retry: u32) -> Duration {
        self.retry_delay.saturating_mul(retry)
    }

    async fn fetch_once(&self, url: &Url) -> Result<Article, FetchError> {
        let html = self.source.fetch_page(url).await?;
        extract_article(&html, url, self.max_images)
    }
}
