//! Application state management

use std::sync::Arc;

use crate::article::ArticleFetcher;
use crate::config::Config;
use crate::export::ExportOptions;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    export_options: ExportOptions,
    fetcher: ArticleFetcher,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: &Config, fetcher: ArticleFetcher) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                export_options: ExportOptions::from(&config.export),
                fetcher,
            }),
        }
    }

    /// Get the PDF layout options
    pub fn export_options(&self) -> &ExportOptions {
        &self.inner.export_options
    }

    /// Get the article fetcher
    pub fn fetcher(&self) -> &ArticleFetcher {
        &self.inner.fetcher
    }
}
