//! Configuration management for Blog Book Server

use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::export::ExportOptions;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub export: ExportConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin; any origin when unset
    pub cors_allow_origin: Option<String>,
}

/// PDF layout heuristics
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub max_chapter_chars: usize,
    pub line_width: usize,
    pub lines_per_page: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay; retry `n` waits `n * retry_delay_ms`
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
    pub max_images: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_allow_origin: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        let options = ExportOptions::default();
        ExportConfig {
            max_chapter_chars: options.max_chapter_chars,
            line_width: options.line_width,
            lines_per_page: options.lines_per_page,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            max_retries: 3,
            retry_delay_ms: 1000,
            timeout_secs: 20,
            max_images: 5,
        }
    }
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        ExportOptions {
            max_chapter_chars: config.max_chapter_chars,
            line_width: config.line_width,
            lines_per_page: config.lines_per_page,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or malformed values fall back to the defaults.
    pub fn from_env() -> Self {
        let server = ServerConfig::default();
        let export = ExportConfig::default();
        let fetch = FetchConfig::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(server.host),
                port: env_or("SERVER_PORT", server.port),
                cors_allow_origin: env::var("CORS_ALLOW_ORIGIN").ok().filter(|o| !o.is_empty()),
            },
            export: ExportConfig {
                max_chapter_chars: env_or("PDF_MAX_CHAPTER_CHARS", export.max_chapter_chars),
                line_width: env_or("PDF_LINE_WIDTH", export.line_width),
                lines_per_page: env_or("PDF_LINES_PER_PAGE", export.lines_per_page),
            },
            fetch: FetchConfig {
                max_retries: env_or("FETCH_MAX_RETRIES", fetch.max_retries),
                retry_delay_ms: env_or("FETCH_RETRY_DELAY_MS", fetch.retry_delay_ms),
                timeout_secs: env_or("FETCH_TIMEOUT_SECS", fetch.timeout_secs),
                max_images: env_or("FETCH_MAX_IMAGES", fetch.max_images),
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring malformed {}={:?}", key, value);
            default
        }),
        Err(_) => default,
    }
}
