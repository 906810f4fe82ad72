//! Site-Ripple: a bounded-concurrency site crawler
//!
//! This crate crawls a single site with a fixed pool of workers sharing one frontier,
//! handing every fetched page to a caller-supplied handler. A simpler batch downloader
//! shares the same worker-bounding discipline for fixed URL lists.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Ripple operations
///
/// Only problems that stop a crawl or download from starting surface here.
/// Fetch, parse and page handler errors stay local to their URL and are listed
/// in the report.
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid exclusion pattern: {0}")]
    InvalidPattern(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors raised while fetching a single URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Errors raised while turning a response body into a document
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Response body is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// Error reported by a caller-supplied page handler
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CallbackError {
    pub message: String,
}

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for Site-Ripple operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use crate::config::{CrawlConfig, DownloadConfig};
pub use crate::crawler::{
    run_crawl, run_download, BatchDownloader, Crawler, Document, FetchResponse, Fetcher,
    Frontier, HtmlParser, HttpFetcher, Link, PageHandler, Parser,
};
pub use crate::output::{CrawlReport, DownloadReport};
pub use crate::state::PageOutcome;
pub use crate::url::{strip_fragment, LinkDecision, LinkFilter};
