//! Configuration module for Site-Ripple
//!
//! Crawls and batch downloads can be configured programmatically through
//! [`CrawlConfig`] and [`DownloadConfig`], or loaded from a TOML file.
//!
//! # Example
//!
//! ```no_run
//! use site_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ripple.toml")).unwrap();
//! if let Some(crawl) = &config.crawl {
//!     println!("Crawling {} with {} workers", crawl.root_url, crawl.workers);
//! }
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, DownloadConfig, HttpConfig, DEFAULT_EXCLUDE_PATTERN, DEFAULT_WORKERS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export validation entry points used at construction time
pub use validation::{
    compile_exclude_pattern, parse_root_url, validate, validate_crawl_config,
    validate_download_config, validate_http_config,
};
