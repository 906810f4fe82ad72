use crate::config::types::{Config, CrawlConfig, DownloadConfig, HttpConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates every section present in a configuration file
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(crawl) = &config.crawl {
        validate_crawl_config(crawl)?;
    }
    validate_http_config(&config.http)?;
    if let Some(download) = &config.download {
        validate_download_config(download)?;
    }
    Ok(())
}

/// Validates a crawl configuration
pub fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_workers(config.workers)?;
    parse_root_url(&config.root_url)?;
    compile_exclude_pattern(&config.exclude_pattern)?;
    Ok(())
}

/// Validates a batch download configuration
pub fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    validate_workers(config.workers)?;

    for url in &config.urls {
        parse_http_url(url)?;
    }

    Ok(())
}

/// Validates HTTP client configuration
pub fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Parses the crawl root, which must be an absolute http(s) URL with a host
pub fn parse_root_url(root_url: &str) -> Result<Url, ConfigError> {
    let url = parse_http_url(root_url)?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "Root URL '{}' has no host",
            root_url
        )));
    }

    Ok(url)
}

/// Compiles the exclusion regex
pub fn compile_exclude_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
}

fn validate_workers(workers: usize) -> Result<(), ConfigError> {
    if workers < 1 {
        return Err(ConfigError::Validation(format!(
            "workers must be >= 1, got {}",
            workers
        )));
    }
    Ok(())
}

fn parse_http_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid URL '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "URL '{}' must use the http or https scheme",
            raw
        )));
    }

    Ok(url)
}
