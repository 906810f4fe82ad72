use serde::Deserialize;

/// Number of concurrent workers used when none is configured
pub const DEFAULT_WORKERS: usize = 10;

/// Skips URLs ending in a dot-extension unless the extension starts with `htm` or `php`
///
/// The alternation spells out "any word that does not begin with htm/php" without
/// lookahead, which the `regex` crate does not support.
pub const DEFAULT_EXCLUDE_PATTERN: &str = r"\.(?:[\w&&[^hp]]\w*|h|h[\w&&[^t]]\w*|ht|ht[\w&&[^m]]\w*|p|p[\w&&[^h]]\w*|ph|ph[\w&&[^p]]\w*)$";

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: Option<CrawlConfig>,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub download: Option<DownloadConfig>,
}

/// Site crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Root URL; also the substring every followed link must contain
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Number of concurrent workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Regex matched against candidate URLs; matching URLs are never enqueued
    #[serde(rename = "exclude-pattern", default = "default_exclude_pattern")]
    pub exclude_pattern: String,
}

impl CrawlConfig {
    /// Creates a crawl configuration with default workers and exclusion pattern
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            workers: DEFAULT_WORKERS,
            exclude_pattern: default_exclude_pattern(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_pattern = pattern.into();
        self
    }
}

/// Batch download configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// URLs to fetch, in dispatch order
    #[serde(default)]
    pub urls: Vec<String>,

    /// Maximum number of fetches in flight at once
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl DownloadConfig {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

/// HTTP client configuration for the default fetcher
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_exclude_pattern() -> String {
    DEFAULT_EXCLUDE_PATTERN.to_string()
}

fn default_user_agent() -> String {
    format!("site-ripple/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}
