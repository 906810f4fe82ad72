//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator owns the crawl configuration and its collaborators. Running a
//! crawl seeds the frontier with the root URL, spawns exactly `workers` worker
//! tasks that share it, waits for all of them and folds their results into a
//! [`CrawlReport`].

use crate::config::{parse_root_url, validate_crawl_config, CrawlConfig, HttpConfig};
use crate::crawler::pipeline::PagePipeline;
use crate::crawler::worker::{CrawlContext, Worker};
use crate::crawler::{Fetcher, Frontier, HtmlParser, HttpFetcher, PageHandler, Parser};
use crate::output::CrawlReport;
use crate::url::{normalize_url, LinkFilter};
use crate::{ConfigError, RippleError};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Bounded-concurrency crawler for a single site
pub struct Crawler {
    config: CrawlConfig,
    frontier: Arc<Frontier>,
    filter: LinkFilter,
    base_url: Url,
    http: HttpConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
    parser: Arc<dyn Parser>,
    handler: Option<Arc<dyn PageHandler>>,
    cancel: CancellationToken,
}

impl Crawler {
    /// Creates a crawler for `config`
    ///
    /// The configuration is validated up front: `workers` must be at least 1, the
    /// root URL must be an absolute http(s) URL and the exclusion pattern must
    /// compile. The frontier is seeded with the normalized root URL. Unless another
    /// fetcher is supplied, pages are fetched with an [`HttpFetcher`] built when the
    /// crawl starts. Pages are parsed with [`HtmlParser`] by default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation fails.
    pub fn new(config: CrawlConfig) -> Result<Self, ConfigError> {
        validate_crawl_config(&config)?;

        let base_url = parse_root_url(&config.root_url)?;
        let filter = LinkFilter::from_config(&config)?;

        // "http://x.test" and the "http://x.test/" its pages link back to are one URL
        let seed = normalize_url(&config.root_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.root_url, e)))?;
        let frontier = Arc::new(Frontier::with_seed(&seed));

        Ok(Self {
            config,
            frontier,
            filter,
            base_url,
            http: HttpConfig::default(),
            fetcher: None,
            parser: Arc::new(HtmlParser),
            handler: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the page fetcher
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// HTTP settings for the default [`HttpFetcher`]; ignored once a fetcher is supplied
    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Replaces the document parser
    pub fn with_parser(mut self, parser: Arc<dyn Parser>) -> Self {
        self.parser = parser;
        self
    }

    /// Sets the handler invoked for every processed page
    pub fn with_page_handler(mut self, handler: Arc<dyn PageHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Uses `token` to stop the crawl early
    ///
    /// Once the token is cancelled, workers stop taking new URLs and drop any page
    /// they are still fetching. Abandoned URLs are not marked visited.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The frontier this crawler will consume
    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Runs the crawl until the frontier drains or the crawl is cancelled
    ///
    /// Per-URL failures never abort the crawl; they are recorded in the report.
    /// A panicking worker is counted in [`CrawlReport::worker_panics`] and the
    /// remaining workers carry on.
    ///
    /// # Errors
    ///
    /// Fails before any page is fetched if no fetcher was supplied and the default
    /// HTTP client cannot be built.
    pub async fn crawl(self) -> Result<CrawlReport, RippleError> {
        let start_time = Instant::now();
        let workers = self.config.workers;

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(&self.http).map_err(ConfigError::HttpClient)?),
        };

        tracing::info!(
            "Starting crawl of {} with {} workers",
            self.config.root_url,
            workers
        );

        let context = Arc::new(CrawlContext {
            frontier: Arc::clone(&self.frontier),
            pipeline: PagePipeline {
                fetcher,
                parser: self.parser,
                handler: self.handler,
            },
            filter: self.filter,
            base_url: self.base_url,
            cancel: self.cancel.clone(),
        });

        let mut tasks = JoinSet::new();
        for id in 0..workers {
            let worker = Worker::new(id, Arc::clone(&context));
            tasks.spawn(worker.run());
        }

        let mut report = CrawlReport {
            root_url: self.config.root_url.clone(),
            ..Default::default()
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(summary) => report.pages.extend(summary.pages),
                Err(e) if e.is_panic() => {
                    tracing::error!("Crawl worker panicked: {}", e);
                    report.worker_panics += 1;
                }
                Err(e) => tracing::warn!("Crawl worker did not finish: {}", e),
            }
        }

        report.cancelled = self.cancel.is_cancelled() && !self.frontier.is_complete();
        report.visited = self.frontier.visited();
        report.discovered = self.frontier.seen_len();
        report.elapsed = start_time.elapsed();

        if report.cancelled {
            tracing::info!(
                "Crawl cancelled: {} pages visited, {} still pending",
                report.visited.len(),
                self.frontier.pending_len()
            );
        } else {
            tracing::info!(
                "Crawl completed: {} pages visited in {:?}",
                report.visited.len(),
                report.elapsed
            );
        }

        Ok(report)
    }
}

/// Crawls the site described by `config` with the default fetcher and parser
///
/// This is the main entry point for a crawl without a page handler; use
/// [`Crawler`] directly to plug in collaborators.
///
/// # Arguments
///
/// * `config` - Root URL, worker count and exclusion pattern
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran; per-page failures are inside the report
/// * `Err(RippleError)` - The configuration was rejected or the HTTP client could
///   not be built
pub async fn run_crawl(config: CrawlConfig) -> Result<CrawlReport, RippleError> {
    Crawler::new(config)?.crawl().await
}
