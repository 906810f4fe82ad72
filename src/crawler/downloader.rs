//! Batch downloader for a fixed list of URLs
//!
//! Every URL gets its own task up front, and a global semaphore with `workers`
//! permits bounds how many fetches run at once. No links are followed.

use crate::config::{validate_download_config, DownloadConfig, HttpConfig};
use crate::crawler::pipeline::{PagePipeline, Visit};
use crate::crawler::{Fetcher, HtmlParser, HttpFetcher, PageHandler, Parser};
use crate::output::{DownloadReport, PageRecord};
use crate::state::PageOutcome;
use crate::{ConfigError, RippleError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Fetches and processes a fixed set of URLs with bounded concurrency
pub struct BatchDownloader {
    config: DownloadConfig,
    http: HttpConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
    parser: Arc<dyn Parser>,
    handler: Option<Arc<dyn PageHandler>>,
    cancel: CancellationToken,
}

impl BatchDownloader {
    /// Creates a downloader for `config`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `workers` is 0 or a URL is not an absolute http(s)
    /// URL.
    pub fn new(config: DownloadConfig) -> Result<Self, ConfigError> {
        validate_download_config(&config)?;

        Ok(Self {
            config,
            http: HttpConfig::default(),
            fetcher: None,
            parser: Arc::new(HtmlParser),
            handler: None,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// HTTP settings for the default [`HttpFetcher`]; ignored once a fetcher is supplied
    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn Parser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_page_handler(mut self, handler: Arc<dyn PageHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Uses `token` to stop the download early
    ///
    /// URLs not yet started are skipped and fetches already running are dropped.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Downloads every URL, at most `workers` at a time
    ///
    /// # Errors
    ///
    /// Fails before any URL is fetched if no fetcher was supplied and the default
    /// HTTP client cannot be built.
    pub async fn download(self) -> Result<DownloadReport, RippleError> {
        let start_time = Instant::now();
        let total = self.config.urls.len();

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(&self.http).map_err(ConfigError::HttpClient)?),
        };

        tracing::info!(
            "Downloading {} URLs with {} workers",
            total,
            self.config.workers
        );

        let pipeline = PagePipeline {
            fetcher,
            parser: self.parser,
            handler: self.handler,
        };
        let semaphore = Arc::new(Semaphore::new(self.config.workers));

        let mut tasks = JoinSet::new();
        for url in self.config.urls {
            let pipeline = pipeline.clone();
            let semaphore = Arc::clone(&semaphore);
            let cancel = self.cancel.clone();

            tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return TaskOutcome::Skipped,
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return TaskOutcome::Skipped,
                    },
                };

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => TaskOutcome::Interrupted,
                    record = download_one(&pipeline, url) => TaskOutcome::Finished(record),
                }
            });
        }

        let mut report = DownloadReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(TaskOutcome::Finished(record)) => report.pages.push(record),
                Ok(TaskOutcome::Skipped) => report.skipped += 1,
                Ok(TaskOutcome::Interrupted) => report.interrupted += 1,
                Err(e) if e.is_panic() => {
                    tracing::error!("Download task panicked: {}", e);
                    report.task_panics += 1;
                }
                Err(e) => tracing::warn!("Download task did not finish: {}", e),
            }
        }

        report.cancelled = report.skipped + report.interrupted > 0;
        report.elapsed = start_time.elapsed();

        tracing::info!(
            "Download finished: {} of {} URLs processed in {:?}",
            report.processed_count(),
            total,
            report.elapsed
        );

        Ok(report)
    }
}

enum TaskOutcome {
    Finished(PageRecord),
    /// Cancelled before a permit was granted
    Skipped,
    /// Cancelled while the page was being fetched or processed
    Interrupted,
}

// Links on a downloaded page resolve against that page's own URL
async fn download_one(pipeline: &PagePipeline, url: String) -> PageRecord {
    let base_url = match Url::parse(&url) {
        Ok(base_url) => base_url,
        Err(e) => {
            return PageRecord::failed(
                url,
                PageOutcome::FetchFailed,
                format!("Invalid URL: {}", e),
            )
        }
    };

    match pipeline.visit(&url, &base_url).await {
        Visit::Processed(_) => {
            tracing::debug!("Downloaded {}", url);
            PageRecord::processed(url)
        }
        Visit::Failed(record) => record,
    }
}

/// Downloads `config.urls` with the default fetcher and parser
pub async fn run_download(config: DownloadConfig) -> Result<DownloadReport, RippleError> {
    BatchDownloader::new(config)?.download().await
}
