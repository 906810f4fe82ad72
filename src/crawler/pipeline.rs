//! Single-page processing shared by crawl workers and the batch downloader
//!
//! fetch → status check → parse → page handler. Every failure is classified
//! into a [`PageOutcome`] and stays local to the URL.

use crate::crawler::{Document, Fetcher, PageHandler, Parser};
use crate::output::PageRecord;
use crate::state::PageOutcome;
use crate::FetchError;
use std::sync::Arc;
use url::Url;

/// Result of running one URL through the pipeline
#[derive(Debug)]
pub(crate) enum Visit {
    /// Page parsed and accepted by the handler
    Processed(Document),
    /// Page ended early; the record carries the outcome and error text
    Failed(PageRecord),
}

/// The collaborators every page goes through
#[derive(Clone)]
pub(crate) struct PagePipeline {
    pub fetcher: Arc<dyn Fetcher>,
    pub parser: Arc<dyn Parser>,
    pub handler: Option<Arc<dyn PageHandler>>,
}

impl PagePipeline {
    /// Fetches `url` and, on a 200, parses it against `base_url` and runs the handler
    pub async fn visit(&self, url: &str, base_url: &Url) -> Visit {
        let response = match self.fetcher.fetch(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                return Visit::Failed(PageRecord::failed(
                    url,
                    PageOutcome::FetchFailed,
                    e.to_string(),
                ));
            }
        };

        if !response.is_ok() {
            let error = FetchError::Status {
                url: url.to_string(),
                status: response.status,
            };
            tracing::info!("{}", error);
            return Visit::Failed(PageRecord::failed(
                url,
                PageOutcome::HttpStatus(response.status),
                error.to_string(),
            ));
        }

        let document = match self.parser.parse(&response.body, base_url) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", url, e);
                return Visit::Failed(PageRecord::failed(
                    url,
                    PageOutcome::ParseFailed,
                    e.to_string(),
                ));
            }
        };

        if let Some(handler) = &self.handler {
            if let Err(e) = handler.handle(url, &document) {
                tracing::error!("Page handler failed for {}: {}", url, e);
                return Visit::Failed(PageRecord::failed(
                    url,
                    PageOutcome::CallbackFailed,
                    e.to_string(),
                ));
            }
        }

        Visit::Processed(document)
    }
}
