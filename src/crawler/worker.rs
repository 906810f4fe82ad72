//! Crawl worker
//!
//! Each worker is one tokio task running the frontier-consumption loop:
//! dequeue → fetch → parse → handler → filter links → enqueue, until the
//! frontier reports it is drained or the crawl is cancelled.

use crate::crawler::pipeline::{PagePipeline, Visit};
use crate::crawler::{Document, Frontier};
use crate::output::PageRecord;
use crate::url::{strip_fragment, LinkDecision, LinkFilter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// State shared by every worker of one crawl
pub(crate) struct CrawlContext {
    pub frontier: Arc<Frontier>,
    pub pipeline: PagePipeline,
    pub filter: LinkFilter,
    /// Relative links are resolved against the root, not the page they appear on
    pub base_url: Url,
    pub cancel: CancellationToken,
}

/// What one worker did before exiting
#[derive(Debug, Default)]
pub(crate) struct WorkerSummary {
    pub pages: Vec<PageRecord>,
}

pub(crate) struct Worker {
    id: usize,
    context: Arc<CrawlContext>,
}

impl Worker {
    pub fn new(id: usize, context: Arc<CrawlContext>) -> Self {
        Self { id, context }
    }

    /// Runs the worker loop to completion
    pub async fn run(self) -> WorkerSummary {
        let mut summary = WorkerSummary::default();
        let context = &self.context;

        loop {
            let lease = tokio::select! {
                biased;
                _ = context.cancel.cancelled() => break,
                lease = context.frontier.dequeue() => match lease {
                    Some(lease) => lease,
                    None => break,
                },
            };

            let url = lease.url().to_string();
            tracing::debug!("Worker {} processing {}", self.id, url);

            let visit = tokio::select! {
                biased;
                _ = context.cancel.cancelled() => None,
                visit = context.pipeline.visit(&url, &context.base_url) => Some(visit),
            };

            match visit {
                Some(Visit::Processed(document)) => {
                    let enqueued = self.enqueue_links(&document);
                    tracing::debug!("Processed {} ({} new links)", url, enqueued);
                    summary.pages.push(PageRecord::processed(url));
                }
                Some(Visit::Failed(record)) => summary.pages.push(record),
                None => {
                    tracing::debug!("Worker {} abandoned {} on cancellation", self.id, url);
                    lease.abandon();
                    break;
                }
            }

            lease.mark_visited();
        }

        tracing::debug!(
            "Worker {} exiting after {} pages",
            self.id,
            summary.pages.len()
        );
        summary
    }

    /// Filters the page's anchor links and enqueues the eligible ones
    fn enqueue_links(&self, document: &Document) -> usize {
        let context = &self.context;
        let mut enqueued = 0;

        for link in document.anchor_links() {
            match context.filter.evaluate(link, &context.frontier) {
                LinkDecision::Accept => {
                    // A sibling worker may have enqueued it since the check
                    if context.frontier.enqueue(strip_fragment(link)) {
                        enqueued += 1;
                    }
                }
                decision => tracing::trace!("Skipping {}: {:?}", link, decision),
            }
        }

        enqueued
    }
}
