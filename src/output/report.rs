//! Crawl and download reports

use crate::state::PageOutcome;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// How one URL ended, with an error description for failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: String,
    pub outcome: PageOutcome,
    pub detail: Option<String>,
}

impl PageRecord {
    pub fn processed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: PageOutcome::Processed,
            detail: None,
        }
    }

    pub fn failed(url: impl Into<String>, outcome: PageOutcome, detail: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome,
            detail: Some(detail.into()),
        }
    }
}

/// Result of a site crawl
///
/// A crawl never fails as a whole once it has started; per-URL problems are
/// recorded here. [`CrawlReport::is_success`] is false when a page handler
/// failed, a worker panicked, or the crawl was cancelled.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Root URL the crawl started from
    pub root_url: String,

    /// One record per fetch attempt, in completion order
    pub pages: Vec<PageRecord>,

    /// URLs whose fetch attempt finished
    pub visited: HashSet<String>,

    /// Distinct URLs ever enqueued, including any left unfetched by cancellation
    pub discovered: usize,

    /// Worker tasks that ended in a panic
    pub worker_panics: usize,

    /// Whether the crawl stopped because its cancellation token fired
    pub cancelled: bool,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn processed_count(&self) -> usize {
        count_processed(&self.pages)
    }

    /// Records for every URL that did not end as processed
    pub fn failures(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter().filter(|page| page.outcome.is_error())
    }

    /// Records for URLs whose page handler returned an error
    pub fn callback_failures(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages
            .iter()
            .filter(|page| page.outcome.is_callback_failure())
    }

    /// Number of records per outcome
    pub fn outcome_counts(&self) -> BTreeMap<PageOutcome, usize> {
        count_outcomes(&self.pages)
    }

    /// Looks up the record for a URL
    pub fn page(&self, url: &str) -> Option<&PageRecord> {
        self.pages.iter().find(|page| page.url == url)
    }

    /// True when the crawl ran to completion with no caller-side failures
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.worker_panics == 0 && self.callback_failures().next().is_none()
    }
}

/// Result of a batch download
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    /// One record per URL that was fetched, in completion order
    pub pages: Vec<PageRecord>,

    /// URLs that were never attempted because the download was cancelled
    pub skipped: usize,

    /// URLs whose fetch was already running when the download was cancelled
    pub interrupted: usize,

    /// Download tasks that ended in a panic
    pub task_panics: usize,

    /// Whether the download stopped because its cancellation token fired
    pub cancelled: bool,

    /// Wall-clock duration of the download
    pub elapsed: Duration,
}

impl DownloadReport {
    pub fn processed_count(&self) -> usize {
        count_processed(&self.pages)
    }

    pub fn failures(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter().filter(|page| page.outcome.is_error())
    }

    pub fn outcome_counts(&self) -> BTreeMap<PageOutcome, usize> {
        count_outcomes(&self.pages)
    }

    pub fn page(&self, url: &str) -> Option<&PageRecord> {
        self.pages.iter().find(|page| page.url == url)
    }

    pub fn is_success(&self) -> bool {
        !self.cancelled
            && self.task_panics == 0
            && !self.pages.iter().any(|page| page.outcome.is_callback_failure())
    }
}

fn count_processed(pages: &[PageRecord]) -> usize {
    pages
        .iter()
        .filter(|page| page.outcome.is_success())
        .count()
}

fn count_outcomes(pages: &[PageRecord]) -> BTreeMap<PageOutcome, usize> {
    let mut counts = BTreeMap::new();
    for page in pages {
        *counts.entry(page.outcome).or_insert(0) += 1;
    }
    counts
}
