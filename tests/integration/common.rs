//! Test doubles shared by the integration tests

use async_trait::async_trait;
use site_ripple::crawler::{Document, FetchResponse, Fetcher, PageHandler};
use site_ripple::{CallbackError, FetchError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory site: URL -> (status, body)
///
/// Unknown URLs answer 404. Every call is counted per URL, and the number of
/// fetches running at the same time is tracked.
#[derive(Default)]
pub struct StubSite {
    pages: HashMap<String, (u16, Vec<u8>)>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    fetches: Mutex<HashMap<String, usize>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl StubSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a 200 page whose body is an anchor for each href
    pub fn page(self, url: &str, hrefs: &[&str]) -> Self {
        let anchors: String = hrefs
            .iter()
            .map(|href| format!(r#"<a href="{}">link</a>"#, href))
            .collect();
        let html = format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            url, anchors
        );
        self.raw(url, 200, html.into_bytes())
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.raw(url, status, Vec::new())
    }

    pub fn raw(mut self, url: &str, status: u16, body: Vec<u8>) -> Self {
        self.pages.insert(url.to_string(), (status, body));
        self
    }

    /// Delay applied to every fetch without its own delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn delay_for(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetches.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for StubSite {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(&self.active);
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        let delay = self
            .delays
            .get(url)
            .copied()
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        Ok(match self.pages.get(url) {
            Some((status, body)) => FetchResponse::new(*status, body.clone()),
            None => FetchResponse::new(404, Vec::new()),
        })
    }
}

/// A site with no end: `/n` links to `/n+1` and `/n+2`
pub struct EndlessSite {
    pub root: String,
    pub delay: Duration,
}

#[async_trait]
impl Fetcher for EndlessSite {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        tokio::time::sleep(self.delay).await;

        let n: u64 = url
            .trim_start_matches(self.root.as_str())
            .trim_start_matches('/')
            .parse()
            .unwrap_or(0);
        let html = format!(
            r#"<html><body><a href="/{}">next</a><a href="/{}">skip</a></body></html>"#,
            n + 1,
            n + 2
        );
        Ok(FetchResponse::new(200, html))
    }
}

/// Page handler recording `(url, title)` for every page it sees
#[derive(Default)]
pub struct Collector {
    pages: Mutex<Vec<(String, Option<String>)>>,
}

impl Collector {
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .pages
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect();
        urls.sort();
        urls
    }

    pub fn title_of(&self, url: &str) -> Option<String> {
        self.pages
            .lock()
            .unwrap()
            .iter()
            .find(|(seen, _)| seen == url)
            .and_then(|(_, title)| title.clone())
    }
}

impl PageHandler for Collector {
    fn handle(&self, url: &str, document: &Document) -> Result<(), CallbackError> {
        self.pages
            .lock()
            .unwrap()
            .push((url.to_string(), document.title().map(str::to_string)));
        Ok(())
    }
}
