//! Page handler seam
//!
//! A page handler receives every successfully fetched and parsed page. It runs
//! inside a worker task, possibly concurrently with itself for other URLs, so it
//! must be `Send + Sync` and guard any shared state it touches.

use crate::crawler::Document;
use crate::CallbackError;

/// Caller-supplied per-page callback
///
/// Returning an error aborts the current page: its links are not followed and the
/// failure is listed in the crawl report. Other pages are unaffected.
///
/// Closures with the matching signature implement this trait:
///
/// ```
/// use site_ripple::crawler::{Document, PageHandler};
/// use site_ripple::CallbackError;
///
/// let handler = |url: &str, document: &Document| -> Result<(), CallbackError> {
///     println!("{} ({} chars)", url, document.text().len());
///     Ok(())
/// };
/// let _: &dyn PageHandler = &handler;
/// ```
pub trait PageHandler: Send + Sync {
    fn handle(&self, url: &str, document: &Document) -> Result<(), CallbackError>;
}

impl<F> PageHandler for F
where
    F: Fn(&str, &Document) -> Result<(), CallbackError> + Send + Sync,
{
    fn handle(&self, url: &str, document: &Document) -> Result<(), CallbackError> {
        self(url, document)
    }
}
