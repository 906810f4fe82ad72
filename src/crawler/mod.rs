//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The shared frontier with dedup and in-flight tracking
//! - HTTP fetching and HTML parsing behind swappable traits
//! - The worker loop and crawl coordination
//! - A batch downloader for fixed URL lists

mod coordinator;
mod downloader;
mod fetcher;
mod frontier;
mod handler;
mod parser;
mod pipeline;
mod worker;

pub use coordinator::{run_crawl, Crawler};
pub use downloader::{run_download, BatchDownloader};
pub use fetcher::{build_http_client, FetchResponse, Fetcher, HttpFetcher};
pub use frontier::{Frontier, Lease};
pub use handler::PageHandler;
pub use parser::{parse_html, resolve_link, Document, HtmlParser, Link, Parser};
