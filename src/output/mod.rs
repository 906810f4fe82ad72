//! Output module for crawl results
//!
//! This module handles:
//! - Per-URL outcome records collected by workers
//! - Crawl and download reports returned to callers
//! - Printing summaries for the command line

mod report;
pub mod stats;

pub use report::{CrawlReport, DownloadReport, PageRecord};
pub use stats::{print_crawl_report, print_download_report};
