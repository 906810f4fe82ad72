//! Printing crawl results
//!
//! Renders reports for the command line in the same shape for crawls and
//! batch downloads.

use crate::output::{CrawlReport, DownloadReport, PageRecord};
use crate::state::PageOutcome;
use std::collections::BTreeMap;

/// Prints a crawl report to stdout
pub fn print_crawl_report(report: &CrawlReport) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Root URL: {}", report.root_url);
    println!("  URLs discovered: {}", report.discovered);
    println!("  URLs visited: {}", report.visited.len());
    println!("  Elapsed: {:.2}s", report.elapsed.as_secs_f64());
    if report.cancelled {
        println!("  Cancelled before the frontier drained");
    }
    if report.worker_panics > 0 {
        println!("  Worker panics: {}", report.worker_panics);
    }
    println!();

    print_outcomes(&report.outcome_counts(), report.pages.len());
    print_failures(report.failures());
    print_success_rate(report.processed_count(), report.pages.len());
}

/// Prints a batch download report to stdout
pub fn print_download_report(report: &DownloadReport) {
    println!("=== Download Summary ===\n");

    println!("Overview:");
    println!("  URLs fetched: {}", report.pages.len());
    println!("  Elapsed: {:.2}s", report.elapsed.as_secs_f64());
    if report.cancelled {
        println!(
            "  Cancelled, {} URLs skipped, {} interrupted",
            report.skipped, report.interrupted
        );
    }
    if report.task_panics > 0 {
        println!("  Task panics: {}", report.task_panics);
    }
    println!();

    print_outcomes(&report.outcome_counts(), report.pages.len());
    print_failures(report.failures());
    print_success_rate(report.processed_count(), report.pages.len());
}

fn print_outcomes(counts: &BTreeMap<PageOutcome, usize>, total: usize) {
    println!("Pages by Outcome:");

    // Sort outcomes by count (descending)
    let mut outcome_counts: Vec<_> = counts.iter().collect();
    outcome_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (outcome, count) in outcome_counts {
        println!("  {}: {} ({:.1}%)", outcome, count, percentage(*count, total));
    }
    println!();
}

fn print_failures<'a>(failures: impl Iterator<Item = &'a PageRecord>) {
    let failures: Vec<_> = failures.collect();
    if failures.is_empty() {
        return;
    }

    println!("Failures ({}):", failures.len());
    for page in failures {
        match &page.detail {
            Some(detail) => println!("  - {} [{}] {}", page.url, page.outcome, detail),
            None => println!("  - {} [{}]", page.url, page.outcome),
        }
    }
    println!();
}

fn print_success_rate(processed: usize, total: usize) {
    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        percentage(processed, total),
        processed,
        total
    );
}

fn percentage(count: usize, total: usize) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
