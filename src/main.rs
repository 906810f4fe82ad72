//! Site-Ripple main entry point
//!
//! This is the command-line interface for the Site-Ripple crawler.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use site_ripple::config::{load_config_with_hash, Config, CrawlConfig, DownloadConfig};
use site_ripple::crawler::{BatchDownloader, Crawler, Document};
use site_ripple::output::{print_crawl_report, print_download_report};
use site_ripple::CallbackError;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Site-Ripple: a bounded-concurrency site crawler
///
/// Crawls every page reachable from a root URL within the same site using a
/// fixed pool of workers, or downloads a fixed list of URLs. Each processed
/// page is printed as `url<TAB>title`.
#[derive(Parser, Debug)]
#[command(name = "site-ripple")]
#[command(version)]
#[command(about = "A bounded-concurrency site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl every same-site page reachable from a root URL
    Crawl {
        /// Root URL; overrides `crawl.root-url` from the config file
        #[arg(value_name = "ROOT_URL")]
        root_url: Option<String>,

        /// Number of concurrent workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Regex of links to skip
        #[arg(long, value_name = "RE")]
        exclude: Option<String>,
    },

    /// Download a fixed list of URLs without following links
    Download {
        /// URLs to fetch; overrides `download.urls` from the config file
        #[arg(value_name = "URL")]
        urls: Vec<String>,

        /// Number of concurrent downloads
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let success = match cli.command {
        Command::Crawl {
            root_url,
            workers,
            exclude,
        } => handle_crawl(config, root_url, workers, exclude, cancel).await?,
        Command::Download { urls, workers } => {
            handle_download(config, urls, workers, cancel).await?
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_ripple=info,warn"),
            1 => EnvFilter::new("site_ripple=debug,info"),
            2 => EnvFilter::new("site_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only page lines and the summary
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Cancels `token` on the first Ctrl-C
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, stopping after in-flight pages");
                token.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}

fn print_page(url: &str, document: &Document) -> Result<(), CallbackError> {
    println!("{}\t{}", url, document.title().unwrap_or_default());
    Ok(())
}

/// Handles the `crawl` subcommand
async fn handle_crawl(
    config: Config,
    root_url: Option<String>,
    workers: Option<usize>,
    exclude: Option<String>,
    cancel: CancellationToken,
) -> anyhow::Result<bool> {
    let mut crawl_config = match (root_url, config.crawl) {
        (Some(root_url), Some(file_config)) => CrawlConfig {
            root_url,
            ..file_config
        },
        (Some(root_url), None) => CrawlConfig::new(root_url),
        (None, Some(file_config)) => file_config,
        (None, None) => bail!("No root URL given on the command line or in the config file"),
    };
    if let Some(workers) = workers {
        crawl_config.workers = workers;
    }
    if let Some(exclude) = exclude {
        crawl_config.exclude_pattern = exclude;
    }

    let crawler = Crawler::new(crawl_config)?
        .with_http_config(config.http)
        .with_page_handler(Arc::new(print_page))
        .with_cancellation(cancel);

    let report = crawler.crawl().await?;
    print_crawl_report(&report);

    Ok(report.is_success())
}

/// Handles the `download` subcommand
async fn handle_download(
    config: Config,
    urls: Vec<String>,
    workers: Option<usize>,
    cancel: CancellationToken,
) -> anyhow::Result<bool> {
    let mut download_config = match config.download {
        Some(file_config) if urls.is_empty() => file_config,
        Some(file_config) => DownloadConfig {
            urls,
            ..file_config
        },
        None if urls.is_empty() => {
            bail!("No URLs given on the command line or in the config file")
        }
        None => DownloadConfig::new(urls),
    };
    if let Some(workers) = workers {
        download_config.workers = workers;
    }

    let downloader = BatchDownloader::new(download_config)?
        .with_http_config(config.http)
        .with_page_handler(Arc::new(print_page))
        .with_cancellation(cancel);

    let report = downloader.download().await?;
    print_download_report(&report);

    Ok(report.is_success())
}
