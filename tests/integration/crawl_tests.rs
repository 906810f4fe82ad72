//! End-to-end crawl behavior

use crate::common::{Collector, EndlessSite, StubSite};
use site_ripple::config::CrawlConfig;
use site_ripple::crawler::{Crawler, Document};
use site_ripple::{run_crawl, CallbackError, ConfigError, PageOutcome, RippleError};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crawler(root: &str, workers: usize, site: &Arc<StubSite>) -> Crawler {
    Crawler::new(CrawlConfig::new(root).with_workers(workers))
        .unwrap()
        .with_fetcher(Arc::clone(site) as _)
}

fn set(urls: &[&str]) -> HashSet<String> {
    urls.iter().map(|url| url.to_string()).collect()
}

#[tokio::test]
async fn test_crawl_stays_on_site_and_skips_assets() {
    let site = Arc::new(
        StubSite::new()
            .page("http://x.test/", &["/a", "/b.png", "http://other.test/"])
            .page("http://x.test/a", &["/"])
            .page("http://other.test/", &[]),
    );

    let report = crawler("http://x.test", 2, &site).crawl().await.unwrap();

    assert_eq!(report.visited, set(&["http://x.test/", "http://x.test/a"]));
    assert_eq!(site.fetch_count("http://x.test/b.png"), 0);
    assert_eq!(site.fetch_count("http://other.test/"), 0);
    assert_eq!(site.fetch_count("http://x.test/"), 1);
    assert_eq!(report.processed_count(), 2);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_cycle_visits_each_page_once() {
    let site = Arc::new(
        StubSite::new()
            .page("http://x.test/", &["/a"])
            .page("http://x.test/a", &["/b"])
            .page("http://x.test/b", &["/a", "/", "/c"])
            .page("http://x.test/c", &["/a", "/b"]),
    );

    let report = crawler("http://x.test/", 3, &site).crawl().await.unwrap();

    assert_eq!(
        report.visited,
        set(&[
            "http://x.test/",
            "http://x.test/a",
            "http://x.test/b",
            "http://x.test/c"
        ])
    );
    for url in &report.visited {
        assert_eq!(site.fetch_count(url), 1, "{} fetched more than once", url);
    }
    assert_eq!(report.pages.len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_root_spelling_does_not_limit_crawl() {
    for root in ["http://X.test", "http://x.test:80", "HTTP://x.TEST/#top"] {
        let site = Arc::new(
            StubSite::new()
                .page("http://x.test/", &["/a"])
                .page("http://x.test/a", &["/b"])
                .page("http://x.test/b", &[]),
        );

        let report = crawler(root, 2, &site).crawl().await.unwrap();

        assert_eq!(
            report.visited,
            set(&["http://x.test/", "http://x.test/a", "http://x.test/b"]),
            "root {}",
            root
        );
        assert_eq!(report.processed_count(), 3);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_reachable_page_is_visited() {
    // Binary tree of 14 pages below the root
    let mut site = StubSite::new().with_delay(Duration::from_millis(2));
    let mut expected = vec!["http://x.test/".to_string()];
    site = site.page("http://x.test/", &["/n1", "/n2"]);
    for n in 1..=14 {
        let url = format!("http://x.test/n{}", n);
        let left = format!("/n{}", 2 * n + 1);
        let right = format!("/n{}", 2 * n + 2);
        site = if 2 * n + 2 <= 14 {
            site.page(&url, &[left.as_str(), right.as_str()])
        } else {
            site.page(&url, &[])
        };
        expected.push(url);
    }
    let site = Arc::new(site);

    let report = crawler("http://x.test", 4, &site).crawl().await.unwrap();

    let expected: HashSet<String> = expected.into_iter().collect();
    assert_eq!(report.visited, expected);
    assert_eq!(site.total_fetches(), 15);
    assert_eq!(report.discovered, 15);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_link_fetched_once_under_contention() {
    let hubs: Vec<String> = (1..=8).map(|n| format!("/p{}", n)).collect();
    let hub_refs: Vec<&str> = hubs.iter().map(String::as_str).collect();

    let mut site = StubSite::new()
        .with_delay(Duration::from_millis(20))
        .page("http://x.test/", &hub_refs)
        .page("http://x.test/shared", &[]);
    for hub in &hubs {
        site = site.page(&format!("http://x.test{}", hub), &["/shared", "/shared#top"]);
    }
    let site = Arc::new(site);

    let report = crawler("http://x.test", 8, &site).crawl().await.unwrap();

    assert_eq!(site.fetch_count("http://x.test/shared"), 1);
    assert_eq!(report.visited.len(), 10);
}

#[tokio::test]
async fn test_fragments_do_not_create_new_pages() {
    let site = Arc::new(
        StubSite::new()
            .page("http://x.test/", &["/a#top", "/a#bottom", "/a", "#intro"])
            .page("http://x.test/a", &[]),
    );

    let report = crawler("http://x.test", 2, &site).crawl().await.unwrap();

    assert_eq!(site.fetch_count("http://x.test/a"), 1);
    assert_eq!(site.fetch_count("http://x.test/"), 1);
    assert_eq!(report.visited, set(&["http://x.test/", "http://x.test/a"]));
}

#[tokio::test]
async fn test_http_error_is_recorded_not_retried() {
    let site = Arc::new(
        StubSite::new()
            .page("http://x.test/", &["/missing", "/a", "/broken"])
            .page("http://x.test/a", &["/missing"])
            .status("http://x.test/broken", 500),
    );

    let report = crawler("http://x.test", 3, &site).crawl().await.unwrap();

    assert_eq!(site.fetch_count("http://x.test/missing"), 1);
    assert_eq!(
        report.page("http://x.test/missing").unwrap().outcome,
        PageOutcome::HttpStatus(404)
    );
    assert_eq!(
        report.page("http://x.test/broken").unwrap().outcome,
        PageOutcome::HttpStatus(500)
    );
    assert_eq!(
        report.page("http://x.test/a").unwrap().outcome,
        PageOutcome::Processed
    );
    assert!(report.visited.contains("http://x.test/missing"));
    assert!(report.is_success());
}

#[tokio::test]
async fn test_idle_workers_wait_for_slow_page() {
    let site = Arc::new(
        StubSite::new()
            .delay_for("http://x.test/", Duration::from_millis(200))
            .page("http://x.test/", &["/a", "/b"])
            .page("http://x.test/a", &[])
            .page("http://x.test/b", &[]),
    );

    let report = crawler("http://x.test", 4, &site).crawl().await.unwrap();

    assert_eq!(
        report.visited,
        set(&["http://x.test/", "http://x.test/a", "http://x.test/b"])
    );
}

#[tokio::test]
async fn test_worker_count_bounds_concurrency() {
    let pages: Vec<String> = (1..=20).map(|n| format!("/p{}", n)).collect();
    let page_refs: Vec<&str> = pages.iter().map(String::as_str).collect();

    let site = Arc::new(
        StubSite::new()
            .with_delay(Duration::from_millis(10))
            .page("http://x.test/", &page_refs),
    );

    let report = crawler("http://x.test", 3, &site).crawl().await.unwrap();

    assert!(site.max_concurrency() <= 3);
    assert_eq!(site.total_fetches(), 21);
    assert_eq!(report.visited.len(), 21);
}

#[tokio::test]
async fn test_handler_error_stops_that_page_only() {
    let site = Arc::new(
        StubSite::new()
            .page("http://x.test/", &["/bad", "/good"])
            .page("http://x.test/bad", &["/hidden"])
            .page("http://x.test/good", &[])
            .page("http://x.test/hidden", &[]),
    );

    let handler = |url: &str, _document: &Document| {
        if url.ends_with("/bad") {
            Err(CallbackError::new("refused"))
        } else {
            Ok(())
        }
    };

    let report = crawler("http://x.test", 2, &site)
        .with_page_handler(Arc::new(handler))
        .crawl()
        .await
        .unwrap();

    assert_eq!(site.fetch_count("http://x.test/hidden"), 0);
    let bad = report.page("http://x.test/bad").unwrap();
    assert_eq!(bad.outcome, PageOutcome::CallbackFailed);
    assert_eq!(bad.detail.as_deref(), Some("refused"));
    assert_eq!(
        report.page("http://x.test/good").unwrap().outcome,
        PageOutcome::Processed
    );
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_undecodable_page_is_parse_failure() {
    let site = Arc::new(
        StubSite::new()
            .page("http://x.test/", &["/binary"])
            .raw("http://x.test/binary", 200, vec![0xff, 0xfe, 0x00, 0xc3]),
    );

    let report = crawler("http://x.test", 1, &site).crawl().await.unwrap();

    assert_eq!(
        report.page("http://x.test/binary").unwrap().outcome,
        PageOutcome::ParseFailed
    );
    assert!(report.visited.contains("http://x.test/binary"));
}

#[tokio::test]
async fn test_handler_sees_processed_pages() {
    let site = Arc::new(
        StubSite::new()
            .page("http://x.test/", &["/a"])
            .page("http://x.test/a", &[]),
    );
    let collector = Arc::new(Collector::default());

    crawler("http://x.test", 2, &site)
        .with_page_handler(Arc::clone(&collector) as _)
        .crawl()
        .await
        .unwrap();

    assert_eq!(collector.urls(), vec!["http://x.test/", "http://x.test/a"]);
    assert_eq!(
        collector.title_of("http://x.test/a").as_deref(),
        Some("http://x.test/a")
    );
}

#[tokio::test]
async fn test_cancellation_stops_endless_crawl() {
    let site = Arc::new(EndlessSite {
        root: "http://x.test".to_string(),
        delay: Duration::from_millis(5),
    });
    let token = CancellationToken::new();

    let crawler = Crawler::new(CrawlConfig::new("http://x.test").with_workers(4))
        .unwrap()
        .with_fetcher(site)
        .with_cancellation(token.clone());
    let frontier = Arc::clone(crawler.frontier());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(5), crawler.crawl())
        .await
        .expect("crawl did not stop after cancellation")
        .unwrap();
    canceller.await.unwrap();

    assert!(report.cancelled);
    assert!(!report.is_success());
    assert!(!report.visited.is_empty());
    // Abandoned pages are neither recorded nor marked visited
    assert_eq!(report.visited.len(), report.pages.len());
    assert!(report.discovered > report.visited.len());
    assert_eq!(frontier.in_flight(), 0);
}

#[tokio::test]
async fn test_crawl_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>Home</title></head><body>
                <a href="/about">About</a>
                <a href="/logo.png">Logo</a>
                <a href="https://elsewhere.test/">Elsewhere</a>
            </body></html>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>About</title></head><body><a href="/">Home</a></body></html>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let collector = Arc::new(Collector::default());
    let report = Crawler::new(CrawlConfig::new(base_url.as_str()).with_workers(2))
        .unwrap()
        .with_page_handler(Arc::clone(&collector) as _)
        .crawl()
        .await
        .unwrap();

    let home = format!("{}/", base_url);
    let about = format!("{}/about", base_url);
    assert_eq!(report.visited, set(&[home.as_str(), about.as_str()]));
    assert_eq!(collector.title_of(&home).as_deref(), Some("Home"));
    assert_eq!(collector.title_of(&about).as_deref(), Some("About"));
    assert!(report.is_success());
}

#[tokio::test]
async fn test_unreachable_root_is_fetch_failure() {
    let report = run_crawl(CrawlConfig::new("http://127.0.0.1:9").with_workers(2))
        .await
        .unwrap();

    assert_eq!(
        report.page("http://127.0.0.1:9/").unwrap().outcome,
        PageOutcome::FetchFailed
    );
    assert_eq!(report.visited.len(), 1);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let zero_workers = run_crawl(CrawlConfig::new("http://x.test").with_workers(0)).await;
    assert!(matches!(
        zero_workers,
        Err(RippleError::Config(ConfigError::Validation(_)))
    ));

    let not_http = run_crawl(CrawlConfig::new("ftp://x.test/")).await;
    assert!(matches!(
        not_http,
        Err(RippleError::Config(ConfigError::InvalidUrl(_)))
    ));
}
