//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP sites and run full crawl
//! sessions against them end-to-end.

use sitespider::config::{CrawlerConfig, UserAgentConfig};
use sitespider::crawler::{CrawlSummary, Crawler, PageCallback, StopReason};
use sitespider::indexer::indexing_callback;
use sitespider::storage::{SharedStorage, SqliteStorage, Storage};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a crawler configuration tuned for fast tests
fn create_test_config(seed: &str) -> CrawlerConfig {
    let mut config = CrawlerConfig::with_start_url(seed);
    config.poll_interval_ms = 10;
    config.politeness_delay_ms = 0;
    config.request_timeout_secs = 5;
    config.max_duration_secs = 30;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

/// Mounts an HTML page that must be requested exactly `times` times
async fn mount_page(mock_server: &MockServer, route: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(times)
        .mount(mock_server)
        .await;
}

/// A page callback that records every `(url, depth)` it sees
fn recording_callback() -> (PageCallback, Arc<Mutex<Vec<(String, u32)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let on_page: PageCallback = Arc::new(move |url: &str, _html: &str, depth: u32| {
        sink.lock().unwrap().push((url.to_string(), depth));
    });
    (on_page, seen)
}

async fn run_crawl(
    seed: &str,
    max_depth: u32,
    workers: usize,
    on_page: PageCallback,
) -> CrawlSummary {
    let config = create_test_config(seed);
    let mut crawler =
        Crawler::new(&config, &UserAgentConfig::default()).expect("Failed to create crawler");
    crawler
        .crawl(seed, max_depth, workers, on_page)
        .await
        .expect("Crawl failed")
}

#[tokio::test]
async fn test_crawl_visits_every_page_exactly_once() {
    let mock_server = MockServer::start().await;

    // A small site with cycles: every page is reachable and linked more than once
    mount_page(&mock_server, "/", r#"<a href="/a">A</a> <a href="/b">B</a>"#, 1).await;
    mount_page(
        &mock_server,
        "/a",
        r#"<a href="/">Home</a> <a href="/b">B</a> <a href="/c">C</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/b", r#"<a href="/a">A</a> <a href="c">C</a>"#, 1).await;
    mount_page(&mock_server, "/c", r#"<a href="/d">D</a> <a href="./c">C</a>"#, 1).await;
    mount_page(&mock_server, "/d", r#"<a href="/">Home</a>"#, 1).await;

    let seed = format!("{}/", mock_server.uri());
    let (on_page, seen) = recording_callback();

    let summary = run_crawl(&seed, 10, 3, on_page).await;

    assert_eq!(summary.stop_reason, StopReason::Quiescent);
    assert_eq!(summary.pages_fetched, 5);
    assert_eq!(summary.urls_discovered, 5);

    let mut urls: Vec<String> = seen.lock().unwrap().iter().map(|(u, _)| u.clone()).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), 5);
}

#[tokio::test]
async fn test_crawl_respects_max_depth() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/level2">Down</a>"#, 1).await;
    mount_page(&mock_server, "/level2", r#"<a href="/level3">Down</a>"#, 1).await;
    mount_page(&mock_server, "/level3", r#"<a href="/level4">Down</a>"#, 0).await;

    let seed = format!("{}/", mock_server.uri());
    let (on_page, seen) = recording_callback();

    let summary = run_crawl(&seed, 2, 2, on_page).await;

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.urls_discovered, 2);

    let mut seen = seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(
        seen,
        vec![
            (seed.clone(), 1),
            (format!("{}/level2", mock_server.uri()), 2),
        ]
    );
}

#[tokio::test]
async fn test_crawl_stays_on_seed_host() {
    let mock_server = MockServer::start().await;
    let port = mock_server.address().port();

    // "localhost" reaches the same server but is a different host string
    let body = format!(
        r#"<a href="/inside">In</a>
           <a href="http://localhost:{}/offsite">Other name</a>
           <a href="http://other.invalid/page">Other site</a>"#,
        port
    );
    mount_page(&mock_server, "/", &body, 1).await;
    mount_page(&mock_server, "/inside", "<p>inside</p>", 1).await;
    mount_page(&mock_server, "/offsite", "<p>offsite</p>", 0).await;

    let seed = format!("{}/", mock_server.uri());
    let (on_page, seen) = recording_callback();

    let summary = run_crawl(&seed, 3, 2, on_page).await;

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.urls_discovered, 2);
    assert!(seen
        .lock()
        .unwrap()
        .iter()
        .all(|(url, _)| url.starts_with(&mock_server.uri())));
}

#[tokio::test]
async fn test_crawl_skips_denylisted_extensions() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/report.pdf">PDF</a> <a href="/photo.PNG">Photo</a> <a href="/page">Page</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/report.pdf", "", 0).await;
    mount_page(&mock_server, "/photo.PNG", "", 0).await;
    mount_page(&mock_server, "/page", "<p>page</p>", 1).await;

    let seed = format!("{}/", mock_server.uri());
    let (on_page, _seen) = recording_callback();

    let summary = run_crawl(&seed, 2, 2, on_page).await;
    assert_eq!(summary.pages_fetched, 2);
}

#[tokio::test]
async fn test_crawl_of_failing_site_fetches_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let seed = format!("{}/", mock_server.uri());
    let (on_page, seen) = recording_callback();

    let summary = run_crawl(&seed, 3, 4, on_page).await;

    assert_eq!(summary.stop_reason, StopReason::Quiescent);
    assert_eq!(summary.pages_fetched, 0);
    assert_eq!(summary.urls_discovered, 1);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_zero_workers_still_crawls() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "<p>only page</p>", 1).await;

    let seed = format!("{}/", mock_server.uri());
    let (on_page, _seen) = recording_callback();

    let summary = run_crawl(&seed, 1, 0, on_page).await;
    assert_eq!(summary.pages_fetched, 1);
}

#[tokio::test]
async fn test_panicking_callback_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/next">Next</a>"#, 1).await;
    mount_page(&mock_server, "/next", "<p>next</p>", 1).await;

    let seed = format!("{}/", mock_server.uri());
    let on_page: PageCallback = Arc::new(|url: &str, _: &str, _: u32| {
        panic!("callback failure for {}", url);
    });

    let summary = run_crawl(&seed, 2, 1, on_page).await;

    assert_eq!(summary.stop_reason, StopReason::Quiescent);
    assert_eq!(summary.pages_fetched, 2);
}

#[tokio::test]
async fn test_crawl_indexes_pages() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><h1>Spider home</h1><a href="/about">About</a></body></html>"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/about",
        "<html><body><p>About the spider, spider, spider</p></body></html>",
        1,
    )
    .await;

    let sqlite = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    let shared: SharedStorage = sqlite.clone();

    let seed = format!("{}/", mock_server.uri());
    let summary = run_crawl(&seed, 2, 2, indexing_callback(shared)).await;
    assert_eq!(summary.pages_fetched, 2);

    let storage = sqlite.lock().unwrap();
    assert_eq!(storage.count_documents().unwrap(), 2);

    let results = storage.search(&["spider".to_string()]).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, format!("{}/about", mock_server.uri()));
    assert_eq!(results[0].relevance, 3);
}

#[tokio::test]
async fn test_crawl_stops_at_duration_ceiling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>slow</p>").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let seed = format!("{}/", mock_server.uri());
    let mut config = create_test_config(&seed);
    config.max_duration_secs = 1;

    let mut crawler = Crawler::new(&config, &UserAgentConfig::default()).unwrap();
    let (on_page, _seen) = recording_callback();

    let summary = crawler.crawl(&seed, 2, 1, on_page).await.unwrap();

    assert_eq!(summary.stop_reason, StopReason::DeadlineReached);
    assert!(summary.elapsed >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_stop_handle_interrupts_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>slow</p>").set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let seed = format!("{}/", mock_server.uri());
    let config = create_test_config(&seed);
    let mut crawler = Crawler::new(&config, &UserAgentConfig::default()).unwrap();

    let handle = crawler.stop_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.stop();
    });

    let (on_page, _seen) = recording_callback();
    let summary = crawler.crawl(&seed, 2, 1, on_page).await.unwrap();

    assert_eq!(summary.stop_reason, StopReason::Interrupted);
}

#[tokio::test]
async fn test_crawler_can_run_twice() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "<p>home</p>", 2).await;

    let seed = format!("{}/", mock_server.uri());
    let config = create_test_config(&seed);
    let mut crawler = Crawler::new(&config, &UserAgentConfig::default()).unwrap();

    for _ in 0..2 {
        let (on_page, _seen) = recording_callback();
        let summary = crawler.crawl(&seed, 1, 2, on_page).await.unwrap();
        assert_eq!(summary.pages_fetched, 1);
        assert_eq!(summary.urls_discovered, 1);
    }
}

#[tokio::test]
async fn test_seed_is_not_normalized_before_dedup() {
    let mock_server = MockServer::start().await;

    // The bare seed and its "/" link are distinct strings, so both are fetched
    mount_page(&mock_server, "/", r#"<a href="/">Home</a>"#, 2).await;

    let seed = mock_server.uri();
    let (on_page, _seen) = recording_callback();

    let summary = run_crawl(&seed, 3, 1, on_page).await;

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.urls_discovered, 2);
}
