//! Integration tests for the query front end
//!
//! Each test binds the server to an ephemeral port, seeds an in-memory
//! index and talks to it over real HTTP.

use sitespider::server::serve;
use sitespider::storage::{
    SearchResult, SharedStorage, SqliteStorage, Storage, StorageError, StorageResult,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const D1: &str = "http://example.com/d1";
const D2: &str = "http://example.com/d2";

struct TestServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn start_server(storage: SharedStorage) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(serve(listener, storage, async move {
        let _ = rx.await;
    }));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// D1 holds a:3 b:1, D2 holds a:1 b:5
fn seeded_storage() -> SharedStorage {
    let mut storage = SqliteStorage::new_in_memory().unwrap();

    let d1 = storage.insert_document(D1).unwrap();
    let d2 = storage.insert_document(D2).unwrap();

    let mut freq = HashMap::new();
    freq.insert("a".to_string(), 3);
    freq.insert("b".to_string(), 1);
    storage.insert_word_frequencies(d1, &freq).unwrap();

    freq.insert("a".to_string(), 1);
    freq.insert("b".to_string(), 5);
    storage.insert_word_frequencies(d2, &freq).unwrap();

    Arc::new(Mutex::new(storage))
}

async fn post_query(server: &TestServer, query: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(server.url("/search"))
        .form(&[("query", query)])
        .send()
        .await
        .unwrap()
}

/// A backend whose every call fails
struct FailingStorage;

fn broken() -> StorageError {
    StorageError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "disk on fire",
    ))
}

impl Storage for FailingStorage {
    fn ensure_schema(&mut self) -> StorageResult<()> {
        Err(broken())
    }

    fn insert_document(&mut self, _url: &str) -> StorageResult<i64> {
        Err(broken())
    }

    fn insert_word_frequencies(
        &mut self,
        _document_id: i64,
        _frequencies: &HashMap<String, u32>,
    ) -> StorageResult<()> {
        Err(broken())
    }

    fn search(&self, _words: &[String]) -> StorageResult<Vec<SearchResult>> {
        Err(broken())
    }

    fn count_documents(&self) -> StorageResult<u64> {
        Err(broken())
    }

    fn count_words(&self) -> StorageResult<u64> {
        Err(broken())
    }

    fn count_postings(&self) -> StorageResult<u64> {
        Err(broken())
    }
}

#[tokio::test]
async fn test_index_serves_search_form() {
    let server = start_server(seeded_storage()).await;

    let response = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains(r#"<form method="post" action="/search">"#));
    assert!(body.contains(r#"name="query""#));
}

#[tokio::test]
async fn test_search_ranks_results() {
    let server = start_server(seeded_storage()).await;

    let response = post_query(&server, "a b").await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    let d1 = body.find(D1).expect("D1 missing from results");
    let d2 = body.find(D2).expect("D2 missing from results");
    assert!(d2 < d1, "D2 should rank above D1");
    assert!(body.contains("(6)"));
    assert!(body.contains("(4)"));
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let server = start_server(seeded_storage()).await;

    let body = post_query(&server, "A").await.text().await.unwrap();
    assert!(body.contains(D1));
    assert!(body.contains(D2));
}

#[tokio::test]
async fn test_search_without_matches() {
    let server = start_server(seeded_storage()).await;

    let response = post_query(&server, "a c").await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains("Nothing found."));
    assert!(!body.contains(D1));
}

#[tokio::test]
async fn test_query_with_too_many_words_is_rejected() {
    let server = start_server(seeded_storage()).await;

    let response = post_query(&server, "a b c d e").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_query_with_four_words_is_accepted() {
    let server = start_server(seeded_storage()).await;

    let response = post_query(&server, "a b c d").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let server = start_server(seeded_storage()).await;

    assert_eq!(post_query(&server, "").await.status(), 400);
    assert_eq!(post_query(&server, " ?! ").await.status(), 400);

    // No query field at all
    let response = reqwest::Client::new()
        .post(server.url("/search"))
        .form(&[("other", "x")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_query_is_escaped_in_results() {
    let server = start_server(seeded_storage()).await;

    let body = post_query(&server, "<script>a</script>")
        .await
        .text()
        .await
        .unwrap();
    assert!(!body.contains("<script>"));
    assert!(body.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let server = start_server(seeded_storage()).await;

    let response = reqwest::get(server.url("/missing")).await.unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let storage: SharedStorage = Arc::new(Mutex::new(FailingStorage));
    let server = start_server(storage).await;

    let response = post_query(&server, "a").await;
    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let server = start_server(seeded_storage()).await;

    let response = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(response.status(), 200);

    server.shutdown.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
