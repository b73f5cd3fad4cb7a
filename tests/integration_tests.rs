//! Integration tests using mock HTTP server
//!
//! Tests the full flow: PaginationBuffer → HttpFetcher → paged JSON endpoint

use pagination_buffer::{
    BufferConfig, Error, FetchOutcome, HttpFetcher, PageCursor, PaginationBuffer, RequestKeys,
    RequestOptions,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Ticket {
    id: u64,
    title: String,
}

fn tickets(range: std::ops::Range<u64>) -> Vec<serde_json::Value> {
    range
        .map(|id| json!({"id": id, "title": format!("Ticket {id}")}))
        .collect()
}

fn options(value: serde_json::Value) -> RequestOptions {
    value.as_object().cloned().unwrap()
}

/// Mount `/tickets` serving `total` tickets in pages of `size`, each page
/// expected exactly `hits` times
async fn mount_pages(server: &MockServer, total: u64, size: u64, hits: u64) {
    let pages = total.div_ceil(size);
    for page in 1..=pages {
        let start = (page - 1) * size;
        let end = (start + size).min(total);

        Mock::given(method("GET"))
            .and(path("/tickets"))
            .and(query_param("page", page.to_string()))
            .and(query_param("size", size.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": total,
                "elements": tickets(start..end)
            })))
            .expect(hits)
            .mount(server)
            .await;
    }
}

// ============================================================================
// HTTP Buffer Tests
// ============================================================================

#[tokio::test]
async fn test_http_buffer_scenario() {
    let server = MockServer::start().await;
    mount_pages(&server, 120, 50, 1).await;

    let fetcher = HttpFetcher::<Ticket>::new(&format!("{}/tickets", server.uri())).unwrap();
    let config = BufferConfig::new(10)
        .with_backend_page_size(50)
        .with_read_ahead(1);
    let buffer = PaginationBuffer::open(
        config,
        fetcher,
        PageCursor::default(),
        RequestOptions::new(),
    )
    .await
    .unwrap();

    let view = buffer.view().await;
    assert_eq!(view.total, 120);
    assert_eq!(view.page_elements.len(), 10);
    assert_eq!(view.page_elements[0].title, "Ticket 0");
    assert!(view.next_page_available);

    for page in 2..=12 {
        buffer.set_frontend_page(page).await.unwrap();
    }

    let view = buffer.view().await;
    assert_eq!(
        view.page_elements.iter().map(|t| t.id).collect::<Vec<_>>(),
        (110..120).collect::<Vec<_>>()
    );
    assert!(!view.next_page_available);
    assert!(buffer.exhausted().await);
}

#[tokio::test]
async fn test_http_buffer_sends_filters_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("p", "1"))
        .and(query_param("status", "open"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"count": 2},
            "data": tickets(0..2)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::<Ticket>::new(&format!("{}/search", server.uri()))
        .unwrap()
        .total_path("meta.count")
        .elements_path("data")
        .header("Authorization", "Bearer test-token");
    let config = BufferConfig::new(5).with_request_keys(RequestKeys::without_page_size("p"));

    let buffer = PaginationBuffer::open(
        config,
        fetcher,
        PageCursor::default(),
        options(json!({"status": "open"})),
    )
    .await
    .unwrap();

    assert_eq!(buffer.total().await, 2);
    assert_eq!(buffer.page_elements().await.len(), 2);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].url.query().unwrap_or_default().contains("size"));
}

#[tokio::test]
async fn test_http_buffer_invalidates_on_filter_change() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tickets"))
        .and(query_param("status", "open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "elements": tickets(0..3)
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tickets"))
        .and(query_param("status", "closed"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "elements": tickets(100..101)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::<Ticket>::new(&format!("{}/tickets", server.uri())).unwrap();
    let cursor = PageCursor::default();
    let buffer = PaginationBuffer::open(
        BufferConfig::new(2).with_backend_page_size(10),
        fetcher,
        cursor.clone(),
        options(json!({"status": "open"})),
    )
    .await
    .unwrap();
    cursor.set(2);
    assert_eq!(buffer.page_elements().await[0].id, 2);

    let outcome = buffer
        .set_request_options(options(json!({"status": "closed"})))
        .await
        .unwrap();

    assert_eq!(outcome, FetchOutcome::Appended(1));
    assert_eq!(cursor.get(), 1);
    assert_eq!(buffer.total().await, 1);
    assert_eq!(buffer.page_elements().await[0].id, 100);
}

#[tokio::test]
async fn test_http_error_status_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tickets"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::<Ticket>::new(&format!("{}/tickets", server.uri())).unwrap();
    let result = PaginationBuffer::open(
        BufferConfig::new(10),
        fetcher,
        PageCursor::default(),
        RequestOptions::new(),
    )
    .await;

    match result {
        Err(err @ Error::HttpStatus { status: 503, .. }) => {
            assert!(err.is_retryable());
            assert!(err.to_string().contains("maintenance"));
        }
        other => panic!("Expected HTTP 503, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::<Ticket>::new(&format!("{}/tickets", server.uri())).unwrap();
    let buffer = PaginationBuffer::new(
        BufferConfig::new(10),
        fetcher,
        PageCursor::default(),
        RequestOptions::new(),
    )
    .unwrap();

    let err = buffer.prime().await.unwrap_err();
    assert!(matches!(err, Error::MissingField { .. }));
    assert!(!buffer.loading().await);
    assert_eq!(buffer.backend_page().await, 0);
}

// ============================================================================
// Driver Integration Tests
// ============================================================================

#[tokio::test]
async fn test_driver_follows_cursor_over_http() {
    let server = MockServer::start().await;
    mount_pages(&server, 60, 20, 1).await;

    let fetcher = HttpFetcher::<Ticket>::new(&format!("{}/tickets", server.uri())).unwrap();
    let cursor = PageCursor::default();
    let buffer = PaginationBuffer::open(
        BufferConfig::new(10).with_backend_page_size(20),
        fetcher,
        cursor.clone(),
        RequestOptions::new(),
    )
    .await
    .unwrap();
    let (options_tx, options_rx) = watch::channel(RequestOptions::new());
    let driver = buffer.spawn_driver(options_rx);

    cursor.advance();
    cursor.advance();

    tokio::time::timeout(Duration::from_secs(5), async {
        while !buffer.exhausted().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("buffer never reached the total");

    buffer.settled().await;
    assert_eq!(buffer.buffered_len().await, 60);

    drop(options_tx);
    driver.await.unwrap();
}
