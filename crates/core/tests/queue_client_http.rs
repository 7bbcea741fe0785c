//! HTTP queue client integration tests against a mock Starr API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reaparr_core::{HttpStarrClient, StarrApp, StarrClient, StarrError};

fn client_for(app: StarrApp, server: &MockServer) -> HttpStarrClient {
    HttpStarrClient::new(app, &server.uri(), "test-key", Duration::from_secs(5))
}

fn record(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "size": 1000.0,
        "status": "downloading",
        "timeleft": "00:30:00"
    })
}

fn page_body(records: Vec<serde_json::Value>, total: usize) -> serde_json::Value {
    json!({ "records": records, "totalRecords": total })
}

#[tokio::test]
async fn test_v3_queue_pagination() {
    let server = MockServer::start().await;
    let pages: Vec<Vec<serde_json::Value>> = vec![
        (0..100).map(|i| record(i, &format!("Item {}", i))).collect(),
        (100..200).map(|i| record(i, &format!("Item {}", i))).collect(),
        (200..250).map(|i| record(i, &format!("Item {}", i))).collect(),
    ];
    for (i, records) in pages.into_iter().enumerate() {
        Mock::given(method("GET"))
            .and(path("/api/v3/queue"))
            .and(query_param("page", (i + 1).to_string()))
            .and(query_param("pageSize", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(records, 250)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(StarrApp::Radarr, &server);
    let fetch = client.fetch_queue().await;

    assert!(fetch.error.is_none());
    assert_eq!(fetch.api_calls, 3);
    assert_eq!(fetch.items.len(), 250);
    assert_eq!(fetch.items[0].name, "Item 0");
    assert_eq!(fetch.items[249].name, "Item 249");
}

#[tokio::test]
async fn test_pagination_stops_on_empty_page() {
    let server = MockServer::start().await;
    let first: Vec<serde_json::Value> = (0..100).map(|i| record(i, "X")).collect();

    // The advertised total overshoots what the API actually returns.
    Mock::given(method("GET"))
        .and(path("/api/v3/queue"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(first, 500)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/queue"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![], 500)))
        .mount(&server)
        .await;

    let client = client_for(StarrApp::Radarr, &server);
    let fetch = client.fetch_queue().await;

    assert!(fetch.error.is_none());
    assert_eq!(fetch.api_calls, 2);
    assert_eq!(fetch.items.len(), 100);
}

#[tokio::test]
async fn test_page_failure_returns_partial_items() {
    let server = MockServer::start().await;
    let first: Vec<serde_json::Value> = (0..100).map(|i| record(i, "X")).collect();

    Mock::given(method("GET"))
        .and(path("/api/v3/queue"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(first, 200)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/queue"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(StarrApp::Radarr, &server);
    let fetch = client.fetch_queue().await;

    // The first page of items survives the second page failing.
    assert_eq!(fetch.items.len(), 100);
    assert_eq!(fetch.api_calls, 2);
    assert!(matches!(fetch.error, Some(StarrError::ApiError(_))));
}

#[tokio::test]
async fn test_v1_bare_list_for_lidarr() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/queue"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Discography", "album": {"title": "The Album"}},
            {"id": 2, "title": "Single"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(StarrApp::Lidarr, &server);
    let fetch = client.fetch_queue().await;

    assert!(fetch.error.is_none());
    assert_eq!(fetch.api_calls, 1);
    assert_eq!(fetch.items.len(), 2);
    assert_eq!(fetch.items[0].name, "The Album");
    assert_eq!(fetch.items[1].name, "Single");
}

#[tokio::test]
async fn test_queue_items_are_normalized() {
    let server = MockServer::start().await;
    let records = vec![
        json!({
            "id": 11,
            "title": "Movie.Release.2160p.WEB-DL",
            "movie": {"title": "The Movie"},
            "size": 5368709120.0,
            "status": "Stalled",
            "timeleft": "01:00:00",
            "errorMessage": "no connections"
        }),
        // Records without an id are dropped but still count towards paging.
        json!({"title": "Orphan"}),
    ];
    Mock::given(method("GET"))
        .and(path("/api/v3/queue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(records, 2)))
        .mount(&server)
        .await;

    let client = client_for(StarrApp::Radarr, &server);
    let fetch = client.fetch_queue().await;

    assert!(fetch.error.is_none());
    assert_eq!(fetch.api_calls, 1);
    assert_eq!(fetch.items.len(), 1);

    let item = &fetch.items[0];
    assert_eq!(item.id, "11");
    assert_eq!(item.name, "The Movie");
    assert_eq!(item.size, 5_368_709_120);
    assert_eq!(item.status, "stalled");
    assert_eq!(item.eta, 3600);
    assert_eq!(item.error_message, "no connections");
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/queue"))
        .and(header("X-Api-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![], 0)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(StarrApp::Sonarr, &server);
    let fetch = client.fetch_queue().await;
    assert!(fetch.error.is_none());
}

#[tokio::test]
async fn test_delete_sends_removal_flags() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/queue/42"))
        .and(query_param("removeFromClient", "true"))
        .and(query_param("blocklist", "true"))
        .and(header("X-Api-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(StarrApp::Radarr, &server);
    client.delete_download("42", true).await.unwrap();
}

#[tokio::test]
async fn test_delete_can_keep_download_in_client() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/queue/7"))
        .and(query_param("removeFromClient", "false"))
        .and(query_param("blocklist", "true"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(StarrApp::Whisparr, &server);
    client.delete_download("7", false).await.unwrap();
}

#[tokio::test]
async fn test_delete_failure_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/queue/9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(StarrApp::Radarr, &server);
    let err = client.delete_download("9", true).await.unwrap_err();
    assert!(matches!(err, StarrError::ApiError(_)));
}

#[tokio::test]
async fn test_unreachable_host_maps_to_connection_failed() {
    let client = HttpStarrClient::new(
        StarrApp::Radarr,
        "http://127.0.0.1:1",
        "test-key",
        Duration::from_secs(2),
    );

    let fetch = client.fetch_queue().await;
    assert_eq!(fetch.api_calls, 1);
    assert!(fetch.items.is_empty());
    assert!(matches!(fetch.error, Some(StarrError::ConnectionFailed(_))));
}
