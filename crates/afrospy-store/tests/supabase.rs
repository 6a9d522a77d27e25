//! Integration tests for `SupabaseStore` using wiremock HTTP mocks.

use afrospy_core::{AdRecord, DEFAULT_PLATFORM};
use afrospy_store::{AdSink, StoreError, SupabaseStore};
use chrono::NaiveDate;
use wiremock::matchers::{body_json, header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_store(base_url: &str) -> SupabaseStore {
    SupabaseStore::new(base_url, "service-key", 30, "afrospy-test")
        .expect("store construction should not fail")
}

fn sample_ad() -> AdRecord {
    AdRecord {
        page_name: "Boutique Kara".to_string(),
        ad_copy: "Sérum éclat, livraison N'Djamena".to_string(),
        cta_link: Some("https://kara.myshopify.com/products/serum".to_string()),
        video_url: None,
        image_url: Some("https://cdn.example.com/a.jpg".to_string()),
        thumbnail_url: Some("https://cdn.example.com/a.jpg".to_string()),
        ad_archive_id: "998877".to_string(),
        platform: DEFAULT_PLATFORM.to_string(),
        is_active: true,
        started_at: NaiveDate::from_ymd_opt(2026, 10, 10).unwrap(),
        trend_score: 0.9,
    }
}

#[tokio::test]
async fn upsert_sends_conflict_target_and_auth_headers() {
    let server = MockServer::start().await;
    let ad = sample_ad();

    Mock::given(method("POST"))
        .and(path("/rest/v1/ads"))
        .and(query_param("on_conflict", "page_name,ad_copy"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .and(headers(
            "prefer",
            vec!["resolution=merge-duplicates", "return=minimal"],
        ))
        .and(body_json(serde_json::to_value(&ad).unwrap()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    store.upsert_ad(&ad).await.expect("upsert should succeed");
}

#[tokio::test]
async fn body_uses_row_column_names() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/ads"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    store.upsert_ad(&sample_ad()).await.unwrap();

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["page_name"], "Boutique Kara");
    assert_eq!(body["started_at"], "2026-10-10");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["platform"], "facebook");
    assert_eq!(body["video_url"], serde_json::Value::Null);
}

#[tokio::test]
async fn server_error_is_rejected_with_truncated_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/ads"))
        .respond_with(ResponseTemplate::new(409).set_body_string("d".repeat(400)))
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let err = store.upsert_ad(&sample_ad()).await.unwrap_err();

    match err {
        StoreError::Rejected { status, body } => {
            assert_eq!(status, 409);
            assert_eq!(body.len(), 200);
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_store_is_an_http_error() {
    // Port 9 (discard) on localhost is not listening in test environments.
    let store = test_store("http://127.0.0.1:9");
    let err = store.upsert_ad(&sample_ad()).await.unwrap_err();
    assert!(matches!(err, StoreError::Http(_)), "got {err:?}");
}
