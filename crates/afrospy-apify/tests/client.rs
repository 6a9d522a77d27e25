//! Integration tests for `ApifyClient` using wiremock HTTP mocks.

use afrospy_apify::{ApifyClient, ApifyError, RunStatus, ScrapeActor};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApifyClient {
    ApifyClient::with_base_url("test-token", "actor-1", 30, "afrospy-test", base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn start_run_posts_search_url_and_returns_run_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/acts/actor-1/runs"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(serde_json::json!({
            "urls": [{
                "url": "https://www.facebook.com/ads/library/?active_status=active&ad_type=all&country=TD&q=soin%20visage&media_type=all"
            }],
            "resultsLimit": 5
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": { "id": "run-abc", "status": "READY", "defaultDatasetId": "ds-1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let run_id = client
        .start_run("soin visage", "TD", 5)
        .await
        .expect("launch should succeed");

    assert_eq!(run_id, "run-abc");
}

#[tokio::test]
async fn start_run_rejection_carries_status_and_truncated_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/acts/actor-1/runs"))
        .respond_with(ResponseTemplate::new(402).set_body_string("c".repeat(500)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.start_run("serum", "SN", 10).await.unwrap_err();

    match err {
        ApifyError::Launch { status, body } => {
            assert_eq!(status, 402);
            assert_eq!(body.len(), 200);
        }
        other => panic!("expected Launch, got {other:?}"),
    }
}

#[tokio::test]
async fn get_run_parses_status_and_dataset() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/actor-runs/run-abc"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "id": "run-abc",
                "status": "SUCCEEDED",
                "defaultDatasetId": "ds-9",
                "startedAt": "2025-01-01T00:00:00.000Z"
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let run = client.get_run("run-abc").await.expect("should parse run");

    assert_eq!(run.status, RunStatus::Succeeded);
    assert_eq!(run.default_dataset_id.as_deref(), Some("ds-9"));
}

#[tokio::test]
async fn get_run_non_success_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/actor-runs/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_run("missing").await.unwrap_err();
    assert!(
        matches!(err, ApifyError::UnexpectedStatus { status: 404, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn dataset_download_always_requests_fixed_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/datasets/ds-9/items"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "pageName": "Boutique A", "adText": "Promo" },
            { "pageName": "Boutique B" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let items = client.dataset_items("ds-9").await.expect("items");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["pageName"], "Boutique A");
}

#[tokio::test]
async fn dataset_page_size_is_configurable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/datasets/ds-1/items"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_dataset_page_size(50);
    let items = client.dataset_items("ds-1").await.expect("items");
    assert!(items.is_empty());
}

#[tokio::test]
async fn dataset_that_is_not_an_array_fails_to_decode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/datasets/ds-2/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "nope"})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.dataset_items("ds-2").await.unwrap_err();
    assert!(matches!(err, ApifyError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn from_app_config_sends_configured_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/actor-runs/r"))
        .and(header("user-agent", "custom-agent/9"))
        .and(header("authorization", "Bearer cfg-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "id": "r", "status": "RUNNING" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let vars = std::collections::HashMap::from([
        ("APIFY_TOKEN", "cfg-token"),
        ("APIFY_BASE_URL", uri.as_str()),
        ("AFROSPY_USER_AGENT", "custom-agent/9"),
    ]);
    let config = afrospy_core::build_app_config(|key| {
        vars.get(key)
            .map(|v| (*v).to_string())
            .ok_or(std::env::VarError::NotPresent)
    })
    .expect("config should build");

    let client = ApifyClient::from_app_config(&config).expect("client");
    let run = client.get_run("r").await.expect("user agent should match");
    assert_eq!(run.status, RunStatus::Running);
}
