// HTTP endpoint tests

use axum_test::TestServer;
use std::sync::Arc;
use usage_server::cache::MemoryCache;
use usage_server::catalog::StaticCatalog;
use usage_server::config::AppConfig;
use usage_server::routes;
use usage_server::usage_repo::UsageRepo;

// Upstream points at a closed port so upstream-failure paths fail fast.
const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[upstream]
base_url = "http://127.0.0.1:1"
ui_base_url = "http://127.0.0.1:1"
page_size = 100

[cache]
ttl_seconds = 60

[catalog.entities]
checkout = ["payments", "checkout"]
"#;

fn test_app() -> axum::Router {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    routes::app(
        Arc::new(UsageRepo::new(&config.upstream)),
        Arc::new(MemoryCache::new()),
        Arc::new(StaticCatalog::new(&config.catalog)),
        config.cache.ttl_seconds,
    )
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = TestServer::new(test_app());
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("usage-server: workload usage over time");
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = TestServer::new(test_app());
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("usage-server")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_usage_unknown_entity_is_404_with_message() {
    let server = TestServer::new(test_app());
    let response = server.get("/api/usage/unmapped-service").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
    let json: serde_json::Value = response.json();
    let message = json.get("error").and_then(|v| v.as_str()).unwrap();
    assert!(message.contains("unmapped-service"));
}

#[tokio::test]
async fn test_usage_upstream_failure_is_500_with_message() {
    let server = TestServer::new(test_app());
    let response = server.get("/api/usage/checkout?window=7d").await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = response.json();
    assert!(json.get("error").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_usage_unknown_entity_skips_upstream_and_cache() {
    // 404 must come back even though the upstream is unreachable: no fetch is
    // attempted when the entity has no groups.
    let server = TestServer::new(test_app());
    let response = server.get("/api/usage/nope?window=ytd&compare=true").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}
