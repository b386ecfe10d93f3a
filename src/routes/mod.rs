// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::cache::CacheStore;
use crate::catalog::GroupCatalog;
use crate::usage_repo::UsageRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) usage_repo: Arc<UsageRepo>,
    pub(crate) cache: Arc<dyn CacheStore>,
    pub(crate) catalog: Arc<dyn GroupCatalog>,
    /// TTL in the cache backend's unit (milliseconds); config supplies seconds.
    pub(crate) cache_ttl_ms: u64,
}

pub fn app(
    usage_repo: Arc<UsageRepo>,
    cache: Arc<dyn CacheStore>,
    catalog: Arc<dyn GroupCatalog>,
    cache_ttl_seconds: u64,
) -> Router {
    let state = AppState {
        usage_repo,
        cache,
        catalog,
        cache_ttl_ms: cache_ttl_seconds * 1000,
    };
    Router::new()
        .route("/", get(|| async { "usage-server: workload usage over time" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/usage/{entity}", get(http::usage_handler)) // GET /api/usage/{entity}
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
