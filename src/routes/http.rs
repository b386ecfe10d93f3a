// GET handlers: version, usage series

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::AppState;
use crate::cache::{self, usage_cache_key};
use crate::models::UsageResponse;
use crate::usage_repo::{UsageRepo, series};
use crate::version::{NAME, VERSION};
use crate::window::{self, Preset, ResolvedWindow};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct UsageQuery {
    /// Window preset (7d, 30d, 365d, last_month, mtd, last_quarter, qtd,
    /// last_year, ytd). Unknown values resolve as 30d.
    #[serde(default = "default_window")]
    window: String,
    /// Also fetch and bucket the preceding window of equal length.
    #[serde(default)]
    compare: bool,
}

fn default_window() -> String {
    "30d".into()
}

#[derive(Debug, thiserror::Error)]
pub(super) enum ApiError {
    #[error("no app groups found for entity '{0}'")]
    UnknownEntity(String),
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::UnknownEntity(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(e) => {
                tracing::warn!(error = %e, "usage request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = axum::Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// GET /api/usage/{entity}?window=<preset>&compare=<bool>
/// Resolves the entity's app groups (404 when none), resolves the window, and
/// serves the bucketed series cache-aside.
pub(super) async fn usage_handler(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(query): Query<UsageQuery>,
) -> Result<axum::Json<UsageResponse>, ApiError> {
    let groups = state
        .catalog
        .app_groups(&entity)
        .ok_or_else(|| ApiError::UnknownEntity(entity.clone()))?;

    let preset = Preset::parse(&query.window);
    let resolved = window::resolve(preset);
    let key = usage_cache_key(&groups, preset, &resolved, query.compare);

    let response = cache::get_or_fetch(
        state.cache.as_ref(),
        &key,
        state.cache_ttl_ms,
        || async {
            compute_usage(
                &state.usage_repo,
                &entity,
                &groups,
                &resolved,
                query.compare,
            )
            .await
        },
    )
    .await?;
    Ok(axum::Json(response))
}

/// Fetches raw samples (both windows concurrently when comparing; either
/// failure aborts the whole request) and builds the bucketed series.
async fn compute_usage(
    repo: &UsageRepo,
    entity: &str,
    groups: &[String],
    window: &ResolvedWindow,
    compare: bool,
) -> anyhow::Result<UsageResponse> {
    let (samples, previous_fetch) = if compare {
        let prev_window = window.previous();
        let (current, previous) = futures_util::future::try_join(
            repo.fetch_samples(groups, window),
            repo.fetch_samples(groups, &prev_window),
        )
        .await?;
        (current, Some((previous, prev_window)))
    } else {
        (repo.fetch_samples(groups, window).await?, None)
    };

    let series = series::build_series(&samples, window);
    let previous = previous_fetch.map(|(samples, w)| series::build_series(&samples, &w));

    Ok(UsageResponse {
        entity: entity.to_string(),
        app_groups: groups.to_vec(),
        window: *window,
        series,
        previous,
        source_url: repo.deep_link(groups, window),
    })
}
