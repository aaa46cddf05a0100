use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::config::RateLimitBackend;
use crate::state::AppState;

/// What `/health` reports.
///
/// `status` is `"ok"` only when the listing store answers and image uploads
/// can be served; anything less is `"degraded"`. The endpoint itself always
/// answers 200 so a probe can read the breakdown.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// `false` when no image host is configured.
    pub uploads_enabled: bool,
    pub rate_limit_backend: RateLimitBackend,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match state.listings.health_check().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Health check: listing store unreachable");
            false
        }
    };
    let uploads_enabled = state.images.is_some();

    Json(HealthResponse {
        status: if db_healthy && uploads_enabled { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        uploads_enabled,
        rate_limit_backend: state.config.rate_limit_backend,
    })
}

/// `GET /health`, mounted at the root rather than under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
