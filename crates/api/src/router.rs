//! Assembles the HTTP surface: route tree, per-route limits and the layers
//! every request passes through.
//!
//! `main.rs` and the integration tests both call [`build_app_router`], so a
//! test request sees the same limits, CORS policy and request ids as
//! production traffic.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID: &str = "x-request-id";

/// Methods used by the route table in [`routes::api_routes`]: `PUT` for
/// role changes, `PATCH` for listing status, `DELETE` for listing removal.
const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Build the application [`Router`].
///
/// `/health` sits at the root; everything else lives under `/api/v1`.
/// Image uploads get their own body limit (`upload_max_bytes`) while every
/// other route keeps axum's default, so a large body is only accepted where
/// files are expected.
///
/// Layers, outermost first: CORS, request id assignment, tracing, request id
/// echo, timeout, panic recovery.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID);

    let uploads =
        routes::uploads::router().layer(DefaultBodyLimit::max(config.upload_max_bytes));

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/uploads", uploads)
        .nest("/api/v1", routes::api_routes())
        .fallback(route_not_found)
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// Unknown paths answer with the same `{error, code}` body as handlers.
async fn route_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found", "code": "NOT_FOUND" })),
    )
        .into_response()
}

/// CORS for the storefront and back-office origins.
///
/// Sessions travel as bearer tokens, never cookies, so credentials are not
/// allowed. The request id is exposed so the frontend can quote it in bug
/// reports.
///
/// # Panics
///
/// Panics at startup if any configured origin is not a valid header value.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(REQUEST_ID)])
        .max_age(Duration::from_secs(3600))
}
