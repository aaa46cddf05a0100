//! Route definitions for the public submission endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::intake;
use crate::state::AppState;

/// Routes mounted at the `/api/v1` root. No authentication.
///
/// ```text
/// POST   /customer-requests       -> submit_customer_request
/// POST   /favorites               -> submit_favorite
/// POST   /offers                  -> submit_offer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customer-requests", post(intake::submit_customer_request))
        .route("/favorites", post(intake::submit_favorite))
        .route("/offers", post(intake::submit_offer))
}
