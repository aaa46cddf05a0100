//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin, back_office};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// Account routes require the `admin` role; the submission lists accept any
/// staff role (enforced by handler extractors).
///
/// ```text
/// GET    /accounts                          -> list_accounts
/// PUT    /accounts/{id}/role                -> set_role
/// GET    /accounts/{id}/transfer-preview    -> transfer_preview
/// POST   /accounts/{id}/demote              -> demote
///
/// GET    /customer-requests                 -> list_customer_requests (staff)
/// GET    /favorites                         -> list_favorites (staff)
/// GET    /offers                            -> list_offers (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(admin::list_accounts))
        .route("/accounts/{id}/role", put(admin::set_role))
        .route(
            "/accounts/{id}/transfer-preview",
            get(admin::transfer_preview),
        )
        .route("/accounts/{id}/demote", post(admin::demote))
        .route(
            "/customer-requests",
            get(back_office::list_customer_requests),
        )
        .route("/favorites", get(back_office::list_favorites))
        .route("/offers", get(back_office::list_offers))
}
