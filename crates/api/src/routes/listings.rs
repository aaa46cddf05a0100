//! Route definitions for the `/listings` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::listings;
use crate::state::AppState;

/// Routes mounted at `/listings`.
///
/// ```text
/// GET    /                        -> list_listings (public, filter query)
/// POST   /                        -> create_listing (any account)
/// GET    /featured                -> list_featured (public)
/// GET    /mine                    -> list_mine (any account)
/// GET    /{id}                    -> get_listing (public, projection by viewer)
/// DELETE /{id}                    -> delete_listing (admin)
/// PATCH  /{id}/status             -> update_status (owner or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(listings::list_listings).post(listings::create_listing),
        )
        .route("/featured", get(listings::list_featured))
        .route("/mine", get(listings::list_mine))
        .route(
            "/{id}",
            get(listings::get_listing).delete(listings::delete_listing),
        )
        .route("/{id}/status", patch(listings::update_status))
}
