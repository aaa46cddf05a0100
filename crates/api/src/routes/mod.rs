pub mod admin;
pub mod health;
pub mod intake;
pub mod listings;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// `/uploads` is mounted separately by [`crate::router::build_app_router`]
/// because it carries its own body limit.
///
/// Route hierarchy:
///
/// ```text
/// /customer-requests                       submit lead (public)
/// /favorites                               submit favorite (public)
/// /offers                                  submit offer (public)
/// /uploads                                 image upload (public, multipart)
///
/// /listings                                catalog, create
/// /listings/featured                       showcase
/// /listings/mine                           caller's listings
/// /listings/{id}                           detail, delete
/// /listings/{id}/status                    toggle active / featured
///
/// /admin/accounts                          list accounts (admin)
/// /admin/accounts/{id}/role                change role (admin)
/// /admin/accounts/{id}/transfer-preview    listings to hand over (admin)
/// /admin/accounts/{id}/demote              transfer and demote (admin)
/// /admin/customer-requests                 leads (staff)
/// /admin/favorites                         favorites (staff)
/// /admin/offers                            offers (staff)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(intake::router())
        .nest("/listings", listings::router())
        .nest("/admin", admin::router())
}
