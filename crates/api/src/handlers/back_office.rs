//! Staff views of submitted leads, favorites and offers.
//!
//! Admins and sales agents only ([`RequireStaff`]). Each list is newest
//! first and capped at [`BACK_OFFICE_LIMIT`].

use axum::extract::State;
use axum::Json;

use emlak_core::submission::{CustomerRequest, FavoriteEntry, OfferEntry, BACK_OFFICE_LIMIT};

use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/customer-requests
pub async fn list_customer_requests(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<CustomerRequest>>>> {
    let data = state
        .submissions
        .list_customer_requests(BACK_OFFICE_LIMIT)
        .await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<FavoriteEntry>>>> {
    let data = state.submissions.list_favorites(BACK_OFFICE_LIMIT).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/offers
pub async fn list_offers(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<OfferEntry>>>> {
    let data = state.submissions.list_offers(BACK_OFFICE_LIMIT).await?;
    Ok(Json(DataResponse { data }))
}
