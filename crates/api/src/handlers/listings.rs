//! Handlers for the `/listings` resource.
//!
//! Reads are public; what a caller sees of a listing depends on who they are
//! (see [`ListingView::for_viewer`]). Mutations require a session.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use emlak_core::error::CoreError;
use emlak_core::filter::{paginate, FilterParams, ListingFilter, Page};
use emlak_core::listing::{Listing, ListingFlags, ListingView, NewListing};
use emlak_core::types::ListingId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::Session;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/listings
///
/// Filters the newest active listings (a bounded snapshot) and returns one
/// page of matches.
pub async fn list_listings(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<FilterParams>,
) -> AppResult<Json<DataResponse<Page<ListingView>>>> {
    let filter = ListingFilter::from_params(&params)?;
    let snapshot = state
        .listings
        .list_active(state.config.listing_snapshot_limit)
        .await?;

    let page = paginate(filter.apply(snapshot), &params);
    Ok(Json(DataResponse {
        data: Page {
            total: page.total,
            items: page.items.into_iter().map(ListingView::public).collect(),
        },
    }))
}

/// GET /api/v1/listings/featured
pub async fn list_featured(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ListingView>>>> {
    let listings = state
        .listings
        .list_featured(state.config.featured_limit)
        .await?;
    Ok(Json(DataResponse {
        data: listings.into_iter().map(ListingView::public).collect(),
    }))
}

/// GET /api/v1/listings/mine
///
/// Every listing the caller owns, inactive ones included.
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<ListingView>>>> {
    let viewer = session.viewer();
    let listings = state.listings.list_by_owner(session.account_id).await?;
    Ok(Json(DataResponse {
        data: listings
            .into_iter()
            .map(|l| ListingView::for_viewer(l, Some(&viewer)))
            .collect(),
    }))
}

/// GET /api/v1/listings/{id}
///
/// Inactive listings are only visible to their owner and admins; everyone
/// else gets 404.
pub async fn get_listing(
    State(state): State<AppState>,
    session: Option<Session>,
    AppPath(id): AppPath<ListingId>,
) -> AppResult<Json<DataResponse<ListingView>>> {
    let viewer = session.as_ref().map(Session::viewer);
    let listing = find_listing(&state, id).await?;

    let visible = listing.is_active
        || viewer
            .as_ref()
            .is_some_and(|v| listing.can_be_managed_by(v));
    if !visible {
        return Err(not_found(id).into());
    }

    Ok(Json(DataResponse {
        data: ListingView::for_viewer(listing, viewer.as_ref()),
    }))
}

/// POST /api/v1/listings
///
/// Creates an active, non-featured listing owned by the caller.
pub async fn create_listing(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    AppJson(input): AppJson<NewListing>,
) -> AppResult<(StatusCode, Json<DataResponse<ListingView>>)> {
    input.check()?;

    let listing = state.listings.create(session.account_id, &input).await?;
    tracing::info!(listing_id = %listing.id, owner = %session.account_id, "Listing created");

    let viewer = session.viewer();
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ListingView::for_viewer(listing, Some(&viewer)),
        }),
    ))
}

/// PATCH /api/v1/listings/{id}/status
///
/// Owners and admins may toggle `is_active`; only admins may toggle
/// `featured`.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    AppPath(id): AppPath<ListingId>,
    AppJson(flags): AppJson<ListingFlags>,
) -> AppResult<Json<DataResponse<ListingView>>> {
    if flags.is_empty() {
        return Err(CoreError::Validation(
            "Provide at least one of is_active or featured".into(),
        )
        .into());
    }

    let viewer = session.viewer();
    flags.authorize(&viewer)?;

    let listing = find_listing(&state, id).await?;
    if !listing.can_be_managed_by(&viewer) {
        return Err(CoreError::Forbidden(
            "Only the owner or an admin can change this listing".into(),
        )
        .into());
    }

    let updated = state
        .listings
        .update_flags(id, &flags)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        listing_id = %id,
        is_active = updated.is_active,
        featured = updated.featured,
        "Listing status updated",
    );

    Ok(Json(DataResponse {
        data: ListingView::for_viewer(updated, Some(&viewer)),
    }))
}

/// DELETE /api/v1/listings/{id}
///
/// Hard delete. Favorites and offers that reference the listing are kept.
pub async fn delete_listing(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<ListingId>,
) -> AppResult<StatusCode> {
    if !state.listings.delete(id).await? {
        return Err(not_found(id).into());
    }
    tracing::info!(listing_id = %id, admin = %admin.account_id, "Listing deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_listing(state: &AppState, id: ListingId) -> AppResult<Listing> {
    state
        .listings
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id).into())
}

fn not_found(id: ListingId) -> CoreError {
    CoreError::NotFound {
        entity: "listing",
        id,
    }
}
