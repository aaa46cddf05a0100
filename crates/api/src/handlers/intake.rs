//! Handlers for the public submission endpoints.
//!
//! No authentication. Validation, rate limiting and persistence all live in
//! [`emlak_core::intake`]; these handlers only supply the caller's address
//! and the clock.

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use emlak_core::intake::{self, CustomerRequestForm, FavoriteForm, OfferForm};

use crate::client_ip::ClientAddress;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::response::Ack;
use crate::state::AppState;

/// POST /api/v1/customer-requests
pub async fn submit_customer_request(
    State(state): State<AppState>,
    ClientAddress(address): ClientAddress,
    AppJson(form): AppJson<CustomerRequestForm>,
) -> AppResult<Json<Ack>> {
    intake::submit_customer_request(state.intake(), form, address.as_deref(), Utc::now()).await?;
    Ok(Json(Ack::ok()))
}

/// POST /api/v1/favorites
pub async fn submit_favorite(
    State(state): State<AppState>,
    ClientAddress(address): ClientAddress,
    AppJson(form): AppJson<FavoriteForm>,
) -> AppResult<Json<Ack>> {
    intake::submit_favorite(state.intake(), form, address.as_deref(), Utc::now()).await?;
    Ok(Json(Ack::ok()))
}

/// POST /api/v1/offers
pub async fn submit_offer(
    State(state): State<AppState>,
    ClientAddress(address): ClientAddress,
    AppJson(form): AppJson<OfferForm>,
) -> AppResult<Json<Ack>> {
    intake::submit_offer(state.intake(), form, address.as_deref(), Utc::now()).await?;
    Ok(Json(Ack::ok()))
}
