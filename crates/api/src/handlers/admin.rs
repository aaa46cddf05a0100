//! Handlers for `/admin/accounts` (account roles and ownership transfer).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use emlak_core::account::Profile;
use emlak_core::error::CoreError;
use emlak_core::ownership::{self, DemotionOutcome, TransferChoice, TransferPreview};
use emlak_core::roles::Role;
use emlak_core::types::AccountId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `PUT /admin/accounts/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// Request body for `POST /admin/accounts/{id}/demote`.
///
/// `transfer` is required when the account still owns listings:
/// `{"action": "reassign", "destination": "<uuid>"}` or `{"action": "skip"}`.
#[derive(Debug, Default, Deserialize)]
pub struct DemoteRequest {
    #[serde(default)]
    pub transfer: Option<TransferChoice>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Profile>>>> {
    let profiles = state.accounts.list_profiles().await?;
    Ok(Json(DataResponse { data: profiles }))
}

/// PUT /api/v1/admin/accounts/{id}/role
///
/// A sales agent who still owns listings cannot be moved off the role here;
/// that goes through the demotion workflow so the listings get a new owner.
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<AccountId>,
    AppJson(input): AppJson<SetRoleRequest>,
) -> AppResult<Json<DataResponse<Profile>>> {
    let target = state
        .accounts
        .find_profile(id)
        .await?
        .ok_or_else(|| profile_not_found(id))?;

    if id == admin.account_id && input.role != Role::Admin {
        return Err(
            CoreError::Conflict("Admins cannot remove their own admin role".into()).into(),
        );
    }

    if target.role == Role::SalesAgent && input.role != Role::SalesAgent {
        let owned = state.listings.count_by_owner(id).await?;
        if owned > 0 {
            return Err(CoreError::Conflict(format!(
                "Account owns {owned} listings; use the demotion workflow to transfer them first"
            ))
            .into());
        }
    }

    let profile = state
        .accounts
        .set_role(id, input.role)
        .await?
        .ok_or_else(|| profile_not_found(id))?;
    tracing::info!(
        account_id = %id,
        from = %target.role,
        to = %profile.role,
        admin = %admin.account_id,
        "Account role changed",
    );

    Ok(Json(DataResponse { data: profile }))
}

/// GET /api/v1/admin/accounts/{id}/transfer-preview
///
/// Listing count and candidate destination agents, shown before demotion.
pub async fn transfer_preview(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<AccountId>,
) -> AppResult<Json<DataResponse<TransferPreview>>> {
    let preview = ownership::preview(state.listings.as_ref(), state.accounts.as_ref(), id).await?;
    Ok(Json(DataResponse { data: preview }))
}

/// POST /api/v1/admin/accounts/{id}/demote
///
/// Reassigns the agent's listings (unless skipped), then demotes the agent
/// to customer.
pub async fn demote(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<AccountId>,
    AppJson(input): AppJson<DemoteRequest>,
) -> AppResult<Json<DataResponse<DemotionOutcome>>> {
    let outcome = ownership::demote_sales_agent(
        state.listings.as_ref(),
        state.accounts.as_ref(),
        id,
        input.transfer,
    )
    .await?;
    tracing::info!(
        account_id = %id,
        moved_listings = outcome.moved_listings,
        admin = %admin.account_id,
        "Sales agent demotion completed",
    );

    Ok(Json(DataResponse { data: outcome }))
}

fn profile_not_found(id: AccountId) -> CoreError {
    CoreError::NotFound {
        entity: "profile",
        id,
    }
}
