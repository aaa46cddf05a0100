//! Session extractor for Axum handlers.
//!
//! The token only proves identity. The role is read from the profile store
//! once per request, so a role change takes effect on the caller's next
//! request without re-issuing tokens.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use emlak_core::account::{Profile, Viewer};
use emlak_core::error::CoreError;
use emlak_core::roles::Role;
use emlak_core::types::AccountId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller and their current profile.
///
/// ```ignore
/// async fn my_handler(session: Session) -> AppResult<Json<()>> {
///     tracing::info!(account_id = %session.account_id, role = %session.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    pub account_id: AccountId,
    pub role: Role,
    pub profile: Profile,
}

impl Session {
    pub fn viewer(&self) -> Viewer {
        Viewer {
            account_id: self.account_id,
            role: self.role,
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        authenticate(auth_header, state).await
    }
}

/// `Option<Session>`: `None` without an `Authorization` header, but a header
/// that is present and invalid is still rejected.
impl OptionalFromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(auth_header) = parts.headers.get("authorization") else {
            return Ok(None);
        };
        let auth_header = auth_header.to_str().map_err(|_| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization header".into(),
            ))
        })?;

        authenticate(auth_header, state).await.map(Some)
    }
}

async fn authenticate(auth_header: &str, state: &AppState) -> Result<Session, AppError> {
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })?;

    let claims = validate_token(token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    let profile = state.accounts.find_profile(claims.sub).await?.ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "No profile exists for this account".into(),
        ))
    })?;

    Ok(Session {
        account_id: profile.id,
        role: profile.role,
        profile,
    })
}
