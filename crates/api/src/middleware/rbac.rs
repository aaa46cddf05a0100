//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`Session`] and rejects requests whose role does not
//! meet the minimum requirement. Use these in route handlers to enforce
//! authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use emlak_core::error::CoreError;
use emlak_core::roles::Role;

use super::auth::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(session): RequireAdmin) -> AppResult<Json<()>> {
///     // session.role is guaranteed to be Admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub Session);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.role != Role::Admin {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(session))
    }
}

/// Requires `sales-agent` or `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireStaff(pub Session);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if !session.role.is_staff() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Sales agent or Admin role required".into(),
            )));
        }
        Ok(RequireStaff(session))
    }
}

/// Requires any authenticated account (any role).
///
/// Functionally equivalent to [`Session`] but named explicitly for use in
/// route definitions where the intent "this route requires authentication"
/// should be self-documenting.
pub struct RequireAuth(pub Session);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(RequireAuth(session))
    }
}
