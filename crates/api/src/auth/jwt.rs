//! Access-token validation.
//!
//! Tokens are issued by the external auth service and signed with a shared
//! HS256 secret. The server never issues tokens itself; it only checks the
//! signature, expiry and (optionally) audience, then trusts `sub` as the
//! account id.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use emlak_core::types::AccountId;

/// Claims read from every access token.
///
/// The auth service's own `role` claim is ignored; the account role comes
/// from the profile store.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the account id.
    pub sub: AccountId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the auth service.
    pub secret: String,
    /// Expected `aud` claim; `None` skips the audience check.
    pub audience: Option<String>,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var             | Required | Default |
    /// |---------------------|----------|---------|
    /// | `AUTH_JWT_SECRET`   | **yes**  | --      |
    /// | `AUTH_JWT_AUDIENCE` | no       | unset   |
    ///
    /// # Panics
    ///
    /// Panics if `AUTH_JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("AUTH_JWT_SECRET")
            .expect("AUTH_JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "AUTH_JWT_SECRET must not be empty");

        let audience = std::env::var("AUTH_JWT_AUDIENCE")
            .ok()
            .filter(|aud| !aud.trim().is_empty());

        Self { secret, audience }
    }
}

/// Validate and decode an access token, returning the embedded [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    match &config.audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
