//! Caller network address for rate limiting.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Address the request came from, as reported by the fronting proxy.
///
/// Priority:
/// 1. first entry of `X-Forwarded-For`
/// 2. `X-Real-IP`
///
/// `None` when neither header carries a value; intake then skips rate
/// limiting rather than lumping every such caller into one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for ClientAddress {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientAddress(client_address(&parts.headers)))
    }
}

pub fn client_address(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next());
    let real_ip = headers.get("x-real-ip").and_then(|v| v.to_str().ok());

    forwarded
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| real_ip.map(str::trim).filter(|s| !s.is_empty()))
        .map(str::to_string)
}
