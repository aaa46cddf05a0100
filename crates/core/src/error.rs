use crate::types::EntityId;

/// Failure of the backing persistence service.
///
/// The message is for server-side logs only. It must never be echoed to a
/// client; the HTTP layer replaces it with a generic message.
#[derive(Debug, thiserror::Error)]
#[error("storage failure: {0}")]
pub struct StorageError(pub String);

impl StorageError {
    pub fn new(source: impl std::fmt::Display) -> Self {
        Self(source.to_string())
    }
}

/// Failure of a third-party service other than the database (image host).
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request to upstream service failed: {0}")]
    Request(String),

    #[error("upstream service rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("upstream service returned an unexpected payload: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// A multi-step mutation stopped after some steps were applied.
    ///
    /// `message` is safe to show to the caller; `source` is logged only.
    #[error("Partially applied: {message} ({source})")]
    PartiallyApplied {
        message: String,
        source: StorageError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}
