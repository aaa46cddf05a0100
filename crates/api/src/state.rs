use std::sync::Arc;

use emlak_core::gateway::{AccountGateway, ImageHost, ListingGateway, SubmissionGateway};
use emlak_core::intake::IntakeContext;
use emlak_core::rate_limit::RateLimitStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (every collaborator is behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub listings: Arc<dyn ListingGateway>,
    pub submissions: Arc<dyn SubmissionGateway>,
    pub accounts: Arc<dyn AccountGateway>,
    /// Shared rate-limit counters for the intake endpoints.
    pub limiter: Arc<dyn RateLimitStore>,
    /// `None` when the image host is not configured; uploads then fail with 500.
    pub images: Option<Arc<dyn ImageHost>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn intake(&self) -> IntakeContext<'_> {
        IntakeContext {
            listings: self.listings.as_ref(),
            submissions: self.submissions.as_ref(),
            limiter: self.limiter.as_ref(),
            limits: &self.config.intake_limits,
        }
    }
}
