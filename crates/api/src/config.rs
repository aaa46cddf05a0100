use chrono::Duration;
use serde::Serialize;

use emlak_core::intake::IntakeLimits;
use emlak_core::rate_limit::RateLimit;

use crate::auth::jwt::JwtConfig;

/// Where rate-limit counters live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    /// Shared by every instance (default).
    Postgres,
    /// Per process; for single-instance deployments and local development.
    Memory,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the JWT
/// secret. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Postgres pool size (default: `20`).
    pub database_max_connections: u32,
    /// Maximum multipart body size for image uploads (default: 25 MiB).
    pub upload_max_bytes: usize,
    /// Listings fetched per catalog request before filtering (default: `60`).
    pub listing_snapshot_limit: i64,
    /// Listings shown in the featured showcase (default: `9`).
    pub featured_limit: i64,
    pub rate_limit_backend: RateLimitBackend,
    pub intake_limits: IntakeLimits,
    /// Bearer token validation for the external auth service.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                              | Default                 |
    /// |--------------------------------------|-------------------------|
    /// | `HOST`                               | `0.0.0.0`               |
    /// | `PORT`                               | `3000`                  |
    /// | `CORS_ORIGINS`                       | `http://localhost:3001` |
    /// | `REQUEST_TIMEOUT_SECS`               | `30`                    |
    /// | `DATABASE_MAX_CONNECTIONS`           | `20`                    |
    /// | `UPLOAD_MAX_BYTES`                   | `26214400`              |
    /// | `LISTING_SNAPSHOT_LIMIT`             | `60`                    |
    /// | `FEATURED_LIMIT`                     | `9`                     |
    /// | `RATE_LIMIT_BACKEND`                 | `postgres`              |
    /// | `CUSTOMER_REQUEST_MAX`               | `2`                     |
    /// | `CUSTOMER_REQUEST_WINDOW_MINUTES`    | `10`                    |
    /// | `CUSTOMER_REQUEST_ESCALATION_HOURS`  | `5` (`0` disables)      |
    /// | `OFFER_MAX_PER_ADDRESS`              | `4`                     |
    /// | `OFFER_MAX_PER_LISTING`              | `1`                     |
    /// | `FAVORITE_MAX`                       | unset (unlimited)       |
    /// | `FAVORITE_WINDOW_MINUTES`            | `60`                    |
    ///
    /// # Panics
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let rate_limit_backend = match std::env::var("RATE_LIMIT_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .as_str()
        {
            "postgres" => RateLimitBackend::Postgres,
            "memory" => RateLimitBackend::Memory,
            other => panic!("RATE_LIMIT_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        Self {
            host,
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 20),
            upload_max_bytes: env_or("UPLOAD_MAX_BYTES", 25 * 1024 * 1024),
            listing_snapshot_limit: env_or("LISTING_SNAPSHOT_LIMIT", 60),
            featured_limit: env_or("FEATURED_LIMIT", 9),
            rate_limit_backend,
            intake_limits: intake_limits_from_env(),
            jwt: JwtConfig::from_env(),
        }
    }
}

fn intake_limits_from_env() -> IntakeLimits {
    let escalation_hours: i64 = env_or("CUSTOMER_REQUEST_ESCALATION_HOURS", 5);
    let mut customer_request = RateLimit::per_window(
        env_or("CUSTOMER_REQUEST_MAX", 2),
        Duration::minutes(env_or("CUSTOMER_REQUEST_WINDOW_MINUTES", 10)),
    );
    if escalation_hours > 0 {
        customer_request = customer_request.with_escalation(Duration::hours(escalation_hours));
    }

    let favorite = env_opt::<u32>("FAVORITE_MAX").map(|max| {
        RateLimit::per_window(max, Duration::minutes(env_or("FAVORITE_WINDOW_MINUTES", 60)))
    });

    IntakeLimits {
        customer_request,
        offer_total: RateLimit::lifetime(env_or("OFFER_MAX_PER_ADDRESS", 4)),
        offer_per_listing: RateLimit::lifetime(env_or("OFFER_MAX_PER_LISTING", 1)),
        favorite,
    }
}

/// Parse `name` or fall back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(name).unwrap_or(default)
}

fn env_opt<T>(name: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => panic!("{name} is not valid ('{raw}'): {e}"),
    }
}
