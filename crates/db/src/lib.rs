//! Postgres persistence for the listing marketplace.
//!
//! [`store::PgStore`] implements the storage traits from `emlak_core::gateway`
//! on top of the repositories; [`rate_limit::PgRateLimiter`] implements the
//! atomic rate-limit contract.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod rate_limit;
pub mod repositories;
pub mod store;

pub use rate_limit::PgRateLimiter;
pub use store::PgStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
