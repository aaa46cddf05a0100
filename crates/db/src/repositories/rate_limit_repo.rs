//! Repository for `rate_limit_hits`.
//!
//! Every method takes a connection so the caller can run them inside one
//! transaction guarded by [`RateLimitRepo::lock_key`].

use sqlx::PgConnection;

use emlak_core::types::Timestamp;

pub struct RateLimitRepo;

impl RateLimitRepo {
    /// Serialize all transactions touching `key` until the current one ends.
    pub async fn lock_key(conn: &mut PgConnection, key: &str) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(key)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Hits recorded at or after `since` (all hits when `since` is `None`).
    pub async fn count_hits(
        conn: &mut PgConnection,
        key: &str,
        since: Option<Timestamp>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM rate_limit_hits \
             WHERE key = $1 AND ($2::timestamptz IS NULL OR hit_at >= $2)",
        )
        .bind(key)
        .bind(since)
        .fetch_one(conn)
        .await
    }

    pub async fn record_hit(
        conn: &mut PgConnection,
        key: &str,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO rate_limit_hits (key, hit_at) VALUES ($1, $2)")
            .bind(key)
            .bind(at)
            .execute(conn)
            .await?;
        Ok(())
    }
}
