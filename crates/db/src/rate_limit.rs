//! Rate limiting shared by every server instance.
//!
//! One transaction per call. The advisory locks for all keys involved are
//! taken first, in sorted order, so two requests sharing a key cannot
//! interleave their count and insert, and two requests sharing several keys
//! cannot deadlock.

use async_trait::async_trait;

use emlak_core::error::StorageError;
use emlak_core::rate_limit::{is_exceeded, RateLimitDecision, RateLimitRule, RateLimitStore};
use emlak_core::types::Timestamp;

use crate::repositories::RateLimitRepo;
use crate::DbPool;

#[derive(Clone)]
pub struct PgRateLimiter {
    pool: DbPool,
}

impl PgRateLimiter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Distinct keys in lock order.
fn lock_order(rules: &[RateLimitRule]) -> Vec<&str> {
    let mut keys: Vec<&str> = rules.iter().map(|r| r.key.as_str()).collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

#[async_trait]
impl RateLimitStore for PgRateLimiter {
    async fn check_and_consume(
        &self,
        rules: &[RateLimitRule],
        now: Timestamp,
    ) -> Result<RateLimitDecision, StorageError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::new)?;

        for key in lock_order(rules) {
            RateLimitRepo::lock_key(&mut *tx, key)
                .await
                .map_err(StorageError::new)?;
        }

        for (index, rule) in rules.iter().enumerate() {
            let window_count =
                RateLimitRepo::count_hits(&mut *tx, &rule.key, rule.limit.window_start(now))
                    .await
                    .map_err(StorageError::new)?;
            let escalation_count = match rule.limit.escalation_start(now) {
                Some(since) => Some(
                    RateLimitRepo::count_hits(&mut *tx, &rule.key, Some(since))
                        .await
                        .map_err(StorageError::new)?,
                ),
                None => None,
            };

            if is_exceeded(&rule.limit, window_count, escalation_count) {
                tx.commit().await.map_err(StorageError::new)?;
                return Ok(RateLimitDecision::Rejected { rule: index });
            }
        }

        for rule in rules {
            RateLimitRepo::record_hit(&mut *tx, &rule.key, now)
                .await
                .map_err(StorageError::new)?;
        }
        tx.commit().await.map_err(StorageError::new)?;
        Ok(RateLimitDecision::Allowed)
    }
}
