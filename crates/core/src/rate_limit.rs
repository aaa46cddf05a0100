//! Time-windowed request counters keyed by client address.
//!
//! A [`RateLimitStore`] evaluates a set of rules and, only when every rule
//! passes, records one hit for each of them. Check and record happen as one
//! atomic step so concurrent requests cannot both observe "one slot left".
//!
//! [`MemoryRateLimiter`] serializes callers behind a mutex and is correct
//! within a single process. The Postgres implementation in `emlak-db` gives
//! the same guarantee across server instances.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::types::Timestamp;

/// How many hits a key may accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u32,
    /// `None` counts every hit ever recorded.
    pub window: Option<Duration>,
    /// A longer window that must also hold `max_requests` hits before the
    /// key is rejected. Once `window` has passed, the key is allowed again
    /// no matter how long this one is.
    pub escalation: Option<Duration>,
}

impl RateLimit {
    pub fn per_window(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window: Some(window),
            escalation: None,
        }
    }

    pub fn lifetime(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: None,
            escalation: None,
        }
    }

    pub fn with_escalation(mut self, escalation: Duration) -> Self {
        self.escalation = Some(escalation);
        self
    }

    /// Earliest timestamp that still counts toward the window.
    pub fn window_start(&self, now: Timestamp) -> Option<Timestamp> {
        self.window.map(|w| now - w)
    }

    /// Earliest timestamp that still counts toward the escalation window.
    pub fn escalation_start(&self, now: Timestamp) -> Option<Timestamp> {
        self.escalation.map(|e| now - e)
    }

    /// How long hits must be kept to evaluate this limit.
    fn retention(&self) -> Option<Duration> {
        match (self.window, self.escalation) {
            (Some(window), Some(escalation)) => Some(window.max(escalation)),
            (Some(window), None) => Some(window),
            (None, _) => None,
        }
    }

    /// Human-readable form used in rejection messages.
    pub fn describe(&self) -> String {
        let requests = if self.max_requests == 1 {
            "1 request".to_string()
        } else {
            format!("{} requests", self.max_requests)
        };
        match self.window {
            Some(window) => format!("at most {requests} per {}", describe_span(window)),
            None => format!("at most {requests} in total"),
        }
    }
}

fn describe_span(span: Duration) -> String {
    let (n, unit) = if span.num_minutes() % 60 == 0 && span.num_hours() > 0 {
        (span.num_hours(), "hour")
    } else {
        (span.num_minutes(), "minute")
    };
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    pub key: String,
    pub limit: RateLimit,
}

impl RateLimitRule {
    pub fn new(key: impl Into<String>, limit: RateLimit) -> Self {
        Self {
            key: key.into(),
            limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Every rule passed and a hit was recorded for each.
    Allowed,
    /// The rule at this index rejected; nothing was recorded.
    Rejected { rule: usize },
}

impl RateLimitDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }
}

/// Whether a key with these counts is over `limit`.
///
/// `escalation_count` is only consulted when the limit has an escalation
/// window.
pub fn is_exceeded(limit: &RateLimit, window_count: i64, escalation_count: Option<i64>) -> bool {
    let max = i64::from(limit.max_requests);
    window_count >= max && escalation_count.is_none_or(|count| count >= max)
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Check all `rules` and consume one slot from each when all pass.
    ///
    /// Rules are evaluated in order; the first rejection wins.
    async fn check_and_consume(
        &self,
        rules: &[RateLimitRule],
        now: Timestamp,
    ) -> Result<RateLimitDecision, StorageError>;
}

/// Single-rule form keyed directly by `address`.
///
/// Returns `true` when the request is allowed (and was counted).
pub async fn check_and_consume(
    store: &dyn RateLimitStore,
    address: &str,
    window_minutes: i64,
    max_requests: u32,
    now: Timestamp,
) -> Result<bool, StorageError> {
    let rule = RateLimitRule::new(
        address,
        RateLimit::per_window(max_requests, Duration::minutes(window_minutes)),
    );
    let decision = store.check_and_consume(&[rule], now).await?;
    Ok(decision.is_allowed())
}

// ---------------------------------------------------------------------------
// In-process implementation
// ---------------------------------------------------------------------------

/// Minimum seconds between sweeps of idle buckets.
const SWEEP_INTERVAL_SECS: i64 = 60;

#[derive(Debug)]
struct Bucket {
    /// Oldest first.
    hits: VecDeque<Timestamp>,
    /// `None` keeps hits forever.
    retention: Option<Duration>,
}

impl Bucket {
    fn new(retention: Option<Duration>) -> Self {
        Self {
            hits: VecDeque::new(),
            retention,
        }
    }

    fn prune(&mut self, now: Timestamp) {
        if let Some(retention) = self.retention {
            let start = now - retention;
            while self.hits.front().is_some_and(|hit| *hit < start) {
                self.hits.pop_front();
            }
        }
    }

    fn count_since(&self, start: Option<Timestamp>) -> i64 {
        let count = match start {
            Some(start) => self.hits.iter().filter(|hit| **hit >= start).count(),
            None => self.hits.len(),
        };
        count as i64
    }
}

#[derive(Debug, Default)]
struct Buckets {
    by_key: HashMap<String, Bucket>,
    last_sweep: Option<Timestamp>,
}

impl Buckets {
    /// Drop every bucket whose hits have all aged out.
    fn sweep(&mut self, now: Timestamp) {
        if self
            .last_sweep
            .is_some_and(|last| (now - last).num_seconds() < SWEEP_INTERVAL_SECS)
        {
            return;
        }
        self.by_key.retain(|_, bucket| {
            bucket.prune(now);
            !bucket.hits.is_empty()
        });
        self.last_sweep = Some(now);
    }
}

/// Counters held in process memory.
///
/// Every call takes the same lock, so check and record can never interleave.
/// Buckets with no live hits are swept at most once a minute.
#[derive(Debug, Default)]
pub struct MemoryRateLimiter {
    buckets: Mutex<Buckets>,
}

impl MemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimiter {
    async fn check_and_consume(
        &self,
        rules: &[RateLimitRule],
        now: Timestamp,
    ) -> Result<RateLimitDecision, StorageError> {
        let mut buckets = self.buckets.lock().await;
        buckets.sweep(now);

        for (index, rule) in rules.iter().enumerate() {
            let Some(bucket) = buckets.by_key.get_mut(&rule.key) else {
                if rule.limit.max_requests == 0 {
                    return Ok(RateLimitDecision::Rejected { rule: index });
                }
                continue;
            };
            bucket.prune(now);
            let window_count = bucket.count_since(rule.limit.window_start(now));
            let escalation_count = rule
                .limit
                .escalation
                .map(|_| bucket.count_since(rule.limit.escalation_start(now)));
            if is_exceeded(&rule.limit, window_count, escalation_count) {
                return Ok(RateLimitDecision::Rejected { rule: index });
            }
        }

        for rule in rules {
            buckets
                .by_key
                .entry(rule.key.clone())
                .or_insert_with(|| Bucket::new(rule.limit.retention()))
                .hits
                .push_back(now);
        }
        Ok(RateLimitDecision::Allowed)
    }
}
