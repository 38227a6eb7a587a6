//! Cache item contract and shared staleness tracking

use crate::error::InfoCacheResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

/// A value that can live in an [`ItemCache`](super::ItemCache)
#[async_trait]
pub trait CacheItem: Send + Sync + 'static {
    /// Data handed out to callers. Cheap to clone (usually an `Arc`).
    type Payload: Clone + Send + Sync + 'static;

    /// Stable identity of the cached resource
    fn key(&self) -> String;

    /// Whether the next access must refetch before returning data
    fn needs_refresh(&self) -> bool;

    /// Fetch fresh data, replacing the payload only on success
    async fn refresh(&mut self) -> InfoCacheResult<()>;

    /// Currently cached data, if any
    fn payload(&self) -> Option<Self::Payload>;

    /// When the payload was last replaced
    fn last_cached(&self) -> Option<DateTime<Utc>>;
}

/// Refresh bookkeeping shared by the cached item kinds
///
/// A zero refresh interval means the data is only ever refetched on an
/// explicit refresh. Expiry is measured on the monotonic clock; the wall
/// clock timestamp is kept for reporting only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Freshness {
    last_cached: Option<DateTime<Utc>>,
    cached_instant: Option<Instant>,
    refresh_interval: Duration,
}

impl Freshness {
    /// Create bookkeeping for data that has never been fetched
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            last_cached: None,
            cached_instant: None,
            refresh_interval,
        }
    }

    /// Create bookkeeping for data fetched `age` ago
    pub fn cached_ago(age: Duration, refresh_interval: Duration) -> Self {
        let now = Instant::now();
        let wall_age = chrono::Duration::from_std(age).unwrap_or(chrono::Duration::zero());
        Self {
            last_cached: Some(Utc::now() - wall_age),
            cached_instant: Some(now.checked_sub(age).unwrap_or(now)),
            refresh_interval,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn last_cached(&self) -> Option<DateTime<Utc>> {
        self.last_cached
    }

    /// Record a successful fetch
    pub fn mark_cached(&mut self) {
        self.last_cached = Some(Utc::now());
        self.cached_instant = Some(Instant::now());
    }

    /// True if never cached, or if the interval is set and has elapsed
    pub fn needs_refresh(&self) -> bool {
        let Some(cached) = self.cached_instant else {
            return true;
        };
        !self.refresh_interval.is_zero() && cached.elapsed() >= self.refresh_interval
    }
}
