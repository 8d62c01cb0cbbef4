//! Caching layer for plan snapshots.
//!
//! Plan snapshots rarely change once published, but a full refresh asks
//! for every bucket in the window again. We memoize them per bucket in a
//! small bounded cache so that sliding the window by one hour costs one
//! plan request instead of one per bucket. Change feeds always pass
//! through.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{HourBucket, StopRecord};
use crate::timetables::{FeedError, TimetableGateway};

/// Cached plan snapshot.
type PlanEntry = Arc<Vec<StopRecord>>;

/// Configuration for the plan cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached snapshots.
    pub ttl: Duration,

    /// Maximum number of cached buckets.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 12,
        }
    }
}

/// Cache for plan snapshots, keyed by bucket.
pub struct PlanCache {
    plans: MokaCache<HourBucket, PlanEntry>,
}

impl PlanCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let plans = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { plans }
    }

    /// Get a cached snapshot.
    pub async fn get(&self, bucket: &HourBucket) -> Option<PlanEntry> {
        self.plans.get(bucket).await
    }

    /// Insert a snapshot into the cache.
    pub async fn insert(&self, bucket: HourBucket, entry: PlanEntry) {
        self.plans.insert(bucket, entry).await;
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.plans.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.plans.invalidate_all();
    }
}

/// Gateway with plan memoization.
///
/// Wraps any [`TimetableGateway`] and answers repeated `plan` requests
/// from the cache.
pub struct CachedGateway<G> {
    inner: G,
    cache: PlanCache,
}

impl<G: TimetableGateway> CachedGateway<G> {
    /// Create a new cached gateway.
    pub fn new(inner: G, cache_config: &CacheConfig) -> Self {
        Self {
            inner,
            cache: PlanCache::new(cache_config),
        }
    }

    /// Access the underlying gateway.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}

impl<G: TimetableGateway> TimetableGateway for CachedGateway<G> {
    async fn plan(&self, bucket: HourBucket) -> Result<Vec<StopRecord>, FeedError> {
        // Try cache first
        if let Some(cached) = self.cache.get(&bucket).await {
            trace!(%bucket, "plan cache hit");
            return Ok(cached.as_ref().clone());
        }

        // Failures are not cached
        let records = self.inner.plan(bucket).await?;
        self.cache.insert(bucket, Arc::new(records.clone())).await;

        Ok(records)
    }

    async fn full_changes(&self) -> Result<Vec<StopRecord>, FeedError> {
        self.inner.full_changes().await
    }

    async fn recent_changes(&self) -> Result<Vec<StopRecord>, FeedError> {
        self.inner.recent_changes().await
    }
}
