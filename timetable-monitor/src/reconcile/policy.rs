//! Cache state and the choice between refresh paths.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::domain::HourBucket;

use super::view::StopView;

/// Default age after which a warm view is rebuilt from scratch.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(90);

/// Configuration for the reconciliation cache.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Views older than this take the full refresh path.
    pub freshness: Duration,
}

impl ReconcileConfig {
    pub fn new(freshness: Duration) -> Self {
        Self { freshness }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            freshness: DEFAULT_FRESHNESS,
        }
    }
}

/// A view that has been refreshed at least once.
#[derive(Debug, Clone)]
pub struct WarmView {
    pub view: StopView,
    /// Buckets the view was built for.
    pub buckets: BTreeSet<HourBucket>,
    pub refreshed_at: Instant,
}

/// What the cache holds between calls.
///
/// The view and its bucket set only ever change together, as one value.
#[derive(Debug, Clone, Default)]
pub enum CacheState {
    /// Nothing fetched yet.
    #[default]
    Cold,
    Warm(WarmView),
}

impl CacheState {
    pub fn is_warm(&self) -> bool {
        matches!(self, CacheState::Warm(_))
    }

    pub fn view(&self) -> Option<&StopView> {
        match self {
            CacheState::Cold => None,
            CacheState::Warm(warm) => Some(&warm.view),
        }
    }

    pub fn buckets(&self) -> Option<&BTreeSet<HourBucket>> {
        match self {
            CacheState::Cold => None,
            CacheState::Warm(warm) => Some(&warm.buckets),
        }
    }
}

/// How a call to the cache refreshes the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPlan {
    /// Apply the recent change feed to the current view.
    Incremental,
    /// Rebuild the view from plan snapshots and the full change feed.
    Full,
}

/// Decide the refresh path for a request.
///
/// Only a warm view for exactly the requested buckets, refreshed less than
/// `freshness` before `now`, is updated incrementally.
pub fn plan_refresh(
    requested: &BTreeSet<HourBucket>,
    state: &CacheState,
    now: Instant,
    freshness: Duration,
) -> RefreshPlan {
    match state {
        CacheState::Warm(warm)
            if warm.buckets == *requested
                && now.saturating_duration_since(warm.refreshed_at) < freshness =>
        {
            RefreshPlan::Incremental
        }
        _ => RefreshPlan::Full,
    }
}
