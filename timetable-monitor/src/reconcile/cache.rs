//! Reconciliation of plan snapshots and change feeds into one view.

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{debug, info};

use crate::domain::{HourBucket, StopRecord};
use crate::timetables::TimetableGateway;

use super::error::ReconcileError;
use super::policy::{CacheState, ReconcileConfig, RefreshPlan, WarmView, plan_refresh};
use super::view::{Admission, StopView};

/// Keeps the reconciled stop view for a window of hour buckets.
///
/// Every call either patches the current view with the recent change feed
/// or rebuilds it from the plan snapshots and the full change feed; see
/// [`plan_refresh`]. A refresh is built aside and swapped in only when
/// every fetch succeeded.
pub struct ReconciliationCache<G> {
    gateway: G,
    config: ReconcileConfig,
    state: CacheState,
}

impl<G: TimetableGateway> ReconciliationCache<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_config(gateway, ReconcileConfig::default())
    }

    pub fn with_config(gateway: G, config: ReconcileConfig) -> Self {
        Self {
            gateway,
            config,
            state: CacheState::Cold,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn state(&self) -> &CacheState {
        &self.state
    }

    /// Buckets of the current view, empty while cold.
    pub fn buckets(&self) -> BTreeSet<HourBucket> {
        self.state.buckets().cloned().unwrap_or_default()
    }

    /// Reconciled stops for `buckets`, refreshing as needed.
    pub async fn stops_for(
        &mut self,
        buckets: &BTreeSet<HourBucket>,
    ) -> Result<Vec<StopRecord>, ReconcileError> {
        self.stops_for_at(buckets, Instant::now()).await
    }

    /// As [`stops_for`](Self::stops_for), with the clock supplied.
    pub async fn stops_for_at(
        &mut self,
        buckets: &BTreeSet<HourBucket>,
        now: Instant,
    ) -> Result<Vec<StopRecord>, ReconcileError> {
        let plan = plan_refresh(buckets, &self.state, now, self.config.freshness);
        debug!(?plan, buckets = buckets.len(), "refreshing stop view");

        let view = match (plan, &self.state) {
            (RefreshPlan::Incremental, CacheState::Warm(warm)) => {
                self.incremental(warm.view.clone()).await?
            }
            _ => self.full(buckets).await?,
        };

        let stops = view.records().to_vec();
        self.state = CacheState::Warm(WarmView {
            view,
            buckets: buckets.clone(),
            refreshed_at: now,
        });

        Ok(stops)
    }

    async fn incremental(&self, mut view: StopView) -> Result<StopView, ReconcileError> {
        let changes = self.gateway.recent_changes().await?;
        debug!(changes = changes.len(), "applying recent changes");

        view.integrate_all(changes, Admission::CompleteOnly)?;
        Ok(view)
    }

    async fn full(&self, buckets: &BTreeSet<HourBucket>) -> Result<StopView, ReconcileError> {
        let mut view = StopView::new();

        for &bucket in buckets {
            let plan = self.gateway.plan(bucket).await?;
            debug!(%bucket, records = plan.len(), "merging plan snapshot");
            view.integrate_all(plan, Admission::Always)?;
        }

        let changes = self.gateway.full_changes().await?;
        let planned = view.len();
        view.integrate_all(changes, Admission::CompleteOnly)?;

        info!(
            buckets = buckets.len(),
            planned,
            stops = view.len(),
            "rebuilt stop view"
        );

        Ok(view)
    }
}
