//! Reconciled view of a station's stops.
//!
//! Plan snapshots give the baseline for each hour bucket. The full change
//! feed carries every known deviation and the recent change feed only the
//! latest ones. [`ReconciliationCache`] decides per call which feeds to
//! fetch and merges them, last value wins per field.

mod cache;
mod error;
mod policy;
mod view;

pub use cache::ReconciliationCache;
pub use error::ReconcileError;
pub use policy::{
    CacheState, DEFAULT_FRESHNESS, ReconcileConfig, RefreshPlan, WarmView, plan_refresh,
};
pub use view::{Admission, StopView};
