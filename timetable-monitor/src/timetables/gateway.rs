//! The contract between the reconciliation engine and a feed source.

use std::future::Future;

use crate::domain::{HourBucket, StopRecord};

use super::error::FeedError;

/// Source of the three timetable feeds for one station.
///
/// Each call returns partial records; only the fields the feed carries are
/// populated. Implementations do not retry.
pub trait TimetableGateway: Send + Sync {
    /// Planned stops starting within `bucket`, as originally scheduled.
    fn plan(
        &self,
        bucket: HourBucket,
    ) -> impl Future<Output = Result<Vec<StopRecord>, FeedError>> + Send;

    /// Every currently known deviation, across all buckets.
    fn full_changes(&self) -> impl Future<Output = Result<Vec<StopRecord>, FeedError>> + Send;

    /// Deviations published within roughly the last couple of minutes.
    fn recent_changes(&self) -> impl Future<Output = Result<Vec<StopRecord>, FeedError>> + Send;
}

/// Which feed a gateway call targeted. Used in logs and by the mock's
/// call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Plan(HourBucket),
    FullChanges,
    RecentChanges,
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedKind::Plan(bucket) => write!(f, "plan {bucket}"),
            FeedKind::FullChanges => f.write_str("full changes"),
            FeedKind::RecentChanges => f.write_str("recent changes"),
        }
    }
}
