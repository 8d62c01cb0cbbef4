//! Mock timetable gateway for testing without API access.
//!
//! Serves feeds from memory, either set up directly by tests or loaded
//! from XML fixture files, and records every call so tests can check which
//! refresh path ran.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::domain::{HourBucket, StopRecord, parse_feed_time};

use super::error::FeedError;
use super::gateway::{FeedKind, TimetableGateway};
use super::parse::parse_timetable;

#[derive(Default)]
struct MockFeeds {
    plans: HashMap<HourBucket, Vec<StopRecord>>,
    full_changes: Vec<StopRecord>,
    recent_changes: Vec<StopRecord>,
    failing: Option<FeedKind>,
    fail_all: bool,
    calls: Vec<FeedKind>,
}

/// Mock gateway that serves in-memory feeds.
///
/// Buckets without a plan return an empty snapshot.
#[derive(Default)]
pub struct MockGateway {
    feeds: Mutex<MockFeeds>,
}

impl MockGateway {
    /// Create a mock with every feed empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load fixtures from a directory.
    ///
    /// Expects `plan-YYMMDDHH.xml` files for plan buckets, plus optional
    /// `fchg.xml` and `rchg.xml`. Other files are ignored.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, FeedError> {
        let data_dir = data_dir.as_ref();
        let mut feeds = MockFeeds::default();

        let entries = std::fs::read_dir(data_dir).map_err(|e| FeedError::MockData {
            message: format!("Failed to read mock data directory {:?}: {}", data_dir, e),
        })?;

        let mut loaded = 0;
        for entry in entries {
            let entry = entry.map_err(|e| FeedError::MockData {
                message: format!("Failed to read directory entry: {}", e),
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("xml") {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let target = match stem {
                "fchg" => &mut feeds.full_changes,
                "rchg" => &mut feeds.recent_changes,
                _ => match stem.strip_prefix("plan-") {
                    Some(hour) => {
                        let start = parse_feed_time(&format!("{hour}00")).map_err(|e| {
                            FeedError::MockData {
                                message: format!("Invalid plan file name {:?}: {}", path, e),
                            }
                        })?;
                        feeds.plans.entry(HourBucket::containing(start)).or_default()
                    }
                    None => continue,
                },
            };

            let xml = std::fs::read_to_string(&path).map_err(|e| FeedError::MockData {
                message: format!("Failed to read {:?}: {}", path, e),
            })?;
            *target = parse_timetable(&xml)?;
            loaded += 1;
        }

        if loaded == 0 {
            return Err(FeedError::MockData {
                message: format!("No timetable fixtures found in {:?}", data_dir),
            });
        }

        Ok(Self {
            feeds: Mutex::new(feeds),
        })
    }

    fn with_feeds<T>(&self, f: impl FnOnce(&mut MockFeeds) -> T) -> T {
        let mut feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut feeds)
    }

    /// Set the plan snapshot for a bucket.
    pub fn set_plan(&self, bucket: HourBucket, records: Vec<StopRecord>) {
        self.with_feeds(|f| {
            f.plans.insert(bucket, records);
        });
    }

    /// Set the full change feed.
    pub fn set_full_changes(&self, records: Vec<StopRecord>) {
        self.with_feeds(|f| f.full_changes = records);
    }

    /// Set the recent change feed.
    pub fn set_recent_changes(&self, records: Vec<StopRecord>) {
        self.with_feeds(|f| f.recent_changes = records);
    }

    /// Make calls to one feed fail until cleared.
    pub fn fail_on(&self, feed: Option<FeedKind>) {
        self.with_feeds(|f| f.failing = feed);
    }

    /// Make every call fail until cleared.
    pub fn fail_all(&self, fail: bool) {
        self.with_feeds(|f| f.fail_all = fail);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<FeedKind> {
        self.with_feeds(|f| f.calls.clone())
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.with_feeds(|f| f.calls.clear());
    }

    /// Buckets with a plan snapshot.
    pub fn available_buckets(&self) -> Vec<HourBucket> {
        let mut buckets: Vec<_> = self.with_feeds(|f| f.plans.keys().copied().collect());
        buckets.sort();
        buckets
    }

    fn serve(&self, feed: FeedKind) -> Result<Vec<StopRecord>, FeedError> {
        self.with_feeds(|f| {
            f.calls.push(feed);

            if f.fail_all || f.failing == Some(feed) {
                return Err(FeedError::Api {
                    status: 503,
                    message: format!("mock failure for {feed}"),
                });
            }

            Ok(match feed {
                FeedKind::Plan(bucket) => f.plans.get(&bucket).cloned().unwrap_or_default(),
                FeedKind::FullChanges => f.full_changes.clone(),
                FeedKind::RecentChanges => f.recent_changes.clone(),
            })
        })
    }
}

impl TimetableGateway for MockGateway {
    async fn plan(&self, bucket: HourBucket) -> Result<Vec<StopRecord>, FeedError> {
        self.serve(FeedKind::Plan(bucket))
    }

    async fn full_changes(&self) -> Result<Vec<StopRecord>, FeedError> {
        self.serve(FeedKind::FullChanges)
    }

    async fn recent_changes(&self) -> Result<Vec<StopRecord>, FeedError> {
        self.serve(FeedKind::RecentChanges)
    }
}
