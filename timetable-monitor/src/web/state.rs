//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::board::{BoardBuilder, BoardConfig};
use crate::cache::CachedGateway;
use crate::domain::{HourBucket, StopRecord};
use crate::timetables::{FeedError, MockGateway, TimetableClient, TimetableGateway};

/// Where the server's feeds come from.
pub enum FeedSource {
    /// The timetable API, with plan snapshots memoized
    Http(CachedGateway<TimetableClient>),
    /// Fixture files or test data
    Mock(MockGateway),
}

impl TimetableGateway for FeedSource {
    async fn plan(&self, bucket: HourBucket) -> Result<Vec<StopRecord>, FeedError> {
        match self {
            FeedSource::Http(gateway) => gateway.plan(bucket).await,
            FeedSource::Mock(gateway) => gateway.plan(bucket).await,
        }
    }

    async fn full_changes(&self) -> Result<Vec<StopRecord>, FeedError> {
        match self {
            FeedSource::Http(gateway) => gateway.full_changes().await,
            FeedSource::Mock(gateway) => gateway.full_changes().await,
        }
    }

    async fn recent_changes(&self) -> Result<Vec<StopRecord>, FeedError> {
        match self {
            FeedSource::Http(gateway) => gateway.recent_changes().await,
            FeedSource::Mock(gateway) => gateway.recent_changes().await,
        }
    }
}

/// Shared application state.
///
/// The board builder owns the reconciled view, so requests take turns
/// through the mutex.
#[derive(Clone)]
pub struct AppState {
    pub board: Arc<Mutex<BoardBuilder<FeedSource>>>,

    /// Default board window
    pub config: Arc<BoardConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(board: BoardBuilder<FeedSource>, config: BoardConfig) -> Self {
        Self {
            board: Arc::new(Mutex::new(board)),
            config: Arc::new(config),
        }
    }
}
