//! Timetable HTTP client.
//!
//! Fetches the plan, full change and recent change documents for one
//! station and converts them to domain records.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{EvaId, HourBucket, StopRecord};

use super::error::FeedError;
use super::gateway::{FeedKind, TimetableGateway};
use super::parse::parse_timetable;

/// Default base URL for the timetable API.
pub const DEFAULT_BASE_URL: &str = "https://api.deutschebahn.com/timetables/v1";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 2;

const CLIENT_USER_AGENT: &str = concat!("timetable-monitor/", env!("CARGO_PKG_VERSION"));

/// Configuration for the timetable client.
#[derive(Debug, Clone)]
pub struct TimetableConfig {
    /// Station whose feeds are fetched
    pub station: EvaId,
    /// Bearer token, if the API requires one
    pub api_key: Option<String>,
    /// Base URL for the API
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TimetableConfig {
    /// Create a new config for the given station.
    pub fn new(station: EvaId) -> Self {
        Self {
            station,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Timetable API client for one station.
///
/// Uses a semaphore to limit concurrent requests; the upstream quota is
/// small.
#[derive(Debug, Clone)]
pub struct TimetableClient {
    http: reqwest::Client,
    base_url: String,
    station: EvaId,
    semaphore: Arc<Semaphore>,
}

impl TimetableClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TimetableConfig) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                FeedError::Api {
                    status: 0,
                    message: "Invalid API key format".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            station: config.station,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// The station this client fetches for.
    pub fn station(&self) -> EvaId {
        self.station
    }

    /// Request URL for a feed.
    pub fn feed_url(&self, feed: FeedKind) -> String {
        match feed {
            FeedKind::Plan(bucket) => format!(
                "{}/plan/{}/{}/{}",
                self.base_url,
                self.station,
                bucket.date_segment(),
                bucket.hour_segment()
            ),
            FeedKind::FullChanges => format!("{}/fchg/{}", self.base_url, self.station),
            FeedKind::RecentChanges => format!("{}/rchg/{}", self.base_url, self.station),
        }
    }

    /// Fetch and parse one feed document.
    pub async fn fetch(&self, feed: FeedKind) -> Result<Vec<StopRecord>, FeedError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FeedError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = self.feed_url(feed);
        debug!(%feed, %url, "requesting timetable feed");

        let response = self.http.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FeedError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;
        let records = parse_timetable(&body)?;
        debug!(%feed, count = records.len(), "parsed timetable feed");

        Ok(records)
    }
}

impl TimetableGateway for TimetableClient {
    async fn plan(&self, bucket: HourBucket) -> Result<Vec<StopRecord>, FeedError> {
        self.fetch(FeedKind::Plan(bucket)).await
    }

    async fn full_changes(&self) -> Result<Vec<StopRecord>, FeedError> {
        self.fetch(FeedKind::FullChanges).await
    }

    async fn recent_changes(&self) -> Result<Vec<StopRecord>, FeedError> {
        self.fetch(FeedKind::RecentChanges).await
    }
}
