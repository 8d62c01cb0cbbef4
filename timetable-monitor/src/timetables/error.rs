//! Timetable feed error types.

/// Errors from fetching or decoding a timetable feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid or missing API key
    #[error("unauthorized: check TIMETABLE_API_KEY")]
    Unauthorized,

    /// Rate limited by the API
    #[error("rate limited by timetable API")]
    RateLimited,

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body is not a timetable document
    #[error("XML parse error: {message}")]
    Xml { message: String },

    /// Fixture data for the mock gateway is missing or unreadable
    #[error("mock data error: {message}")]
    MockData { message: String },
}
