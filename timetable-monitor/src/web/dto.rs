//! Data transfer objects for web requests and responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{Arrival, Board, Delay, Departure, EvaId, StopRecord};

/// Format for times in responses.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Query parameters for a board.
#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    /// Minutes to look back (defaults to the configured lookbehind)
    pub lookbehind: Option<i64>,

    /// Minutes to look ahead (defaults to the configured lookahead)
    pub lookahead: Option<i64>,

    /// Board time as `YYMMDDHHmm` (defaults to now)
    pub at: Option<String>,
}

/// A departure on the board.
#[derive(Debug, Serialize)]
pub struct DepartureResult {
    /// Planned departure time
    pub time: String,

    /// Train name, e.g. "RB 38824"
    pub train: String,

    pub destination: String,

    pub platform: Option<String>,

    /// Minutes late, "cancelled", or null when unknown
    pub delay: Option<Delay>,

    pub line: Option<String>,

    pub trip_code: u64,

    pub trip_id: i64,
}

/// An arrival on the board.
#[derive(Debug, Serialize)]
pub struct ArrivalResult {
    /// Planned arrival time
    pub time: String,

    pub train: String,

    pub origin: String,

    pub platform: Option<String>,

    pub delay: Option<Delay>,

    pub line: Option<String>,

    pub trip_code: u64,

    pub trip_id: i64,
}

/// Board response.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub station: EvaId,

    /// Window start (inclusive)
    pub from: String,

    /// Window end (exclusive)
    pub to: String,

    pub departures: Vec<DepartureResult>,

    pub arrivals: Vec<ArrivalResult>,
}

/// Reconciled stops currently held.
#[derive(Debug, Serialize)]
pub struct StopsResponse {
    pub station: EvaId,

    /// Hour buckets of the current view, as `YYMMDD/HH`
    pub buckets: Vec<String>,

    pub count: usize,

    pub stops: Vec<StopSummary>,
}

/// One reconciled stop.
#[derive(Debug, Serialize)]
pub struct StopSummary {
    /// Stop id, e.g. "5-1805220800-3"
    pub id: String,

    pub complete: bool,

    pub visible_until: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

fn format_time(t: NaiveDateTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

impl From<Departure> for DepartureResult {
    fn from(d: Departure) -> Self {
        Self {
            time: format_time(d.time),
            train: d.train_name,
            destination: d.destination,
            platform: d.platform,
            delay: d.delay,
            line: d.line_code,
            trip_code: d.trip_code,
            trip_id: d.trip_id,
        }
    }
}

impl From<Arrival> for ArrivalResult {
    fn from(a: Arrival) -> Self {
        Self {
            time: format_time(a.time),
            train: a.train_name,
            origin: a.origin,
            platform: a.platform,
            delay: a.delay,
            line: a.line_code,
            trip_code: a.trip_code,
            trip_id: a.trip_id,
        }
    }
}

impl From<&StopRecord> for StopSummary {
    fn from(stop: &StopRecord) -> Self {
        Self {
            id: stop.identity().to_string(),
            complete: stop.is_complete(),
            visible_until: stop.visible_until().map(format_time),
        }
    }
}

impl BoardResponse {
    pub fn new(station: EvaId, board: Board) -> Self {
        Self {
            station,
            from: format_time(board.from),
            to: format_time(board.to),
            departures: board.departures.into_iter().map(Into::into).collect(),
            arrivals: board.arrivals.into_iter().map(Into::into).collect(),
        }
    }
}
