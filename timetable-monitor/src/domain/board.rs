//! Board entries handed to persistence and reporting.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

use super::{Delay, EvaId, StopIdentity, StopRecord};

/// Decimal encoding of a trip's start, `YYMMDDHHmm` read as a number.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use timetable_monitor::domain::trip_code;
///
/// let start = NaiveDate::from_ymd_opt(2018, 5, 22).unwrap().and_hms_opt(8, 0, 0).unwrap();
/// assert_eq!(trip_code(start), 1805220800);
/// ```
pub fn trip_code(trip_start: NaiveDateTime) -> u64 {
    100_000_000 * u64::from(trip_start.year().rem_euclid(100) as u32)
        + 1_000_000 * u64::from(trip_start.month())
        + 10_000 * u64::from(trip_start.day())
        + 100 * u64::from(trip_start.hour())
        + u64::from(trip_start.minute())
}

/// A train leaving the station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Departure {
    /// Planned departure time.
    pub time: NaiveDateTime,
    pub train_name: String,
    /// Last station of the current route.
    pub destination: String,
    pub station_id: EvaId,
    pub trip_code: u64,
    /// Upstream trip id, which together with `trip_code` names the trip.
    pub trip_id: i64,
    pub line_code: Option<String>,
    pub platform: Option<String>,
    /// `None` when unknown.
    pub delay: Option<Delay>,
}

/// A train reaching the station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arrival {
    /// Planned arrival time.
    pub time: NaiveDateTime,
    pub train_name: String,
    /// First station of the current route.
    pub origin: String,
    pub station_id: EvaId,
    pub trip_code: u64,
    pub trip_id: i64,
    pub line_code: Option<String>,
    pub platform: Option<String>,
    pub delay: Option<Delay>,
}

/// Departures and arrivals visible in a time window, each sorted by
/// planned time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Start of the window (inclusive).
    pub from: NaiveDateTime,
    /// End of the window (exclusive).
    pub to: NaiveDateTime,
    pub departures: Vec<Departure>,
    pub arrivals: Vec<Arrival>,
    /// The reconciled records the board was derived from.
    pub stops: Vec<StopRecord>,
}

impl Board {
    /// Look up the raw record behind a board entry.
    pub fn stop(&self, identity: StopIdentity) -> Option<&StopRecord> {
        self.stops.iter().find(|s| s.identity() == identity)
    }
}
