//! Stop visit identity.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};

use super::time::{format_feed_time, parse_feed_time};

/// Error returned when parsing an invalid stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id {value:?}: {reason}")]
pub struct InvalidStopId {
    value: String,
    reason: &'static str,
}

/// Identifies one stop visit of one trip across all three feeds.
///
/// Rendered as `{tripId}-{YYMMDDHHmm}-{stopSeq}`, which is also the form the
/// upstream service uses in its `id` attribute. Trip ids may be negative.
///
/// # Examples
///
/// ```
/// use timetable_monitor::domain::StopIdentity;
///
/// let id: StopIdentity = "-7874571842864554321-1805220800-3".parse().unwrap();
/// assert_eq!(id.trip_id(), -7874571842864554321);
/// assert_eq!(id.stop_seq(), 3);
/// assert_eq!(id.to_string(), "-7874571842864554321-1805220800-3");
///
/// assert!("5-1805220800".parse::<StopIdentity>().is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopIdentity {
    trip_id: i64,
    trip_start: NaiveDateTime,
    stop_seq: u32,
}

impl StopIdentity {
    /// Create an identity from its parts.
    ///
    /// Seconds of `trip_start` are not part of the identity and are dropped.
    pub fn new(trip_id: i64, trip_start: NaiveDateTime, stop_seq: u32) -> Self {
        Self {
            trip_id,
            trip_start: truncate_to_minute(trip_start),
            stop_seq,
        }
    }

    /// The upstream trip id.
    pub fn trip_id(&self) -> i64 {
        self.trip_id
    }

    /// When the trip starts at its origin.
    pub fn trip_start(&self) -> NaiveDateTime {
        self.trip_start
    }

    /// Position of this stop within the trip.
    pub fn stop_seq(&self) -> u32 {
        self.stop_seq
    }
}

/// Truncate to whole minutes; feed identities have minute resolution.
fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

impl FromStr for StopIdentity {
    type Err = InvalidStopId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| InvalidStopId {
            value: s.to_string(),
            reason,
        };

        // Split from the right: the trip id may carry a leading minus sign.
        let mut parts = s.rsplitn(3, '-');
        let (Some(seq), Some(start), Some(trip)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(err("expected tripId-YYMMDDHHmm-stopSeq"));
        };

        // `str::parse` accepts a leading '+', which `Display` never writes.
        if !all_digits(trip.strip_prefix('-').unwrap_or(trip)) {
            return Err(err("invalid trip id"));
        }
        if !all_digits(seq) {
            return Err(err("invalid stop sequence"));
        }

        let trip_id = trip.parse::<i64>().map_err(|_| err("invalid trip id"))?;
        let trip_start = parse_feed_time(start).map_err(|_| err("invalid trip start"))?;
        let stop_seq = seq.parse::<u32>().map_err(|_| err("invalid stop sequence"))?;

        Ok(Self::new(trip_id, trip_start, stop_seq))
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Debug for StopIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopIdentity({self})")
    }
}

impl fmt::Display for StopIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.trip_id,
            format_feed_time(self.trip_start),
            self.stop_seq
        )
    }
}
