//! Timestamp handling for the timetable feeds.
//!
//! The upstream service encodes every instant as a ten digit `YYMMDDHHmm`
//! string in station-local time. Plan snapshots are published per hour, so
//! this module also provides the hour-aligned [`HourBucket`] used to key
//! them.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Error returned when parsing an invalid feed timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp {value:?}: {reason}")]
pub struct TimeError {
    value: String,
    reason: &'static str,
}

impl TimeError {
    fn new(value: &str, reason: &'static str) -> Self {
        Self {
            value: value.to_string(),
            reason,
        }
    }
}

/// Parse a `YYMMDDHHmm` feed timestamp.
///
/// Years are two digits and always refer to the 21st century.
///
/// # Examples
///
/// ```
/// use timetable_monitor::domain::parse_feed_time;
///
/// let t = parse_feed_time("1805220825").unwrap();
/// assert_eq!(t.to_string(), "2018-05-22 08:25:00");
///
/// assert!(parse_feed_time("18052208").is_err());
/// assert!(parse_feed_time("1813220825").is_err());
/// ```
pub fn parse_feed_time(s: &str) -> Result<NaiveDateTime, TimeError> {
    if s.len() != 10 {
        return Err(TimeError::new(s, "expected YYMMDDHHmm"));
    }

    let bytes = s.as_bytes();
    let mut fields = [0u32; 5];
    for (i, field) in fields.iter_mut().enumerate() {
        *field = parse_two_digits(&bytes[i * 2..i * 2 + 2])
            .ok_or_else(|| TimeError::new(s, "non-digit character"))?;
    }
    let [year, month, day, hour, minute] = fields;

    let date = NaiveDate::from_ymd_opt(2000 + year as i32, month, day)
        .ok_or_else(|| TimeError::new(s, "no such date"))?;
    let time =
        NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new(s, "no such time"))?;

    Ok(date.and_time(time))
}

/// Format an instant as `YYMMDDHHmm`, the inverse of [`parse_feed_time`].
pub fn format_feed_time(t: NaiveDateTime) -> String {
    format!(
        "{:02}{:02}{:02}{:02}{:02}",
        t.year() % 100,
        t.month(),
        t.day(),
        t.hour(),
        t.minute()
    )
}

fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    match bytes {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

/// One hour-aligned timeslice of the plan feed.
///
/// The wrapped instant always has zero minutes and seconds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HourBucket(NaiveDateTime);

impl HourBucket {
    /// The bucket containing `t`.
    pub fn containing(t: NaiveDateTime) -> Self {
        let start = t
            .date()
            .and_hms_opt(t.hour(), 0, 0)
            .unwrap_or(t.date().and_time(NaiveTime::MIN));
        Self(start)
    }

    /// First instant of the bucket.
    pub fn start(&self) -> NaiveDateTime {
        self.0
    }

    /// First instant after the bucket.
    pub fn end(&self) -> NaiveDateTime {
        self.0 + Duration::hours(1)
    }

    /// The following bucket.
    pub fn next(&self) -> Self {
        Self(self.end())
    }

    /// The `YYMMDD` date segment of the plan request path.
    pub fn date_segment(&self) -> String {
        format!(
            "{:02}{:02}{:02}",
            self.0.year() % 100,
            self.0.month(),
            self.0.day()
        )
    }

    /// The `HH` hour segment of the plan request path.
    pub fn hour_segment(&self) -> String {
        format!("{:02}", self.0.hour())
    }
}

impl fmt::Debug for HourBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HourBucket({})", self.0.format("%Y-%m-%d %H:00"))
    }
}

impl fmt::Display for HourBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.date_segment(), self.hour_segment())
    }
}

/// Every hour bucket needed to cover `[from, to)`.
///
/// Starts at the hour containing `from` and steps by one hour while the
/// bucket start is before `to`. An empty or inverted range yields no
/// buckets.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use timetable_monitor::domain::hour_buckets;
///
/// let day = NaiveDate::from_ymd_opt(2018, 5, 22).unwrap();
/// let from = day.and_hms_opt(7, 20, 0).unwrap();
/// let to = day.and_hms_opt(9, 20, 0).unwrap();
///
/// let buckets: Vec<String> = hour_buckets(from, to).iter().map(|b| b.to_string()).collect();
/// assert_eq!(buckets, ["180522/07", "180522/08", "180522/09"]);
/// ```
pub fn hour_buckets(from: NaiveDateTime, to: NaiveDateTime) -> BTreeSet<HourBucket> {
    let mut buckets = BTreeSet::new();
    let mut bucket = HourBucket::containing(from);
    while bucket.start() < to {
        buckets.insert(bucket);
        bucket = bucket.next();
    }
    buckets
}
