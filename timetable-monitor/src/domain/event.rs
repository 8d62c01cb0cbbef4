//! Arrival and departure halves of a stop visit.
//!
//! The feeds describe each half piecemeal: a plan snapshot carries the
//! `planned_*` fields, change feeds carry `changed_*` fields and
//! cancellation data. Every field is independently present or absent, and
//! [`EventPart::merged`] combines two partial descriptions with the
//! "change wins if present" rule.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Serialize, Serializer};

/// How long a cancelled event stays on the board past its last relevant
/// instant, in minutes.
pub const CANCELLED_GRACE_MINS: i64 = 5;

/// Error returned when parsing an unknown event status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid event status code: {0:?}")]
pub struct InvalidEventStatus(String);

/// Status of an arrival or departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventStatus {
    /// Running as planned (also the status when nothing is known).
    #[default]
    Planned,
    /// Added to the timetable at short notice.
    Added,
    /// Will not take place.
    Cancelled,
}

impl EventStatus {
    /// Parse the single-letter wire code (`p`, `a`, `c`).
    pub fn from_code(code: &str) -> Result<Self, InvalidEventStatus> {
        match code {
            "p" => Ok(EventStatus::Planned),
            "a" => Ok(EventStatus::Added),
            "c" => Ok(EventStatus::Cancelled),
            other => Err(InvalidEventStatus(other.to_string())),
        }
    }
}

/// Delay of an arrival or departure.
///
/// A cancelled event without a changed time has an unbounded delay, which
/// downstream consumers must keep distinct from "delay unknown" (modelled as
/// `Option<Delay>::None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delay {
    /// Delay in whole minutes; negative when early.
    Minutes(i64),
    /// Cancelled: infinite delay.
    Cancelled,
}

impl Delay {
    /// Minutes as a float, with `f64::INFINITY` for cancellations.
    pub fn as_minutes_f64(&self) -> f64 {
        match self {
            Delay::Minutes(m) => *m as f64,
            Delay::Cancelled => f64::INFINITY,
        }
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delay::Minutes(m) => write!(f, "{m:+}"),
            Delay::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Serialised as a number of minutes, or the string `"cancelled"`.
impl Serialize for Delay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Delay::Minutes(m) => serializer.serialize_i64(*m),
            Delay::Cancelled => serializer.serialize_str("cancelled"),
        }
    }
}

/// One arrival or departure of a stop visit, as far as it is known.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventPart {
    /// Stations in planned order: following stations for a departure,
    /// previous stations for an arrival.
    pub planned_path: Option<Vec<String>>,
    /// Replacement path after a reroute.
    pub changed_path: Option<Vec<String>>,
    pub planned_time: Option<NaiveDateTime>,
    pub changed_time: Option<NaiveDateTime>,
    pub planned_status: Option<EventStatus>,
    pub changed_status: Option<EventStatus>,
    pub planned_platform: Option<String>,
    pub changed_platform: Option<String>,
    /// Line identifier, e.g. `S1`.
    pub line: Option<String>,
    /// When the cancellation was announced.
    pub cancellation_time: Option<NaiveDateTime>,
}

impl EventPart {
    /// An event with nothing known.
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine two partial descriptions of the same event.
    ///
    /// Every field of the result is `change`'s value if present, else
    /// `base`'s. No consistency checks are made between fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use timetable_monitor::domain::EventPart;
    ///
    /// let t = |h, m| NaiveDate::from_ymd_opt(2018, 5, 22).unwrap().and_hms_opt(h, m, 0).unwrap();
    ///
    /// let plan = EventPart {
    ///     planned_time: Some(t(8, 25)),
    ///     planned_platform: Some("3".into()),
    ///     ..EventPart::default()
    /// };
    /// let change = EventPart {
    ///     changed_time: Some(t(8, 29)),
    ///     ..EventPart::default()
    /// };
    ///
    /// let merged = EventPart::merged(plan, change);
    /// assert_eq!(merged.planned_time, Some(t(8, 25)));
    /// assert_eq!(merged.changed_time, Some(t(8, 29)));
    /// assert_eq!(merged.planned_platform.as_deref(), Some("3"));
    /// ```
    pub fn merged(base: EventPart, change: EventPart) -> EventPart {
        EventPart {
            planned_path: change.planned_path.or(base.planned_path),
            changed_path: change.changed_path.or(base.changed_path),
            planned_time: change.planned_time.or(base.planned_time),
            changed_time: change.changed_time.or(base.changed_time),
            planned_status: change.planned_status.or(base.planned_status),
            changed_status: change.changed_status.or(base.changed_status),
            planned_platform: change.planned_platform.or(base.planned_platform),
            changed_platform: change.changed_platform.or(base.changed_platform),
            line: change.line.or(base.line),
            cancellation_time: change.cancellation_time.or(base.cancellation_time),
        }
    }

    /// The changed time if known, else the planned time.
    pub fn effective_time(&self) -> Option<NaiveDateTime> {
        self.changed_time.or(self.planned_time)
    }

    /// The changed status if known, else the planned status, else
    /// [`EventStatus::Planned`].
    pub fn effective_status(&self) -> EventStatus {
        self.changed_status
            .or(self.planned_status)
            .unwrap_or_default()
    }

    /// The changed platform if known, else the planned platform.
    pub fn effective_platform(&self) -> Option<&str> {
        self.changed_platform
            .as_deref()
            .or(self.planned_platform.as_deref())
    }

    /// The changed path if known, else the planned path.
    pub fn effective_path(&self) -> Option<&[String]> {
        self.changed_path
            .as_deref()
            .or(self.planned_path.as_deref())
    }

    /// True once both the planned path and planned time are known.
    pub fn is_complete(&self) -> bool {
        self.planned_path.is_some() && self.planned_time.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.effective_status() == EventStatus::Cancelled
    }

    /// Delay against the planned time.
    ///
    /// Cancelled events without a changed time are infinitely late; events
    /// missing either time are on time.
    pub fn delay(&self) -> Delay {
        match (self.changed_time, self.planned_time) {
            (Some(changed), Some(planned)) => {
                Delay::Minutes(changed.signed_duration_since(planned).num_minutes())
            }
            _ if self.is_cancelled() && self.changed_time.is_none() => Delay::Cancelled,
            _ => Delay::Minutes(0),
        }
    }

    /// The last instant at which this event should still be shown.
    ///
    /// The later of the planned and changed time; cancelled events stay up
    /// until [`CANCELLED_GRACE_MINS`] after the later of that and the
    /// cancellation time. `None` until the planned time is known.
    pub fn visible_until(&self) -> Option<NaiveDateTime> {
        let planned = self.planned_time?;
        let mut end = self.changed_time.map_or(planned, |c| c.max(planned));

        if self.is_cancelled() {
            if let Some(cancelled_at) = self.cancellation_time {
                end = end.max(cancelled_at);
            }
            end += Duration::minutes(CANCELLED_GRACE_MINS);
        }

        Some(end)
    }

    /// Last station of the effective path.
    pub fn destination(&self) -> Option<&str> {
        self.effective_path()?.last().map(String::as_str)
    }

    /// First station of the effective path.
    pub fn origin(&self) -> Option<&str> {
        self.effective_path()?.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 5, 22)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn path(stations: &[&str]) -> Option<Vec<String>> {
        Some(stations.iter().map(|s| s.to_string()).collect())
    }

    fn planned(h: u32, m: u32) -> EventPart {
        EventPart {
            planned_path: path(&["Karlsruhe", "Mannheim"]),
            planned_time: Some(t(h, m)),
            ..EventPart::default()
        }
    }

    #[test]
    fn status_codes() {
        assert_eq!(EventStatus::from_code("p"), Ok(EventStatus::Planned));
        assert_eq!(EventStatus::from_code("a"), Ok(EventStatus::Added));
        assert_eq!(EventStatus::from_code("c"), Ok(EventStatus::Cancelled));
        assert!(EventStatus::from_code("x").is_err());
        assert!(EventStatus::from_code("").is_err());
    }

    #[test]
    fn effective_time_prefers_changed() {
        let mut ev = planned(8, 25);
        assert_eq!(ev.effective_time(), Some(t(8, 25)));

        ev.changed_time = Some(t(8, 29));
        assert_eq!(ev.effective_time(), Some(t(8, 29)));

        assert_eq!(EventPart::new().effective_time(), None);
    }

    #[test]
    fn effective_status_defaults_to_planned() {
        let mut ev = EventPart::new();
        assert_eq!(ev.effective_status(), EventStatus::Planned);
        assert!(!ev.is_cancelled());

        ev.planned_status = Some(EventStatus::Cancelled);
        assert!(ev.is_cancelled());

        ev.changed_status = Some(EventStatus::Planned);
        assert!(!ev.is_cancelled());
    }

    #[test]
    fn effective_platform_and_path() {
        let mut ev = planned(8, 25);
        ev.planned_platform = Some("3".into());
        assert_eq!(ev.effective_platform(), Some("3"));
        assert_eq!(ev.destination(), Some("Mannheim"));
        assert_eq!(ev.origin(), Some("Karlsruhe"));

        ev.changed_platform = Some("4".into());
        ev.changed_path = path(&["Karlsruhe", "Bruchsal", "Heidelberg"]);
        assert_eq!(ev.effective_platform(), Some("4"));
        assert_eq!(ev.destination(), Some("Heidelberg"));
    }

    #[test]
    fn completeness_needs_path_and_time() {
        assert!(planned(8, 25).is_complete());

        let mut no_path = planned(8, 25);
        no_path.planned_path = None;
        assert!(!no_path.is_complete());

        let mut no_time = planned(8, 25);
        no_time.planned_time = None;
        assert!(!no_time.is_complete());

        // A changed path does not stand in for the planned one
        let changed_only = EventPart {
            changed_path: path(&["Mannheim"]),
            planned_time: Some(t(8, 25)),
            ..EventPart::default()
        };
        assert!(!changed_only.is_complete());
    }

    #[test]
    fn delay_from_changed_time() {
        let mut ev = planned(8, 25);
        assert_eq!(ev.delay(), Delay::Minutes(0));

        ev.changed_time = Some(t(8, 29));
        assert_eq!(ev.delay(), Delay::Minutes(4));

        ev.changed_time = Some(t(8, 23));
        assert_eq!(ev.delay(), Delay::Minutes(-2));
    }

    #[test]
    fn cancelled_without_changed_time_is_infinite() {
        let mut ev = planned(8, 25);
        ev.changed_status = Some(EventStatus::Cancelled);
        assert_eq!(ev.delay(), Delay::Cancelled);
        assert_eq!(ev.delay().as_minutes_f64(), f64::INFINITY);
    }

    #[test]
    fn cancelled_with_changed_time_keeps_minutes() {
        let mut ev = planned(8, 25);
        ev.changed_status = Some(EventStatus::Cancelled);
        ev.changed_time = Some(t(8, 35));
        assert_eq!(ev.delay(), Delay::Minutes(10));
    }

    #[test]
    fn visible_until_uses_later_time() {
        let mut ev = planned(8, 25);
        assert_eq!(ev.visible_until(), Some(t(8, 25)));

        ev.changed_time = Some(t(8, 29));
        assert_eq!(ev.visible_until(), Some(t(8, 29)));

        // An earlier changed time does not shorten visibility
        ev.changed_time = Some(t(8, 20));
        assert_eq!(ev.visible_until(), Some(t(8, 25)));
    }

    #[test]
    fn visible_until_cancelled_grace() {
        let mut ev = planned(8, 25);
        ev.changed_status = Some(EventStatus::Cancelled);
        ev.cancellation_time = Some(t(8, 10));
        assert_eq!(ev.visible_until(), Some(t(8, 30)));

        ev.cancellation_time = Some(t(8, 40));
        assert_eq!(ev.visible_until(), Some(t(8, 45)));

        ev.cancellation_time = None;
        assert_eq!(ev.visible_until(), Some(t(8, 30)));
    }

    #[test]
    fn visible_until_needs_planned_time() {
        let ev = EventPart {
            changed_time: Some(t(8, 29)),
            ..EventPart::default()
        };
        assert_eq!(ev.visible_until(), None);
    }

    #[test]
    fn merge_keeps_base_where_change_is_absent() {
        let mut base = planned(8, 25);
        base.line = Some("S3".into());
        let change = EventPart {
            changed_time: Some(t(8, 29)),
            ..EventPart::default()
        };

        let merged = EventPart::merged(base.clone(), change);
        assert_eq!(merged.planned_time, base.planned_time);
        assert_eq!(merged.planned_path, base.planned_path);
        assert_eq!(merged.line.as_deref(), Some("S3"));
        assert_eq!(merged.changed_time, Some(t(8, 29)));
    }

    #[test]
    fn merge_accepts_earlier_changes() {
        let mut base = planned(8, 25);
        base.changed_time = Some(t(8, 40));
        let change = EventPart {
            changed_time: Some(t(8, 30)),
            ..EventPart::default()
        };
        assert_eq!(EventPart::merged(base, change).changed_time, Some(t(8, 30)));
    }

    #[test]
    fn delay_display_and_json() {
        assert_eq!(Delay::Minutes(4).to_string(), "+4");
        assert_eq!(Delay::Minutes(-1).to_string(), "-1");
        assert_eq!(Delay::Cancelled.to_string(), "cancelled");
        assert_eq!(serde_json::to_string(&Delay::Minutes(4)).unwrap(), "4");
        assert_eq!(
            serde_json::to_string(&Delay::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
