//! Stop records.
//!
//! A `StopRecord` is everything currently known about one stop visit: its
//! identity, the arrival and departure halves, and the trip label. Each
//! feed contributes a partial record and [`StopRecord::merged`] folds them
//! together.

use chrono::NaiveDateTime;

use super::{EventPart, MergeError, StopIdentity, TripLabel};

/// What is known about one stop visit.
///
/// The identity is fixed at construction; merges only replace the optional
/// parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopRecord {
    identity: StopIdentity,
    /// Arrival half; absent at a trip's origin or when not yet reported.
    pub arrival: Option<EventPart>,
    /// Departure half; absent at a trip's terminus or when not yet reported.
    pub departure: Option<EventPart>,
    pub label: Option<TripLabel>,
}

impl StopRecord {
    /// A record with nothing but its identity known.
    pub fn new(identity: StopIdentity) -> Self {
        Self {
            identity,
            arrival: None,
            departure: None,
            label: None,
        }
    }

    /// Set the arrival half.
    pub fn with_arrival(mut self, arrival: EventPart) -> Self {
        self.arrival = Some(arrival);
        self
    }

    /// Set the departure half.
    pub fn with_departure(mut self, departure: EventPart) -> Self {
        self.departure = Some(departure);
        self
    }

    /// Set the trip label.
    pub fn with_label(mut self, label: TripLabel) -> Self {
        self.label = Some(label);
        self
    }

    pub fn identity(&self) -> StopIdentity {
        self.identity
    }

    /// True when the label is known and at least one half is complete.
    pub fn is_complete(&self) -> bool {
        self.label.is_some()
            && (self.arrival.as_ref().is_some_and(EventPart::is_complete)
                || self.departure.as_ref().is_some_and(EventPart::is_complete))
    }

    /// The later of the complete halves' visibility ends.
    pub fn visible_until(&self) -> Option<NaiveDateTime> {
        [self.arrival.as_ref(), self.departure.as_ref()]
            .into_iter()
            .flatten()
            .filter(|ev| ev.is_complete())
            .filter_map(EventPart::visible_until)
            .max()
    }

    /// Combine two partial records of the same stop visit.
    ///
    /// The label is taken whole from `change` when present. Arrival and
    /// departure are merged with [`EventPart::merged`] when both sides have
    /// one, otherwise whichever side has one is kept.
    ///
    /// Fails with [`MergeError::IdentityMismatch`] when the identities
    /// differ.
    pub fn merged(base: StopRecord, change: StopRecord) -> Result<StopRecord, MergeError> {
        if base.identity != change.identity {
            return Err(MergeError::IdentityMismatch {
                base: base.identity,
                change: change.identity,
            });
        }

        // TODO: merge label fields individually once a feed is seen sending
        // partial labels.
        let label = change.label.or(base.label);

        Ok(StopRecord {
            identity: base.identity,
            arrival: merge_parts(base.arrival, change.arrival),
            departure: merge_parts(base.departure, change.departure),
            label,
        })
    }
}

fn merge_parts(base: Option<EventPart>, change: Option<EventPart>) -> Option<EventPart> {
    match (base, change) {
        (Some(base), Some(change)) => Some(EventPart::merged(base, change)),
        (base, change) => change.or(base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventStatus;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 5, 22)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn id(seq: u32) -> StopIdentity {
        StopIdentity::new(5, t(8, 0), seq)
    }

    fn planned_departure() -> EventPart {
        EventPart {
            planned_path: Some(vec!["Karlsruhe".into(), "Mannheim".into()]),
            planned_time: Some(t(8, 25)),
            ..EventPart::default()
        }
    }

    #[test]
    fn new_record_is_incomplete() {
        let rec = StopRecord::new(id(3));
        assert_eq!(rec.identity(), id(3));
        assert!(!rec.is_complete());
        assert_eq!(rec.visible_until(), None);
    }

    #[test]
    fn complete_needs_label_and_complete_part() {
        let no_label = StopRecord::new(id(3)).with_departure(planned_departure());
        assert!(!no_label.is_complete());

        let with_label = no_label.with_label(TripLabel::new("RB", "38824"));
        assert!(with_label.is_complete());

        let partial_part = StopRecord::new(id(3))
            .with_label(TripLabel::new("RB", "38824"))
            .with_departure(EventPart {
                planned_time: Some(t(8, 25)),
                ..EventPart::default()
            });
        assert!(!partial_part.is_complete());
    }

    #[test]
    fn arrival_alone_can_complete() {
        let rec = StopRecord::new(id(3))
            .with_label(TripLabel::new("RB", "38824"))
            .with_arrival(planned_departure());
        assert!(rec.is_complete());
    }

    #[test]
    fn visible_until_takes_later_half() {
        let mut arrival = planned_departure();
        arrival.planned_time = Some(t(8, 23));
        let mut departure = planned_departure();
        departure.changed_status = Some(EventStatus::Cancelled);

        let rec = StopRecord::new(id(3))
            .with_arrival(arrival)
            .with_departure(departure);
        assert_eq!(rec.visible_until(), Some(t(8, 30)));
    }

    #[test]
    fn merge_rejects_different_identity() {
        let err = StopRecord::merged(StopRecord::new(id(3)), StopRecord::new(id(4))).unwrap_err();
        assert_eq!(
            err,
            MergeError::IdentityMismatch {
                base: id(3),
                change: id(4)
            }
        );
    }

    #[test]
    fn merge_fills_missing_parts() {
        let base = StopRecord::new(id(3)).with_label(TripLabel::new("RB", "38824"));
        let change = StopRecord::new(id(3)).with_departure(planned_departure());

        let merged = StopRecord::merged(base, change).unwrap();
        assert!(merged.is_complete());
        assert!(merged.arrival.is_none());
        assert_eq!(merged.departure, Some(planned_departure()));
    }

    #[test]
    fn merge_combines_parts_fieldwise() {
        let base = StopRecord::new(id(3)).with_departure(planned_departure());
        let change = StopRecord::new(id(3)).with_departure(EventPart {
            changed_time: Some(t(8, 29)),
            ..EventPart::default()
        });

        let merged = StopRecord::merged(base, change).unwrap();
        let dep = merged.departure.unwrap();
        assert_eq!(dep.planned_time, Some(t(8, 25)));
        assert_eq!(dep.changed_time, Some(t(8, 29)));
    }

    #[test]
    fn merge_replaces_label_whole() {
        let mut base_label = TripLabel::new("RB", "38824");
        base_label.operator = Some("800725".into());
        let base = StopRecord::new(id(3)).with_label(base_label);
        let change = StopRecord::new(id(3)).with_label(TripLabel::new("RE", "38824"));

        let merged = StopRecord::merged(base, change).unwrap();
        let label = merged.label.unwrap();
        assert_eq!(label.category, "RE");
        assert!(label.operator.is_none());
    }
}
