//! Departure and arrival boards derived from the reconciled view.

use chrono::{Duration, NaiveDateTime};

use crate::domain::{
    Arrival, Board, Departure, EvaId, EventPart, StopRecord, hour_buckets, trip_code,
};
use crate::reconcile::{ReconcileError, ReconciliationCache};
use crate::timetables::TimetableGateway;

/// Longest window accepted on either side of the board time (minutes).
pub const MAX_WINDOW_MINS: i64 = 24 * 60;

/// Window around `now` that a board covers.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// How far back to look (minutes).
    pub lookbehind_mins: i64,

    /// How far ahead to look (minutes).
    pub lookahead_mins: i64,
}

impl BoardConfig {
    pub fn new(lookbehind_mins: i64, lookahead_mins: i64) -> Self {
        Self {
            lookbehind_mins,
            lookahead_mins,
        }
    }

    pub fn lookbehind(&self) -> Duration {
        Duration::minutes(self.lookbehind_mins)
    }

    pub fn lookahead(&self) -> Duration {
        Duration::minutes(self.lookahead_mins)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            lookbehind_mins: 60,
            lookahead_mins: 60,
        }
    }
}

/// Builds boards for one station.
pub struct BoardBuilder<G> {
    station: EvaId,
    cache: ReconciliationCache<G>,
}

impl<G: TimetableGateway> BoardBuilder<G> {
    pub fn new(station: EvaId, cache: ReconciliationCache<G>) -> Self {
        Self { station, cache }
    }

    pub fn station(&self) -> EvaId {
        self.station
    }

    pub fn cache(&self) -> &ReconciliationCache<G> {
        &self.cache
    }

    /// Board for `[now - lookbehind, now + lookahead)`.
    ///
    /// A stop appears as a departure when it is complete, its departure is
    /// complete, still visible at `now` and due no later than the end of
    /// the window. Arrivals follow the same rule. Both lists are sorted by
    /// planned time, keeping feed order for ties.
    pub async fn board(
        &mut self,
        now: NaiveDateTime,
        lookbehind: Duration,
        lookahead: Duration,
    ) -> Result<Board, ReconcileError> {
        let from = now - lookbehind;
        let to = now + lookahead;

        let stops = self.cache.stops_for(&hour_buckets(from, to)).await?;

        let mut departures: Vec<Departure> = stops
            .iter()
            .filter_map(|stop| self.departure(stop, now, to))
            .collect();
        departures.sort_by_key(|d| d.time);

        let mut arrivals: Vec<Arrival> = stops
            .iter()
            .filter_map(|stop| self.arrival(stop, now, to))
            .collect();
        arrivals.sort_by_key(|a| a.time);

        Ok(Board {
            from,
            to,
            departures,
            arrivals,
            stops,
        })
    }

    fn departure(
        &self,
        stop: &StopRecord,
        now: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Option<Departure> {
        let part = stop.departure.as_ref()?;
        let time = shown_at(stop, part, now, to)?;
        let identity = stop.identity();

        Some(Departure {
            time,
            train_name: train_name(stop, part),
            destination: part.destination().unwrap_or_default().to_string(),
            station_id: self.station,
            trip_code: trip_code(identity.trip_start()),
            trip_id: identity.trip_id(),
            line_code: part.line.clone(),
            platform: part.effective_platform().map(str::to_string),
            delay: Some(part.delay()),
        })
    }

    fn arrival(
        &self,
        stop: &StopRecord,
        now: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Option<Arrival> {
        let part = stop.arrival.as_ref()?;
        let time = shown_at(stop, part, now, to)?;
        let identity = stop.identity();

        Some(Arrival {
            time,
            train_name: train_name(stop, part),
            origin: part.origin().unwrap_or_default().to_string(),
            station_id: self.station,
            trip_code: trip_code(identity.trip_start()),
            trip_id: identity.trip_id(),
            line_code: part.line.clone(),
            platform: part.effective_platform().map(str::to_string),
            delay: Some(part.delay()),
        })
    }
}

/// Planned time of `part` if it belongs on the board at `now`.
fn shown_at(
    stop: &StopRecord,
    part: &EventPart,
    now: NaiveDateTime,
    to: NaiveDateTime,
) -> Option<NaiveDateTime> {
    if !stop.is_complete() || !part.is_complete() {
        return None;
    }
    if part.visible_until()? < now || part.effective_time()? > to {
        return None;
    }
    part.planned_time
}

fn train_name(stop: &StopRecord, part: &EventPart) -> String {
    stop.label
        .as_ref()
        .map(|label| label.train_name(part.line.as_deref()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Delay, EventStatus, HourBucket, StopIdentity, TripLabel};
    use crate::timetables::{FeedKind, MockGateway};
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 5, 22)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn bucket(h: u32) -> HourBucket {
        HourBucket::containing(t(h, 0))
    }

    fn station() -> EvaId {
        EvaId::new(8000191).unwrap()
    }

    fn id(seq: u32) -> StopIdentity {
        StopIdentity::new(5, t(8, 0), seq)
    }

    fn rb_departure(seq: u32, dep: NaiveDateTime) -> StopRecord {
        StopRecord::new(id(seq))
            .with_label(TripLabel::new("RB", "38824"))
            .with_departure(EventPart {
                planned_path: Some(vec!["Karlsruhe".into(), "Mannheim".into()]),
                planned_time: Some(dep),
                ..EventPart::default()
            })
    }

    fn builder(mock: MockGateway) -> BoardBuilder<MockGateway> {
        BoardBuilder::new(station(), ReconciliationCache::new(mock))
    }

    async fn board_at(builder: &mut BoardBuilder<MockGateway>, now: NaiveDateTime) -> Board {
        builder
            .board(now, Duration::hours(1), Duration::hours(1))
            .await
            .unwrap()
    }

    #[test]
    fn default_config() {
        let config = BoardConfig::default();
        assert_eq!(config.lookbehind(), Duration::hours(1));
        assert_eq!(config.lookahead(), Duration::hours(1));
        assert_eq!(BoardConfig::new(15, 30).lookahead(), Duration::minutes(30));
    }

    #[tokio::test]
    async fn planned_departure_is_on_time() {
        let mock = MockGateway::new();
        mock.set_plan(bucket(8), vec![rb_departure(3, t(8, 25))]);
        let mut builder = builder(mock);

        let board = board_at(&mut builder, t(8, 20)).await;

        assert_eq!(board.from, t(7, 20));
        assert_eq!(board.to, t(9, 20));
        assert_eq!(
            board.departures,
            vec![Departure {
                time: t(8, 25),
                train_name: "RB 38824".into(),
                destination: "Mannheim".into(),
                station_id: station(),
                trip_code: 1805220800,
                trip_id: 5,
                line_code: None,
                platform: None,
                delay: Some(Delay::Minutes(0)),
            }]
        );
        assert!(board.arrivals.is_empty());
        assert_eq!(
            builder.cache().gateway().calls(),
            vec![
                FeedKind::Plan(bucket(7)),
                FeedKind::Plan(bucket(8)),
                FeedKind::Plan(bucket(9)),
                FeedKind::FullChanges,
            ]
        );
    }

    #[tokio::test]
    async fn recent_change_delays_departure() {
        let mock = MockGateway::new();
        mock.set_plan(bucket(8), vec![rb_departure(3, t(8, 25))]);
        let mut builder = builder(mock);
        board_at(&mut builder, t(8, 20)).await;

        builder.cache().gateway().set_recent_changes(vec![
            StopRecord::new(id(3)).with_departure(EventPart {
                changed_time: Some(t(8, 29)),
                ..EventPart::default()
            }),
        ]);
        let board = board_at(&mut builder, t(8, 20)).await;

        let dep = &board.departures[0];
        assert_eq!(dep.time, t(8, 25));
        assert_eq!(dep.delay, Some(Delay::Minutes(4)));

        let part = board.stop(id(3)).unwrap().departure.as_ref().unwrap();
        assert_eq!(part.visible_until(), Some(t(8, 29)));
    }

    #[tokio::test]
    async fn cancelled_departure_stays_for_grace_period() {
        let mock = MockGateway::new();
        mock.set_plan(bucket(8), vec![rb_departure(3, t(8, 25))]);
        mock.set_full_changes(vec![StopRecord::new(id(3)).with_departure(EventPart {
            changed_status: Some(EventStatus::Cancelled),
            cancellation_time: Some(t(8, 10)),
            ..EventPart::default()
        })]);
        let mut builder = builder(mock);

        let board = board_at(&mut builder, t(8, 29)).await;
        assert_eq!(board.departures.len(), 1);
        assert_eq!(board.departures[0].delay, Some(Delay::Cancelled));

        let part = board.stop(id(3)).unwrap().departure.as_ref().unwrap();
        assert_eq!(part.visible_until(), Some(t(8, 30)));

        let board = board_at(&mut builder, t(8, 31)).await;
        assert!(board.departures.is_empty());
    }

    #[tokio::test]
    async fn visibility_boundary() {
        let mock = MockGateway::new();
        mock.set_plan(bucket(8), vec![rb_departure(3, t(8, 25))]);
        let mut builder = builder(mock);

        let board = board_at(&mut builder, t(8, 25)).await;
        assert_eq!(board.departures.len(), 1);

        let just_after = t(8, 25) + Duration::seconds(1);
        let board = board_at(&mut builder, just_after).await;
        assert!(board.departures.is_empty());
    }

    #[tokio::test]
    async fn lookahead_bounds_effective_time() {
        let mock = MockGateway::new();
        mock.set_plan(
            bucket(9),
            vec![rb_departure(1, t(9, 20)), rb_departure(2, t(9, 21))],
        );
        let mut builder = builder(mock);

        let board = board_at(&mut builder, t(8, 20)).await;
        assert_eq!(board.departures.len(), 1);
        assert_eq!(board.departures[0].time, t(9, 20));
    }

    #[tokio::test]
    async fn terminus_and_origin() {
        let terminating = StopRecord::new(id(1))
            .with_label(TripLabel::new("ICE", "71"))
            .with_arrival(EventPart {
                planned_path: Some(vec!["Basel".into(), "Freiburg".into()]),
                planned_time: Some(t(8, 40)),
                line: Some("S3".into()),
                planned_platform: Some("2".into()),
                changed_platform: Some("5".into()),
                ..EventPart::default()
            });
        let originating = rb_departure(2, t(8, 45));

        let mock = MockGateway::new();
        mock.set_plan(bucket(8), vec![terminating, originating]);
        let mut builder = builder(mock);

        let board = board_at(&mut builder, t(8, 20)).await;

        assert_eq!(board.departures.len(), 1);
        assert_eq!(board.departures[0].destination, "Mannheim");

        assert_eq!(board.arrivals.len(), 1);
        let arrival = &board.arrivals[0];
        assert_eq!(arrival.origin, "Basel");
        assert_eq!(arrival.train_name, "ICE S3 (71)");
        assert_eq!(arrival.line_code.as_deref(), Some("S3"));
        assert_eq!(arrival.platform.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn incomplete_stops_are_cached_but_not_shown() {
        let unlabelled = StopRecord::new(id(1)).with_departure(EventPart {
            planned_path: Some(vec!["Mannheim".into()]),
            planned_time: Some(t(8, 30)),
            ..EventPart::default()
        });
        let no_time = StopRecord::new(id(2))
            .with_label(TripLabel::new("RB", "1"))
            .with_departure(EventPart {
                planned_path: Some(vec!["Mannheim".into()]),
                ..EventPart::default()
            });

        let mock = MockGateway::new();
        mock.set_plan(bucket(8), vec![unlabelled, no_time]);
        let mut builder = builder(mock);

        let board = board_at(&mut builder, t(8, 20)).await;
        assert!(board.departures.is_empty());
        assert_eq!(board.stops.len(), 2);
    }

    #[tokio::test]
    async fn sorted_by_planned_time_with_feed_order_ties() {
        let trip = |trip_id: i64, dep: NaiveDateTime| {
            let planned = rb_departure(1, dep);
            let mut stop = StopRecord::new(StopIdentity::new(trip_id, t(8, 0), 1));
            stop.label = planned.label;
            stop.departure = planned.departure;
            stop
        };

        let mock = MockGateway::new();
        mock.set_plan(
            bucket(8),
            vec![trip(11, t(8, 50)), trip(12, t(8, 30)), trip(13, t(8, 50))],
        );
        let mut builder = builder(mock);

        let board = board_at(&mut builder, t(8, 20)).await;
        let order: Vec<(i64, NaiveDateTime)> = board
            .departures
            .iter()
            .map(|d| (d.trip_id, d.time))
            .collect();
        assert_eq!(order, vec![(12, t(8, 30)), (11, t(8, 50)), (13, t(8, 50))]);
    }

    #[tokio::test]
    async fn empty_path_gives_empty_destination() {
        let mock = MockGateway::new();
        mock.set_plan(
            bucket(8),
            vec![StopRecord::new(id(1))
                .with_label(TripLabel::new("RB", "1"))
                .with_departure(EventPart {
                    planned_path: Some(Vec::new()),
                    planned_time: Some(t(8, 30)),
                    ..EventPart::default()
                })],
        );
        let mut builder = builder(mock);

        let board = board_at(&mut builder, t(8, 20)).await;
        assert_eq!(board.departures[0].destination, "");
    }

    #[tokio::test]
    async fn feed_failure_propagates() {
        let mock = MockGateway::new();
        mock.fail_all(true);
        let mut builder = builder(mock);

        let err = builder
            .board(t(8, 20), Duration::hours(1), Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Feed(_)));
    }
}
