//! Domain types for the timetable monitor.
//!
//! This module holds the model of a partially known stop visit, the
//! field-level merge rules that reconcile the upstream feeds, and the
//! board entries derived from reconciled records. Parsing constructors
//! validate their input, so code receiving these types can trust them.

mod board;
mod error;
pub(crate) mod event;
mod identity;
mod label;
mod station;
pub(crate) mod stop;
mod time;

pub use board::{Arrival, Board, Departure, trip_code};
pub use error::MergeError;
pub use event::{CANCELLED_GRACE_MINS, Delay, EventPart, EventStatus, InvalidEventStatus};
pub use identity::{InvalidStopId, StopIdentity};
pub use label::TripLabel;
pub use station::{EvaId, InvalidEvaId};
pub use stop::StopRecord;
pub use time::{HourBucket, TimeError, format_feed_time, hour_buckets, parse_feed_time};
