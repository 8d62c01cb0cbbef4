//! Timetable feed access.
//!
//! The upstream timetable service publishes three overlapping views of a
//! station's schedule:
//! - `plan`: one snapshot per hour, as originally scheduled
//! - `fchg`: every currently known change, across all hours
//! - `rchg`: only changes from the last couple of minutes
//!
//! Each is an XML document of partial stop records. [`TimetableGateway`]
//! abstracts over where they come from; [`TimetableClient`] fetches them
//! over HTTP and [`MockGateway`] serves them from memory.

mod client;
mod error;
mod gateway;
mod mock;
mod parse;

pub use client::{DEFAULT_BASE_URL, TimetableClient, TimetableConfig};
pub use error::FeedError;
pub use gateway::{FeedKind, TimetableGateway};
pub use mock::MockGateway;
pub use parse::{RecordError, convert_stop, parse_timetable};
