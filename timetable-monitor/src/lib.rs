//! Live departure and arrival boards for a railway station.
//!
//! Reconciles the timetable API's hourly plan snapshots with its full and
//! recent change feeds into one view of the station's stops, and derives
//! boards for a window around the current time from it.

pub mod board;
pub mod cache;
pub mod config;
pub mod domain;
pub mod reconcile;
pub mod timetables;
pub mod web;
