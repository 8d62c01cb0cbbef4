//! Web layer for the timetable monitor.
//!
//! Serves the station board and the reconciled stops as JSON.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, FeedSource};
