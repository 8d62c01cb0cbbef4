//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{Duration, Local};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::board::MAX_WINDOW_MINS;
use crate::domain::parse_feed_time;
use crate::reconcile::ReconcileError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/board", get(board))
        .route("/stops", get(stops))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Departure and arrival board for the configured station.
async fn board(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<BoardResponse>, AppError> {
    let now = match query.at.as_deref() {
        Some(at) => parse_feed_time(at).map_err(|e| AppError::BadRequest {
            message: format!("Invalid board time {at:?}: {e}"),
        })?,
        None => Local::now().naive_local(),
    };

    let lookbehind = window_mins("lookbehind", query.lookbehind, state.config.lookbehind_mins)?;
    let lookahead = window_mins("lookahead", query.lookahead, state.config.lookahead_mins)?;

    let mut builder = state.board.lock().await;
    let station = builder.station();
    let board = builder
        .board(now, Duration::minutes(lookbehind), Duration::minutes(lookahead))
        .await?;

    Ok(Json(BoardResponse::new(station, board)))
}

fn window_mins(name: &str, requested: Option<i64>, default: i64) -> Result<i64, AppError> {
    match requested.unwrap_or(default) {
        mins if (0..=MAX_WINDOW_MINS).contains(&mins) => Ok(mins),
        mins => Err(AppError::BadRequest {
            message: format!("{name} must be between 0 and {MAX_WINDOW_MINS} minutes, got {mins}"),
        }),
    }
}

/// Stops currently held in the reconciled view.
async fn stops(State(state): State<AppState>) -> Json<StopsResponse> {
    let builder = state.board.lock().await;
    let cache = builder.cache();

    let stops: Vec<StopSummary> = cache
        .state()
        .view()
        .map(|view| view.records().iter().map(StopSummary::from).collect())
        .unwrap_or_default();

    Json(StopsResponse {
        station: builder.station(),
        buckets: cache.buckets().iter().map(ToString::to_string).collect(),
        count: stops.len(),
        stops,
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    /// The timetable API failed or answered with an error
    Upstream { message: String },
    Internal { message: String },
}

impl From<ReconcileError> for AppError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::Feed(_) => AppError::Upstream {
                message: e.to_string(),
            },
            ReconcileError::Merge(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
