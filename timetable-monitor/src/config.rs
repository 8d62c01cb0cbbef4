//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::board::{BoardConfig, MAX_WINDOW_MINS};
use crate::domain::EvaId;
use crate::timetables::DEFAULT_BASE_URL;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Errors reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not set")]
    Missing { var: &'static str },

    #[error("{var}={value:?} is invalid: {message}")]
    Invalid {
        var: &'static str,
        value: String,
        message: String,
    },
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Station whose board is served
    pub station: EvaId,
    /// Bearer token for the timetable API
    pub api_key: Option<String>,
    pub base_url: String,
    /// Serve fixture files from this directory instead of calling the API
    pub mock_dir: Option<PathBuf>,
    pub board: BoardConfig,
    pub bind: SocketAddr,
}

impl MonitorConfig {
    /// Read configuration from `TIMETABLE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value
    /// if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());

        let station_raw = var("TIMETABLE_STATION").ok_or(ConfigError::Missing {
            var: "TIMETABLE_STATION",
        })?;
        let station = EvaId::parse(station_raw.trim()).map_err(|e| ConfigError::Invalid {
            var: "TIMETABLE_STATION",
            value: station_raw.clone(),
            message: e.to_string(),
        })?;

        let defaults = BoardConfig::default();
        let lookbehind_mins = minutes(&var, "TIMETABLE_LOOKBEHIND_MINS", defaults.lookbehind_mins)?;
        let lookahead_mins = minutes(&var, "TIMETABLE_LOOKAHEAD_MINS", defaults.lookahead_mins)?;

        let bind_raw = var("TIMETABLE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.trim().parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                var: "TIMETABLE_BIND",
                value: bind_raw.clone(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            station,
            api_key: var("TIMETABLE_API_KEY"),
            base_url: var("TIMETABLE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            mock_dir: var("TIMETABLE_MOCK_DIR").map(PathBuf::from),
            board: BoardConfig::new(lookbehind_mins, lookahead_mins),
            bind,
        })
    }
}

/// A number of minutes in `0..=MAX_WINDOW_MINS`, or `default` when unset.
fn minutes(
    var: impl Fn(&'static str) -> Option<String>,
    name: &'static str,
    default: i64,
) -> Result<i64, ConfigError> {
    let Some(raw) = var(name) else {
        return Ok(default);
    };

    let invalid = |message: &str| ConfigError::Invalid {
        var: name,
        value: raw.clone(),
        message: message.to_string(),
    };

    let mins: i64 = raw.trim().parse().map_err(|_| invalid("not a number"))?;
    if mins < 0 {
        return Err(invalid("must not be negative"));
    }
    if mins > MAX_WINDOW_MINS {
        return Err(invalid(&format!("must be at most {MAX_WINDOW_MINS}")));
    }
    Ok(mins)
}
