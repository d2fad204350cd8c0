//! Application configuration.
//!
//! Defaults match the mobile app: a silent refresh every 10 seconds, a
//! one-second minimum loading display, and empty stations shown. Every
//! value can be overridden from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::refresh::{DEFAULT_MIN_DISPLAY, DEFAULT_REFRESH_INTERVAL};

/// Longest accepted minimum loading display.
pub const MAX_MIN_DISPLAY: Duration = Duration::from_secs(60);

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment value could not be parsed
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the server.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the station availability feed (`None` = client default).
    pub feed_url: Option<String>,

    /// Serve stations from this JSON file instead of the live feed.
    pub mock_data: Option<PathBuf>,

    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// Interval between silent background refreshes.
    pub refresh_interval: Duration,

    /// Minimum time the loading indicator stays up for a user refresh.
    pub min_display_duration: Duration,

    /// Whether stations without e-bikes are shown by default.
    pub show_empty_stations: bool,

    /// Feed request timeout in seconds.
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            mock_data: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            min_display_duration: DEFAULT_MIN_DISPLAY,
            show_empty_stations: true,
            http_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from `AMPED_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to resolve variable names.
    ///
    /// Unset or blank variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("AMPED_FEED_URL") {
            config.feed_url = Some(url);
        }
        if let Some(path) = get("AMPED_MOCK_DATA") {
            config.mock_data = Some(PathBuf::from(path));
        }
        if let Some(v) = get("AMPED_BIND_ADDR") {
            config.bind_addr = parse("AMPED_BIND_ADDR", &v)?;
        }
        if let Some(v) = get("AMPED_REFRESH_INTERVAL_SECS") {
            let secs: u64 = parse("AMPED_REFRESH_INTERVAL_SECS", &v)?;
            if secs == 0 {
                return Err(invalid("AMPED_REFRESH_INTERVAL_SECS", &v, "must be positive"));
            }
            config.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(v) = get("AMPED_MIN_DISPLAY_SECS") {
            let secs: f64 = parse("AMPED_MIN_DISPLAY_SECS", &v)?;
            let duration = Duration::try_from_secs_f64(secs)
                .map_err(|e| invalid("AMPED_MIN_DISPLAY_SECS", &v, &e.to_string()))?;
            if duration > MAX_MIN_DISPLAY {
                return Err(invalid("AMPED_MIN_DISPLAY_SECS", &v, "must be at most 60 seconds"));
            }
            config.min_display_duration = duration;
        }
        if let Some(v) = get("AMPED_SHOW_EMPTY_STATIONS") {
            config.show_empty_stations = parse_bool("AMPED_SHOW_EMPTY_STATIONS", &v)?;
        }
        if let Some(v) = get("AMPED_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = parse("AMPED_HTTP_TIMEOUT_SECS", &v)?;
        }

        Ok(config)
    }

    /// Use a mock data file instead of the live feed.
    pub fn with_mock_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.mock_data = Some(path.into());
        self
    }

    /// Set the background refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the minimum loading display duration.
    pub fn with_min_display_duration(mut self, duration: Duration) -> Self {
        self.min_display_duration = duration;
        self
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, value, &e.to_string()))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}
