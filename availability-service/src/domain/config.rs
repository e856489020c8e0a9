use std::path::Path;

use chrono_tz::Tz;
use serde::Deserialize;
use shared::time::{TimeRange, WallTime};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: Box<toml::de::Error>,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// On-disk shape of the engine configuration. Every field is optional;
/// a missing file means all defaults.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    timezone: String,
    day_start: String,
    day_end: String,
    min_booking_minutes: u16,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Manila".to_string(),
            day_start: "06:00".to_string(),
            day_end: "22:00".to_string(),
            min_booking_minutes: 180,
        }
    }
}

/// Validated engine configuration: the business timezone all date keys are
/// resolved in, the default window seeded on empty days, and the minimum
/// duration below which bookings draw a warning.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub timezone: Tz,
    pub default_window: TimeRange,
    pub min_booking_minutes: u16,
}

impl EngineConfig {
    /// Loads the TOML config at `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = if Path::new(path).exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source: Box::new(source),
            })?
        } else {
            tracing::info!(%path, "Config file not found, using defaults");
            RawConfig::default()
        };
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let timezone: Tz = raw
            .timezone
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown timezone {:?}", raw.timezone)))?;
        let day_start = WallTime::parse(&raw.day_start)
            .map_err(|e| ConfigError::Invalid(format!("day_start: {e}")))?;
        let day_end = WallTime::parse(&raw.day_end)
            .map_err(|e| ConfigError::Invalid(format!("day_end: {e}")))?;
        let default_window = TimeRange::new(day_start, day_end)
            .map_err(|e| ConfigError::Invalid(format!("default window: {e}")))?;

        Ok(Self {
            timezone,
            default_window,
            min_booking_minutes: raw.min_booking_minutes,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_raw(RawConfig::default()).expect("built-in defaults are valid")
    }
}
