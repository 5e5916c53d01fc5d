//! Configuration data model and validation

use crate::logging::LogFormat;
use crate::types::{AppError, Result, TimeUnit};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Raw run settings, merged from defaults, `.env`, environment and CLI.
///
/// Numbers are kept signed so that out-of-range values reach validation
/// and are reported as configuration errors instead of parse failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// WebSocket endpoint to load
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Number of concurrent connections
    #[serde(default = "default_connections")]
    pub connections: i64,

    /// Magnitude of the per-connection send interval
    #[serde(default = "default_interval")]
    pub interval: i64,

    /// Unit of the send interval (`msec` or `sec`)
    #[serde(default = "default_interval_unit")]
    pub interval_unit: String,

    /// Payload length in bytes
    #[serde(default = "default_payload_length")]
    pub payload_length: i64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Log line format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            connections: default_connections(),
            interval: default_interval(),
            interval_unit: default_interval_unit(),
            payload_length: default_payload_length(),
            enable_color: default_enable_color(),
            log_format: LogFormat::default(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return the first error found
    pub fn validate(&self) -> Result<()> {
        self.to_run_config().map(|_| ())
    }

    /// Build the immutable run configuration.
    ///
    /// Checks run in a fixed order (URL, length, connections, duration, unit)
    /// so the operator always sees the same error for the same input.
    pub fn to_run_config(&self) -> Result<RunConfig> {
        let target_url = parse_target_url(&self.target_url)?;

        if self.payload_length <= 0 {
            return Err(AppError::config(format!("invalid length: {}", self.payload_length)));
        }

        if self.connections <= 0 {
            return Err(AppError::config(format!("invalid connections: {}", self.connections)));
        }

        if self.interval <= 0 {
            return Err(AppError::config(format!("invalid duration: {}", self.interval)));
        }

        let unit: TimeUnit = self.interval_unit.parse()?;

        Ok(RunConfig {
            target_url,
            connection_count: to_usize(self.connections, "connections")?,
            tick_interval: unit.duration(self.interval as u64),
            payload_length: to_usize(self.payload_length, "length")?,
        })
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(target_url) = std::env::var("TARGET_URL") {
            self.target_url = target_url.trim().to_string();
        }

        if let Ok(connections) = std::env::var("CONNECTIONS") {
            self.connections = connections.trim().parse().map_err(|e| {
                AppError::config(format!("Invalid CONNECTIONS value '{}': {}", connections, e))
            })?;
        }

        if let Ok(interval) = std::env::var("INTERVAL") {
            self.interval = interval.trim().parse().map_err(|e| {
                AppError::config(format!("Invalid INTERVAL value '{}': {}", interval, e))
            })?;
        }

        if let Ok(unit) = std::env::var("INTERVAL_UNIT") {
            self.interval_unit = unit.trim().to_string();
        }

        if let Ok(length) = std::env::var("PAYLOAD_LENGTH") {
            self.payload_length = length.trim().parse().map_err(|e| {
                AppError::config(format!("Invalid PAYLOAD_LENGTH value '{}': {}", length, e))
            })?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse().map_err(|e| {
                AppError::config(format!(
                    "Invalid ENABLE_COLOR value '{}': {}",
                    enable_color, e
                ))
            })?;
        }

        if let Ok(log_format) = std::env::var("LOG_FORMAT") {
            self.log_format = log_format.trim().parse()?;
        }

        Ok(())
    }
}

/// Validated, immutable parameters of one load run.
///
/// Only obtainable through validation, so every holder can rely on a
/// `ws`/`wss` URL and strictly positive counts and interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    target_url: Url,
    connection_count: usize,
    tick_interval: Duration,
    payload_length: usize,
}

impl RunConfig {
    /// Build a run configuration directly, applying the same rules as [`Config::to_run_config`]
    pub fn new(
        target_url: &str,
        connection_count: usize,
        tick_interval: Duration,
        payload_length: usize,
    ) -> Result<Self> {
        let target_url = parse_target_url(target_url)?;

        if payload_length == 0 {
            return Err(AppError::config("invalid length: 0"));
        }
        if connection_count == 0 {
            return Err(AppError::config("invalid connections: 0"));
        }
        if tick_interval.is_zero() {
            return Err(AppError::config("invalid duration: 0"));
        }

        Ok(Self {
            target_url,
            connection_count,
            tick_interval,
            payload_length,
        })
    }

    pub fn target_url(&self) -> &Url {
        &self.target_url
    }

    pub fn connection_count(&self) -> usize {
        self.connection_count
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn payload_length(&self) -> usize {
        self.payload_length
    }
}

impl TryFrom<&Config> for RunConfig {
    type Error = AppError;

    fn try_from(config: &Config) -> Result<Self> {
        config.to_run_config()
    }
}

fn parse_target_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| AppError::config(format!("url parse error: {}", e)))?;

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(AppError::config(format!("invalid scheme: {}", other))),
    }
}

fn to_usize(value: i64, name: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| AppError::config(format!("invalid {}: {}", name, value)))
}

// Default value functions for serde
fn default_target_url() -> String {
    crate::defaults::DEFAULT_TARGET_URL.to_string()
}

fn default_connections() -> i64 {
    crate::defaults::DEFAULT_CONNECTIONS
}

fn default_interval() -> i64 {
    crate::defaults::DEFAULT_INTERVAL
}

fn default_interval_unit() -> String {
    crate::defaults::DEFAULT_INTERVAL_UNIT.to_string()
}

fn default_payload_length() -> i64 {
    crate::defaults::DEFAULT_PAYLOAD_LENGTH
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let run = config.to_run_config().unwrap();
        assert_eq!(run.target_url().as_str(), "ws://localhost:8000/");
        assert_eq!(run.connection_count(), 1);
        assert_eq!(run.tick_interval(), Duration::from_secs(1));
        assert_eq!(run.payload_length(), 1);
    }

    #[test]
    fn test_invalid_scheme_rejected() {
        let config = Config {
            target_url: "http://host/".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid scheme: http"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_wss_scheme_accepted() {
        let config = Config {
            target_url: "wss://echo.example.com/socket".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unparsable_url_rejected() {
        let config = Config {
            target_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("url parse error"));
    }

    #[test]
    fn test_invalid_unit_rejected() {
        let config = Config {
            interval_unit: "min".to_string(),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("invalid unit: min"));
    }

    #[test]
    fn test_non_positive_numbers_rejected() {
        let cases = [
            (Config { payload_length: 0, ..Default::default() }, "invalid length: 0"),
            (Config { connections: -3, ..Default::default() }, "invalid connections: -3"),
            (Config { interval: 0, ..Default::default() }, "invalid duration: 0"),
        ];

        for (config, expected) in cases {
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(expected), "{} should mention {}", err, expected);
        }
    }

    #[test]
    fn test_validation_order_reports_length_before_connections() {
        let config = Config {
            payload_length: 0,
            connections: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("invalid length"));
    }

    #[test]
    fn test_millisecond_interval() {
        let config = Config {
            interval: 250,
            interval_unit: "msec".to_string(),
            ..Default::default()
        };
        assert_eq!(config.to_run_config().unwrap().tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_run_config_new_rules() {
        assert!(RunConfig::new("ws://127.0.0.1:9/", 3, Duration::from_millis(10), 5).is_ok());
        assert!(RunConfig::new("http://127.0.0.1:9/", 3, Duration::from_millis(10), 5).is_err());
        assert!(RunConfig::new("ws://127.0.0.1:9/", 0, Duration::from_millis(10), 5).is_err());
        assert!(RunConfig::new("ws://127.0.0.1:9/", 3, Duration::ZERO, 5).is_err());
        assert!(RunConfig::new("ws://127.0.0.1:9/", 3, Duration::from_millis(10), 0).is_err());
    }

    #[test]
    fn test_try_from_config() {
        let config = Config {
            connections: 3,
            payload_length: 5,
            ..Default::default()
        };
        let run = RunConfig::try_from(&config).unwrap();
        assert_eq!(run.connection_count(), 3);
        assert_eq!(run.payload_length(), 5);
    }
}
