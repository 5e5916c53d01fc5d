//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::logging::LogFormat;
use crate::types::TimeUnit;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load an env file if it exists.
    ///
    /// Variables already set in the process environment win over the file.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path).map_err(|e| {
                AppError::config(format!("Failed to load {}: {}", path.display(), e))
            })?;

            if debug {
                println!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            println!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# WebSocket Load Tester Configuration
#
# Values here are used when the matching command-line flag is not given.
# Variables already set in the environment take precedence over this file.

# WebSocket endpoint to load (ws:// or wss://)
# TARGET_URL=ws://localhost:8000/

# Number of concurrent connections
# CONNECTIONS=1

# Send interval per connection, and its unit (msec or sec)
# INTERVAL=1
# INTERVAL_UNIT=sec

# Payload length in bytes
# PAYLOAD_LENGTH=1

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Log line format (console, json or compact)
# LOG_FORMAT=console

# Example: 500 connections, each sending 128 bytes every 200ms
# CONNECTIONS=500
# INTERVAL=200
# INTERVAL_UNIT=msec
# PAYLOAD_LENGTH=128
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        let content = Self::create_example_env_content();
        std::fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "TARGET_URL" => {
                let parsed = url::Url::parse(value).map_err(|e| {
                    AppError::config(format!("Invalid TARGET_URL value '{}': {}", value, e))
                })?;
                if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
                    return Err(AppError::config(format!("invalid scheme: {}", parsed.scheme())));
                }
            }
            "CONNECTIONS" | "INTERVAL" | "PAYLOAD_LENGTH" => {
                let number: i64 = value.parse().map_err(|e| {
                    AppError::config(format!("Invalid {} value '{}': {}", key, value, e))
                })?;
                if number <= 0 {
                    return Err(AppError::config(format!(
                        "{} must be greater than 0, got: {}",
                        key, number
                    )));
                }
            }
            "INTERVAL_UNIT" => {
                value.parse::<TimeUnit>()?;
            }
            "ENABLE_COLOR" => {
                value.parse::<bool>().map_err(|e| {
                    AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e))
                })?;
            }
            "LOG_FORMAT" => {
                value.parse::<LogFormat>()?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("TARGET_URL", "WebSocket endpoint (ws:// or wss://)", "ws://localhost:8000/"),
            ("CONNECTIONS", "Number of concurrent connections", "100"),
            ("INTERVAL", "Send interval magnitude", "500"),
            ("INTERVAL_UNIT", "Send interval unit (msec or sec)", "msec"),
            ("PAYLOAD_LENGTH", "Payload length in bytes", "64"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
            ("LOG_FORMAT", "Log line format (console, json, compact)", "json"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<18} {}\n", var, description));
            help.push_str(&format!("  {:<18} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Check an env file and report lines with invalid values
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut warnings = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                if let Err(e) = Self::validate_env_var(key.trim(), value.trim()) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }
}
