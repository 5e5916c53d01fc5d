//! Configuration validation utilities and rules
//!
//! Hard errors come from [`Config::validate`]; this module adds non-fatal
//! warnings about settings that are legal but probably not what the operator
//! wanted.

use crate::{
    error::Result,
    models::{Config, RunConfig},
};
use colored::Colorize;
use std::time::Duration;

/// Connection count above which a warning is shown
pub const HIGH_CONNECTION_COUNT: usize = 10_000;

/// Aggregate frames per second above which a warning is shown
pub const HIGH_SEND_RATE: f64 = 50_000.0;

/// Payload length above which a warning is shown
pub const LARGE_PAYLOAD: usize = 1024 * 1024;

/// Configuration validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and collect warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        let run = config.to_run_config()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_target(&run));
        warnings.extend(Self::validate_load(&run));

        Ok(warnings)
    }

    /// Checks on the endpoint itself
    fn validate_target(run: &RunConfig) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let url = run.target_url();

        if url.scheme() == "ws" && !is_local_host(url) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("'{}' is not encrypted and not on this machine; consider wss://", url),
            ));
        }

        if url.query().is_some() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("'{}' includes query parameters, they are sent with every handshake", url),
            ));
        }

        warnings
    }

    /// Checks on the amount of load requested
    fn validate_load(run: &RunConfig) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if run.connection_count() > HIGH_CONNECTION_COUNT {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "{} connections may exceed the open file limit of this process",
                    run.connection_count()
                ),
            ));
        }

        let rate = aggregate_send_rate(run.connection_count(), run.tick_interval());
        if rate > HIGH_SEND_RATE {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Configuration sends about {:.0} frames per second in total", rate),
            ));
        }

        if run.payload_length() > LARGE_PAYLOAD {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Payload of {} bytes may exceed the peer's frame size limit",
                    run.payload_length()
                ),
            ));
        }

        warnings
    }
}

/// Frames per second across all connections
pub fn aggregate_send_rate(connections: usize, interval: Duration) -> f64 {
    if interval.is_zero() {
        return f64::INFINITY;
    }
    connections as f64 / interval.as_secs_f64()
}

fn is_local_host(url: &url::Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        let tag = if !use_color {
            tag
        } else {
            match self.level {
                ValidationLevel::Info => tag.blue().to_string(),
                ValidationLevel::Warning => tag.yellow().to_string(),
            }
        };
        format!("{} {}", tag, self.message)
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
