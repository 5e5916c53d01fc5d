//! Command-line interface

use clap::Parser;

/// WebSocket Load Tester - holds many connections open and measures echo round trips
///
/// Every flag left out falls back to the environment (or a `.env` file), then
/// to the built-in default.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "wslt")]
#[command(version, about, long_about = None)]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// WebSocket endpoint to load (ws:// or wss://)
    #[arg(short = 'a', long = "address", value_name = "URL")]
    pub address: Option<String>,

    /// Number of concurrent connections
    #[arg(short = 'c', long = "connections", value_name = "N")]
    pub connections: Option<i64>,

    /// Send interval magnitude, per connection
    #[arg(short = 'd', long = "duration", value_name = "N")]
    pub duration: Option<i64>,

    /// Unit of the send interval (msec or sec)
    #[arg(short = 'u', long = "unit", value_name = "UNIT")]
    pub unit: Option<String>,

    /// Payload length in bytes
    #[arg(short = 'l', long = "length", value_name = "BYTES")]
    pub length: Option<i64>,

    /// Log line format (console, json or compact)
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<String>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Write an example .env file to the current directory and exit
    #[arg(long, conflicts_with = "env_help")]
    pub create_config: bool,

    /// List the supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        Ok(())
    }

    /// Explicit color choice from the flags, if any
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        self.color_override().unwrap_or_else(supports_color)
    }
}

/// Check if the terminal supports color output
pub fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    // Default to true on Unix-like systems, false on Windows
    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
