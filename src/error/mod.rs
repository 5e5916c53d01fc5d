//! Error handling for the WebSocket load tester

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Application-level errors. Every variant here is fatal to the process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Parsing errors (URLs, numbers, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Network errors outside of a single connection (e.g. binding the echo listener)
    #[error("Network error: {0}")]
    Network(String),

    /// I/O errors (signal registration, file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Parse(_) => "PARSE",
            Self::Network(_) => "NETWORK",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!(
                    "Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.",
                    msg
                )
            }
            Self::Validation(msg) => {
                format!(
                    "Invalid input: {}\n\nSuggestion: Check the target URL scheme (ws:// or wss://) and that all counts are positive.",
                    msg
                )
            }
            Self::Parse(msg) => {
                format!(
                    "Failed to parse data: {}\n\nSuggestion: Check the format of your input values.",
                    msg
                )
            }
            Self::Network(msg) => {
                format!(
                    "Network problem: {}\n\nSuggestion: Check that the address is free and reachable.",
                    msg
                )
            }
            Self::Io(msg) => {
                format!(
                    "I/O operation failed: {}\n\nSuggestion: Check process permissions.",
                    msg
                )
            }
            Self::Internal(msg) => {
                format!(
                    "Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.",
                    msg
                )
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            // Invalid configuration or usage
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Network(_) => 2,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Network(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

// Anyhow integration
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Transport failure local to a single connection.
///
/// These never leave the worker that produced them: they are reported to the
/// event sink and the worker terminates.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("dial: {0}")]
    Dial(#[source] tungstenite::Error),

    #[error("write: {0}")]
    Write(#[source] tungstenite::Error),

    #[error("read: {0}")]
    Read(#[source] tungstenite::Error),

    /// The peer answered a tick with a close frame instead of an echo.
    #[error("read: connection closed by peer (code {code})")]
    PeerClosed { code: u16 },

    #[error("read: connection reset before a reply arrived")]
    StreamEnded,

    #[error("write close: {0}")]
    WriteClose(#[source] tungstenite::Error),
}

impl WorkerError {
    /// Short operation name, matches the prefix of the display string
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Dial(_) => "dial",
            Self::Write(_) => "write",
            Self::Read(_) | Self::PeerClosed { .. } | Self::StreamEnded => "read",
            Self::WriteClose(_) => "write close",
        }
    }
}

/// Error reporter for fatal errors shown to the operator
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            eprintln!();
            eprintln!("{}", error.user_friendly_message());
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_error = AppError::config("invalid unit: min");
        assert_eq!(config_error.category(), "CONFIG");
        assert_eq!(config_error.exit_code(), 1);

        let io_error = AppError::io("signal handler");
        assert_eq!(io_error.category(), "IO");
        assert_eq!(io_error.exit_code(), 5);
    }

    #[test]
    fn test_error_display() {
        let error = AppError::config("invalid scheme: http");
        let display = error.to_string();
        assert!(display.contains("Configuration error"));
        assert!(display.contains("invalid scheme: http"));
    }

    #[test]
    fn test_error_categories() {
        let errors = [
            AppError::config("config"),
            AppError::validation("validation"),
            AppError::parse("parse"),
            AppError::network("network"),
            AppError::io("io"),
            AppError::internal("internal"),
        ];

        let expected_categories = ["CONFIG", "VALIDATION", "PARSE", "NETWORK", "IO", "INTERNAL"];

        for (error, expected) in errors.iter().zip(expected_categories.iter()) {
            assert_eq!(error.category(), *expected);
        }
    }

    #[test]
    fn test_configuration_errors_exit_with_one() {
        assert_eq!(AppError::config("test").exit_code(), 1);
        assert_eq!(AppError::validation("test").exit_code(), 1);
        assert_eq!(AppError::parse("test").exit_code(), 1);
        assert_eq!(AppError::network("test").exit_code(), 2);
        assert_eq!(AppError::internal("test").exit_code(), 99);
    }

    #[test]
    fn test_user_friendly_messages() {
        let error = AppError::config("invalid length: 0");
        let message = error.user_friendly_message();
        assert!(message.contains("Configuration problem"));
        assert!(message.contains("Suggestion:"));
        assert!(message.contains("invalid length: 0"));
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        assert_eq!(app_error.category(), "IO");

        let parse_error = "not_a_number".parse::<i32>().unwrap_err();
        let app_error: AppError = parse_error.into();
        assert_eq!(app_error.category(), "PARSE");

        let url_error = url::Url::parse("::").unwrap_err();
        let app_error: AppError = url_error.into();
        assert_eq!(app_error.category(), "PARSE");
    }

    #[test]
    fn test_console_formatting() {
        let error = AppError::config("Test error");
        let formatted_no_color = error.format_for_console(false);
        let formatted_color = error.format_for_console(true);

        assert_eq!(formatted_no_color, "[CONFIG] Configuration error: Test error");
        assert!(formatted_color.contains("CONFIG"));
        assert!(formatted_color.contains("Test error"));
    }

    #[test]
    fn test_worker_error_operation_matches_display() {
        let errors = [
            WorkerError::Dial(tungstenite::Error::ConnectionClosed),
            WorkerError::Write(tungstenite::Error::AlreadyClosed),
            WorkerError::Read(tungstenite::Error::ConnectionClosed),
            WorkerError::PeerClosed { code: 1001 },
            WorkerError::StreamEnded,
            WorkerError::WriteClose(tungstenite::Error::AlreadyClosed),
        ];

        for error in &errors {
            assert!(
                error.to_string().starts_with(error.operation()),
                "{} should start with {}",
                error,
                error.operation()
            );
        }
    }
}
