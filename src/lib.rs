//! WebSocket Load Tester
//!
//! Opens a configurable number of persistent WebSocket connections, has each
//! one send a fixed-size payload at a fixed interval, logs the round-trip time
//! of every exchange, and closes every connection cleanly when the operator
//! interrupts the run.

pub mod app;
pub mod cli;
pub mod config;
pub mod echo;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod signals;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result, WorkerError};
pub use executor::{
    CompletionBarrier, DrainReport, EventSink, RunHandle, ShutdownBroadcast, ShutdownSignal,
    Supervisor, Worker, WorkerEvent, WorkerExit,
};
pub use models::{Config, Payload, RttObservation, RunConfig};
pub use types::{TimeUnit, WorkerId};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Build metadata stamped by build.rs, when available
pub fn build_info() -> String {
    format!(
        "{} v{} (commit {}, built {})",
        PKG_NAME,
        VERSION,
        option_env!("GIT_COMMIT").unwrap_or("unknown"),
        option_env!("BUILD_TIME").unwrap_or("unknown"),
    )
}

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_TARGET_URL: &str = "ws://localhost:8000/";
    pub const DEFAULT_CONNECTIONS: i64 = 1;
    pub const DEFAULT_INTERVAL: i64 = 1;
    pub const DEFAULT_INTERVAL_UNIT: &str = "sec";
    pub const DEFAULT_PAYLOAD_LENGTH: i64 = 1;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const DEFAULT_LOG_FORMAT: &str = "console";
    pub const DEFAULT_ECHO_ADDR: &str = "localhost:8000";
}
