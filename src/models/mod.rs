//! Data models and structures for the load tester

pub mod config;
pub mod metrics;
pub mod payload;

// Re-export main model types
pub use config::{Config, RunConfig};
pub use metrics::RttObservation;
pub use payload::Payload;
