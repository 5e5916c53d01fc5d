//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Identity of one worker, unique within a run.
///
/// Only used for logging and as the close-frame reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(usize);

impl WorkerId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit of the tick interval magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    /// `msec`
    Millis,
    /// `sec`
    Secs,
}

impl TimeUnit {
    /// Turn a positive magnitude into a duration
    pub fn duration(self, magnitude: u64) -> Duration {
        match self {
            Self::Millis => Duration::from_millis(magnitude),
            Self::Secs => Duration::from_secs(magnitude),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Millis => "msec",
            Self::Secs => "sec",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "msec" => Ok(Self::Millis),
            "sec" => Ok(Self::Secs),
            other => Err(AppError::config(format!("invalid unit: {}", other))),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
