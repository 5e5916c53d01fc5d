//! Round-trip timing data model

use crate::types::WorkerId;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// One successful tick on one connection.
///
/// Produced by the worker and handed straight to the event sink; nothing
/// keeps these around.
#[derive(Debug, Clone, Copy)]
pub struct RttObservation {
    /// Worker that performed the exchange
    pub worker_id: WorkerId,

    /// Monotonic instant just before the request frame was written
    pub sent_at: Instant,

    /// Monotonic instant just after the reply frame was read
    pub received_at: Instant,

    /// Wall-clock time the observation was recorded
    pub recorded_at: DateTime<Utc>,
}

impl RttObservation {
    /// Create an observation for an exchange that just completed
    pub fn new(worker_id: WorkerId, sent_at: Instant, received_at: Instant) -> Self {
        Self {
            worker_id,
            sent_at,
            received_at,
            recorded_at: Utc::now(),
        }
    }

    /// Round-trip time; never negative because both instants are monotonic
    pub fn rtt(&self) -> Duration {
        self.received_at.saturating_duration_since(self.sent_at)
    }

    /// Round-trip time in milliseconds
    pub fn rtt_ms(&self) -> f64 {
        self.rtt().as_secs_f64() * 1000.0
    }
}
