//! Worker lifecycle events and the sink they are handed to

use crate::error::WorkerError;
use crate::models::RttObservation;
use crate::types::WorkerId;
use async_trait::async_trait;
use std::fmt;
use std::sync::Mutex;

/// How a worker ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Observed the shutdown broadcast and sent its close frame
    Shutdown,
    DialFailed,
    SendFailed,
    ReceiveFailed,
    /// Observed shutdown but the close frame could not be written
    CloseFailed,
}

impl WorkerExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shutdown => "shutdown",
            Self::DialFailed => "dial_failed",
            Self::SendFailed => "send_failed",
            Self::ReceiveFailed => "receive_failed",
            Self::CloseFailed => "close_failed",
        }
    }
}

impl fmt::Display for WorkerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happened on one connection
#[derive(Debug)]
pub enum WorkerEvent {
    Connected { id: WorkerId },
    Rtt(RttObservation),
    Failed { id: WorkerId, error: WorkerError },
    Closed { id: WorkerId },
    /// Always the last event of a worker
    Finished { id: WorkerId, exit: WorkerExit },
}

impl WorkerEvent {
    pub fn worker_id(&self) -> WorkerId {
        match self {
            Self::Connected { id }
            | Self::Failed { id, .. }
            | Self::Closed { id }
            | Self::Finished { id, .. } => *id,
            Self::Rtt(observation) => observation.worker_id,
        }
    }
}

/// Consumer of worker events.
///
/// Called inline from the worker loop, so implementations should return
/// quickly; a slow sink delays that worker's next tick.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn record(&self, event: WorkerEvent);
}

/// Sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<WorkerEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every event recorded so far
    pub fn drain(&self) -> Vec<WorkerEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn record(&self, event: WorkerEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
