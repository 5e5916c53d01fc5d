//! Connection pool engine
//!
//! This module contains the concurrent core of a load run:
//! - [`Worker`]: one connection's dial, tick and close loop
//! - [`ShutdownBroadcast`]: one-shot, fire-once fan-out to every worker
//! - [`CompletionBarrier`]: counter that releases the drain once every worker has finished
//! - [`Supervisor`] and [`RunHandle`]: spawning, interrupt wiring and the drain
//! - [`EventSink`]: where worker lifecycle events go

pub mod barrier;
pub mod events;
pub mod shutdown;
pub mod supervisor;
pub mod worker;

pub use barrier::{CompletionBarrier, CompletionGuard};
pub use events::{CollectingSink, EventSink, WorkerEvent, WorkerExit};
pub use shutdown::{ShutdownBroadcast, ShutdownSignal};
pub use supervisor::{DrainReport, RunHandle, Supervisor};
pub use worker::Worker;
