//! Spawns the workers of a run and drains them on interrupt

use super::barrier::CompletionBarrier;
use super::events::EventSink;
use super::shutdown::ShutdownBroadcast;
use super::worker::Worker;
use crate::error::Result;
use crate::logging::{ConnectionLogger, Logger};
use crate::models::{Payload, RunConfig};
use crate::signals::wait_for_interrupt;
use crate::types::WorkerId;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Outcome of a completed drain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Workers that were spawned
    pub workers: usize,
    /// Workers whose task panicked instead of finishing
    pub panicked: usize,
    /// Time from shutdown trigger to the last worker finishing
    pub elapsed: Duration,
}

/// Builds and starts one run
pub struct Supervisor {
    config: Arc<RunConfig>,
    sink: Arc<dyn EventSink>,
    logger: Logger,
}

impl Supervisor {
    /// Supervisor that logs worker events to the console
    pub fn new(config: RunConfig) -> Self {
        Self {
            config: Arc::new(config),
            sink: Arc::new(ConnectionLogger::from_logger(Logger::new("CONN".to_string()))),
            logger: Logger::new("POOL".to_string()),
        }
    }

    /// Send worker events somewhere else
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Logger for run-level messages
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Spawn one worker per configured connection.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_run(self) -> RunHandle {
        let count = self.config.connection_count();
        let shutdown = Arc::new(ShutdownBroadcast::new());
        let (barrier, guards) = CompletionBarrier::new(count);
        let payload = Payload::filler(self.config.payload_length());

        self.logger
            .info(&format!(
                "starting {} connections to {}",
                count,
                self.config.target_url()
            ))
            .field("connections", count)
            .field("interval_ms", self.config.tick_interval().as_millis() as u64)
            .field("payload_length", payload.len())
            .log();

        let handles = guards
            .into_iter()
            .enumerate()
            .map(|(index, guard)| {
                let worker = Worker::new(
                    WorkerId::new(index),
                    Arc::clone(&self.config),
                    payload.clone(),
                    shutdown.observe(),
                    guard,
                    Arc::clone(&self.sink),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        RunHandle {
            shutdown,
            barrier,
            handles,
            logger: self.logger,
        }
    }
}

/// A started run. Dropping it without draining leaves the workers running.
pub struct RunHandle {
    shutdown: Arc<ShutdownBroadcast>,
    barrier: CompletionBarrier,
    handles: Vec<JoinHandle<()>>,
    logger: Logger,
}

impl RunHandle {
    /// Shared shutdown broadcast of this run
    pub fn shutdown(&self) -> Arc<ShutdownBroadcast> {
        Arc::clone(&self.shutdown)
    }

    /// Workers that have not finished yet
    pub fn remaining(&self) -> usize {
        self.barrier.remaining()
    }

    /// Wait for SIGINT/SIGTERM, then shut every worker down and wait for them.
    ///
    /// Further interrupts during the drain are absorbed. If the signal handlers
    /// cannot be installed the run is still drained before the error is
    /// returned.
    pub async fn await_interrupt_then_drain(self) -> Result<DrainReport> {
        let interrupted = wait_for_interrupt().await;

        match interrupted {
            Ok(()) => {
                self.logger.info("interrupt received, closing connections").log();

                let shutdown = Arc::clone(&self.shutdown);
                let logger = self.logger.clone();
                let repeat = tokio::spawn(async move {
                    while wait_for_interrupt().await.is_ok() {
                        shutdown.trigger();
                        logger.warn("shutdown already in progress").log();
                    }
                });

                let report = self.drain().await;
                repeat.abort();
                Ok(report)
            }
            Err(e) => {
                self.logger
                    .error("cannot wait for interrupts, shutting down now")
                    .error_info(&e)
                    .log();
                self.drain().await;
                Err(e)
            }
        }
    }

    /// Drain once `interrupt` completes
    pub async fn drain_after<F>(self, interrupt: F) -> DrainReport
    where
        F: Future<Output = ()>,
    {
        interrupt.await;
        self.drain().await
    }

    /// Trigger shutdown now and wait for every worker to finish
    pub async fn drain(self) -> DrainReport {
        let started = Instant::now();
        self.shutdown.trigger();

        self.barrier.wait().await;

        let workers = self.handles.len();
        let mut panicked = 0;
        for handle in self.handles {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    panicked += 1;
                }
            }
        }

        let report = DrainReport {
            workers,
            panicked,
            elapsed: started.elapsed(),
        };

        self.logger
            .info(&format!("all {} connections finished", workers))
            .field("workers", report.workers)
            .field("panicked", report.panicked)
            .field("elapsed_ms", report.elapsed.as_millis() as u64)
            .log();

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{CollectingSink, WorkerEvent, WorkerExit};
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    async fn refused_config(connections: usize) -> RunConfig {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        RunConfig::new(
            &format!("ws://{}/", addr),
            connections,
            Duration::from_millis(20),
            1,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_spawns_one_worker_per_connection() {
        let sink = Arc::new(CollectingSink::new());
        let handle = Supervisor::new(refused_config(4).await)
            .with_sink(sink.clone())
            .start_run();

        let report = timeout(Duration::from_secs(5), handle.drain()).await.unwrap();
        assert_eq!(report.workers, 4);
        assert_eq!(report.panicked, 0);

        let mut finished: Vec<usize> = sink
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                WorkerEvent::Finished { id, exit } => {
                    assert_eq!(exit, WorkerExit::DialFailed);
                    Some(id.get())
                }
                _ => None,
            })
            .collect();
        finished.sort_unstable();
        assert_eq!(finished, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_drain_after_waits_for_interrupt() {
        let sink = Arc::new(CollectingSink::new());
        let handle = Supervisor::new(refused_config(1).await)
            .with_sink(sink)
            .start_run();
        let shutdown = handle.shutdown();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let drain = tokio::spawn(handle.drain_after(async move {
            let _ = rx.await;
        }));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!shutdown.is_triggered());

        tx.send(()).unwrap();
        let report = timeout(Duration::from_secs(5), drain).await.unwrap().unwrap();
        assert!(shutdown.is_triggered());
        assert_eq!(report.workers, 1);
    }

    #[tokio::test]
    async fn test_drain_after_external_trigger() {
        let handle = Supervisor::new(refused_config(2).await)
            .with_sink(Arc::new(CollectingSink::new()))
            .start_run();

        // Triggering from outside first makes the drain's own trigger a no-op
        assert!(handle.shutdown().trigger());
        let report = timeout(Duration::from_secs(5), handle.drain()).await.unwrap();
        assert_eq!(report.workers, 2);
    }
}
