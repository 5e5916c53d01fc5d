//! One-shot shutdown broadcast shared by every worker of a run

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Fire-once broadcast.
///
/// The underlying send happens at most once no matter how many times, or from
/// how many tasks, [`trigger`](Self::trigger) is called.
#[derive(Debug)]
pub struct ShutdownBroadcast {
    fired: AtomicBool,
    tx: watch::Sender<bool>,
}

impl ShutdownBroadcast {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            fired: AtomicBool::new(false),
            tx,
        }
    }

    /// Signal shutdown. Returns `true` only for the call that actually fired.
    pub fn trigger(&self) -> bool {
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        // send_replace succeeds even with no receivers alive
        self.tx.send_replace(true);
        true
    }

    /// New observer of the broadcast
    pub fn observe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Default for ShutdownBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`ShutdownBroadcast`]
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Completes once shutdown has been signaled; immediately if it already was.
    ///
    /// A broadcaster dropped without firing can never fire, so that also
    /// counts as signaled.
    pub async fn signaled(&mut self) {
        let _ = self.rx.wait_for(|fired| *fired).await;
    }

    pub fn is_signaled(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_observer_sees_trigger() {
        let broadcast = ShutdownBroadcast::new();
        let mut signal = broadcast.observe();
        assert!(!signal.is_signaled());

        assert!(broadcast.trigger());
        timeout(Duration::from_secs(1), signal.signaled()).await.unwrap();
        assert!(signal.is_signaled());
    }

    #[tokio::test]
    async fn test_second_trigger_is_noop() {
        let broadcast = ShutdownBroadcast::new();
        assert!(broadcast.trigger());
        assert!(!broadcast.trigger());
        assert!(broadcast.is_triggered());
    }

    #[tokio::test]
    async fn test_late_observer_completes_immediately() {
        let broadcast = ShutdownBroadcast::new();
        broadcast.trigger();

        let mut signal = broadcast.observe();
        timeout(Duration::from_millis(100), signal.signaled()).await.unwrap();
        // Observing again is a no-op
        timeout(Duration::from_millis(100), signal.signaled()).await.unwrap();
    }

    #[tokio::test]
    async fn test_pending_until_triggered() {
        let broadcast = ShutdownBroadcast::new();
        let mut signal = broadcast.observe();
        assert!(timeout(Duration::from_millis(50), signal.signaled()).await.is_err());
    }

    #[tokio::test]
    async fn test_dropped_broadcaster_releases_observers() {
        let broadcast = ShutdownBroadcast::new();
        let mut signal = broadcast.observe();
        drop(broadcast);
        timeout(Duration::from_secs(1), signal.signaled()).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_triggers_fire_once() {
        let broadcast = Arc::new(ShutdownBroadcast::new());
        let observers: Vec<_> = (0..8).map(|_| broadcast.observe()).collect();

        let triggers: Vec<_> = (0..16)
            .map(|_| {
                let broadcast = Arc::clone(&broadcast);
                tokio::spawn(async move { broadcast.trigger() })
            })
            .collect();

        let mut fired = 0;
        for handle in triggers {
            if handle.await.unwrap() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);

        for mut signal in observers {
            timeout(Duration::from_secs(1), signal.signaled()).await.unwrap();
        }
    }
}
