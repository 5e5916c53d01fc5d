//! Counting barrier released when every worker has checked in

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug)]
struct BarrierState {
    remaining: AtomicUsize,
    released: Notify,
}

impl BarrierState {
    fn arrive(&self) {
        // checked_sub keeps the count from wrapping below zero
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        if previous == Ok(1) {
            self.released.notify_waiters();
        }
    }
}

/// Waiting side of the barrier, held by the supervisor.
///
/// Each party owns one [`CompletionGuard`]; the barrier releases once all
/// guards have arrived or been dropped.
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    state: Arc<BarrierState>,
}

impl CompletionBarrier {
    /// Create a barrier for `parties` workers along with one guard per worker
    pub fn new(parties: usize) -> (Self, Vec<CompletionGuard>) {
        let state = Arc::new(BarrierState {
            remaining: AtomicUsize::new(parties),
            released: Notify::new(),
        });

        let guards = (0..parties)
            .map(|_| CompletionGuard {
                state: Some(Arc::clone(&state)),
            })
            .collect();

        (Self { state }, guards)
    }

    /// Parties that have not checked in yet
    pub fn remaining(&self) -> usize {
        self.state.remaining.load(Ordering::Acquire)
    }

    /// Wait until every party has checked in
    pub async fn wait(&self) {
        loop {
            let notified = self.state.released.notified();
            tokio::pin!(notified);
            // Register before checking so a release between the check and the
            // await is not missed
            notified.as_mut().enable();

            if self.remaining() == 0 {
                return;
            }

            notified.await;
        }
    }
}

/// One worker's share of the barrier. Decrements exactly once, on
/// [`arrive`](Self::arrive) or on drop, whichever comes first.
#[derive(Debug)]
pub struct CompletionGuard {
    state: Option<Arc<BarrierState>>,
}

impl CompletionGuard {
    /// Check in
    pub fn arrive(mut self) {
        if let Some(state) = self.state.take() {
            state.arrive();
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            state.arrive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_releases_at_zero() {
        let (barrier, guards) = CompletionBarrier::new(3);
        assert_eq!(barrier.remaining(), 3);

        let mut guards = guards.into_iter();
        guards.next().unwrap().arrive();
        guards.next().unwrap().arrive();
        assert_eq!(barrier.remaining(), 1);
        assert!(timeout(Duration::from_millis(50), barrier.wait()).await.is_err());

        guards.next().unwrap().arrive();
        timeout(Duration::from_secs(1), barrier.wait()).await.unwrap();
        assert_eq!(barrier.remaining(), 0);
    }

    #[test]
    fn test_wait_pending_until_last_arrival() {
        let (barrier, guards) = CompletionBarrier::new(2);
        let mut guards = guards.into_iter();

        let mut wait = tokio_test::task::spawn(barrier.wait());
        tokio_test::assert_pending!(wait.poll());

        guards.next().unwrap().arrive();
        tokio_test::assert_pending!(wait.poll());

        guards.next().unwrap().arrive();
        assert!(wait.is_woken());
        tokio_test::assert_ready!(wait.poll());
    }

    #[tokio::test]
    async fn test_drop_counts_as_arrival() {
        let (barrier, guards) = CompletionBarrier::new(2);
        drop(guards);
        assert_eq!(barrier.remaining(), 0);
        timeout(Duration::from_secs(1), barrier.wait()).await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_parties_is_already_released() {
        let (barrier, guards) = CompletionBarrier::new(0);
        assert!(guards.is_empty());
        timeout(Duration::from_millis(100), barrier.wait()).await.unwrap();
    }

    #[test]
    fn test_count_never_goes_negative() {
        let (barrier, _) = CompletionBarrier::new(0);
        barrier.state.arrive();
        barrier.state.arrive();
        assert_eq!(barrier.remaining(), 0);
    }

    #[tokio::test]
    async fn test_panicking_task_still_arrives() {
        let (barrier, guards) = CompletionBarrier::new(1);
        let guard = guards.into_iter().next().unwrap();

        let handle = tokio::spawn(async move {
            let _guard = guard;
            panic!("worker blew up");
        });
        assert!(handle.await.is_err());

        timeout(Duration::from_secs(1), barrier.wait()).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_arrivals() {
        let (barrier, guards) = CompletionBarrier::new(64);

        let waiter = {
            let barrier = barrier.clone();
            tokio::spawn(async move { barrier.wait().await })
        };

        for guard in guards {
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                guard.arrive();
            });
        }

        timeout(Duration::from_secs(5), waiter).await.unwrap().unwrap();
        assert_eq!(barrier.remaining(), 0);
    }
}
