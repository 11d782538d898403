use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

/// Trailing-edge debouncer: of a burst of calls spaced closer than `delay`,
/// only the last one runs, `delay` after it was made.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `task`, superseding anything scheduled before it that has
    /// not fired yet. Must be called from within a tokio runtime.
    pub fn call<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) == ticket {
                task.await;
            }
        });
    }

    /// Drops whatever is pending.
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_last_call() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(Mutex::new(Vec::new()));

        for value in 1..=5 {
            let fired = Arc::clone(&fired);
            debouncer.call(async move {
                fired.lock().await.push(value);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(*fired.lock().await, vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn calls_separated_by_quiet_period_both_fire() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(Mutex::new(Vec::new()));

        for value in [1, 2] {
            let fired = Arc::clone(&fired);
            debouncer.call(async move {
                fired.lock().await.push(value);
            });
            tokio::time::sleep(Duration::from_millis(700)).await;
        }

        assert_eq!(*fired.lock().await, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_call() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&fired);
        debouncer.call(async move {
            *counter.lock().await += 1;
        });
        debouncer.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(*fired.lock().await, 0);
    }
}
