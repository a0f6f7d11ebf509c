//! Trailing-edge debouncer.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Coalesces bursts of triggers into a single action.
///
/// The action runs once the window has passed without a new trigger.
/// Dropping every handle (or calling [`Debouncer::shutdown`]) stops the
/// background task; a trigger still waiting out its window is discarded.
pub struct Debouncer {
    tx: mpsc::UnboundedSender<()>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Spawns the background task on the current tokio runtime.
    pub fn spawn<F, Fut>(window: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => return,
                    msg = rx.recv() => {
                        if msg.is_none() {
                            return;
                        }
                    }
                }

                // Wait for a quiet window, restarting on every new trigger.
                loop {
                    tokio::select! {
                        _ = task_token.cancelled() => return,
                        msg = rx.recv() => {
                            if msg.is_none() {
                                action().await;
                                return;
                            }
                        }
                        _ = sleep(window) => {
                            action().await;
                            break;
                        }
                    }
                }
            }
        });

        debug!("Debouncer started with a {:?} window", window);
        Self {
            tx,
            token,
            handle: Some(handle),
        }
    }

    /// Requests the action. Repeated calls inside the window collapse into one.
    pub fn trigger(&self) {
        // The task only stops after cancellation, when dropping is fine.
        let _ = self.tx.send(());
    }

    /// Stops the task, discarding a pending trigger.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(window: Duration) -> (Debouncer, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let task_count = count.clone();
        let debouncer = Debouncer::spawn(window, move || {
            let count = task_count.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });
        (debouncer, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once() {
        let (debouncer, count) = counting(Duration::from_millis(1000));
        for _ in 0..5 {
            debouncer.trigger();
            sleep(Duration::from_millis(200)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(1100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (debouncer, count) = counting(Duration::from_millis(250));
        debouncer.trigger();
        sleep(Duration::from_millis(300)).await;
        debouncer.trigger();
        sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_pending() {
        let (debouncer, count) = counting(Duration::from_millis(250));
        debouncer.trigger();
        debouncer.shutdown().await;
        sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
