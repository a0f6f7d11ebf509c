//! Debounced persistence of the session snapshot.

use crate::debounce::Debouncer;
use livedev_core::error::Result;
use livedev_core::session::{SessionSnapshot, SnapshotRepository};
use livedev_core::template::TemplateRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Loads the session at startup and saves it after every quiet window.
///
/// Save failures are logged and never surfaced to the caller of
/// [`PersistenceGateway::schedule`].
pub struct PersistenceGateway {
    repository: Arc<dyn SnapshotRepository>,
    /// Latest snapshot not yet written.
    pending: Arc<Mutex<Option<SessionSnapshot>>>,
    debouncer: Debouncer,
}

impl PersistenceGateway {
    pub fn new(repository: Arc<dyn SnapshotRepository>, window: Duration) -> Self {
        let pending: Arc<Mutex<Option<SessionSnapshot>>> = Arc::new(Mutex::new(None));

        let task_repository = repository.clone();
        let task_pending = pending.clone();
        let debouncer = Debouncer::spawn(window, move || {
            let repository = task_repository.clone();
            let pending = task_pending.clone();
            async move {
                let Some(snapshot) = pending.lock().await.take() else {
                    return;
                };
                match repository.save(&snapshot).await {
                    Ok(()) => debug!("Autosaved session ({} files)", snapshot.file_system.len()),
                    Err(e) => error!("Failed to save session state: {}", e),
                }
            }
        });

        Self {
            repository,
            pending,
            debouncer,
        }
    }

    /// Restores the stored session, falling back to a fresh one.
    ///
    /// Read failures are logged and treated as "nothing stored".
    pub async fn restore(&self, templates: &TemplateRegistry) -> SessionSnapshot {
        let loaded = match self.repository.load().await {
            Ok(loaded) => loaded,
            Err(e) => {
                error!("Failed to load session state: {}", e);
                None
            }
        };
        if loaded.is_none() {
            debug!("No stored session, starting fresh");
        }
        SessionSnapshot::restore_or_initial(loaded, templates)
    }

    /// Queues `snapshot` for the next debounced save.
    pub async fn schedule(&self, snapshot: SessionSnapshot) {
        *self.pending.lock().await = Some(snapshot);
        self.debouncer.trigger();
    }

    /// Writes the pending snapshot now, if any.
    pub async fn flush(&self) -> Result<bool> {
        let Some(snapshot) = self.pending.lock().await.take() else {
            return Ok(false);
        };
        self.repository.save(&snapshot).await?;
        Ok(true)
    }

    /// Flushes and stops the background task.
    pub async fn shutdown(self) {
        if let Err(e) = self.flush().await {
            warn!("Final save failed: {}", e);
        }
        self.debouncer.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livedev_core::chat::ChatMessage;
    use livedev_infrastructure::InMemorySnapshotRepository;
    use tokio::time::sleep;

    fn snapshot(marker: &str) -> SessionSnapshot {
        let mut snapshot = SessionSnapshot::initial(TemplateRegistry::builtin());
        snapshot.chat_history.push(ChatMessage::user(marker));
        snapshot
    }

    #[tokio::test(start_paused = true)]
    async fn test_saves_latest_after_window() {
        let repo = InMemorySnapshotRepository::new();
        let gateway = PersistenceGateway::new(Arc::new(repo.clone()), Duration::from_millis(1000));

        gateway.schedule(snapshot("one")).await;
        sleep(Duration::from_millis(400)).await;
        gateway.schedule(snapshot("two")).await;
        sleep(Duration::from_millis(400)).await;
        assert_eq!(repo.save_count(), 0);

        sleep(Duration::from_millis(700)).await;
        assert_eq!(repo.save_count(), 1);
        let stored = repo.load().await.unwrap().unwrap();
        assert_eq!(stored.chat_history.last().unwrap().content, "two");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_swallowed() {
        let repo = InMemorySnapshotRepository::new();
        repo.set_fail_saves(true);
        let gateway = PersistenceGateway::new(Arc::new(repo.clone()), Duration::from_millis(10));

        gateway.schedule(snapshot("lost")).await;
        sleep(Duration::from_millis(50)).await;
        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_falls_back_to_initial() {
        let repo = InMemorySnapshotRepository::new();
        let gateway = PersistenceGateway::new(Arc::new(repo), Duration::from_millis(10));
        let restored = gateway.restore(TemplateRegistry::builtin()).await;
        assert_eq!(restored, SessionSnapshot::initial(TemplateRegistry::builtin()));
    }

    #[tokio::test]
    async fn test_flush_writes_immediately() {
        let repo = InMemorySnapshotRepository::new();
        let gateway =
            PersistenceGateway::new(Arc::new(repo.clone()), Duration::from_secs(3600));
        assert!(!gateway.flush().await.unwrap());

        gateway.schedule(snapshot("now")).await;
        gateway.shutdown().await;
        assert_eq!(repo.save_count(), 1);
    }
}
