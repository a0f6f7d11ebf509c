//! Preview rendering with object URL bookkeeping.

use crate::debounce::Debouncer;
use livedev_core::FileSystem;
use livedev_core::preview::{Blob, BlobRegistry, BlobStore, PreviewDocument, render_preview};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::debug;

/// Owns the blob registry and revokes a render's URLs once it is superseded.
#[derive(Debug, Default)]
pub struct PreviewController {
    blobs: BlobRegistry,
    current: Option<PreviewDocument>,
}

impl PreviewController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `root` and retires the previous document's URLs.
    pub fn render(&mut self, fs: &FileSystem, root: Option<&str>) -> PreviewDocument {
        let document = render_preview(fs, root, &mut self.blobs);
        if let Some(previous) = self.current.replace(document.clone()) {
            let revoked = previous
                .object_urls
                .iter()
                .filter(|url| self.blobs.revoke_object_url(url))
                .count();
            debug!("Revoked {} object URLs", revoked);
        }
        document
    }

    /// Content behind a live object URL.
    pub fn blob(&self, url: &str) -> Option<&Blob> {
        self.blobs.get(url)
    }

    pub fn live_urls(&self) -> usize {
        self.blobs.live_count()
    }

    /// Revokes everything and forgets the current document.
    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            for url in &previous.object_urls {
                self.blobs.revoke_object_url(url);
            }
        }
    }
}

/// Re-renders the preview a short while after the store or root changes.
///
/// The latest document is published on a watch channel.
pub struct LivePreview {
    controller: Arc<Mutex<PreviewController>>,
    fs: Arc<RwLock<FileSystem>>,
    root: Arc<RwLock<Option<String>>>,
    tx: Arc<watch::Sender<PreviewDocument>>,
    debouncer: Debouncer,
}

impl LivePreview {
    pub fn spawn(
        fs: Arc<RwLock<FileSystem>>,
        root: Arc<RwLock<Option<String>>>,
        window: Duration,
    ) -> Self {
        let mut controller = PreviewController::new();
        let idle = controller.render(&FileSystem::new(), None);
        let controller = Arc::new(Mutex::new(controller));
        let tx = Arc::new(watch::Sender::new(idle));

        let (task_controller, task_fs, task_root, task_tx) =
            (controller.clone(), fs.clone(), root.clone(), tx.clone());
        let debouncer = Debouncer::spawn(window, move || {
            let (controller, fs, root, tx) = (
                task_controller.clone(),
                task_fs.clone(),
                task_root.clone(),
                task_tx.clone(),
            );
            async move {
                let document = Self::render_with(&controller, &fs, &root).await;
                tx.send_replace(document);
            }
        });

        Self {
            controller,
            fs,
            root,
            tx,
            debouncer,
        }
    }

    /// Schedules a re-render.
    pub fn request(&self) {
        self.debouncer.trigger();
    }

    /// Renders immediately, publishing and returning the document.
    pub async fn render_now(&self) -> PreviewDocument {
        let document = Self::render_with(&self.controller, &self.fs, &self.root).await;
        self.tx.send_replace(document.clone());
        document
    }

    pub fn subscribe(&self) -> watch::Receiver<PreviewDocument> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> PreviewDocument {
        self.tx.borrow().clone()
    }

    /// Looks up the content behind an object URL of the current render.
    pub async fn blob(&self, url: &str) -> Option<Blob> {
        self.controller.lock().await.blob(url).cloned()
    }

    pub async fn shutdown(self) {
        self.debouncer.shutdown().await;
        self.controller.lock().await.clear();
    }

    async fn render_with(
        controller: &Mutex<PreviewController>,
        fs: &RwLock<FileSystem>,
        root: &RwLock<Option<String>>,
    ) -> PreviewDocument {
        let root = root.read().await.clone();
        let fs = fs.read().await;
        controller.lock().await.render(&fs, root.as_deref())
    }
}
