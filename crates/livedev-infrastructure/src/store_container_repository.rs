//! Container repository backed by the shared path-keyed store.
//!
//! Records are the `handover.json` files inside the store itself, so the
//! store stays the single source of truth.

use async_trait::async_trait;
use livedev_core::FileSystem;
use livedev_core::container::registry;
use livedev_core::container::{Container, ContainerRepository, CreateContainerOptions};
use livedev_core::error::{Result, SandboxError};
use livedev_core::template::TemplateRegistry;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct StoreContainerRepository {
    fs: Arc<RwLock<FileSystem>>,
    templates: Arc<TemplateRegistry>,
}

impl StoreContainerRepository {
    pub fn new(fs: Arc<RwLock<FileSystem>>, templates: Arc<TemplateRegistry>) -> Self {
        Self { fs, templates }
    }

    /// Repository over `fs` using the built-in templates.
    pub fn with_builtin_templates(fs: Arc<RwLock<FileSystem>>) -> Self {
        Self::new(fs, Arc::new(TemplateRegistry::builtin().clone()))
    }

    pub fn file_system(&self) -> Arc<RwLock<FileSystem>> {
        self.fs.clone()
    }
}

#[async_trait]
impl ContainerRepository for StoreContainerRepository {
    async fn create(&self, options: &CreateContainerOptions) -> Result<Container> {
        let mut fs = self.fs.write().await;
        let (next, container) = registry::create(options, &fs, &self.templates)?;
        *fs = next;
        Ok(container)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Container>> {
        let fs = self.fs.read().await;
        registry::read_metadata(id, &fs)
    }

    async fn list_all(&self) -> Result<Vec<Container>> {
        let fs = self.fs.read().await;
        Ok(registry::scan(&fs))
    }

    async fn update(&self, container: &Container) -> Result<()> {
        let mut fs = self.fs.write().await;
        if !fs.contains(&container.metadata_path()) {
            return Err(SandboxError::not_found("container", container.id.clone()));
        }
        *fs = registry::write_metadata(container, &fs)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut fs = self.fs.write().await;
        if fs.keys_with_prefix(&registry::root_for(id)).is_empty() {
            return Err(SandboxError::not_found("container", id));
        }
        *fs = registry::remove(id, &fs);
        Ok(())
    }
}
