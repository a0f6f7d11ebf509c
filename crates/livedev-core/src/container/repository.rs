//! Container repository trait.

use super::model::{Container, CreateContainerOptions};
use crate::error::Result;
use async_trait::async_trait;

/// Repository for container records.
///
/// Implementations own the backing store; callers never parse metadata files
/// themselves.
#[async_trait]
pub trait ContainerRepository: Send + Sync {
    /// Scaffolds and persists a new container.
    async fn create(&self, options: &CreateContainerOptions) -> Result<Container>;

    /// Finds a container by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Container))`: Container found
    /// - `Ok(None)`: Container not found
    async fn find_by_id(&self, id: &str) -> Result<Option<Container>>;

    /// Lists every container, newest first.
    async fn list_all(&self) -> Result<Vec<Container>>;

    /// Rewrites the record of an existing container.
    async fn update(&self, container: &Container) -> Result<()>;

    /// Deletes a container and all of its files.
    async fn delete(&self, id: &str) -> Result<()>;
}
