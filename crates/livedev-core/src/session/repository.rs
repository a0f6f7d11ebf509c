//! Session snapshot repository trait.

use super::model::SessionSnapshot;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence of the single session snapshot.
///
/// Implementations are constructed once by the application entry point and
/// passed down; there is no global instance.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Loads the stored snapshot.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(SessionSnapshot))`: a readable snapshot was stored
    /// - `Ok(None)`: nothing stored, or stored under an unsupported version
    /// - `Err(_)`: the backend could not be read
    async fn load(&self) -> Result<Option<SessionSnapshot>>;

    /// Replaces the stored snapshot.
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<()>;

    /// Removes the stored snapshot.
    async fn clear(&self) -> Result<()>;
}
