//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema of what is written to storage.
//! They are private to the infrastructure layer and absorb the evolution of
//! the storage format over time.
//!
//! ### SessionSnapshot Version History
//! - **1.0.0**: Unversioned legacy layout
//! - **2.0.0**: Stable chat ids and vertical split

mod snapshot;

pub use snapshot::{
    ChatEntryV1_0_0, ChatEntryV2_0_0, LEGACY_SNAPSHOT_VERSION, SNAPSHOT_ENTITY,
    SUPPORTED_SNAPSHOT_VERSIONS, SessionSnapshotDTO, SessionSnapshotV1_0_0,
    SessionSnapshotV2_0_0, create_snapshot_migrator,
};
