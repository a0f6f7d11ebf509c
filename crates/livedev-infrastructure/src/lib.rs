pub mod archive_writer;
pub mod config_service;
pub mod dto;
pub mod in_memory_snapshot_repository;
pub mod paths;
pub mod sled_snapshot_repository;
pub mod snapshot_codec;
pub mod store_container_repository;

pub use crate::config_service::ConfigService;
pub use crate::in_memory_snapshot_repository::InMemorySnapshotRepository;
pub use crate::paths::LivedevPaths;
pub use crate::sled_snapshot_repository::SledSnapshotRepository;
pub use crate::store_container_repository::StoreContainerRepository;
