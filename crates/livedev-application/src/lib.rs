//! Application layer for the Live Dev Sandbox.
//!
//! Use cases that coordinate the domain model, storage and agents: the
//! sandbox session itself, debounced autosave and live preview.

pub mod autosave;
pub mod debounce;
pub mod preview_controller;
pub mod sandbox;

pub use autosave::PersistenceGateway;
pub use debounce::Debouncer;
pub use preview_controller::{LivePreview, PreviewController};
pub use sandbox::{SandboxSession, SandboxSessionBuilder};
