//! Domain layer of the Live Dev Sandbox.
//!
//! Everything here is storage-agnostic: the path-keyed store and its tree
//! view, templates, containers and their simulated lifecycle, preview
//! rendering, chat and session models, and the repository traits that the
//! infrastructure crate implements.

pub mod chat;
pub mod config;
pub mod container;
pub mod error;
pub mod export;
pub mod file_system;
pub mod preview;
pub mod session;
pub mod template;

// Re-export common error type
pub use error::{Result, SandboxError};
pub use file_system::FileSystem;
