//! Session state and its persistence contract.

mod editor;
mod model;
mod repository;

pub use editor::EditorState;
pub use model::{
    DEFAULT_PANEL_SIZES, DEFAULT_VERTICAL_SPLIT, MAX_VERTICAL_SPLIT, MIN_VERTICAL_SPLIT,
    SessionSnapshot, clamp_vertical_split,
};
pub use repository::SnapshotRepository;
