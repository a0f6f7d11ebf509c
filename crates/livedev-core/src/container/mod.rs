//! Containers: scaffolded projects living under `/containers/<id>/`.

pub mod lifecycle;
mod model;
pub mod registry;
mod repository;

pub use lifecycle::{Command, LatencyWindow, LifecycleRunner, Outcome, RunResult, TransitionPolicy};
pub use model::{
    ChosenTemplates, Container, ContainerStatus, CreateContainerOptions, HistoryAction,
    HistoryEntry, INTERRUPTED, SYSTEM_OPERATOR,
};
pub use registry::{CONTAINERS_ROOT, METADATA_FILE};
pub use repository::ContainerRepository;
