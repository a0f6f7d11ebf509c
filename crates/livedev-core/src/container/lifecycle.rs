//! Simulated container lifecycle.
//!
//! ```text
//! initialized -install-> installing -> installed -build-> building -> built
//!                                          |                          |
//!                                          +----------start-----------+--> running
//! ```
//!
//! Commands do no real work: they append a pending history entry, wait a
//! random latency and then record the outcome.

use super::model::{Container, ContainerStatus, HistoryAction, HistoryEntry};
use super::registry;
use crate::config::LifecycleConfig;
use crate::error::{Result, SandboxError};
use crate::file_system::FileSystem;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::time::Duration;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, info, warn};

/// A lifecycle command.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Install,
    Build,
    Start,
}

impl Command {
    /// Status shown while the command is running, if any.
    pub fn transient_status(&self) -> Option<ContainerStatus> {
        match self {
            Self::Install => Some(ContainerStatus::Installing),
            Self::Build => Some(ContainerStatus::Building),
            Self::Start => None,
        }
    }

    /// Status reached when the command succeeds.
    pub fn target_status(&self) -> ContainerStatus {
        match self {
            Self::Install => ContainerStatus::Installed,
            Self::Build => ContainerStatus::Built,
            Self::Start => ContainerStatus::Running,
        }
    }

    /// Whether the command may start from `status` under the strict policy.
    pub fn accepts(&self, status: ContainerStatus) -> bool {
        match self {
            Self::Install => status == ContainerStatus::Initialized,
            Self::Build => status == ContainerStatus::Installed,
            Self::Start => matches!(status, ContainerStatus::Installed | ContainerStatus::Built),
        }
    }
}

/// How the runner treats commands issued from the wrong state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransitionPolicy {
    /// Reject with `SandboxError::InvalidTransition`.
    #[default]
    Strict,
    /// Run anyway and overwrite the status.
    Permissive,
}

/// Result of a simulated command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// Inclusive window the simulated latency is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyWindow {
    pub min: Duration,
    pub max: Duration,
}

impl LatencyWindow {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// A zero-length window, for tests.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn sample(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

impl Default for LatencyWindow {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500), Duration::from_millis(3000))
    }
}

/// Output of a completed run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub container: Container,
    pub file_system: FileSystem,
    pub outcome: Outcome,
}

/// Applies lifecycle commands to container records.
#[derive(Debug, Clone)]
pub struct LifecycleRunner {
    policy: TransitionPolicy,
    latency: LatencyWindow,
    failure_rate: f64,
}

impl Default for LifecycleRunner {
    fn default() -> Self {
        Self::new(TransitionPolicy::default(), LatencyWindow::default())
    }
}

impl LifecycleRunner {
    pub fn new(policy: TransitionPolicy, latency: LatencyWindow) -> Self {
        Self {
            policy,
            latency,
            failure_rate: 0.0,
        }
    }

    pub fn from_config(config: &LifecycleConfig) -> Self {
        Self::new(
            config.policy,
            LatencyWindow::new(
                Duration::from_millis(config.min_latency_ms),
                Duration::from_millis(config.max_latency_ms),
            ),
        )
        .with_failure_rate(config.failure_rate)
    }

    /// Probability in `[0, 1]` that a run ends in `Outcome::Failed`.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = if rate.is_finite() { rate.clamp(0.0, 1.0) } else { 0.0 };
        self
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Checks whether `command` may run against `container`.
    pub fn check(&self, container: &Container, command: Command) -> Result<()> {
        if self.policy == TransitionPolicy::Permissive || command.accepts(container.status) {
            return Ok(());
        }
        Err(SandboxError::InvalidTransition {
            container_id: container.id.clone(),
            status: container.status.to_string(),
            command: command.to_string(),
        })
    }

    /// Commands that `check` would currently accept for `container`.
    pub fn available_commands(&self, container: &Container) -> Vec<Command> {
        Command::iter()
            .filter(|command| self.check(container, *command).is_ok())
            .collect()
    }

    /// Starts `command`: appends the pending entry and applies the transient status.
    pub fn begin(&self, container: &Container, command: Command) -> Result<Container> {
        self.check(container, command)?;

        if self.policy == TransitionPolicy::Permissive && !command.accepts(container.status) {
            warn!(
                "Running {} on {} from status {} (permissive policy)",
                command, container.id, container.status
            );
        }

        let mut next = container.clone();
        let mut details = Map::new();
        details.insert("command".to_string(), json!(command.to_string()));
        details.insert("status".to_string(), json!("pending"));
        next.history
            .push(HistoryEntry::new(HistoryAction::Command, details));
        if let Some(status) = command.transient_status() {
            next.status = status;
        }
        Ok(next)
    }

    /// Completes `command`: marks the latest pending entry and sets the final status.
    pub fn finish(&self, container: Container, command: Command, outcome: Outcome) -> Container {
        let mut next = container;
        let pending = next.history.iter_mut().rev().find(|entry| {
            entry.action == HistoryAction::Command
                && entry.detail_str("status") == Some("pending")
                && entry.detail_str("command") == Some(command.to_string().as_str())
        });
        if let Some(entry) = pending {
            entry
                .details
                .insert("status".to_string(), Value::String(outcome.as_str().to_string()));
            if outcome == Outcome::Failed {
                entry
                    .details
                    .insert("error".to_string(), json!("simulated failure"));
            }
        }

        next.status = match outcome {
            Outcome::Success => command.target_status(),
            Outcome::Failed => ContainerStatus::Error,
        };
        next
    }

    /// Draws the outcome of a run from the configured failure rate.
    pub fn roll_outcome(&self) -> Outcome {
        if self.failure_rate > 0.0 && rand::thread_rng().gen_bool(self.failure_rate) {
            Outcome::Failed
        } else {
            Outcome::Success
        }
    }

    /// Waits the simulated latency.
    pub async fn simulate(&self) {
        let delay = self.latency.sample();
        debug!("Simulating command for {:?}", delay);
        tokio::time::sleep(delay).await;
    }

    /// Runs `command` end to end and returns the updated record and store.
    pub async fn run(
        &self,
        container: &Container,
        command: Command,
        fs: &FileSystem,
    ) -> Result<RunResult> {
        let started = self.begin(container, command)?;
        self.simulate().await;
        let outcome = self.roll_outcome();
        let finished = self.finish(started, command, outcome);
        let file_system = registry::write_metadata(&finished, fs)?;

        info!(
            "Container {} {} -> {} ({})",
            finished.id,
            command,
            finished.status,
            outcome.as_str()
        );
        Ok(RunResult {
            container: finished,
            file_system,
            outcome,
        })
    }
}
