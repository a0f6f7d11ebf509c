//! Plan-then-review orchestration.

use crate::prompt::format_file_context;
use crate::review_agent::Reviewer;
use livedev_core::FileSystem;
use livedev_core::chat::{CodeEdit, PlanAgent};
use livedev_core::error::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Context passed to the reviewer alongside the plan.
const REVIEW_CONTEXT: &str = "review";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub description: String,
    pub status: StepStatus,
}

/// A reviewed development plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationPlan {
    pub title: String,
    pub steps: Vec<PlanStep>,
    pub code: Vec<CodeEdit>,
    pub review: String,
}

fn review_instruction(steps: &[String]) -> String {
    let numbered = steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Please review the following development plan for clarity and completeness. Plan:\n{}",
        numbered
    )
}

/// Asks `planner` for a plan towards `goal`, then has `reviewer` review it.
///
/// Every returned step starts out pending.
pub async fn run_deconstruction_task(
    goal: &str,
    fs: &FileSystem,
    planner: &dyn PlanAgent,
    reviewer: &dyn Reviewer,
) -> Result<OrchestrationPlan> {
    let context = format_file_context(fs, None)?;
    let draft = planner.plan(goal, &context).await?;

    let review = reviewer
        .review(&review_instruction(&draft.steps), Some(REVIEW_CONTEXT))
        .await?;

    info!(
        "Plan '{}' drafted with {} steps and {} files",
        draft.title,
        draft.steps.len(),
        draft.code.len()
    );

    Ok(OrchestrationPlan {
        title: draft.title,
        steps: draft
            .steps
            .into_iter()
            .map(|description| PlanStep {
                description,
                status: StepStatus::Pending,
            })
            .collect(),
        code: draft.code,
        review,
    })
}
