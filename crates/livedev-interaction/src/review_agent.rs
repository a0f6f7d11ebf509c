//! Canned review agent.
//!
//! Answers by keyword so plan orchestration can run without a model.

use async_trait::async_trait;
use livedev_core::error::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Simulated thinking time of [`ReviewAgent`].
pub const DEFAULT_REVIEW_DELAY: Duration = Duration::from_millis(1500);

const DATA_USAGE_CLAUSE: &str = "\n\n## Clause on AI Data Usage (Added by Review Agent)\n\nData submitted to AI services, including prompts and generated content, may be logged for auditing and quality assurance.";

const APPROVAL: &str = "This looks good. The new clause is clear and concise. I have no further recommendations. Approved by Review-Supervisor (simulated).";

/// Steps answered to a "deconstruct" or "decompose" instruction.
pub const DECONSTRUCTION_STEPS: [&str; 4] = [
    "Retrieve document 'privacy_policy_v1.md' from Domain A.",
    "Draft an update to the document to include a new clause about AI data usage.",
    "Submit the drafted update for supervisory review.",
    "Upon approval, push the updated document to Domain B as 'privacy_policy_v2.md'.",
];

/// Anything that can review a piece of text.
#[async_trait]
pub trait Reviewer: Send + Sync {
    async fn review(&self, instruction: &str, context: Option<&str>) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ReviewAgent {
    delay: Duration,
}

impl Default for ReviewAgent {
    fn default() -> Self {
        Self::new(DEFAULT_REVIEW_DELAY)
    }
}

impl ReviewAgent {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A review agent that answers immediately.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Answers `instruction` after the configured delay.
    ///
    /// Keywords are matched case-insensitively in this order: "update" (only
    /// with a context), "review", "deconstruct"/"decompose".
    pub async fn respond(&self, instruction: &str, context: Option<&str>) -> String {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        let answer = canned_answer(instruction, context);
        debug!("Review agent answered {} chars", answer.len());
        answer
    }
}

#[async_trait]
impl Reviewer for ReviewAgent {
    async fn review(&self, instruction: &str, context: Option<&str>) -> Result<String> {
        Ok(self.respond(instruction, context).await)
    }
}

fn canned_answer(instruction: &str, context: Option<&str>) -> String {
    let lowered = instruction.to_lowercase();

    if lowered.contains("update") {
        if let Some(context) = context.filter(|c| !c.is_empty()) {
            return format!("{}{}", context, DATA_USAGE_CLAUSE);
        }
    }
    if lowered.contains("review") {
        return APPROVAL.to_string();
    }
    if lowered.contains("deconstruct") || lowered.contains("decompose") {
        return DECONSTRUCTION_STEPS
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect::<Vec<_>>()
            .join("\n");
    }
    format!(
        "This is a simulated response from the review agent. The instruction was: \"{}\".",
        instruction
    )
}
