//! Agents that work without a model.
//!
//! `OfflineChatAgent` applies file blocks pasted by the user, written in the
//! same `File:` format the context dump uses. `OfflinePlanAgent` builds plans
//! from the review agent's canned decomposition.

use crate::review_agent::ReviewAgent;
use async_trait::async_trait;
use livedev_core::chat::{AgentReply, AgentRequest, ChatAgent, CodeEdit, PlanAgent, PlanDraft};
use livedev_core::error::{Result, SandboxError};
use tracing::debug;

const FILE_MARKER: &str = "File:";
const FENCE: &str = "```";

const OFFLINE_HINT: &str = "Paste one or more blocks of the form\n\n    File: /containers/<id>/path\n    ```lang\n    ...full file content...\n    ```\n\nand they will be written to the store.";

/// Extracts `File:` blocks from free text.
///
/// A block is a `File: <path>` line, an opening fence, the content and a
/// closing fence. Blocks without a closing fence are ignored.
pub fn parse_file_blocks(text: &str) -> Vec<CodeEdit> {
    let mut edits = Vec::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let Some(path) = line.trim().strip_prefix(FILE_MARKER) else {
            continue;
        };
        let path = path.trim();
        if !path.starts_with('/') {
            continue;
        }
        match lines.next() {
            Some(open) if open.trim_start().starts_with(FENCE) => {}
            _ => continue,
        }

        let mut body = Vec::new();
        let mut closed = false;
        for line in lines.by_ref() {
            if line.trim() == FENCE {
                closed = true;
                break;
            }
            body.push(line);
        }
        if closed {
            edits.push(CodeEdit::new(path, body.join("\n")));
        }
    }
    edits
}

#[derive(Debug, Clone, Default)]
pub struct OfflineChatAgent;

#[async_trait]
impl ChatAgent for OfflineChatAgent {
    async fn respond(&self, request: AgentRequest) -> Result<AgentReply> {
        let text = request
            .last_user_text()
            .ok_or_else(|| SandboxError::agent("No user message to answer."))?;

        let edits = parse_file_blocks(text);
        if edits.is_empty() {
            return Ok(AgentReply {
                text: "I'm running offline, so I can only apply files you paste.".to_string(),
                explanation: OFFLINE_HINT.to_string(),
                code: None,
            });
        }

        let listing = edits
            .iter()
            .map(|e| format!("- `{}`", e.path))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(AgentReply {
            text: format!("Applied {} file(s).", edits.len()),
            explanation: format!("Updated files:\n{}", listing),
            code: Some(edits),
        })
    }
}

const DECONSTRUCT_INSTRUCTION: &str = "Deconstruct the goal into steps.";

/// Plans by asking a [`ReviewAgent`] to deconstruct the goal.
#[derive(Debug, Clone)]
pub struct OfflinePlanAgent {
    agent: ReviewAgent,
}

impl OfflinePlanAgent {
    pub fn new(agent: ReviewAgent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl PlanAgent for OfflinePlanAgent {
    async fn plan(&self, goal: &str, context: &str) -> Result<PlanDraft> {
        // The goal never reaches the keyword matcher.
        let answer = self.agent.respond(DECONSTRUCT_INSTRUCTION, None).await;
        debug!(
            "Offline planner answered goal '{}' with {} context chars",
            goal.trim(),
            context.len()
        );

        let steps: Vec<String> = answer
            .lines()
            .filter_map(|line| {
                let (number, rest) = line.split_once(". ")?;
                number
                    .chars()
                    .all(|c| c.is_ascii_digit())
                    .then(|| rest.trim().to_string())
            })
            .collect();
        if steps.is_empty() {
            return Err(SandboxError::agent("Planner returned no steps."));
        }

        Ok(PlanDraft {
            title: goal.trim().to_string(),
            steps,
            code: Vec::new(),
        })
    }
}
