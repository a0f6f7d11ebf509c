//! Agent contracts.
//!
//! No network client lives in this workspace. These traits describe what the
//! session expects from a chat agent and from a planning agent.

use super::message::{ChatMessage, CodeEdit, MessageRole};
use crate::error::{Result, SandboxError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One conversational turn forwarded to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTurn {
    pub role: MessageRole,
    pub text: String,
}

/// Input of [`ChatAgent::respond`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    /// User and model turns only, oldest first.
    pub history: Vec<AgentTurn>,
    /// Dump of the user's files and preview state.
    pub context: String,
}

impl AgentRequest {
    /// Builds a request from a transcript, dropping system messages.
    pub fn from_transcript(transcript: &[ChatMessage], context: impl Into<String>) -> Self {
        Self {
            history: transcript
                .iter()
                .filter(|m| m.is_conversational())
                .map(|m| AgentTurn {
                    role: m.role,
                    text: m.content.clone(),
                })
                .collect(),
            context: context.into(),
        }
    }

    /// Text of the most recent user turn.
    pub fn last_user_text(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|t| t.role == MessageRole::User)
            .map(|t| t.text.as_str())
    }
}

/// Output of [`ChatAgent::respond`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    pub text: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<CodeEdit>>,
}

impl AgentReply {
    /// Parses a raw JSON reply, requiring non-empty `text` and `explanation`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SandboxError::agent(
                "Received an invalid response from the AI agent.",
            ));
        }
        let reply: AgentReply = serde_json::from_str(trimmed)
            .map_err(|e| SandboxError::agent(format!("Malformed agent reply: {}", e)))?;
        if reply.text.is_empty() || reply.explanation.is_empty() {
            return Err(SandboxError::agent(
                "Received an invalid response from the AI agent.",
            ));
        }
        Ok(reply)
    }

    pub fn into_message(self) -> ChatMessage {
        ChatMessage::model(self.text, Some(self.explanation), self.code)
    }
}

/// A conversational coding agent.
#[async_trait]
pub trait ChatAgent: Send + Sync {
    async fn respond(&self, request: AgentRequest) -> Result<AgentReply>;
}

/// Draft produced by a planning agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDraft {
    pub title: String,
    pub steps: Vec<String>,
    #[serde(default)]
    pub code: Vec<CodeEdit>,
}

/// An agent that decomposes a goal into steps and starter code.
#[async_trait]
pub trait PlanAgent: Send + Sync {
    async fn plan(&self, goal: &str, context: &str) -> Result<PlanDraft>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_drops_system_messages() {
        let transcript = vec![
            ChatMessage::welcome(),
            ChatMessage::user("make it blue"),
            ChatMessage::model("done", None, None),
            ChatMessage::system("oops"),
            ChatMessage::user("now red"),
        ];
        let request = AgentRequest::from_transcript(&transcript, "ctx");
        assert_eq!(request.history.len(), 3);
        assert_eq!(request.last_user_text(), Some("now red"));
    }

    #[test]
    fn test_reply_parsing() {
        let reply = AgentReply::from_json(
            r#"{"text":"ok","explanation":"changed","code":[{"path":"/a","content":"b"}]}"#,
        )
        .unwrap();
        assert_eq!(reply.code.as_ref().unwrap()[0].path, "/a");

        let message = reply.into_message();
        assert_eq!(message.role, MessageRole::Model);
        assert_eq!(message.explanation.as_deref(), Some("changed"));
    }

    #[test]
    fn test_reply_parsing_rejects_incomplete() {
        assert!(AgentReply::from_json("").is_err());
        assert!(AgentReply::from_json(r#"{"text":"ok"}"#).is_err());
        assert!(AgentReply::from_json(r#"{"text":"","explanation":"x"}"#).is_err());
    }
}
