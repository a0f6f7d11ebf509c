//! Chat transcript models.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Id of the welcome message a fresh session starts with.
pub const WELCOME_MESSAGE_ID: &str = "init";
pub const WELCOME_MESSAGE: &str =
    "Welcome System Operator. Create a new container or select an existing one to begin.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
    System,
}

/// A full-file edit proposed by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEdit {
    pub path: String,
    pub content: String,
}

impl CodeEdit {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// One entry of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<CodeEdit>>,
}

impl ChatMessage {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            explanation: None,
            code: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    pub fn model(
        content: impl Into<String>,
        explanation: Option<String>,
        code: Option<Vec<CodeEdit>>,
    ) -> Self {
        Self {
            explanation,
            code,
            ..Self::with_role(MessageRole::Model, content)
        }
    }

    /// The system greeting shown in a brand-new session.
    pub fn welcome() -> Self {
        Self {
            id: WELCOME_MESSAGE_ID.to_string(),
            ..Self::system(WELCOME_MESSAGE)
        }
    }

    /// Whether this message is part of the conversation sent to the agent.
    pub fn is_conversational(&self) -> bool {
        matches!(self.role, MessageRole::User | MessageRole::Model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_message() {
        let msg = ChatMessage::welcome();
        assert_eq!(msg.id, "init");
        assert_eq!(msg.role, MessageRole::System);
        assert!(msg.content.starts_with("Welcome System Operator"));
        assert!(!msg.is_conversational());
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("explanation").is_none());
        assert!(json.get("code").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ChatMessage::user("a").id, ChatMessage::user("a").id);
    }
}
