//! Chat transcript and agent contracts.

mod agent;
mod message;

pub use agent::{AgentReply, AgentRequest, AgentTurn, ChatAgent, PlanAgent, PlanDraft};
pub use message::{ChatMessage, CodeEdit, MessageRole, WELCOME_MESSAGE, WELCOME_MESSAGE_ID};
