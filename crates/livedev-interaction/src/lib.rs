//! Agent-facing helpers for the sandbox.
//!
//! Prompt context rendering, the canned review agent, offline agents and
//! plan orchestration. No network client lives here.

pub mod offline_agent;
pub mod orchestration;
pub mod prompt;
pub mod review_agent;

pub use offline_agent::{OfflineChatAgent, OfflinePlanAgent, parse_file_blocks};
pub use orchestration::{OrchestrationPlan, PlanStep, StepStatus, run_deconstruction_task};
pub use prompt::{format_file_context, system_instruction};
pub use review_agent::{ReviewAgent, Reviewer};
