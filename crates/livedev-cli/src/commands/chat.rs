use super::Workspace;
use anyhow::Result;
use colored::Colorize;
use livedev_core::chat::MessageRole;
use livedev_interaction::{OfflinePlanAgent, ReviewAgent};
use std::path::Path;

/// Sends one message to the offline chat agent.
pub async fn chat(home: Option<&Path>, message: &str) -> Result<()> {
    let workspace = Workspace::open(home).await?;
    let result = workspace.session.submit_chat(message).await;
    let active = workspace.session.editor().await.active_file;
    workspace.close().await;

    let reply = result?;
    match reply.role {
        MessageRole::System => println!("{}", reply.content.red()),
        _ => {
            println!("{}", reply.content.bold());
            if let Some(explanation) = &reply.explanation {
                println!("{}", explanation);
            }
        }
    }
    if reply.code.is_some() {
        if let Some(active) = active {
            println!("✏️  Active file: {}", active);
        }
    }
    Ok(())
}

/// Drafts and reviews a plan with the offline agents.
pub async fn plan(home: Option<&Path>, goal: &str, json: bool) -> Result<()> {
    let workspace = Workspace::open(home).await?;
    let planner = OfflinePlanAgent::new(ReviewAgent::instant());
    let result = workspace
        .session
        .plan(goal, &planner, &ReviewAgent::default())
        .await;
    workspace.close().await;
    let plan = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }
    println!("{}", plan.title.bold());
    for (i, step) in plan.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step.description);
    }
    println!("\n{}", plan.review.italic());
    Ok(())
}
