use super::Workspace;
use anyhow::{Context, Result, bail};
use colored::{ColoredString, Colorize};
use livedev_core::container::{Command, Container, ContainerStatus, CreateContainerOptions};
use std::path::Path;
use std::str::FromStr;

pub struct CreateArgs {
    pub prompt: String,
    pub base: String,
    pub ui: Option<String>,
    pub datastore: Option<String>,
    pub env: Vec<String>,
}

fn parse_env(pair: &str) -> Result<(String, String)> {
    let (key, value) = pair
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{}'", pair))?;
    if key.trim().is_empty() {
        bail!("Empty variable name in '{}'", pair);
    }
    Ok((key.trim().to_string(), value.to_string()))
}

pub fn parse_command(value: &str) -> Result<Command, String> {
    Command::from_str(&value.to_lowercase())
        .map_err(|_| format!("unknown command '{}' (install, build, start)", value))
}

fn status_label(status: ContainerStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        ContainerStatus::Running => label.green(),
        ContainerStatus::Error => label.red(),
        ContainerStatus::Installing | ContainerStatus::Building => label.yellow(),
        ContainerStatus::Installed | ContainerStatus::Built => label.cyan(),
        _ => label.normal(),
    }
}

fn print_container(container: &Container) {
    println!(
        "{}  [{}]  {}",
        container.id.bold(),
        status_label(container.status),
        container.prompt
    );
    println!(
        "    templates: {}",
        container.chosen_templates.ordered_ids().join(", ")
    );
    for (key, value) in container.masked_env() {
        println!("    env {}={}", key, value);
    }
}

pub async fn create(home: Option<&Path>, args: CreateArgs) -> Result<()> {
    let mut options = CreateContainerOptions::new(args.prompt, args.base);
    if let Some(ui) = args.ui {
        options = options.with_ui(ui);
    }
    if let Some(datastore) = args.datastore {
        options = options.with_datastore(datastore);
    }
    for pair in &args.env {
        let (key, value) = parse_env(pair)?;
        options = options.with_env(key, value);
    }

    let workspace = Workspace::open(home).await?;
    let result = workspace.session.create_container(&options).await;
    workspace.close().await;

    let container = result?;
    println!("📦 Created {}", container.path);
    print_container(&container);
    Ok(())
}

/// JSON listing with secrets masked the same way as the text output.
fn containers_json(containers: &[Container]) -> Result<String> {
    let shown: Vec<Container> = containers.iter().map(Container::redacted).collect();
    Ok(serde_json::to_string_pretty(&shown)?)
}

pub async fn list(home: Option<&Path>, json: bool) -> Result<()> {
    let workspace = Workspace::open(home).await?;
    let result = workspace.session.containers().await;
    workspace.close().await;
    let containers = result?;

    if json {
        println!("{}", containers_json(&containers)?);
        return Ok(());
    }
    if containers.is_empty() {
        println!("No containers yet. Create one with `livedev create`.");
        return Ok(());
    }
    for container in &containers {
        print_container(container);
    }
    Ok(())
}

pub async fn run(home: Option<&Path>, id: &str, command: Command) -> Result<()> {
    let workspace = Workspace::open(home).await?;
    println!("⏳ Running {} on {}...", command, id);
    let result = workspace.session.run_command(id, command).await;
    let preview_root = workspace.session.preview_root().await;
    workspace.close().await;

    let container = result?;
    println!("{} -> {}", container.id.bold(), status_label(container.status));
    if container.status == ContainerStatus::Error {
        bail!("{} failed for {}", command, container.id);
    }
    if command == Command::Start {
        if let Some(root) = preview_root {
            println!("👀 Previewing {}", root);
        }
    }
    Ok(())
}

pub async fn delete(home: Option<&Path>, id: &str) -> Result<()> {
    let workspace = Workspace::open(home).await?;
    let result = workspace.session.delete_container(id).await;
    workspace.close().await;
    result?;
    println!("🗑️  Deleted {}", id);
    Ok(())
}
