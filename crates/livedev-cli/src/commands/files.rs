use super::Workspace;
use anyhow::{Result, bail};
use colored::Colorize;
use livedev_core::file_system::{NodeKind, TreeNode};
use livedev_core::template::{TemplateKind, TemplateRegistry};
use std::path::Path;

fn render_tree(nodes: &[TreeNode], depth: usize, out: &mut Vec<String>) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match node.kind {
            NodeKind::Folder => {
                out.push(format!("{}📁 {}", indent, node.name));
                render_tree(&node.children, depth + 1, out);
            }
            NodeKind::File => out.push(format!("{}📄 {}", indent, node.name)),
        }
    }
}

pub async fn tree(home: Option<&Path>, path: Option<&str>) -> Result<()> {
    let workspace = Workspace::open(home).await?;
    let nodes = workspace.session.tree().await;
    workspace.close().await;

    let nodes = match path {
        Some(path) => {
            let wanted = if path.ends_with('/') {
                path.to_string()
            } else {
                format!("{}/", path)
            };
            match nodes.iter().find_map(|n| n.find(&wanted)) {
                Some(folder) => vec![folder.clone()],
                None => bail!("No folder at {}", wanted),
            }
        }
        None => nodes,
    };

    let mut lines = Vec::new();
    render_tree(&nodes, 0, &mut lines);
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Lists the built-in templates by kind.
pub fn templates() {
    let registry = TemplateRegistry::builtin();
    for kind in [TemplateKind::Base, TemplateKind::Ui, TemplateKind::Datastore] {
        println!("{}", kind.to_string().to_uppercase().bold());
        for template in registry.by_kind(kind) {
            println!("  {:<16} {}", template.id.cyan(), template.description);
        }
    }
}
