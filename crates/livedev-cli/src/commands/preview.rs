use super::Workspace;
use anyhow::{Context, Result};
use livedev_core::preview::PreviewStatus;
use std::path::Path;

/// Renders the preview document, optionally switching the preview root first.
pub async fn run(home: Option<&Path>, root: Option<String>, out: Option<&Path>) -> Result<()> {
    let workspace = Workspace::open(home).await?;
    if let Some(root) = root {
        let root = if root.ends_with('/') { root } else { format!("{}/", root) };
        workspace.session.set_preview_root(Some(root)).await;
    }
    let document = workspace.session.render_preview().await;
    workspace.close().await;

    match out {
        Some(path) => {
            std::fs::write(path, &document.html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("🖼️  Wrote preview to {}", path.display());
        }
        None => println!("{}", document.html),
    }

    match document.status {
        PreviewStatus::Rendered => eprintln!(
            "sandbox=\"{}\", {} inlined assets",
            document.sandbox_policy(),
            document.object_urls.len()
        ),
        PreviewStatus::MissingEntry => eprintln!("The preview root has no index.html"),
        PreviewStatus::Idle => {}
    }
    Ok(())
}
