use super::{Workspace, resolve_paths};
use anyhow::Result;
use colored::Colorize;
use livedev_infrastructure::ConfigService;
use std::path::Path;

pub async fn run(home: Option<&Path>) -> Result<()> {
    let service = ConfigService::new(resolve_paths(home)?.config_file());
    if service.init_default().await? {
        println!("📝 Wrote {}", service.path().display());
    } else {
        println!("Config already exists at {}", service.path().display());
    }

    let workspace = Workspace::open(home).await?;
    let files = workspace.session.file_system().await.len();
    let db = workspace
        .paths
        .database_dir(workspace.config.persistence.db_path.as_ref());
    let database = workspace.database.clone();
    workspace.close().await;
    let bytes = database.size_on_disk()?;

    println!(
        "{}",
        format!(
            "✅ Sandbox ready at {} ({} files, {} bytes on disk)",
            db.display(),
            files,
            bytes
        )
        .green()
    );
    Ok(())
}
