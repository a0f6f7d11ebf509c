use super::Workspace;
use anyhow::{Result, bail};
use livedev_core::export::DEFAULT_ARCHIVE_NAME;
use livedev_infrastructure::archive_writer::write_archive;
use std::path::{Path, PathBuf};

pub async fn run(home: Option<&Path>, out: Option<PathBuf>) -> Result<()> {
    let workspace = Workspace::open(home).await?;
    let archive = workspace.session.export().await;
    let destination = out.unwrap_or_else(|| workspace.paths.exports_dir().join(DEFAULT_ARCHIVE_NAME));
    workspace.close().await;

    if archive.is_empty() {
        bail!("Nothing to export: there are no containers");
    }
    let written = write_archive(&archive, &destination).await?;
    println!("📦 Exported {} files to {}", written, destination.display());
    Ok(())
}
