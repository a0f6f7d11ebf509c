//! Writes a project export to disk as a single zip archive.

use livedev_core::error::{Result, SandboxError};
use livedev_core::export::ProjectArchive;
use std::io::{Cursor, Write};
use std::path::{Component, Path};
use tokio::fs;
use tracing::{info, warn};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Encodes `archive` as zip bytes.
///
/// Entries that would escape the archive root are skipped. Returns the
/// bytes and the number of entries stored.
pub fn encode_zip(archive: &ProjectArchive) -> Result<(Vec<u8>, usize)> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut stored = 0;
    for (relative, content) in &archive.entries {
        if !is_contained(relative) {
            warn!("Skipping export entry outside the archive: {}", relative);
            continue;
        }
        writer
            .start_file(relative.as_str(), options)
            .map_err(zip_error)?;
        writer.write_all(content.as_bytes())?;
        stored += 1;
    }

    let bytes = writer.finish().map_err(zip_error)?.into_inner();
    Ok((bytes, stored))
}

/// Writes `archive` as a zip file at `destination`, creating parent
/// directories. Returns the number of entries stored.
pub async fn write_archive(archive: &ProjectArchive, destination: &Path) -> Result<usize> {
    let (bytes, stored) = encode_zip(archive)?;

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| {
            SandboxError::io(format!(
                "Failed to create export directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }
    fs::write(destination, bytes).await.map_err(|e| {
        SandboxError::io(format!("Failed to write '{}': {}", destination.display(), e))
    })?;

    info!("Exported {} files to {}", stored, destination.display());
    Ok(stored)
}

fn is_contained(relative: &str) -> bool {
    let path = Path::new(relative);
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn zip_error(e: ZipError) -> SandboxError {
    SandboxError::io(format!("Failed to build zip archive: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn sample() -> ProjectArchive {
        let mut archive = ProjectArchive::default();
        archive
            .entries
            .insert("cntr_1/index.html".to_string(), "<p/>".to_string());
        archive
            .entries
            .insert("cntr_1/src/app.js".to_string(), "1".to_string());
        archive
            .entries
            .insert("../escape.txt".to_string(), "nope".to_string());
        archive
    }

    #[tokio::test]
    async fn test_writes_single_zip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dest = temp_dir.path().join("exports").join("live-dev-project.zip");

        let stored = write_archive(&sample(), &dest).await.unwrap();
        assert_eq!(stored, 2);
        assert!(dest.is_file());

        let file = std::fs::File::open(&dest).unwrap();
        let mut zip = ZipArchive::new(file).unwrap();
        assert_eq!(zip.len(), 2);
        let mut names: Vec<&str> = zip.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["cntr_1/index.html", "cntr_1/src/app.js"]);

        let mut content = String::new();
        zip.by_name("cntr_1/src/app.js")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "1");
    }

    #[test]
    fn test_empty_archive_is_valid_zip() {
        let (bytes, stored) = encode_zip(&ProjectArchive::default()).unwrap();
        assert_eq!(stored, 0);
        let zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(zip.is_empty());
    }
}
