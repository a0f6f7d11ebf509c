//! Project export.

use crate::container::CONTAINERS_ROOT;
use crate::file_system::FileSystem;
use std::collections::BTreeMap;

/// Default archive name used when the caller does not pick one.
pub const DEFAULT_ARCHIVE_NAME: &str = "live-dev-project.zip";

/// Files of every container, keyed by their path relative to `/containers/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectArchive {
    pub entries: BTreeMap<String, String>,
}

impl ProjectArchive {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects every container file with the `/containers/` prefix stripped.
pub fn export_project(fs: &FileSystem) -> ProjectArchive {
    ProjectArchive {
        entries: fs
            .entries_with_prefix(CONTAINERS_ROOT)
            .map(|(path, content)| (path[CONTAINERS_ROOT.len()..].to_string(), content.to_string()))
            .filter(|(relative, _)| !relative.is_empty())
            .collect(),
    }
}
