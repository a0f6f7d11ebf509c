//! Open-file tabs and the active file.

use crate::chat::CodeEdit;
use crate::file_system::{FileSystem, is_placeholder};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub open_files: Vec<String>,
    pub active_file: Option<String>,
}

impl EditorState {
    /// Activates `path` and opens a tab for it.
    ///
    /// Folders and paths missing from `fs` are ignored. Returns whether the
    /// selection happened.
    pub fn select(&mut self, fs: &FileSystem, path: &str) -> bool {
        if path.ends_with('/') || !fs.contains(path) {
            return false;
        }
        self.open(path);
        self.active_file = Some(path.to_string());
        true
    }

    /// Closes the tab of `path`; if it was active, the first remaining tab
    /// becomes active.
    pub fn close(&mut self, path: &str) {
        self.open_files.retain(|p| p != path);
        if self.active_file.as_deref() == Some(path) {
            self.active_file = self.open_files.first().cloned();
        }
    }

    /// Applies agent edits to `fs`, opening each edited file and activating
    /// the first one.
    pub fn apply_edits(&mut self, fs: &mut FileSystem, edits: &[CodeEdit]) {
        let mut first = None;
        for edit in edits {
            fs.set(edit.path.clone(), edit.content.clone());
            if !is_placeholder(&edit.path) {
                self.open(&edit.path);
                first.get_or_insert_with(|| edit.path.clone());
            }
        }
        if first.is_some() {
            self.active_file = first;
        }
    }

    /// Drops tabs whose file no longer exists in `fs`.
    pub fn prune(&mut self, fs: &FileSystem) {
        self.open_files.retain(|p| fs.contains(p));
        let stale = matches!(&self.active_file, Some(active) if !fs.contains(active));
        if stale {
            self.active_file = self.open_files.first().cloned();
        }
    }

    fn open(&mut self, path: &str) {
        if !self.open_files.iter().any(|p| p == path) {
            self.open_files.push(path.to_string());
        }
    }
}
