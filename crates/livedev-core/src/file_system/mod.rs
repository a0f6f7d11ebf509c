//! Path-keyed store.
//!
//! The store is the single source of truth for every file the sandbox knows
//! about: templates, containers and their metadata files. Keys are absolute
//! paths; directories only exist implicitly through the keys below them.

mod tree;

pub use tree::{NodeKind, TreeNode, build_tree};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel file name used to materialize an otherwise empty directory.
pub const PLACEHOLDER_FILE: &str = ".placeholder";

/// Ordered mapping of absolute path to text content.
///
/// Serializes as a plain JSON object so it can be embedded in snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSystem {
    files: BTreeMap<String, String>,
}

impl FileSystem {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `content` at `path`, replacing any previous content.
    pub fn set(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Removes `path`, returning its previous content.
    pub fn delete(&mut self, path: &str) -> Option<String> {
        self.files.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Iterates over all entries in path order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Iterates over the entries whose path starts with `prefix`.
    pub fn entries_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.files
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries_with_prefix(prefix)
            .map(|(k, _)| k.to_string())
            .collect()
    }

    /// Removes every entry under `prefix` and returns how many were removed.
    pub fn remove_prefix(&mut self, prefix: &str) -> usize {
        let doomed = self.keys_with_prefix(prefix);
        for key in &doomed {
            self.files.remove(key);
        }
        doomed.len()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Creates an empty file named `name` inside the directory `dir`.
    ///
    /// `dir` is expected to end with `/`. Returns the new file's path.
    pub fn new_file(&mut self, dir: &str, name: &str) -> String {
        let path = join_dir(dir, name);
        self.set(path.clone(), String::new());
        path
    }

    /// Creates the folder `name` inside `dir` by writing its placeholder entry.
    ///
    /// Returns the folder path (with trailing `/`).
    pub fn new_folder(&mut self, dir: &str, name: &str) -> String {
        let folder = format!("{}/", join_dir(dir, name.trim_end_matches('/')));
        self.set(format!("{}{}", folder, PLACEHOLDER_FILE), String::new());
        folder
    }

    /// Writes uploaded `(name, content)` pairs into `dir`.
    pub fn upload<I, N, C>(&mut self, dir: &str, files: I) -> Vec<String>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: Into<String>,
    {
        files
            .into_iter()
            .map(|(name, content)| {
                let path = join_dir(dir, name.as_ref());
                self.set(path.clone(), content);
                path
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FileSystem {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for FileSystem {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

/// Returns true when `path` is a placeholder entry.
pub fn is_placeholder(path: &str) -> bool {
    path == PLACEHOLDER_FILE || path.ends_with(&format!("/{}", PLACEHOLDER_FILE))
}

fn join_dir(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileSystem {
        [
            ("/containers/cntr_1/index.html", "<html></html>"),
            ("/containers/cntr_1/src/app.js", "x"),
            ("/containers/cntr_10/index.html", "other"),
            ("/templates/react-vite/package.json", "{}"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_set_get_delete() {
        let mut fs = FileSystem::new();
        fs.set("/a.txt", "hello");
        assert_eq!(fs.get("/a.txt"), Some("hello"));
        fs.set("/a.txt", "bye");
        assert_eq!(fs.get("/a.txt"), Some("bye"));
        assert_eq!(fs.delete("/a.txt"), Some("bye".to_string()));
        assert!(fs.is_empty());
        assert_eq!(fs.delete("/a.txt"), None);
    }

    #[test]
    fn test_keys_with_prefix_respects_boundary() {
        let fs = sample();
        let keys = fs.keys_with_prefix("/containers/cntr_1/");
        assert_eq!(
            keys,
            vec![
                "/containers/cntr_1/index.html".to_string(),
                "/containers/cntr_1/src/app.js".to_string(),
            ]
        );
    }

    #[test]
    fn test_remove_prefix_only_touches_prefix() {
        let mut fs = sample();
        let removed = fs.remove_prefix("/containers/cntr_1/");
        assert_eq!(removed, 2);
        assert!(fs.contains("/containers/cntr_10/index.html"));
        assert!(fs.contains("/templates/react-vite/package.json"));
        assert_eq!(fs.len(), 2);
    }

    #[test]
    fn test_new_file_and_folder() {
        let mut fs = FileSystem::new();
        let file = fs.new_file("/containers/cntr_1/", "notes.md");
        assert_eq!(file, "/containers/cntr_1/notes.md");
        assert_eq!(fs.get(&file), Some(""));

        let folder = fs.new_folder("/containers/cntr_1", "assets");
        assert_eq!(folder, "/containers/cntr_1/assets/");
        assert!(fs.contains("/containers/cntr_1/assets/.placeholder"));
    }

    #[test]
    fn test_upload_writes_every_file() {
        let mut fs = FileSystem::new();
        let written = fs.upload("/up/", vec![("a.css", "body{}"), ("b.js", "1")]);
        assert_eq!(written, vec!["/up/a.css", "/up/b.js"]);
        assert_eq!(fs.get("/up/b.js"), Some("1"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut fs = FileSystem::new();
        fs.set("/x", "1");
        let json = serde_json::to_value(&fs).unwrap();
        assert_eq!(json, serde_json::json!({"/x": "1"}));
    }

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder("/a/.placeholder"));
        assert!(!is_placeholder("/a/placeholder"));
    }
}
