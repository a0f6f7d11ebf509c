//! Folder/file tree derived from the store's keys.

use super::{FileSystem, PLACEHOLDER_FILE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

/// A node of the visual tree.
///
/// Folder paths end with `/`; file paths are the store key itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Depth-first search for the node at `path`.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }
}

#[derive(Default)]
struct Branch {
    path: String,
    kind: Option<NodeKind>,
    children: BTreeMap<String, Branch>,
}

impl Branch {
    fn into_nodes(self) -> Vec<TreeNode> {
        let mut nodes: Vec<TreeNode> = self
            .children
            .into_iter()
            .map(|(name, branch)| TreeNode {
                name,
                path: branch.path.clone(),
                kind: branch.kind.unwrap_or(NodeKind::Folder),
                children: branch.into_nodes(),
            })
            .collect();

        nodes.sort_by(|a, b| match (a.kind, b.kind) {
            (NodeKind::Folder, NodeKind::File) => std::cmp::Ordering::Less,
            (NodeKind::File, NodeKind::Folder) => std::cmp::Ordering::Greater,
            _ => a.name.cmp(&b.name),
        });
        nodes
    }
}

/// Builds the visual tree for every key in `fs`.
///
/// Keys are processed in sorted order and the first key that reaches a
/// segment decides its kind, so a file `/a` wins over a folder `/a/...`.
/// Placeholder entries do not appear, but their parent folders do.
pub fn build_tree(fs: &FileSystem) -> Vec<TreeNode> {
    let mut root = Branch::default();

    for key in fs.paths() {
        let effective = match key.strip_suffix(PLACEHOLDER_FILE) {
            Some(dir) if dir.ends_with('/') => dir,
            _ => key,
        };

        let parts: Vec<&str> = effective.split('/').filter(|p| !p.is_empty()).collect();
        let mut cursor = &mut root;

        for (i, part) in parts.iter().enumerate() {
            let is_last = i == parts.len() - 1;
            let is_file = is_last && !effective.ends_with('/');
            let joined = format!("/{}", parts[..=i].join("/"));

            cursor = cursor.children.entry(part.to_string()).or_default();
            if cursor.kind.is_none() {
                if is_file {
                    cursor.kind = Some(NodeKind::File);
                    cursor.path = joined;
                } else {
                    cursor.kind = Some(NodeKind::Folder);
                    cursor.path = format!("{}/", joined);
                }
            }
        }
    }

    root.into_nodes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_folders_first_then_lexicographic() {
        let fs: FileSystem = [
            ("/proj/zeta.txt", ""),
            ("/proj/alpha.txt", ""),
            ("/proj/src/main.ts", ""),
            ("/proj/assets/logo.svg", ""),
        ]
        .into_iter()
        .collect();

        let tree = build_tree(&fs);
        assert_eq!(names(&tree), vec!["proj"]);
        let proj = &tree[0];
        assert_eq!(proj.path, "/proj/");
        assert_eq!(proj.kind, NodeKind::Folder);
        assert_eq!(
            names(&proj.children),
            vec!["assets", "src", "alpha.txt", "zeta.txt"]
        );
        assert_eq!(proj.children[1].children[0].path, "/proj/src/main.ts");
    }

    #[test]
    fn test_insertion_order_independent() {
        let mut a = FileSystem::new();
        a.set("/b/x.js", "");
        a.set("/a.txt", "");
        a.set("/b/c/d.css", "");

        let mut b = FileSystem::new();
        b.set("/b/c/d.css", "");
        b.set("/a.txt", "");
        b.set("/b/x.js", "");

        assert_eq!(build_tree(&a), build_tree(&b));
    }

    #[test]
    fn test_placeholder_keeps_empty_folder() {
        let mut fs = FileSystem::new();
        fs.set("/proj/empty/.placeholder", "");

        let tree = build_tree(&fs);
        let empty = tree[0].find("/proj/empty/").expect("folder should exist");
        assert!(empty.is_folder());
        assert!(empty.children.is_empty());
    }

    #[test]
    fn test_file_wins_over_same_named_folder() {
        let mut fs = FileSystem::new();
        fs.set("/a", "file");
        fs.set("/a/b.txt", "child");

        let tree = build_tree(&fs);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].kind, NodeKind::File);
        assert_eq!(tree[0].path, "/a");
        assert_eq!(tree[0].children[0].path, "/a/b.txt");
    }

    #[test]
    fn test_empty_store() {
        assert!(build_tree(&FileSystem::new()).is_empty());
    }
}
