/// Owned, serializable result tree.
///
/// This is the shape handed to callers and written to disk. It is produced
/// once from the arena after aggregation and never mutated afterwards,
/// except by the storage trimming pass, which works on its own copy.
use serde::{Deserialize, Serialize};

use super::file_node::EntryNode;
use super::stats::FileTypeStats;

/// One file or directory in a scan result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub is_dir: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extension: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_types: Option<FileTypeStats>,
}

impl FileEntry {
    /// Build an entry from an arena node and its already-converted children.
    pub fn from_node(node: &EntryNode, children: Vec<FileEntry>) -> Self {
        Self {
            name: node.name.to_string(),
            path: node.path.to_string_lossy().into_owned(),
            size: node.size,
            is_dir: node.is_dir,
            extension: node.extension.to_string(),
            children,
            file_types: node.file_types,
        }
    }

    /// Number of entries in this subtree, including `self`.
    pub fn entry_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| count += 1);
        count
    }

    /// Depth-first, pre-order visit of every entry with its depth (root = 0).
    pub fn walk<F: FnMut(&FileEntry, usize)>(&self, mut visit: F) {
        let mut stack: Vec<(&FileEntry, usize)> = vec![(self, 0)];
        while let Some((entry, depth)) = stack.pop() {
            visit(entry, depth);
            // Reverse so the first child is visited first.
            for child in entry.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&FileEntry> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children sorted by size, largest first.
    pub fn children_sorted_by_size(&self) -> Vec<&FileEntry> {
        let mut children: Vec<&FileEntry> = self.children.iter().collect();
        children.sort_by(|a, b| b.size.cmp(&a.size));
        children
    }
}
