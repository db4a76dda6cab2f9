/// Arena-backed entry tree produced by the builder and sized by the
/// aggregator.
///
/// All nodes live in a single `Vec<EntryNode>`. The tree is owned by the scan
/// thread for the whole walk and aggregation, then converted into an owned
/// [`FileEntry`] snapshot.
use super::entry::FileEntry;
use super::file_node::{EntryNode, NodeIndex};
use std::collections::HashMap;
use std::path::PathBuf;

/// Mapping from normalized absolute path to directory handle.
///
/// Lives only for the duration of one scan.
pub type PathIndex = HashMap<PathBuf, NodeIndex>;

/// The complete entry tree produced by a scan.
#[derive(Debug, Clone)]
pub struct EntryTree {
    /// Arena: every node in a flat vector. The root is always index 0.
    pub nodes: Vec<EntryNode>,
}

impl EntryTree {
    /// Create an empty tree with pre-allocated capacity.
    pub fn with_capacity(estimated_nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(estimated_nodes),
        }
    }

    /// Handle of the scan root.
    #[inline]
    pub fn root(&self) -> NodeIndex {
        NodeIndex::new(0)
    }

    /// Allocate a new node in the arena and return its index.
    pub fn add_node(&mut self, node: EntryNode) -> NodeIndex {
        let idx = NodeIndex::new(self.nodes.len());
        self.nodes.push(node);
        idx
    }

    /// Attach `child` as the last child of `parent`, preserving listing order.
    pub fn add_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.nodes[child.idx()].parent = Some(parent);
        self.nodes[parent.idx()].children.push(child);
    }

    /// Get the node at the given index.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &EntryNode {
        &self.nodes[index.idx()]
    }

    /// Get a mutable reference to the node at the given index.
    #[inline]
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut EntryNode {
        &mut self.nodes[index.idx()]
    }

    /// Total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree contains no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Convert the subtree rooted at `index` into an owned [`FileEntry`].
    ///
    /// Children keep their listing order. Runs post-order on an explicit
    /// stack: finished entries wait on `built` until their parent collects
    /// them, so deep trees never recurse.
    pub fn to_file_entry(&self, index: NodeIndex) -> FileEntry {
        let mut stack: Vec<(NodeIndex, bool)> = vec![(index, false)];
        let mut built: Vec<FileEntry> = Vec::new();

        while let Some((idx, expanded)) = stack.pop() {
            let node = &self.nodes[idx.idx()];
            if expanded {
                let children = built.split_off(built.len() - node.children.len());
                built.push(FileEntry::from_node(node, children));
            } else {
                stack.push((idx, true));
                for &child in node.children.iter().rev() {
                    stack.push((child, false));
                }
            }
        }

        debug_assert_eq!(built.len(), 1);
        built
            .pop()
            .unwrap_or_else(|| FileEntry::from_node(&self.nodes[index.idx()], Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;

    fn dir(tree: &mut EntryTree, name: &str, path: &str, parent: Option<NodeIndex>) -> NodeIndex {
        let idx = tree.add_node(EntryNode::new_dir(
            CompactString::new(name),
            PathBuf::from(path),
            parent,
        ));
        if let Some(p) = parent {
            tree.add_child(p, idx);
        }
        idx
    }

    fn file(tree: &mut EntryTree, name: &str, path: &str, size: u64, parent: NodeIndex) {
        let idx = tree.add_node(EntryNode::new_file(
            CompactString::new(name),
            PathBuf::from(path),
            size,
            CompactString::new("txt"),
            Some(parent),
        ));
        tree.add_child(parent, idx);
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut tree = EntryTree::with_capacity(4);
        let root = dir(&mut tree, "root", "/root", None);
        file(&mut tree, "b.txt", "/root/b.txt", 2, root);
        file(&mut tree, "a.txt", "/root/a.txt", 1, root);
        file(&mut tree, "c.txt", "/root/c.txt", 3, root);

        let names: Vec<_> = tree
            .node(root)
            .children
            .iter()
            .map(|c| tree.node(*c).name.as_str())
            .collect();
        assert_eq!(names, vec!["b.txt", "a.txt", "c.txt"]);
    }

    #[test]
    fn to_file_entry_mirrors_arena_shape() {
        let mut tree = EntryTree::with_capacity(5);
        let root = dir(&mut tree, "root", "/root", None);
        let sub = dir(&mut tree, "sub", "/root/sub", Some(root));
        file(&mut tree, "x.txt", "/root/sub/x.txt", 10, sub);
        file(&mut tree, "y.txt", "/root/y.txt", 20, root);

        let entry = tree.to_file_entry(tree.root());
        assert_eq!(entry.name, "root");
        assert_eq!(entry.children.len(), 2);
        assert_eq!(entry.children[0].name, "sub");
        assert_eq!(entry.children[0].children[0].path, "/root/sub/x.txt");
        assert_eq!(entry.children[1].size, 20);
        assert!(entry.children[1].children.is_empty());
    }

    #[test]
    fn to_file_entry_converts_subtrees() {
        let mut tree = EntryTree::with_capacity(4);
        let root = dir(&mut tree, "root", "/root", None);
        let sub = dir(&mut tree, "sub", "/root/sub", Some(root));
        file(&mut tree, "x.txt", "/root/sub/x.txt", 10, sub);
        file(&mut tree, "y.txt", "/root/y.txt", 20, root);

        let entry = tree.to_file_entry(sub);
        assert_eq!(entry.name, "sub");
        assert_eq!(entry.children.len(), 1);
        assert_eq!(entry.children[0].name, "x.txt");
    }

    #[test]
    fn to_file_entry_handles_deep_chains() {
        const DEPTH: usize = 10_000;

        // A small stack: the conversion must not recurse per level.
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let mut tree = EntryTree::with_capacity(DEPTH + 1);
                let mut parent = dir(&mut tree, "root", "/root", None);
                for _ in 0..DEPTH {
                    parent = dir(&mut tree, "d", "/d", Some(parent));
                }
                file(&mut tree, "leaf.txt", "/leaf.txt", 7, parent);

                let mut entry = tree.to_file_entry(tree.root());
                // Unwind level by level; dropping the chain whole would recurse.
                let mut depth = 0;
                while let Some(child) = entry.children.pop() {
                    depth += 1;
                    entry = child;
                }
                (depth, entry.name)
            })
            .unwrap();

        let (depth, leaf) = handle.join().unwrap();
        assert_eq!(depth, DEPTH + 1);
        assert_eq!(leaf, "leaf.txt");
    }
}
