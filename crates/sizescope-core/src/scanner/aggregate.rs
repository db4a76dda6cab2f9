/// Bottom-up size and category aggregation.
///
/// Uses an explicit stack instead of recursion, so arbitrarily deep trees
/// cannot overflow the scan thread's stack. Every directory's totals are
/// derived from its children only, which makes the pass idempotent.
use crate::analysis::categorise_extension;
use crate::model::{EntryTree, FileTypeStats, PathIndex};
use tracing::warn;

/// Recompute every directory's size and [`FileTypeStats`] and return the
/// root's total.
///
/// Subdirectories are resolved through `index`. A directory missing from
/// the index contributes nothing and has its own totals zeroed, so the
/// parent's sum still matches its children.
pub fn aggregate_sizes(tree: &mut EntryTree, index: &PathIndex) -> u64 {
    if tree.is_empty() {
        return 0;
    }
    let root = tree.root();
    if !tree.node(root).is_dir {
        return tree.node(root).size;
    }

    // (node, children_done). A node is pushed twice: once to schedule its
    // subdirectories, once more to sum them after they have been visited.
    let mut stack = vec![(root, false)];

    while let Some((idx, children_done)) = stack.pop() {
        if !children_done {
            stack.push((idx, true));
            for &child in &tree.node(idx).children {
                let node = tree.node(child);
                if node.is_dir {
                    if let Some(&resolved) = index.get(&node.path) {
                        stack.push((resolved, false));
                    }
                }
            }
            continue;
        }

        let mut size: u64 = 0;
        let mut stats = FileTypeStats::default();

        for i in 0..tree.node(idx).children.len() {
            let child = tree.node(idx).children[i];
            let node = tree.node(child);

            if !node.is_dir {
                stats.add(categorise_extension(&node.extension), node.size);
                size += node.size;
                continue;
            }

            match index.get(&node.path) {
                Some(&resolved) => {
                    let sub = tree.node(resolved);
                    size += sub.size;
                    stats.merge(&sub.file_types.unwrap_or_default());
                }
                None => {
                    warn!(
                        "Directory {} missing from path index; counting it as empty",
                        node.path.display()
                    );
                    let orphan = tree.node_mut(child);
                    orphan.size = 0;
                    orphan.file_types = Some(FileTypeStats::default());
                }
            }
        }

        let dir = tree.node_mut(idx);
        dir.size = size;
        dir.file_types = Some(stats);
    }

    tree.node(root).size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FileCategory;
    use crate::model::{EntryNode, NodeIndex};
    use compact_str::CompactString;
    use std::path::PathBuf;

    struct Fixture {
        tree: EntryTree,
        index: PathIndex,
    }

    impl Fixture {
        fn new() -> Self {
            let mut tree = EntryTree::with_capacity(8);
            let mut index = PathIndex::new();
            let root = tree.add_node(EntryNode::new_dir(
                CompactString::new("r"),
                PathBuf::from("/r"),
                None,
            ));
            index.insert(PathBuf::from("/r"), root);
            Self { tree, index }
        }

        fn dir(&mut self, parent: NodeIndex, path: &str) -> NodeIndex {
            let name = path.rsplit('/').next().unwrap();
            let idx = self.tree.add_node(EntryNode::new_dir(
                CompactString::new(name),
                PathBuf::from(path),
                None,
            ));
            self.tree.add_child(parent, idx);
            self.index.insert(PathBuf::from(path), idx);
            idx
        }

        fn file(&mut self, parent: NodeIndex, path: &str, size: u64) -> NodeIndex {
            let name = path.rsplit('/').next().unwrap();
            let ext = crate::scanner::paths::extension_of(name);
            let idx = self.tree.add_node(EntryNode::new_file(
                CompactString::new(name),
                PathBuf::from(path),
                size,
                CompactString::new(ext),
                None,
            ));
            self.tree.add_child(parent, idx);
            idx
        }
    }

    fn assert_invariants(tree: &EntryTree) {
        for node in tree.nodes.iter().filter(|n| n.is_dir) {
            let sum: u64 = node.children.iter().map(|&c| tree.node(c).size).sum();
            assert_eq!(node.size, sum, "size of {}", node.path.display());
            let stats = node.file_types.expect("aggregated directory has stats");
            assert_eq!(stats.total(), node.size, "stats of {}", node.path.display());
        }
    }

    #[test]
    fn sums_nested_directories() {
        let mut f = Fixture::new();
        let root = f.tree.root();
        f.file(root, "/r/a", 100);
        f.file(root, "/r/b", 200);
        let c = f.dir(root, "/r/c");
        f.file(c, "/r/c/d", 300);

        let total = aggregate_sizes(&mut f.tree, &f.index);
        assert_eq!(total, 600);
        assert_eq!(f.tree.node(c).size, 300);
        let stats = f.tree.node(root).file_types.unwrap();
        assert_eq!(stats.other, 600);
        assert_invariants(&f.tree);
    }

    #[test]
    fn classifies_by_extension() {
        let mut f = Fixture::new();
        let root = f.tree.root();
        f.file(root, "/r/x.JPG", 10);
        f.file(root, "/r/song.mp3", 20);
        let docs = f.dir(root, "/r/docs");
        f.file(docs, "/r/docs/a.pdf", 30);
        f.file(docs, "/r/docs/b.tar.gz", 40);

        aggregate_sizes(&mut f.tree, &f.index);
        let stats = f.tree.node(root).file_types.unwrap();
        assert_eq!(stats.get(FileCategory::Image), 10);
        assert_eq!(stats.get(FileCategory::Audio), 20);
        assert_eq!(stats.get(FileCategory::Document), 30);
        assert_eq!(stats.get(FileCategory::Archive), 40);
        assert_eq!(f.tree.node(docs).file_types.unwrap().image, 0);
        assert_invariants(&f.tree);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let mut f = Fixture::new();
        let root = f.tree.root();
        let a = f.dir(root, "/r/a");
        let b = f.dir(a, "/r/a/b");
        f.file(b, "/r/a/b/f.txt", 7);
        f.file(a, "/r/a/g.png", 3);

        let first = aggregate_sizes(&mut f.tree, &f.index);
        let snapshot: Vec<_> = f.tree.nodes.iter().map(|n| (n.size, n.file_types)).collect();
        let second = aggregate_sizes(&mut f.tree, &f.index);
        let again: Vec<_> = f.tree.nodes.iter().map(|n| (n.size, n.file_types)).collect();

        assert_eq!(first, 10);
        assert_eq!(first, second);
        assert_eq!(snapshot, again);
    }

    #[test]
    fn missing_index_entry_counts_as_empty() {
        let mut f = Fixture::new();
        let root = f.tree.root();
        f.file(root, "/r/keep.txt", 5);
        let lost = f.dir(root, "/r/lost");
        f.file(lost, "/r/lost/big.bin", 1_000);
        f.index.remove(&PathBuf::from("/r/lost"));

        let total = aggregate_sizes(&mut f.tree, &f.index);
        assert_eq!(total, 5);
        assert_eq!(f.tree.node(lost).size, 0);
        assert_eq!(f.tree.node(lost).file_types, Some(FileTypeStats::default()));
    }

    #[test]
    fn empty_directory_is_zero() {
        let mut f = Fixture::new();
        let root = f.tree.root();
        let empty = f.dir(root, "/r/empty");
        assert_eq!(aggregate_sizes(&mut f.tree, &f.index), 0);
        assert_eq!(f.tree.node(empty).file_types, Some(FileTypeStats::default()));
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let mut f = Fixture::new();
        let mut parent = f.tree.root();
        let mut path = String::from("/r");
        for _ in 0..5_000 {
            path.push_str("/d");
            parent = f.dir(parent, &path);
        }
        f.file(parent, &format!("{path}/leaf.txt"), 9);

        assert_eq!(aggregate_sizes(&mut f.tree, &f.index), 9);
    }
}
