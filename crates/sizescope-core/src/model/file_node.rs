/// A single node in the arena-allocated entry tree.
///
/// Nodes are stored in a flat `Vec<EntryNode>`. Parent-child relationships
/// use indices rather than pointers, so the tree built during a scan never
/// aliases the `FileEntry` snapshot handed out afterwards.
use compact_str::CompactString;
use std::path::PathBuf;

use super::stats::FileTypeStats;

/// Lightweight index into the arena `Vec<EntryNode>`.
///
/// Uses `u32` to keep nodes small; supports up to ~4 billion nodes,
/// which is more than enough for any real filesystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Create a new `NodeIndex` from a `usize`.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "NodeIndex overflow");
        Self(index as u32)
    }

    /// Return the index as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A single file or directory in the tree.
#[derive(Debug, Clone)]
pub struct EntryNode {
    /// Final path segment.
    pub name: CompactString,

    /// Absolute, normalized path. Unique within one tree and used as the
    /// key of the scan's path index.
    pub path: PathBuf,

    /// Logical size in bytes.
    /// Files carry their stat size from the walk; directories start at 0 and
    /// receive the sum of their children in the aggregation pass.
    pub size: u64,

    /// `true` if this node represents a directory.
    pub is_dir: bool,

    /// Extension without the leading dot. Always empty for directories.
    pub extension: CompactString,

    /// Index of the parent node. `None` for the scan root.
    pub parent: Option<NodeIndex>,

    /// Children in directory-listing order.
    pub children: Vec<NodeIndex>,

    /// Per-category byte totals. Set on directories by the aggregation pass.
    pub file_types: Option<FileTypeStats>,
}

impl EntryNode {
    /// Create a new file node with its stat size.
    pub fn new_file(
        name: CompactString,
        path: PathBuf,
        size: u64,
        extension: CompactString,
        parent: Option<NodeIndex>,
    ) -> Self {
        Self {
            name,
            path,
            size,
            is_dir: false,
            extension,
            parent,
            children: Vec::new(),
            file_types: None,
        }
    }

    /// Create a new directory node. Size stays 0 until aggregation.
    pub fn new_dir(name: CompactString, path: PathBuf, parent: Option<NodeIndex>) -> Self {
        Self {
            name,
            path,
            size: 0,
            is_dir: true,
            extension: CompactString::default(),
            parent,
            children: Vec::new(),
            file_types: None,
        }
    }
}
