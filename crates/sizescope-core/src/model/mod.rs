/// Data model for SizeScope scan results.
///
/// The arena tree (`EntryTree`) is what the scanner builds and aggregates;
/// `FileEntry` is the owned snapshot handed out and persisted.
pub mod entry;
pub mod file_node;
pub mod file_tree;
pub mod size;
pub mod stats;

pub use entry::FileEntry;
pub use file_node::{EntryNode, NodeIndex};
pub use file_tree::{EntryTree, PathIndex};
pub use size::{format_bytes, format_count};
pub use stats::FileTypeStats;
