/// Depth-first tree builder.
///
/// Reads one directory listing at a time with `std::fs::read_dir`, appending
/// every accepted entry to the arena in listing order and registering each
/// directory in the path index before it is visited. Pending directories
/// wait on an explicit stack, and a listing is consumed before the next one
/// is opened, so neither the call stack nor the open descriptors grow with
/// directory depth. Per-entry errors are logged and skipped; only a root
/// that cannot be stat-ed or listed is fatal.
///
/// Cancellation is checked before every listing and at every entry, so a
/// cancelled walk returns quickly with whatever it has already built.
use crate::error::ScanError;
use crate::model::{EntryNode, EntryTree, NodeIndex, PathIndex};
use crate::scanner::paths::{extension_of, is_hidden_name, normalize_path, root_display_name};
use crate::scanner::progress::ProgressTracker;
use crate::scanner::{CancelToken, Completion};
use compact_str::CompactString;
use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Initial arena capacity; the arena grows as needed.
const INITIAL_CAPACITY: usize = 4_096;

/// One directory's entries, read in full.
///
/// On unix a `DirEntry` shares its parent's handle, so the descriptor stays
/// open until the listing is dropped.
type Listing = Vec<io::Result<DirEntry>>;

fn read_listing(path: &Path) -> io::Result<Listing> {
    Ok(fs::read_dir(path)?.collect())
}

/// Everything the builder hands to the aggregator.
#[derive(Debug)]
pub struct BuildOutput {
    pub tree: EntryTree,
    pub index: PathIndex,
    /// The normalized root that was walked.
    pub root_path: PathBuf,
    pub completion: Completion,
}

/// Walk `root` into an arena tree plus path index.
///
/// A root that is a regular file (or a link) yields a one-node tree.
pub fn build_tree(
    root: &Path,
    ignore_hidden: bool,
    cancel: &CancelToken,
    progress: &ProgressTracker,
) -> Result<BuildOutput, ScanError> {
    let start = Instant::now();
    let root_path = normalize_path(root).map_err(|source| ScanError::RootAccess {
        path: root.to_path_buf(),
        source,
    })?;

    let meta = fs::metadata(&root_path).map_err(|source| ScanError::RootAccess {
        path: root_path.clone(),
        source,
    })?;

    let mut tree = EntryTree::with_capacity(INITIAL_CAPACITY);
    let mut index = PathIndex::new();
    let name = CompactString::new(root_display_name(&root_path));

    if !meta.is_dir() {
        let extension = CompactString::new(extension_of(&name));
        tree.add_node(EntryNode::new_file(
            name,
            root_path.clone(),
            meta.len(),
            extension,
            None,
        ));
        return Ok(BuildOutput {
            tree,
            index,
            root_path,
            completion: Completion::Finished,
        });
    }

    let listing = read_listing(&root_path).map_err(|source| ScanError::RootAccess {
        path: root_path.clone(),
        source,
    })?;

    let root_idx = tree.add_node(EntryNode::new_dir(name, root_path.clone(), None));
    index.insert(root_path.clone(), root_idx);

    let mut walker = Walker {
        tree,
        index,
        ignore_hidden,
        cancel,
        progress,
        skipped: 0,
    };
    let completion = walker.walk(root_idx, root_path.clone(), listing);
    let Walker {
        tree,
        index,
        skipped,
        ..
    } = walker;

    debug!(
        "Walk of {} {:?}: {} nodes, {} directories, {} skipped in {:?}",
        root_path.display(),
        completion,
        tree.len(),
        index.len(),
        skipped,
        start.elapsed()
    );

    Ok(BuildOutput {
        tree,
        index,
        root_path,
        completion,
    })
}

/// Mutable walk state.
struct Walker<'a> {
    tree: EntryTree,
    index: PathIndex,
    ignore_hidden: bool,
    cancel: &'a CancelToken,
    progress: &'a ProgressTracker,
    skipped: u64,
}

impl Walker<'_> {
    /// Visit `root` and everything below it. `root_listing` is the root's
    /// already-read listing.
    fn walk(&mut self, root: NodeIndex, root_path: PathBuf, root_listing: Listing) -> Completion {
        let mut first = Some(root_listing);
        let mut pending: Vec<(NodeIndex, PathBuf)> = vec![(root, root_path)];
        let mut subdirs: Vec<(NodeIndex, PathBuf)> = Vec::new();

        while let Some((idx, path)) = pending.pop() {
            if self.cancel.is_cancelled() {
                return Completion::Cancelled;
            }

            let listing = match first.take() {
                Some(listing) => listing,
                None => match read_listing(&path) {
                    Ok(listing) => listing,
                    Err(err) => {
                        warn!("Cannot read directory {}: {err}", path.display());
                        self.skipped += 1;
                        continue;
                    }
                },
            };

            if self.add_listing(idx, &path, listing, &mut subdirs) == Completion::Cancelled {
                return Completion::Cancelled;
            }
            // Reversed so the first listed subdirectory is visited next.
            pending.extend(subdirs.drain(..).rev());
        }
        Completion::Finished
    }

    /// Append the entries of `listing` under `parent`. Subdirectories are
    /// added to the arena and index, and queued on `subdirs` for a later
    /// visit.
    fn add_listing(
        &mut self,
        parent: NodeIndex,
        dir_path: &Path,
        listing: Listing,
        subdirs: &mut Vec<(NodeIndex, PathBuf)>,
    ) -> Completion {
        for entry_result in listing {
            if self.cancel.is_cancelled() {
                return Completion::Cancelled;
            }

            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    warn!("Error listing {}: {err}", dir_path.display());
                    self.skipped += 1;
                    continue;
                }
            };

            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if self.ignore_hidden && is_hidden_name(&name) {
                continue;
            }

            let path = dir_path.join(&file_name);
            let meta = match fs::symlink_metadata(&path) {
                Ok(m) => m,
                Err(err) => {
                    warn!("Cannot stat {}: {err}", path.display());
                    self.skipped += 1;
                    continue;
                }
            };

            self.progress.record_item(&path);

            if meta.is_dir() {
                let node = EntryNode::new_dir(CompactString::new(&name), path.clone(), None);
                let idx = self.tree.add_node(node);
                self.tree.add_child(parent, idx);
                self.index.insert(path.clone(), idx);
                subdirs.push((idx, path));
            } else {
                let extension = CompactString::new(extension_of(&name));
                let node = EntryNode::new_file(
                    CompactString::new(&name),
                    path,
                    meta.len(),
                    extension,
                    None,
                );
                let idx = self.tree.add_node(node);
                self.tree.add_child(parent, idx);
            }
        }
        Completion::Finished
    }
}
