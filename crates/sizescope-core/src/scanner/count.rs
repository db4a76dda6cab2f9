/// Concurrent pre-count of the items under a scan root.
///
/// Gives the progress bar a denominator. The count runs on its own thread
/// with a `jwalk` walk over a rayon pool, applies the same hidden-entry rule
/// as the authoritative walk and skips anything it cannot read. It is only
/// an estimate: the tracker caps progress at 1.0 when it undershoots.
use crate::scanner::progress::ProgressTracker;
use crate::scanner::CancelToken;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Entries counted between two published estimates.
pub const PUBLISH_INTERVAL: u64 = 100;

/// Count entries below `root` on a background thread named
/// `sizescope-counter`.
///
/// Running totals are published to `tracker` under `generation`; the
/// thread returns the final count. It stops early once `cancel` is set.
pub fn spawn_counter(
    root: PathBuf,
    ignore_hidden: bool,
    cancel: CancelToken,
    tracker: Arc<ProgressTracker>,
    generation: u64,
) -> io::Result<JoinHandle<u64>> {
    thread::Builder::new()
        .name("sizescope-counter".into())
        .spawn(move || count_items(&root, ignore_hidden, &cancel, &tracker, generation))
}

/// Count synchronously. Exposed for callers that already own a thread.
pub fn count_items(
    root: &Path,
    ignore_hidden: bool,
    cancel: &CancelToken,
    tracker: &ProgressTracker,
    generation: u64,
) -> u64 {
    let walker = jwalk::WalkDir::new(root)
        .skip_hidden(ignore_hidden)
        .follow_links(false)
        .min_depth(1)
        .parallelism(jwalk::Parallelism::RayonNewPool(num_cpus::get()));

    let mut count: u64 = 0;
    for entry in walker {
        if cancel.is_cancelled() {
            debug!("Pre-count of {} cancelled at {count}", root.display());
            return count;
        }
        if entry.is_err() {
            continue;
        }
        count += 1;
        if count.is_multiple_of(PUBLISH_INTERVAL)
            && !tracker.set_total_items(generation, count)
        {
            // A newer scan owns the tracker; nobody needs this count.
            return count;
        }
    }

    tracker.set_total_items(generation, count);
    debug!("Pre-count of {} finished: {count} items", root.display());
    count
}
