/// Scanner module: walks a directory, sizes it, and reports progress.
///
/// The pieces run in this order on the scan thread:
/// - [`builder`] walks the filesystem depth-first into an arena tree.
/// - [`aggregate`] recomputes directory sizes and category totals bottom-up.
/// - [`coordinator`] owns the lifecycle: one scan at a time, cancellation,
///   persistence and history.
///
/// [`count`] runs beside the builder on its own thread to estimate the total
/// item count; [`progress`] and [`stall`] expose liveness to any reader.
pub mod aggregate;
pub mod builder;
pub mod coordinator;
pub mod count;
pub mod paths;
pub mod progress;
pub mod stall;

pub use aggregate::aggregate_sizes;
pub use builder::{build_tree, BuildOutput};
pub use coordinator::{ScanCoordinator, ScanHandle, ScanOutcome, ScanPhase, ScanReport, ScanRequest};
pub use progress::{ProgressTracker, ScanEvent, ScanStatus};
pub use stall::StallDetector;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a scan and its controller.
///
/// Cloning shares the flag. Once cancelled it stays cancelled; every scan
/// gets a fresh token.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the scan to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a tree walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every reachable entry was visited.
    Finished,
    /// The walk stopped at a cancellation checkpoint; the tree is partial.
    Cancelled,
}
