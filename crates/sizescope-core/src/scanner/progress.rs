/// Scan progress reporting.
///
/// The scan thread updates a [`ProgressTracker`] for every entry it accepts;
/// any thread may take a [`ScanStatus`] snapshot at any time. Terminal
/// lifecycle notifications travel separately as [`ScanEvent`]s over a
/// crossbeam channel.
use crate::config::StallSettings;
use crate::scanner::stall::StallDetector;
use crate::store::ScanRecord;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Point-in-time copy of the running scan's progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatus {
    pub in_progress: bool,
    pub current_path: String,
    pub scanned_items: u64,
    pub total_items: u64,
    /// `scanned_items / max(total_items, 1)`, capped at 1.0.
    pub progress: f64,
    pub stalled: bool,
}

/// Fraction of work done. A zero total reads as one; the estimate may lag
/// behind the real count, so the result is capped at 1.0.
pub fn progress_fraction(scanned: u64, total: u64) -> f64 {
    let total = total.max(1);
    (scanned as f64 / total as f64).min(1.0)
}

/// Lifecycle notifications sent from the scan thread.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// The walk has begun on the normalized root.
    Started { root: PathBuf },
    /// The walk finished and the result was aggregated. `record` is `None`
    /// when the result could not be persisted.
    Completed {
        total_size: u64,
        record: Option<ScanRecord>,
    },
    /// The walk was cancelled; the partial result was still aggregated.
    Cancelled {
        total_size: u64,
        record: Option<ScanRecord>,
    },
    /// The scan failed before producing any result.
    Failed { message: String },
}

#[derive(Debug)]
struct TrackerState {
    generation: u64,
    in_progress: bool,
    current_path: String,
    scanned_items: u64,
    total_items: u64,
    stall: StallDetector,
}

/// Mutex-guarded progress counters for the running scan.
///
/// Each scan gets a new generation number from [`begin`](Self::begin);
/// estimates published for an older generation are dropped.
#[derive(Debug)]
pub struct ProgressTracker {
    state: Mutex<TrackerState>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackerState {
                generation: 0,
                in_progress: false,
                current_path: String::new(),
                scanned_items: 0,
                total_items: 0,
                stall: StallDetector::new(),
            }),
        }
    }

    /// Reset all counters for a new scan of `root` and return its generation.
    pub fn begin(&self, root: &Path, stall: &StallSettings) -> u64 {
        let mut state = self.state.lock();
        state.generation += 1;
        state.in_progress = true;
        state.current_path = root.to_string_lossy().into_owned();
        state.scanned_items = 0;
        state.total_items = 0;
        state.stall = StallDetector::from_settings(stall);
        state.stall.reset();
        state.generation
    }

    /// Count one accepted entry and make it the current path.
    pub fn record_item(&self, path: &Path) {
        let mut state = self.state.lock();
        state.scanned_items += 1;
        state.current_path = path.to_string_lossy().into_owned();
        let scanned = state.scanned_items;
        state.stall.update_activity(scanned);
    }

    /// Publish a total-item estimate for scan `generation`.
    ///
    /// Returns `false` (and changes nothing) if that scan is no longer the
    /// current one.
    pub fn set_total_items(&self, generation: u64, total: u64) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        state.total_items = total;
        true
    }

    /// Mark the current scan as no longer running.
    pub fn finish(&self) {
        self.state.lock().in_progress = false;
    }

    /// Copy the current counters out from under the lock.
    pub fn snapshot(&self) -> ScanStatus {
        let state = self.state.lock();
        ScanStatus {
            in_progress: state.in_progress,
            current_path: state.current_path.clone(),
            scanned_items: state.scanned_items,
            total_items: state.total_items,
            progress: progress_fraction(state.scanned_items, state.total_items),
            stalled: state.in_progress && state.stall.is_stalled(),
        }
    }
}
