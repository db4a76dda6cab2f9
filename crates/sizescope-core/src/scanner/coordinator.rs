/// Scan lifecycle: one scan at a time, on a background thread.
///
/// `Idle → Running → {Completed | Cancelled | Failed} → Idle`
///
/// The coordinator owns everything that outlives a single scan (history,
/// the last result, the last outcome) behind one `parking_lot::Mutex`.
/// Progress counters live in the shared [`ProgressTracker`] so status reads
/// never contend with that lock.
use crate::config::Settings;
use crate::error::{ScanError, StoreError};
use crate::model::FileEntry;
use crate::scanner::aggregate::aggregate_sizes;
use crate::scanner::builder::build_tree;
use crate::scanner::count::spawn_counter;
use crate::scanner::paths::normalize_path;
use crate::scanner::progress::{ProgressTracker, ScanEvent, ScanStatus};
use crate::scanner::{CancelToken, Completion};
use crate::store::{new_result_id, trim_for_storage, ResultStore, ScanHistory, ScanRecord};
use chrono::Utc;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Capacity of a scan's event channel. A scan sends at most two events.
pub const EVENT_CHANNEL_CAPACITY: usize = 8;

/// What to scan.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub path: PathBuf,
    pub ignore_hidden: bool,
    /// Overrides `Settings::scan.pre_count` when set.
    pub pre_count: Option<bool>,
}

impl ScanRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ignore_hidden: false,
            pre_count: None,
        }
    }

    pub fn with_ignore_hidden(mut self, ignore_hidden: bool) -> Self {
        self.ignore_hidden = ignore_hidden;
        self
    }

    pub fn with_pre_count(mut self, pre_count: bool) -> Self {
        self.pre_count = Some(pre_count);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Running,
}

/// Terminal state of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed,
    /// Stopped early; the partial tree was still aggregated and stored.
    Cancelled,
    /// Nothing was produced.
    Failed,
}

/// Everything a finished scan thread returns.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    pub root_path: PathBuf,
    pub total_size: u64,
    /// History record, if the result was persisted.
    pub record: Option<ScanRecord>,
    /// The full, untrimmed tree. `None` only for failed scans.
    pub result: Option<Arc<FileEntry>>,
    pub error: Option<String>,
    pub duration: Duration,
}

impl ScanReport {
    fn failed(root_path: PathBuf, message: String, duration: Duration) -> Self {
        Self {
            outcome: ScanOutcome::Failed,
            root_path,
            total_size: 0,
            record: None,
            result: None,
            error: Some(message),
            duration,
        }
    }

    /// Terminal event matching this report.
    pub fn event(&self) -> ScanEvent {
        match self.outcome {
            ScanOutcome::Completed => ScanEvent::Completed {
                total_size: self.total_size,
                record: self.record.clone(),
            },
            ScanOutcome::Cancelled => ScanEvent::Cancelled {
                total_size: self.total_size,
                record: self.record.clone(),
            },
            ScanOutcome::Failed => ScanEvent::Failed {
                message: self.error.clone().unwrap_or_default(),
            },
        }
    }
}

/// Handle to a running scan.
pub struct ScanHandle {
    /// `Started`, then exactly one terminal event.
    pub events: Receiver<ScanEvent>,
    cancel: CancelToken,
    thread: JoinHandle<ScanReport>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the scan thread ends. By then the coordinator is idle
    /// again.
    pub fn wait(self) -> Result<ScanReport, ScanError> {
        self.thread.join().map_err(|_| ScanError::Aborted)
    }
}

struct CoordinatorState {
    phase: ScanPhase,
    cancel: Option<CancelToken>,
    history: ScanHistory,
    last_result: Option<Arc<FileEntry>>,
    last_outcome: Option<ScanOutcome>,
}

struct Inner {
    state: Mutex<CoordinatorState>,
    tracker: Arc<ProgressTracker>,
    store: ResultStore,
    settings: Settings,
}

/// Parameters of one scan, moved onto the scan thread.
struct ScanJob {
    root: PathBuf,
    ignore_hidden: bool,
    pre_count: bool,
    cancel: CancelToken,
    generation: u64,
}

/// Returns the coordinator to `Idle` when the scan thread ends, including
/// by panic.
struct IdleGuard {
    inner: Arc<Inner>,
}

impl Drop for IdleGuard {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        if thread::panicking() {
            error!("Scan thread panicked");
            state.last_outcome = Some(ScanOutcome::Failed);
        }
        state.phase = ScanPhase::Idle;
        state.cancel = None;
        self.inner.tracker.finish();
    }
}

/// Runs scans and keeps their history. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ScanCoordinator {
    inner: Arc<Inner>,
}

impl ScanCoordinator {
    /// Create a coordinator over `settings.data_dir`, loading any stored
    /// history. An unreadable history file is logged and treated as empty.
    pub fn new(settings: Settings) -> Self {
        let store = ResultStore::new(&settings.data_dir);
        let history = store.load_history().unwrap_or_else(|e| {
            warn!("Could not load scan history: {e}");
            ScanHistory::new()
        });
        debug!(
            "Coordinator using {} ({} history records)",
            store.dir().display(),
            history.len()
        );

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CoordinatorState {
                    phase: ScanPhase::Idle,
                    cancel: None,
                    history,
                    last_result: None,
                    last_outcome: None,
                }),
                tracker: Arc::new(ProgressTracker::new()),
                store,
                settings,
            }),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Start a scan on a background thread named `sizescope-scanner`.
    ///
    /// Fails with [`ScanError::AlreadyRunning`] while another scan runs and
    /// with [`ScanError::RootAccess`] if the root cannot be stat-ed.
    pub fn start_scan(&self, request: ScanRequest) -> Result<ScanHandle, ScanError> {
        let mut state = self.inner.state.lock();
        if state.phase == ScanPhase::Running {
            return Err(ScanError::AlreadyRunning);
        }

        let root = normalize_path(&request.path).map_err(|source| ScanError::RootAccess {
            path: request.path.clone(),
            source,
        })?;
        std::fs::metadata(&root).map_err(|source| ScanError::RootAccess {
            path: root.clone(),
            source,
        })?;

        let cancel = CancelToken::new();
        state.phase = ScanPhase::Running;
        state.cancel = Some(cancel.clone());
        let generation = self.inner.tracker.begin(&root, &self.inner.settings.stall);
        drop(state);

        let job = ScanJob {
            root,
            ignore_hidden: request.ignore_hidden,
            pre_count: request
                .pre_count
                .unwrap_or(self.inner.settings.scan.pre_count),
            cancel: cancel.clone(),
            generation,
        };
        let (events_tx, events_rx) = crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY);
        let inner = self.inner.clone();

        let spawned = thread::Builder::new()
            .name("sizescope-scanner".into())
            .spawn(move || {
                let guard = IdleGuard {
                    inner: inner.clone(),
                };
                let report = inner.run(job, &events_tx);
                drop(guard);
                // Sent after going idle so a listener may start the next scan
                // as soon as it sees this.
                let _ = events_tx.send(report.event());
                report
            });

        match spawned {
            Ok(thread) => Ok(ScanHandle {
                events: events_rx,
                cancel,
                thread,
            }),
            Err(e) => {
                let mut state = self.inner.state.lock();
                state.phase = ScanPhase::Idle;
                state.cancel = None;
                self.inner.tracker.finish();
                Err(ScanError::Spawn(e))
            }
        }
    }

    /// Signal the running scan to stop. Returns `true` iff a scan was running.
    pub fn cancel(&self) -> bool {
        let state = self.inner.state.lock();
        match (&state.phase, &state.cancel) {
            (ScanPhase::Running, Some(token)) => {
                info!("Cancellation requested");
                token.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.inner.state.lock().phase
    }

    pub fn is_running(&self) -> bool {
        self.phase() == ScanPhase::Running
    }

    pub fn status(&self) -> ScanStatus {
        self.inner.tracker.snapshot()
    }

    /// Stored records, newest first.
    pub fn history(&self) -> Vec<ScanRecord> {
        self.inner.state.lock().history.records().to_vec()
    }

    /// The untrimmed tree of the most recent scan in this process.
    pub fn latest_result(&self) -> Option<Arc<FileEntry>> {
        self.inner.state.lock().last_result.clone()
    }

    /// A persisted (trimmed) result by id.
    pub fn result(&self, id: &str) -> Result<FileEntry, StoreError> {
        self.inner.store.load_result(id)
    }

    pub fn last_outcome(&self) -> Option<ScanOutcome> {
        self.inner.state.lock().last_outcome
    }
}

impl Inner {
    /// Body of the scan thread, up to (not including) the terminal event.
    fn run(&self, job: ScanJob, events: &Sender<ScanEvent>) -> ScanReport {
        let start = Instant::now();
        let root = job.root;
        info!("Starting scan of {}", root.display());
        let _ = events.send(ScanEvent::Started { root: root.clone() });

        // The counter gets its own token so it can be stopped once the walk
        // is over without marking the scan itself as cancelled.
        let counter_cancel = CancelToken::new();
        let counter = if job.pre_count {
            match spawn_counter(
                root.clone(),
                job.ignore_hidden,
                counter_cancel.clone(),
                self.tracker.clone(),
                job.generation,
            ) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("Could not start pre-count: {e}");
                    None
                }
            }
        } else {
            None
        };

        let built = build_tree(&root, job.ignore_hidden, &job.cancel, &self.tracker);

        counter_cancel.cancel();
        if let Some(handle) = counter {
            if handle.join().is_err() {
                warn!("Pre-count thread panicked");
            }
        }

        let mut output = match built {
            Ok(output) => output,
            Err(e) => {
                error!("Scan of {} failed: {e}", root.display());
                self.state.lock().last_outcome = Some(ScanOutcome::Failed);
                return ScanReport::failed(root, e.to_string(), start.elapsed());
            }
        };

        let total_size = aggregate_sizes(&mut output.tree, &output.index);
        let entry = Arc::new(output.tree.to_file_entry(output.tree.root()));
        drop(output.tree);
        drop(output.index);

        let outcome = match output.completion {
            Completion::Finished => ScanOutcome::Completed,
            Completion::Cancelled => ScanOutcome::Cancelled,
        };

        let record = self.persist(&root, &entry, total_size);

        {
            let mut state = self.state.lock();
            state.last_result = Some(entry.clone());
            state.last_outcome = Some(outcome);
            if let Some(record) = &record {
                state.history.push(record.clone());
                if let Err(e) = self.store.save_history(&state.history) {
                    warn!("Could not save scan history: {e}");
                }
            }
        }

        let duration = start.elapsed();
        info!(
            "Scan of {} {:?}: {} bytes, {} entries in {:?}",
            root.display(),
            outcome,
            total_size,
            entry.entry_count(),
            duration
        );

        ScanReport {
            outcome,
            root_path: root,
            total_size,
            record,
            result: Some(entry),
            error: None,
            duration,
        }
    }

    /// Store a trimmed copy of `entry`. No record is produced unless the
    /// result file was written.
    fn persist(&self, root: &Path, entry: &FileEntry, size: u64) -> Option<ScanRecord> {
        let trimmed = trim_for_storage(entry, &self.settings.trim);
        let result_id = new_result_id();
        match self.store.save_result(&result_id, &trimmed) {
            Ok(_) => Some(ScanRecord {
                path: root.to_string_lossy().into_owned(),
                timestamp: Utc::now(),
                result_id,
                size,
            }),
            Err(e) => {
                warn!("Could not save scan result {result_id}: {e}");
                None
            }
        }
    }
}
