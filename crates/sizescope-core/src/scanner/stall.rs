/// Stall watchdog for long-running scans.
///
/// Pure bookkeeping over timestamps and an item counter: no I/O, no threads.
/// A stall is only ever reported, never acted on.
use crate::config::StallSettings;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct StallDetector {
    last_activity: Instant,
    last_item_count: u64,
    scan_start: Instant,
    stall_threshold: Duration,
    minimum_items: u64,
    startup_grace_period: Duration,
}

impl Default for StallDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl StallDetector {
    /// Detector with the default thresholds: 30 s without progress, after at
    /// least 500 items and a 10 s startup grace period.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_activity: now,
            last_item_count: 0,
            scan_start: now,
            stall_threshold: Duration::from_secs(30),
            minimum_items: 500,
            startup_grace_period: Duration::from_secs(10),
        }
    }

    /// Detector configured from settings. Zero values keep the defaults.
    pub fn from_settings(settings: &StallSettings) -> Self {
        let mut detector = Self::new();
        detector.set_stall_threshold(settings.threshold_secs);
        detector.set_minimum_items(settings.minimum_items);
        detector.set_startup_grace_period(settings.grace_period_secs);
        detector
    }

    /// Record activity. Only a strictly larger count moves the activity clock.
    pub fn update_activity(&mut self, item_count: u64) {
        if item_count > self.last_item_count {
            self.last_activity = Instant::now();
            self.last_item_count = item_count;
        }
    }

    /// Restart the clocks for a new scan. Thresholds are kept.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last_activity = now;
        self.last_item_count = 0;
        self.scan_start = now;
    }

    pub fn is_stalled(&self) -> bool {
        if self.scan_start.elapsed() < self.startup_grace_period {
            return false;
        }
        if self.last_item_count < self.minimum_items {
            return false;
        }
        self.last_activity.elapsed() > self.stall_threshold
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub fn last_item_count(&self) -> u64 {
        self.last_item_count
    }

    /// Seconds without progress before a scan counts as stalled. Zero is ignored.
    pub fn set_stall_threshold(&mut self, seconds: u64) {
        if seconds > 0 {
            self.stall_threshold = Duration::from_secs(seconds);
        }
    }

    /// Items that must be processed before stalls are reported. Zero is ignored.
    pub fn set_minimum_items(&mut self, count: u64) {
        if count > 0 {
            self.minimum_items = count;
        }
    }

    /// Startup period during which stalls are never reported. Zero is ignored.
    pub fn set_startup_grace_period(&mut self, seconds: u64) {
        if seconds > 0 {
            self.startup_grace_period = Duration::from_secs(seconds);
        }
    }
}
