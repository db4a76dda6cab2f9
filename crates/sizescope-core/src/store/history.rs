/// Bounded scan history, newest first.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of records kept; older ones are evicted.
pub const MAX_HISTORY: usize = 10;

/// Summary of one finished (or cancelled) scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub path: String,
    pub timestamp: DateTime<Utc>,
    /// Key of the persisted result file.
    pub result_id: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanHistory {
    records: Vec<ScanRecord>,
}

impl ScanHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap records loaded from disk, enforcing the cap.
    pub fn from_records(mut records: Vec<ScanRecord>) -> Self {
        records.truncate(MAX_HISTORY);
        Self { records }
    }

    /// Insert `record` as the newest entry and evict beyond the cap.
    pub fn push(&mut self, record: ScanRecord) {
        self.records.insert(0, record);
        self.records.truncate(MAX_HISTORY);
    }

    /// Records, newest first.
    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
