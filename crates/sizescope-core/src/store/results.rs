/// On-disk layout of the data directory.
///
/// ```text
/// <data_dir>/history.json          pretty JSON array of ScanRecord
/// <data_dir>/results/<id>.json     one trimmed FileEntry tree per scan
/// ```
use crate::error::StoreError;
use crate::model::FileEntry;
use crate::store::history::ScanHistory;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub const HISTORY_FILE_NAME: &str = "history.json";
pub const RESULTS_DIR_NAME: &str = "results";

/// Fresh, filesystem-safe result id: `scan_<unix seconds>_<random hex>`.
pub fn new_result_id() -> String {
    format!("scan_{}_{}", Utc::now().timestamp(), Uuid::new_v4().simple())
}

/// `true` if `id` is non-empty and only uses ASCII alphanumerics, `_` and
/// `-`, so it can never escape the results directory.
pub fn is_valid_result_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Reads and writes history and result files under one data directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE_NAME)
    }

    pub fn result_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_result_id(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(RESULTS_DIR_NAME).join(format!("{id}.json")))
    }

    /// Load the history file. A missing file is an empty history.
    pub fn load_history(&self) -> Result<ScanHistory, StoreError> {
        let path = self.history_path();
        match read_json(&path) {
            Ok(records) => Ok(ScanHistory::from_records(records)),
            Err(StoreError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Ok(ScanHistory::new())
            }
            Err(e) => Err(e),
        }
    }

    pub fn save_history(&self, history: &ScanHistory) -> Result<(), StoreError> {
        write_json(&self.history_path(), history)
    }

    pub fn save_result(&self, id: &str, entry: &FileEntry) -> Result<PathBuf, StoreError> {
        let path = self.result_path(id)?;
        write_json(&path, entry)?;
        debug!("Saved result {id} to {}", path.display());
        Ok(path)
    }

    pub fn load_result(&self, id: &str) -> Result<FileEntry, StoreError> {
        let path = self.result_path(id)?;
        match read_json(&path) {
            Err(StoreError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            other => other,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let file = fs::File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write pretty JSON, creating parent directories as needed.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = fs::File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}
