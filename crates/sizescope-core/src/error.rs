/// Error types for the scanning engine, the result store, and settings.
///
/// Per-entry filesystem errors during a walk are not represented here: they
/// are logged and skipped. Only failures a caller must react to get a type.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to start or complete a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Another scan is already running; the request was rejected.
    #[error("a scan is already in progress")]
    AlreadyRunning,

    /// The scan root could not be stat-ed or listed.
    #[error("cannot access scan root {}: {source}", path.display())]
    RootAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The scan thread could not be started.
    #[error("failed to spawn scan thread: {0}")]
    Spawn(#[source] io::Error),

    /// The scan thread ended without producing a report.
    #[error("scan thread terminated unexpectedly")]
    Aborted,
}

/// Failure to read or write persisted scan data.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no stored result with id {0:?}")]
    NotFound(String),

    #[error("invalid result id {0:?}")]
    InvalidId(String),
}

/// Failure to load or save settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
