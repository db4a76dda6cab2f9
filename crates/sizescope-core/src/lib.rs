/// SizeScope Core: disk-usage scanning, aggregation, and history.
///
/// This crate contains all business logic with zero UI dependencies.
/// Frontends drive it through [`scanner::ScanCoordinator`].
///
/// # Modules
///
/// - [`model`]: Arena-allocated entry tree and the serializable result tree.
/// - [`scanner`]: Tree builder, size aggregator, progress and stall tracking,
///   and the scan coordinator.
/// - [`analysis`]: File type classification and summaries.
/// - [`store`]: Scan history, result files, and storage trimming.
/// - [`config`]: TOML settings.
/// - [`export`]: JSON and CSV export of a result tree.
pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod scanner;
pub mod store;

pub use config::Settings;
pub use error::{ConfigError, ScanError, StoreError};
pub use model::{format_bytes, FileEntry};
pub use scanner::{ScanCoordinator, ScanRequest};
