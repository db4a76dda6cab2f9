/// Persistence for scan history and results.
///
/// The coordinator keeps the full result in memory; only a trimmed copy
/// goes to disk, keyed by a generated result id.
pub mod history;
pub mod results;
pub mod trim;

pub use history::{ScanHistory, ScanRecord, MAX_HISTORY};
pub use results::{is_valid_result_id, new_result_id, ResultStore};
pub use trim::trim_for_storage;
