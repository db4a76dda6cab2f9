/// Analysis modules: classification and post-scan summaries.

pub mod file_types;

pub use file_types::{analyse_file_types, categorise_extension, CategoryStats, FileCategory};
