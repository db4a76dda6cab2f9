/// SizeScope CLI: terminal frontend over `sizescope-core`.
///
/// Owns argument parsing ([`commands::Cli`]) and text rendering; all
/// scanning, persistence and history logic lives in the core crate.
pub mod commands;
pub mod render;

pub use commands::{run, Cli, Command};
