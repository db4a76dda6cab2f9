/// Command-line surface and command dispatch.
use crate::render;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;
use sizescope_core::analysis::analyse_file_types;
use sizescope_core::export::{export_csv, export_json};
use sizescope_core::model::FileEntry;
use sizescope_core::scanner::{ScanCoordinator, ScanEvent, ScanOutcome, ScanRequest};
use sizescope_core::Settings;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// How often the progress line is redrawn while a scan runs.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

const DEFAULT_DEPTH: usize = 2;

#[derive(Parser, Debug)]
#[command(name = "sizescope", version)]
#[command(about = "Disk usage scanner with file-type breakdown and scan history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to settings file (default: ~/.sizescope/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a directory, print its size tree and store the result
    Scan {
        /// Directory (or file) to scan
        path: PathBuf,

        /// Skip entries whose name starts with a dot
        #[arg(long)]
        ignore_hidden: bool,

        /// Do not pre-count items (no percentage in the progress line)
        #[arg(long)]
        no_count: bool,

        /// Levels of the tree to print
        #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
        depth: usize,

        /// Also write the full result as JSON
        #[arg(long)]
        export_json: Option<PathBuf>,

        /// Also write one CSV row per entry
        #[arg(long)]
        export_csv: Option<PathBuf>,
    },
    /// List stored scans, newest first
    History,
    /// Print a stored scan result (the latest when no id is given)
    Show {
        /// Result id from `history`
        id: Option<String>,

        /// Levels of the tree to print
        #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
        depth: usize,
    },
}

/// Load settings and run the selected command.
pub fn run(cli: Cli) -> Result<()> {
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    debug!("Data directory: {}", settings.data_dir.display());

    let coordinator = ScanCoordinator::new(settings);

    match cli.command {
        Command::Scan {
            path,
            ignore_hidden,
            no_count,
            depth,
            export_json: json_path,
            export_csv: csv_path,
        } => {
            let ignore_hidden = ignore_hidden || coordinator.settings().scan.ignore_hidden;
            let mut request = ScanRequest::new(path).with_ignore_hidden(ignore_hidden);
            if no_count {
                request = request.with_pre_count(false);
            }
            let result = scan(&coordinator, request)?;

            print!("{}", render::render_tree(&result, depth));
            println!();
            print!(
                "{}",
                render::render_categories(&analyse_file_types(&result), result.size)
            );

            if let Some(path) = json_path {
                export_json(&result, &path)
                    .with_context(|| format!("Failed to export JSON to {}", path.display()))?;
                println!("Exported JSON to: {}", path.display());
            }
            if let Some(path) = csv_path {
                export_csv(&result, &path)
                    .with_context(|| format!("Failed to export CSV to {}", path.display()))?;
                println!("Exported CSV to: {}", path.display());
            }
        }
        Command::History => {
            print!("{}", render::render_history(&coordinator.history()));
        }
        Command::Show { id, depth } => {
            let id = match id {
                Some(id) => id,
                None => match coordinator.history().first() {
                    Some(record) => record.result_id.clone(),
                    None => bail!("No scans recorded yet"),
                },
            };
            let result = coordinator
                .result(&id)
                .with_context(|| format!("Failed to load result {id}"))?;
            print!("{}", render::render_tree(&result, depth));
        }
    }

    Ok(())
}

/// Run one scan to completion, redrawing a progress line on stderr.
fn scan(coordinator: &ScanCoordinator, request: ScanRequest) -> Result<std::sync::Arc<FileEntry>> {
    let handle = coordinator
        .start_scan(request)
        .context("Failed to start scan")?;
    cancel_on_interrupt(coordinator);

    let mut stderr = std::io::stderr();
    loop {
        match handle.events.recv_timeout(PROGRESS_INTERVAL) {
            Ok(ScanEvent::Started { root }) => {
                let _ = writeln!(stderr, "Scanning: {}", root.display());
            }
            Ok(_) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                let line = render::progress_line(&coordinator.status());
                let _ = write!(stderr, "\r\x1B[K{line}");
                let _ = stderr.flush();
            }
        }
    }
    let _ = write!(stderr, "\r\x1B[K");

    let report = handle.wait().context("Scan thread failed")?;
    match report.outcome {
        ScanOutcome::Completed => {}
        ScanOutcome::Cancelled => eprintln!("Scan cancelled; showing partial result."),
        ScanOutcome::Failed => bail!(
            "Scan failed: {}",
            report.error.unwrap_or_else(|| "unknown error".into())
        ),
    }
    if report.record.is_none() {
        eprintln!("Warning: result could not be saved to history.");
    }
    eprintln!(
        "Scanned {} in {:.2?}",
        report.root_path.display(),
        report.duration
    );

    match report.result {
        Some(result) => Ok(result),
        None => bail!("Scan produced no result"),
    }
}

/// Route Ctrl-C to [`ScanCoordinator::cancel`], so an interrupted scan ends
/// as cancelled and still stores its partial result.
///
/// The handler is process-wide and installed once; later calls only log.
fn cancel_on_interrupt(coordinator: &ScanCoordinator) {
    let coordinator = coordinator.clone();
    let installed = ctrlc::set_handler(move || {
        if coordinator.cancel() {
            eprintln!("\nInterrupted: stopping scan, keeping the partial result");
        }
    });
    if let Err(e) = installed {
        debug!("Ctrl-C handler not installed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scan_flags() {
        let cli = Cli::parse_from([
            "sizescope",
            "scan",
            "/data",
            "--ignore-hidden",
            "--no-count",
            "--depth",
            "3",
            "--verbose",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Scan {
                path,
                ignore_hidden,
                no_count,
                depth,
                export_json,
                export_csv,
            } => {
                assert_eq!(path, PathBuf::from("/data"));
                assert!(ignore_hidden);
                assert!(no_count);
                assert_eq!(depth, 3);
                assert!(export_json.is_none());
                assert!(export_csv.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn show_id_is_optional() {
        let cli = Cli::parse_from(["sizescope", "show"]);
        assert!(matches!(
            cli.command,
            Command::Show {
                id: None,
                depth: DEFAULT_DEPTH
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn interrupt_cancels_running_scan() {
        use std::time::{Duration, Instant};
        use tempfile::TempDir;

        let data = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        for d in 0..50 {
            let dir = target.path().join(format!("d{d:02}"));
            std::fs::create_dir(&dir).unwrap();
            for f in 0..200 {
                std::fs::write(dir.join(format!("f{f:03}")), b"x").unwrap();
            }
        }
        let mut settings = Settings::default();
        settings.data_dir = data.path().to_path_buf();
        let coordinator = ScanCoordinator::new(settings);

        let handle = coordinator
            .start_scan(ScanRequest::new(target.path()).with_pre_count(false))
            .unwrap();
        cancel_on_interrupt(&coordinator);

        let deadline = Instant::now() + Duration::from_secs(30);
        while coordinator.status().scanned_items < 50 && Instant::now() < deadline {
            std::hint::spin_loop();
        }
        assert_eq!(unsafe { libc::raise(libc::SIGINT) }, 0);

        let report = handle.wait().unwrap();
        assert_eq!(report.outcome, ScanOutcome::Cancelled);
        assert!(report.total_size > 0 && report.total_size < 10_000);
        assert!(report.record.is_some(), "partial result stored");
        assert_eq!(coordinator.history().len(), 1);
    }
}
