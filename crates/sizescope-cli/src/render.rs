/// Plain-text rendering of scan status, result trees and history.
///
/// Every function returns a `String` so the output can be tested without a
/// terminal.
use sizescope_core::analysis::CategoryStats;
use sizescope_core::model::{format_bytes, format_count, FileEntry};
use sizescope_core::scanner::ScanStatus;
use sizescope_core::store::ScanRecord;
use std::fmt::Write;

/// Width of the right-aligned size column.
const SIZE_WIDTH: usize = 10;

/// One-line progress summary, suitable for redrawing with `\r`.
pub fn progress_line(status: &ScanStatus) -> String {
    let mut line = if status.total_items > 0 {
        format!(
            "Scanned {} / {} items ({:.1}%)",
            format_count(status.scanned_items),
            format_count(status.total_items),
            status.progress * 100.0
        )
    } else {
        format!("Scanned {} items", format_count(status.scanned_items))
    };
    if status.stalled {
        line.push_str("  [no progress, scan may be stalled]");
    }
    line
}

/// Indented tree, largest children first, down to `max_depth` levels below
/// the root.
pub fn render_tree(root: &FileEntry, max_depth: usize) -> String {
    let mut out = String::new();
    render_entry(&mut out, root, 0, max_depth);
    out
}

fn render_entry(out: &mut String, entry: &FileEntry, depth: usize, max_depth: usize) {
    let suffix = if entry.is_dir { "/" } else { "" };
    let _ = writeln!(
        out,
        "{:>width$}  {}{}{}",
        format_bytes(entry.size),
        "  ".repeat(depth),
        entry.name,
        suffix,
        width = SIZE_WIDTH
    );
    if depth >= max_depth {
        return;
    }
    for child in entry.children_sorted_by_size() {
        render_entry(out, child, depth + 1, max_depth);
    }
}

/// Per-category table with each category's share of `total`.
pub fn render_categories(stats: &[CategoryStats], total: u64) -> String {
    let mut out = String::new();
    for s in stats.iter().filter(|s| s.file_count > 0) {
        let share = if total == 0 {
            0.0
        } else {
            s.total_size as f64 / total as f64 * 100.0
        };
        let _ = writeln!(
            out,
            "{:<10} {:>width$} {:>6.1}%  {} files",
            s.category.label(),
            format_bytes(s.total_size),
            share,
            format_count(s.file_count),
            width = SIZE_WIDTH
        );
    }
    out
}

/// History table, newest first.
pub fn render_history(records: &[ScanRecord]) -> String {
    if records.is_empty() {
        return "No scans recorded.\n".to_string();
    }
    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{}  {:>width$}  {}  {}",
            record
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S"),
            format_bytes(record.size),
            record.result_id,
            record.path,
            width = SIZE_WIDTH
        );
    }
    out
}
