/// Export a result tree to JSON or CSV.
use crate::analysis::{categorise_extension, FileCategory};
use crate::error::StoreError;
use crate::model::FileEntry;
use crate::store::results::write_json;
use serde::Serialize;
use std::path::Path;

/// Write the whole tree as pretty JSON, in the same shape as stored results.
pub fn export_json(root: &FileEntry, output_path: &Path) -> Result<(), StoreError> {
    write_json(output_path, root)
}

#[derive(Serialize)]
struct CsvRow<'a> {
    path: &'a str,
    size: u64,
    is_dir: bool,
    category: Option<FileCategory>,
}

/// Write one row per entry, pre-order. Directories have an empty category.
pub fn export_csv(root: &FileEntry, output_path: &Path) -> Result<(), StoreError> {
    let csv_err = |source| StoreError::Csv {
        path: output_path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(output_path).map_err(csv_err)?;

    let mut result: Result<(), csv::Error> = Ok(());
    root.walk(|entry, _depth| {
        if result.is_err() {
            return;
        }
        let category = (!entry.is_dir).then(|| categorise_extension(&entry.extension));
        result = writer.serialize(CsvRow {
            path: &entry.path,
            size: entry.size,
            is_dir: entry.is_dir,
            category,
        });
    });
    result.map_err(csv_err)?;

    writer.flush().map_err(|source| StoreError::Io {
        path: output_path.to_path_buf(),
        source,
    })
}
