/// File type categorisation based on file extensions.
///
/// Groups files into six broad categories (Image, Video, Audio, Document,
/// Archive, Other). The aggregator uses [`categorise_extension`] to fill each
/// directory's `FileTypeStats`; [`analyse_file_types`] summarises a finished
/// result tree for display.
use crate::model::FileEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Broad file type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Other,
}

impl FileCategory {
    /// All categories in display order.
    pub const ALL: [FileCategory; 6] = [
        Self::Image,
        Self::Video,
        Self::Audio,
        Self::Document,
        Self::Archive,
        Self::Other,
    ];

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "Images",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Document => "Documents",
            Self::Archive => "Archives",
            Self::Other => "Other",
        }
    }
}

/// Size and count totals for a single file category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStats {
    pub category: FileCategory,
    pub total_size: u64,
    pub file_count: u64,
}

/// Longest extension segment that can possibly match a known category.
const MAX_KNOWN_EXT_LEN: usize = 16;

/// Categorise a file extension into a broad category.
///
/// Matching is case-insensitive. A compound suffix such as `tar.gz` is
/// resolved by its last dot-segment. Unknown or empty extensions are
/// `Other`.
///
/// Zero-heap-allocation hot path: the segment is lowercased into a fixed-size
/// stack buffer rather than allocating a `String`.
pub fn categorise_extension(ext: &str) -> FileCategory {
    let last = ext.rsplit('.').next().unwrap_or("");
    let bytes = last.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_KNOWN_EXT_LEN {
        return FileCategory::Other;
    }

    let mut lower = [0u8; MAX_KNOWN_EXT_LEN];
    for (dest, &src) in lower.iter_mut().zip(bytes.iter()) {
        *dest = src.to_ascii_lowercase();
    }
    let lower_str = match std::str::from_utf8(&lower[..bytes.len()]) {
        Ok(s) => s,
        Err(_) => return FileCategory::Other,
    };

    match lower_str {
        // Compression wrappers are archives whatever they wrap (tar.gz, log.xz).
        "gz" | "bz2" | "xz" => FileCategory::Archive,
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tiff" | "webp" | "svg" | "ico" | "heic"
        | "heif" => FileCategory::Image,
        "mp4" | "avi" | "mov" | "wmv" | "flv" | "mkv" | "webm" | "m4v" | "mpg" | "mpeg" | "3gp" => {
            FileCategory::Video
        }
        "mp3" | "wav" | "ogg" | "flac" | "aac" | "wma" | "m4a" | "opus" => FileCategory::Audio,
        "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "txt" | "rtf" | "odt"
        | "ods" | "odp" | "md" | "csv" | "pages" | "numbers" | "key" | "html" | "htm" | "xml"
        | "json" => FileCategory::Document,
        "zip" | "rar" | "7z" | "tar" | "iso" | "dmg" => FileCategory::Archive,
        _ => FileCategory::Other,
    }
}

/// Compute per-category size and count stats for a whole result tree.
///
/// Only files contribute. Categories with no files are omitted; the result
/// is sorted by total size, largest first.
pub fn analyse_file_types(root: &FileEntry) -> Vec<CategoryStats> {
    let mut map: HashMap<FileCategory, CategoryStats> =
        HashMap::with_capacity(FileCategory::ALL.len());

    root.walk(|entry, _| {
        if entry.is_dir {
            return;
        }
        let cat = categorise_extension(&entry.extension);
        let stats = map.entry(cat).or_insert(CategoryStats {
            category: cat,
            total_size: 0,
            file_count: 0,
        });
        stats.total_size += entry.size;
        stats.file_count += 1;
    });

    let mut results: Vec<CategoryStats> = map.into_values().collect();
    results.sort_by(|a, b| {
        b.total_size
            .cmp(&a.total_size)
            .then(b.file_count.cmp(&a.file_count))
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── categorise_extension ─────────────────────────────────────────────

    #[test]
    fn categorise_known_image_extensions() {
        for ext in &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "heic"] {
            assert_eq!(
                categorise_extension(ext),
                FileCategory::Image,
                "expected Image for .{ext}"
            );
        }
    }

    #[test]
    fn categorise_known_document_extensions() {
        for ext in &["pdf", "docx", "txt", "md", "csv", "html", "json"] {
            assert_eq!(
                categorise_extension(ext),
                FileCategory::Document,
                "expected Document for .{ext}"
            );
        }
    }

    #[test]
    fn categorise_known_archive_extensions() {
        for ext in &["zip", "rar", "7z", "tar", "gz", "iso"] {
            assert_eq!(
                categorise_extension(ext),
                FileCategory::Archive,
                "expected Archive for .{ext}"
            );
        }
    }

    #[test]
    fn categorise_audio_and_video() {
        assert_eq!(categorise_extension("flac"), FileCategory::Audio);
        assert_eq!(categorise_extension("mkv"), FileCategory::Video);
    }

    #[test]
    fn categorise_compound_suffix_uses_last_segment() {
        assert_eq!(categorise_extension("tar.gz"), FileCategory::Archive);
        assert_eq!(categorise_extension("log.bz2"), FileCategory::Archive);
        assert_eq!(categorise_extension("whatever.xz"), FileCategory::Archive);
        assert_eq!(categorise_extension("backup.png"), FileCategory::Image);
    }

    #[test]
    fn categorise_unknown_extension_returns_other() {
        assert_eq!(categorise_extension("xyz"), FileCategory::Other);
        assert_eq!(categorise_extension(""), FileCategory::Other);
        assert_eq!(categorise_extension("rs"), FileCategory::Other);
        assert_eq!(categorise_extension("tar."), FileCategory::Other);
        assert_eq!(
            categorise_extension("averyveryverylongextension"),
            FileCategory::Other
        );
    }

    /// Extension matching must be case-insensitive so "JPG" == "jpg".
    #[test]
    fn categorise_case_insensitive() {
        assert_eq!(categorise_extension("JPG"), FileCategory::Image);
        assert_eq!(categorise_extension("Mp3"), FileCategory::Audio);
        assert_eq!(categorise_extension("TAR.GZ"), FileCategory::Archive);
    }

    #[test]
    fn categorise_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(categorise_extension("pdf"), FileCategory::Document);
        }
    }

    // ── analyse_file_types ───────────────────────────────────────────────

    fn file(name: &str, ext: &str, size: u64) -> FileEntry {
        FileEntry {
            name: name.into(),
            path: format!("/r/{name}"),
            size,
            is_dir: false,
            extension: ext.into(),
            children: Vec::new(),
            file_types: None,
        }
    }

    fn dir(name: &str, children: Vec<FileEntry>) -> FileEntry {
        FileEntry {
            name: name.into(),
            path: format!("/r/{name}"),
            size: children.iter().map(|c| c.size).sum(),
            is_dir: true,
            extension: String::new(),
            children,
            file_types: None,
        }
    }

    #[test]
    fn analyse_aggregates_by_category() {
        let root = dir(
            "root",
            vec![
                file("a.png", "png", 100),
                file("b.jpg", "jpg", 50),
                dir("docs", vec![file("c.pdf", "pdf", 400)]),
            ],
        );

        let stats = analyse_file_types(&root);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, FileCategory::Document);
        assert_eq!(stats[0].total_size, 400);
        assert_eq!(stats[1].category, FileCategory::Image);
        assert_eq!(stats[1].file_count, 2);
        assert_eq!(stats[1].total_size, 150);
    }

    #[test]
    fn analyse_skips_directories() {
        let root = dir("root", vec![dir("empty", Vec::new())]);
        assert!(analyse_file_types(&root).is_empty());
    }
}
