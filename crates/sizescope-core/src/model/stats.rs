/// Per-category byte counters carried by every aggregated directory.
use serde::{Deserialize, Serialize};

use crate::analysis::FileCategory;

/// Byte totals for the six file categories.
///
/// For an aggregated directory the six counters always sum to the
/// directory's size.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeStats {
    pub image: u64,
    pub video: u64,
    pub audio: u64,
    pub document: u64,
    pub archive: u64,
    pub other: u64,
}

impl FileTypeStats {
    /// Credit `bytes` to the counter for `category`.
    pub fn add(&mut self, category: FileCategory, bytes: u64) {
        match category {
            FileCategory::Image => self.image += bytes,
            FileCategory::Video => self.video += bytes,
            FileCategory::Audio => self.audio += bytes,
            FileCategory::Document => self.document += bytes,
            FileCategory::Archive => self.archive += bytes,
            FileCategory::Other => self.other += bytes,
        }
    }

    /// Add every counter of `other` into `self`.
    pub fn merge(&mut self, other: &FileTypeStats) {
        self.image += other.image;
        self.video += other.video;
        self.audio += other.audio;
        self.document += other.document;
        self.archive += other.archive;
        self.other += other.other;
    }

    /// Bytes recorded for a single category.
    pub fn get(&self, category: FileCategory) -> u64 {
        match category {
            FileCategory::Image => self.image,
            FileCategory::Video => self.video,
            FileCategory::Audio => self.audio,
            FileCategory::Document => self.document,
            FileCategory::Archive => self.archive,
            FileCategory::Other => self.other,
        }
    }

    /// Sum of all six counters.
    pub fn total(&self) -> u64 {
        self.image + self.video + self.audio + self.document + self.archive + self.other
    }
}
