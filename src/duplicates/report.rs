//! Per-directory duplicate report and scan summary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytesize::ByteSize;

use crate::registry::Directory;
use crate::scanner::ScanError;

/// Duplicated files attributed to one registered directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryReport {
    /// The owning directory
    pub directory: Directory,
    /// Files owned by this directory that have a content duplicate
    /// somewhere in the input set, sorted
    pub duplicates: Vec<PathBuf>,
}

/// Mapping from every registered directory to its duplicated files.
///
/// Entries follow registration order. Directories without duplicates are
/// present with an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    entries: Vec<DirectoryReport>,
}

impl DuplicateReport {
    /// Create a report with one empty entry per directory.
    #[must_use]
    pub fn new(directories: &[Directory]) -> Self {
        Self {
            entries: directories
                .iter()
                .map(|directory| DirectoryReport {
                    directory: directory.clone(),
                    duplicates: Vec::new(),
                })
                .collect(),
        }
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [DirectoryReport] {
        &mut self.entries
    }

    /// All entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[DirectoryReport] {
        &self.entries
    }

    /// Duplicates recorded for the directory with this canonical path.
    #[must_use]
    pub fn get(&self, canonical: &Path) -> Option<&[PathBuf]> {
        self.entries
            .iter()
            .find(|entry| entry.directory.canonical_path == canonical)
            .map(|entry| entry.duplicates.as_slice())
    }

    /// Number of directory entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the report has no directory entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of reported duplicate paths across all directories.
    #[must_use]
    pub fn total_duplicates(&self) -> usize {
        self.entries.iter().map(|entry| entry.duplicates.len()).sum()
    }

    /// Check if no directory has any duplicate.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|entry| entry.duplicates.is_empty())
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Directories registered for the scan
    pub directories: usize,
    /// Total number of files walked
    pub total_files: usize,
    /// Total size of all walked files in bytes
    pub total_size: u64,
    /// Files eliminated because their size was unique
    pub eliminated_by_size: usize,
    /// Files that were hashed successfully
    pub hashed_files: usize,
    /// Files dropped because they could not be read
    pub failed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Duplicate files beyond the first copy of each group
    pub duplicate_files: usize,
    /// Bytes reclaimable by keeping one copy per group
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Per-entry errors absorbed during walking and hashing
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Percentage of scanned bytes that are reclaimable.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}
