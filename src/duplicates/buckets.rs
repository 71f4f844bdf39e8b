//! Size-based file bucketing.
//!
//! # Overview
//!
//! Size bucketing is the first filter of duplicate detection: files of
//! different lengths cannot have equal content. Every walked file is inserted
//! into the bucket for its byte length; only buckets with two or more members
//! are handed to the hashing stage, so a file with a unique size is never read.
//!
//! Partial buckets built per directory can be joined with
//! [`SizeBuckets::merge`].
//!
//! # Example
//!
//! ```
//! use dirdupe::duplicates::SizeBuckets;
//! use std::path::PathBuf;
//!
//! let mut buckets = SizeBuckets::new();
//! buckets.insert(PathBuf::from("/a/file1.txt"), 1024);
//! buckets.insert(PathBuf::from("/b/file2.txt"), 1024);
//! buckets.insert(PathBuf::from("/a/file3.txt"), 2048);
//!
//! let (candidates, stats) = buckets.into_candidates();
//! assert_eq!(candidates.len(), 1); // only the 1024-byte bucket
//! assert_eq!(stats.eliminated_unique, 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

/// A group of files with the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in insertion order
    pub files: Vec<PathBuf>,
}

impl SizeGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Mapping from byte length to the files of that length.
#[derive(Debug, Default, Clone)]
pub struct SizeBuckets {
    buckets: HashMap<u64, Vec<PathBuf>>,
    total_files: usize,
    total_size: u64,
}

impl SizeBuckets {
    /// Create an empty bucket set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the bucket for `size`.
    pub fn insert(&mut self, path: PathBuf, size: u64) {
        self.total_files += 1;
        self.total_size += size;
        self.buckets.entry(size).or_default().push(path);
    }

    /// Move every file of `other` into this set, keeping `other`'s order
    /// after the files already present.
    pub fn merge(&mut self, other: SizeBuckets) {
        self.total_files += other.total_files;
        self.total_size += other.total_size;
        for (size, files) in other.buckets {
            self.buckets.entry(size).or_default().extend(files);
        }
    }

    /// Files in the bucket for `size`, if any.
    #[must_use]
    pub fn get(&self, size: u64) -> Option<&[PathBuf]> {
        self.buckets.get(&size).map(Vec::as_slice)
    }

    /// Number of distinct sizes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if no file has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of inserted files.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Sum of all inserted file sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Keep only multi-member buckets, ordered by ascending size.
    #[must_use]
    pub fn into_candidates(self) -> (Vec<SizeGroup>, GroupingStats) {
        let mut stats = GroupingStats {
            total_files: self.total_files,
            total_size: self.total_size,
            unique_sizes: self.buckets.len(),
            ..Default::default()
        };

        let mut candidates: Vec<SizeGroup> = self
            .buckets
            .into_iter()
            .filter_map(|(size, files)| {
                if files.len() < 2 {
                    stats.eliminated_unique += files.len();
                    log::trace!("Eliminated unique size {}: {:?}", size, files.first());
                    None
                } else {
                    stats.potential_duplicates += files.len();
                    stats.duplicate_groups += 1;
                    log::debug!(
                        "Size group {} bytes: {} potential duplicates",
                        size,
                        files.len()
                    );
                    Some(SizeGroup { size, files })
                }
            })
            .collect();
        candidates.sort_unstable_by_key(|group| group.size);

        (candidates, stats)
    }
}

/// Statistics from the size bucketing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated because their size is unique
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size bucketing.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}
