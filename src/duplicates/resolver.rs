//! Attribution of duplicate files to their owning directories.
//!
//! # Ownership
//!
//! Every member of a digest group with 2+ files is recorded under exactly one
//! registered directory: the first directory, in registration order, whose
//! canonical path is a path-component prefix of the file path. With nested
//! registrations (`/data` and `/data/sub`) whichever was registered first owns
//! the files under `/data/sub`. Prefixes are compared by component, so
//! `/data/ab/x` never belongs to `/data/a`.
//!
//! Duplicates inside one directory are all reported: "duplicate" means equal
//! content anywhere in the input set, not only across directories.
//!
//! Each directory's list is deduplicated and sorted, so resolving the same
//! groups twice gives identical reports regardless of traversal order.

use std::collections::HashSet;
use std::path::PathBuf;

use super::hashing::HashGroup;
use super::report::DuplicateReport;
use crate::registry::Directory;

/// Builds a [`DuplicateReport`] from digest groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateResolver;

impl DuplicateResolver {
    /// Create a resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Attribute every duplicated file to its owning directory.
    ///
    /// Groups with fewer than two members are ignored. Files under no
    /// registered directory are logged and skipped.
    #[must_use]
    pub fn resolve(&self, groups: &[HashGroup], directories: &[Directory]) -> DuplicateReport {
        let mut report = DuplicateReport::new(directories);
        let mut recorded: Vec<HashSet<PathBuf>> = vec![HashSet::new(); directories.len()];

        for group in groups.iter().filter(|group| group.files.len() > 1) {
            for file in &group.files {
                let Some(owner) = directories.iter().position(|dir| dir.contains(file)) else {
                    log::warn!("No registered directory owns {}", file.display());
                    continue;
                };

                if recorded[owner].insert(file.clone()) {
                    report.entries_mut()[owner].duplicates.push(file.clone());
                } else {
                    log::debug!("Already recorded: {}", file.display());
                }
            }
        }

        for entry in report.entries_mut() {
            entry.duplicates.sort();
            log::debug!(
                "{}: {} duplicate file(s)",
                entry.directory.display_path.display(),
                entry.duplicates.len()
            );
        }

        report
    }
}
