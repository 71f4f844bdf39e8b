//! Duplicate finder orchestrating the detection pipeline.
//!
//! # Overview
//!
//! 1. **Walk**: every registered directory is traversed on its own thread
//!    into a partial [`SizeBuckets`], skipping registered directories nested
//!    below it; partials are merged in registration order.
//! 2. **Size grouping**: unique sizes are eliminated.
//! 3. **Hashing**: remaining candidates are hashed (see [`super::hashing`]).
//! 4. **Resolution**: digest groups are attributed to registered directories.
//!
//! Per-entry failures never abort the scan. They are collected in
//! [`ScanSummary::scan_errors`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::buckets::SizeBuckets;
use super::hashing::{hash_candidates, HashConfig};
use super::report::{DuplicateReport, ScanSummary};
use super::resolver::DuplicateResolver;
use crate::progress::ProgressCallback;
use crate::registry::{DirectoryRegistry, WalkRoot};
use crate::scanner::{Hasher, ScanError, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Enable byte-by-byte verification after hash matching.
    pub paranoid: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("paranoid", &self.paranoid)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            paranoid: false,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable byte-for-byte confirmation of digest matches.
    #[must_use]
    pub fn with_paranoid(mut self, enabled: bool) -> Self {
        self.paranoid = enabled;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn hash_config(&self) -> HashConfig {
        let mut config = HashConfig::default()
            .with_io_threads(self.io_threads)
            .with_paranoid(self.paranoid);
        if let Some(ref flag) = self.shutdown_flag {
            config = config.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.progress_callback {
            config = config.with_progress_callback(callback.clone());
        }
        config
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The registry holds no directory to scan.
    #[error("No directories registered")]
    NoDirectories,
}

/// Files and errors collected from a single walk root.
#[derive(Default)]
struct RootWalk {
    buckets: SizeBuckets,
    errors: Vec<ScanError>,
}

/// Duplicate finder that runs the complete detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dirdupe::duplicates::{DuplicateFinder, FinderConfig};
/// use dirdupe::registry::DirectoryRegistry;
///
/// let mut registry = DirectoryRegistry::new();
/// registry.register("/photos").unwrap();
/// registry.register("/backup").unwrap();
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(2));
/// let (report, summary) = finder.find(&registry).unwrap();
///
/// for entry in report.entries() {
///     println!("{}: {:?}", entry.directory.display_path.display(), entry.duplicates);
/// }
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find duplicated files across every registered directory.
    ///
    /// The returned report has one entry per registered directory, in
    /// registration order, including directories without duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::NoDirectories`] for an empty registry and
    /// [`FinderError::Interrupted`] if the shutdown flag is raised.
    pub fn find(
        &self,
        registry: &DirectoryRegistry,
    ) -> Result<(DuplicateReport, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if registry.is_empty() {
            return Err(FinderError::NoDirectories);
        }
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut summary = ScanSummary {
            directories: registry.len(),
            ..Default::default()
        };

        let roots = registry.walk_roots();
        log::info!("Scanning {} directories", roots.len());

        let buckets = self.walk_all(&roots, &mut summary);

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        summary.total_files = buckets.total_files();
        summary.total_size = buckets.total_size();
        log::info!(
            "Found {} files ({})",
            summary.total_files,
            summary.total_size_display()
        );

        let (candidates, grouping) = buckets.into_candidates();
        summary.eliminated_by_size = grouping.eliminated_unique;
        log::info!(
            "Size grouping: {} candidates in {} groups ({:.1}% eliminated)",
            grouping.potential_duplicates,
            grouping.duplicate_groups,
            grouping.elimination_rate()
        );

        let (groups, hash_stats) =
            hash_candidates(candidates, self.hasher.clone(), self.config.hash_config());

        if hash_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        summary.hashed_files = hash_stats.hashed_files;
        summary.failed_files = hash_stats.failed_files;
        summary.duplicate_groups = hash_stats.duplicate_groups;
        summary.duplicate_files = hash_stats.duplicate_files;
        summary.reclaimable_space = hash_stats.wasted_space;
        summary
            .scan_errors
            .extend(hash_stats.errors.into_iter().map(ScanError::from));

        let report = DuplicateResolver::new().resolve(&groups, registry.directories());

        summary.scan_duration = start_time.elapsed();
        log::info!(
            "Scan complete in {:.2?}: {} duplicate files in {} groups, {} reclaimable",
            summary.scan_duration,
            summary.duplicate_files,
            summary.duplicate_groups,
            summary.reclaimable_display()
        );

        Ok((report, summary))
    }

    /// Walk every root concurrently and merge the partial buckets in order.
    fn walk_all(&self, roots: &[WalkRoot<'_>], summary: &mut ScanSummary) -> SizeBuckets {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {} directories", roots.len()));
        }

        let seen = AtomicUsize::new(0);
        let partials: Vec<RootWalk> = std::thread::scope(|scope| {
            let handles: Vec<_> = roots
                .iter()
                .map(|root| {
                    let seen = &seen;
                    scope.spawn(move || {
                        self.walk_root(&root.directory.canonical_path, &root.nested, seen)
                    })
                })
                .collect();

            handles
                .into_iter()
                .zip(roots)
                .map(|(handle, root)| {
                    handle.join().unwrap_or_else(|_| {
                        log::error!(
                            "Walker thread for {} panicked",
                            root.directory.canonical_path.display()
                        );
                        RootWalk::default()
                    })
                })
                .collect()
        });

        let mut buckets = SizeBuckets::new();
        for partial in partials {
            buckets.merge(partial.buckets);
            summary.scan_errors.extend(partial.errors);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        buckets
    }

    fn walk_root(&self, root: &Path, nested: &[PathBuf], seen: &AtomicUsize) -> RootWalk {
        let mut result = RootWalk::default();

        let mut walker = Walker::new(root, self.config.walker_config.clone())
            .with_pruned_dirs(nested.to_vec());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let entries = match walker.walk() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Skipping directory: {}", e);
                result.errors.push(e);
                return result;
            }
        };

        for entry in entries {
            match entry {
                Ok(file) => {
                    let count = seen.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(count, file.path.to_string_lossy().as_ref());
                    }
                    result.buckets.insert(file.path, file.size);
                }
                Err(e) => result.errors.push(e),
            }
        }

        log::debug!(
            "Walked {}: {} files",
            root.display(),
            result.buckets.total_files()
        );
        result
    }
}
