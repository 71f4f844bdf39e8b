//! Content hashing of size-bucket candidates.
//!
//! # Overview
//!
//! Every file in a multi-member size bucket is hashed with BLAKE3 on a rayon
//! pool bounded by `io_threads`, so large scans never hold more than a few
//! file handles and read buffers at once. Files are then grouped by digest;
//! only digests shared by two or more files survive.
//!
//! A file that cannot be read is dropped from consideration and recorded in
//! [`HashStats::errors`]. Its bucket siblings are still hashed and grouped
//! normally.
//!
//! With `paranoid` enabled, each digest group is additionally confirmed byte
//! for byte and split into truly identical subgroups.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::buckets::SizeGroup;
use crate::progress::ProgressCallback;
use crate::scanner::{hash_to_hex, Hash, HashError, Hasher};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Files sharing one content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashGroup {
    /// BLAKE3 digest shared by every file in the group
    pub hash: Hash,
    /// File size in bytes
    pub size: u64,
    /// Member paths, in candidate order
    pub files: Vec<PathBuf>,
}

impl HashGroup {
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

    /// Bytes that would be freed by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.files.len().saturating_sub(1) as u64
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }
}

/// Configuration for the hashing phase.
#[derive(Clone)]
pub struct HashConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Confirm digest matches byte for byte.
    pub paranoid: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("io_threads", &self.io_threads)
            .field("paranoid", &self.paranoid)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            paranoid: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HashConfig {
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
}

/// Statistics from the hashing phase.
#[derive(Debug, Default)]
pub struct HashStats {
    /// Files that entered the phase
    pub input_files: usize,
    /// Files successfully hashed
    pub hashed_files: usize,
    /// Files dropped because they could not be read
    pub failed_files: usize,
    /// Total bytes hashed
    pub bytes_hashed: u64,
    /// Digest groups with 2+ files
    pub duplicate_groups: usize,
    /// Files in those groups beyond the first of each
    pub duplicate_files: usize,
    /// Bytes reclaimable by keeping one copy per group
    pub wasted_space: u64,
    /// Whether the phase was cut short by shutdown
    pub interrupted: bool,
    /// Read errors for dropped files
    pub errors: Vec<HashError>,
}

/// Run `op` on a rayon pool limited to `threads` workers.
///
/// Falls back to the global pool if a dedicated pool cannot be built.
pub(crate) fn run_bounded<T, F>(threads: usize, op: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(op),
        Err(e) => {
            log::warn!(
                "Failed to create thread pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            op()
        }
    }
}

/// Hash every candidate file and group the results by digest.
///
/// Returns only groups with 2+ members, in the order their first member
/// appeared among the candidates.
#[must_use]
pub fn hash_candidates(
    candidates: Vec<SizeGroup>,
    hasher: Arc<Hasher>,
    config: HashConfig,
) -> (Vec<HashGroup>, HashStats) {
    let all_files: Vec<(PathBuf, u64)> = candidates
        .into_iter()
        .filter(|group| group.len() > 1)
        .flat_map(|group| {
            let size = group.size;
            group.files.into_iter().map(move |path| (path, size))
        })
        .collect();

    let mut stats = HashStats {
        input_files: all_files.len(),
        ..Default::default()
    };

    if all_files.is_empty() {
        log::debug!("Hashing: No files to process");
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hashing", all_files.len());
    }

    log::info!("Hashing {} candidate files", all_files.len());

    let done = AtomicUsize::new(0);
    let results: Vec<(PathBuf, u64, Option<Result<Hash, HashError>>)> =
        run_bounded(config.io_threads, || {
            all_files
                .into_par_iter()
                .map(|(path, size)| {
                    if config.is_shutdown_requested() {
                        return (path, size, None);
                    }

                    if size > LARGE_FILE_THRESHOLD {
                        log::debug!(
                            "Hashing large file ({} MB): {}",
                            size / (1024 * 1024),
                            path.display()
                        );
                    }

                    let result = hasher.full_hash(&path);
                    match &result {
                        Ok(_) => {
                            log::trace!("Hash computed: {}", path.display());
                            if let Some(ref callback) = config.progress_callback {
                                callback.on_item_completed(size);
                            }
                        }
                        Err(e) => log::warn!("Failed to hash {}: {}", path.display(), e),
                    }

                    let count = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ref callback) = config.progress_callback {
                        callback.on_progress(count, path.to_string_lossy().as_ref());
                    }
                    (path, size, Some(result))
                })
                .collect()
        });

    if config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Hashing: Interrupted by shutdown signal");
    }

    // Group by digest, keeping first-appearance order
    let mut groups: Vec<HashGroup> = Vec::new();
    let mut index: HashMap<Hash, usize> = HashMap::new();

    for (path, size, result) in results {
        match result {
            None => {}
            Some(Ok(hash)) => {
                stats.hashed_files += 1;
                stats.bytes_hashed += size;
                match index.get(&hash) {
                    Some(&idx) => groups[idx].files.push(path),
                    None => {
                        index.insert(hash, groups.len());
                        groups.push(HashGroup {
                            hash,
                            size,
                            files: vec![path],
                        });
                    }
                }
            }
            Some(Err(e)) => {
                stats.failed_files += 1;
                stats.errors.push(e);
            }
        }
    }

    groups.retain(|group| group.len() > 1);

    if config.paranoid && !stats.interrupted {
        groups = confirm_groups(groups, &hasher, &config, &mut stats);
    }

    stats.duplicate_groups = groups.len();
    stats.duplicate_files = groups.iter().map(|g| g.len() - 1).sum();
    stats.wasted_space = groups.iter().map(HashGroup::wasted_space).sum();

    for group in &groups {
        log::debug!(
            "Duplicate group {}: {} files, {} bytes each",
            group.hash_hex(),
            group.len(),
            group.size
        );
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hashing");
    }

    log::info!(
        "Hashing complete: {} groups, {} duplicates, {} bytes reclaimable",
        stats.duplicate_groups,
        stats.duplicate_files,
        stats.wasted_space
    );

    (groups, stats)
}

/// Split digest groups into byte-for-byte identical subgroups.
fn confirm_groups(
    groups: Vec<HashGroup>,
    hasher: &Hasher,
    config: &HashConfig,
    stats: &mut HashStats,
) -> Vec<HashGroup> {
    log::info!("Paranoid mode: verifying {} groups byte by byte", groups.len());

    let verified: Vec<(Vec<HashGroup>, Vec<HashError>)> = run_bounded(config.io_threads, || {
        groups
            .into_par_iter()
            .map(|group| {
                let mut errors = Vec::new();
                let subgroups = split_identical(group.files, hasher, &mut errors)
                    .into_iter()
                    .map(|files| HashGroup {
                        hash: group.hash,
                        size: group.size,
                        files,
                    })
                    .collect::<Vec<_>>();
                if subgroups.len() > 1 {
                    log::warn!(
                        "Digest {} covers {} distinct contents",
                        hash_to_hex(&group.hash),
                        subgroups.len()
                    );
                }
                (subgroups, errors)
            })
            .collect()
    });

    let mut confirmed = Vec::new();
    for (subgroups, errors) in verified {
        stats.failed_files += errors.len();
        stats.errors.extend(errors);
        confirmed.extend(subgroups);
    }
    confirmed
}

/// Partition `files` into classes of identical content, keeping classes of 2+.
///
/// A file whose comparison read fails is dropped and its error recorded.
fn split_identical(
    files: Vec<PathBuf>,
    hasher: &Hasher,
    errors: &mut Vec<HashError>,
) -> Vec<Vec<PathBuf>> {
    let mut pending: VecDeque<PathBuf> = files.into();
    let mut classes = Vec::new();

    'outer: while let Some(reference) = pending.pop_front() {
        let mut same = vec![reference.clone()];
        let mut rest = VecDeque::new();

        while let Some(candidate) = pending.pop_front() {
            match hasher.files_identical(&reference, &candidate) {
                Ok(true) => same.push(candidate),
                Ok(false) => rest.push_back(candidate),
                Err(e) if e.path() == reference.as_path() => {
                    log::warn!("Dropping {} from verification: {}", reference.display(), e);
                    errors.push(e);
                    let mut requeue: VecDeque<PathBuf> = same.into_iter().skip(1).collect();
                    requeue.extend(rest);
                    requeue.push_back(candidate);
                    requeue.extend(pending.drain(..));
                    pending = requeue;
                    continue 'outer;
                }
                Err(e) => {
                    log::warn!("Dropping {} from verification: {}", candidate.display(), e);
                    errors.push(e);
                }
            }
        }

        if same.len() > 1 {
            classes.push(same);
        }
        pending = rest;
    }

    classes
}
