//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory tree
//! and yielding every regular file with its size. Symlinks, directories,
//! devices, sockets and pipes are never yielded, and symlinks are never
//! followed.
//!
//! # Error policy
//!
//! - If the root cannot be opened, [`Walker::walk`] fails up front with
//!   [`ScanError::RootUnreadable`].
//! - Any error below the root is yielded as an `Err` item and iteration
//!   continues with the remaining entries.
//!
//! # Example
//!
//! ```no_run
//! use dirdupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), config);
//! for entry in walker.walk().expect("root readable") {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for regular-file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Directories below the root that are not descended into
    pruned: Arc<Vec<PathBuf>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            pruned: Arc::new(Vec::new()),
        }
    }

    /// Never descend into these directories.
    ///
    /// Paths are compared as joined from the root, so they must share its
    /// form (both canonical, for instance).
    #[must_use]
    pub fn with_pruned_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.pruned = Arc::new(dirs);
        self
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Root directory of this walker.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Build the ignore matcher from configured patterns.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    fn passes_size_filter(&self, size: u64) -> bool {
        self.config.min_size.is_none_or(|min| size >= min)
            && self.config.max_size.is_none_or(|max| size <= max)
    }

    /// Walk the directory tree, yielding regular files.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::RootUnreadable`] if the root cannot be opened.
    /// Errors for individual entries are yielded by the iterator instead.
    pub fn walk(
        &self,
    ) -> Result<impl Iterator<Item = Result<FileEntry, ScanError>> + '_, ScanError> {
        std::fs::read_dir(&self.root).map_err(|source| ScanError::RootUnreadable {
            path: self.root.clone(),
            source,
        })?;

        let gitignore = self.build_gitignore().map(Arc::new);
        let pruned = Arc::clone(&self.pruned);
        let root = self.root.clone();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });

                if !pruned.is_empty() {
                    children.retain(|child| match child {
                        Ok(entry) if entry.file_type().is_dir() => {
                            let path = entry.path();
                            let keep = !pruned.contains(&path);
                            if !keep {
                                log::trace!("Pruning separately walked: {}", path.display());
                            }
                            keep
                        }
                        _ => true,
                    });
                }

                if let Some(gi) = gitignore.as_deref() {
                    children.retain(|child| match child {
                        Ok(entry) => {
                            let ignored =
                                is_ignored(gi, &root, &entry.path(), entry.file_type().is_dir());
                            if ignored {
                                log::trace!("Ignoring: {}", entry.path().display());
                            }
                            !ignored
                        }
                        Err(_) => true,
                    });
                }
            });

        Ok(walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            match entry_result {
                Ok(entry) => {
                    if entry.depth == 0 {
                        return None;
                    }

                    // Directories, symlinks and special files are not candidates
                    if !entry.file_type().is_file() {
                        return None;
                    }

                    let path = entry.path();
                    let metadata = match std::fs::symlink_metadata(&path) {
                        Ok(m) => m,
                        Err(e) => return Some(self.handle_io_error(&path, e)),
                    };
                    if !metadata.is_file() {
                        return None;
                    }

                    let size = metadata.len();
                    if !self.passes_size_filter(size) {
                        log::trace!(
                            "Skipping file due to size filter ({}): {}",
                            size,
                            path.display()
                        );
                        return None;
                    }

                    Some(Ok(FileEntry { path, size }))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(self.handle_jwalk_error(path, e))
                }
            }
        }))
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> Result<FileEntry, ScanError> {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                Err(ScanError::PermissionDenied(path.to_path_buf()))
            }
            ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                Err(ScanError::NotFound(path.to_path_buf()))
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                Err(ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                })
            }
        }
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(
        &self,
        path: PathBuf,
        error: jwalk::Error,
    ) -> Result<FileEntry, ScanError> {
        if let Some(kind) = error.io_error().map(std::io::Error::kind) {
            return self.handle_io_error(&path, std::io::Error::new(kind, error.to_string()));
        }
        log::warn!("Walker error for {}: {}", path.display(), error);
        Err(ScanError::Io {
            path,
            source: std::io::Error::other(error.to_string()),
        })
    }
}

/// Match `path` against the ignore rules, relative to `root`.
fn is_ignored(gitignore: &Gitignore, root: &Path, path: &Path, is_dir: bool) -> bool {
    let relative_path = path.strip_prefix(root).unwrap_or(path);
    let path_str = relative_path.to_string_lossy();
    let normalized_path = if cfg!(windows) {
        path_str.replace('\\', "/")
    } else {
        path_str.into_owned()
    };
    gitignore.matched(normalized_path, is_dir).is_ignore()
}
