//! Input directory normalization.
//!
//! # Overview
//!
//! The [`DirectoryRegistry`] turns the user's ordered list of directory
//! arguments into a set of canonical (absolute, symlink-resolved) directory
//! identities. Two inputs that resolve to the same canonical path are one
//! directory: the second registration logs an aliasing warning and replaces
//! the display path, but keeps the first registration's position.
//!
//! Registration order matters downstream. When registered directories are
//! nested, a file is owned by the first registered directory that contains it
//! (see [`DirectoryRegistry::owner_of`]).
//!
//! # Example
//!
//! ```no_run
//! use dirdupe::registry::DirectoryRegistry;
//!
//! let mut registry = DirectoryRegistry::new();
//! registry.register("./photos").unwrap();
//! registry.register("./backup/photos").unwrap();
//!
//! for dir in registry.directories() {
//!     println!("{} -> {}", dir.display_path.display(), dir.canonical_path.display());
//! }
//! ```

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A registered input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// Absolute, symlink-resolved path. Unique within a registry.
    pub canonical_path: PathBuf,
    /// Path as the user supplied it (last registration wins).
    pub display_path: PathBuf,
}

impl Directory {
    /// Check whether `path` lies inside this directory.
    ///
    /// Comparison is component-wise, so `/data/ab/x` is not inside `/data/a`.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.canonical_path)
    }
}

/// Errors that can occur while registering an input directory.
#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    /// The input path does not exist.
    #[error("Directory not found: {0}")]
    NotFound(PathBuf),

    /// The input path could not be made absolute or its symlinks resolved.
    #[error("Failed to resolve {path}: {source}")]
    Resolution {
        /// Path as supplied
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The input path resolved to something other than a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

impl RegistryError {
    /// The input path this error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::NotADirectory(path) => path,
            Self::Resolution { path, .. } => path,
        }
    }
}

/// Ordered set of canonical input directories.
#[derive(Debug, Default, Clone)]
pub struct DirectoryRegistry {
    directories: Vec<Directory>,
    index: HashMap<PathBuf, usize>,
}

impl DirectoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one input path.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if `input` does not exist
    /// - [`RegistryError::Resolution`] if canonicalization fails for any other reason
    /// - [`RegistryError::NotADirectory`] if `input` resolves to a non-directory
    pub fn register(&mut self, input: impl AsRef<Path>) -> Result<(), RegistryError> {
        let input = input.as_ref();

        let canonical = match std::fs::canonicalize(input) {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // A dangling symlink also reports NotFound from canonicalize.
                return Err(if std::fs::symlink_metadata(input).is_ok() {
                    RegistryError::Resolution {
                        path: input.to_path_buf(),
                        source: e,
                    }
                } else {
                    RegistryError::NotFound(input.to_path_buf())
                });
            }
            Err(e) => {
                return Err(RegistryError::Resolution {
                    path: input.to_path_buf(),
                    source: e,
                })
            }
        };

        if !canonical.is_dir() {
            return Err(RegistryError::NotADirectory(input.to_path_buf()));
        }

        if let Some(&idx) = self.index.get(&canonical) {
            let existing = &mut self.directories[idx];
            log::warn!(
                "Same directory given twice: [{}, {}] => {}, using {}",
                existing.display_path.display(),
                input.display(),
                canonical.display(),
                input.display()
            );
            existing.display_path = input.to_path_buf();
            return Ok(());
        }

        log::debug!(
            "Registered directory {} ({})",
            input.display(),
            canonical.display()
        );
        self.index.insert(canonical.clone(), self.directories.len());
        self.directories.push(Directory {
            canonical_path: canonical,
            display_path: input.to_path_buf(),
        });
        Ok(())
    }

    /// Register every input in order, collecting failures instead of stopping.
    ///
    /// Returns the errors for inputs that could not be registered; the other
    /// inputs are registered regardless.
    pub fn register_all<I, P>(&mut self, inputs: I) -> Vec<RegistryError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        inputs
            .into_iter()
            .filter_map(|input| self.register(input).err())
            .collect()
    }

    /// Registered directories in registration order.
    #[must_use]
    pub fn directories(&self) -> &[Directory] {
        &self.directories
    }

    /// Number of registered directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    /// Check if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// Look up a directory by canonical path.
    #[must_use]
    pub fn get(&self, canonical: &Path) -> Option<&Directory> {
        self.index.get(canonical).map(|&idx| &self.directories[idx])
    }

    /// The directory that owns `path`: the first registered directory
    /// (in registration order) that contains it.
    #[must_use]
    pub fn owner_of(&self, path: &Path) -> Option<&Directory> {
        owner_of(&self.directories, path)
    }

    /// One walk per registered directory, so every file is visited exactly once.
    ///
    /// A directory nested inside another registered directory is walked as a
    /// root of its own and pruned from its ancestor's walk. Hidden-entry and
    /// ignore-pattern filters then apply to it exactly as if it had been
    /// registered alone.
    #[must_use]
    pub fn walk_roots(&self) -> Vec<WalkRoot<'_>> {
        self.directories
            .iter()
            .map(|dir| WalkRoot {
                directory: dir,
                nested: self
                    .directories
                    .iter()
                    .filter(|other| {
                        other.canonical_path != dir.canonical_path
                            && dir.contains(&other.canonical_path)
                    })
                    .map(|other| other.canonical_path.clone())
                    .collect(),
            })
            .collect()
    }
}

/// A directory to walk and the registered directories below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkRoot<'a> {
    /// The registered directory this walk starts from
    pub directory: &'a Directory,
    /// Canonical paths of registered directories strictly inside it; the
    /// walk does not descend into them
    pub nested: Vec<PathBuf>,
}

/// First directory in `directories` containing `path`.
#[must_use]
pub fn owner_of<'a>(directories: &'a [Directory], path: &Path) -> Option<&'a Directory> {
    directories.iter().find(|dir| dir.contains(path))
}
