//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing BLAKE3 digests of
//! whole file contents. Small and medium files are streamed through a fixed
//! buffer; large files go through blake3's memory-mapped, multi-threaded
//! update. Every file handle is scoped to a single call and released on every
//! exit path.
//!
//! [`Hasher::files_identical`] offers a byte-for-byte comparison for callers
//! that want to rule out digest collisions entirely.
//!
//! # Example
//!
//! ```no_run
//! use dirdupe::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.full_hash(Path::new("Cargo.toml")).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// A 256-bit BLAKE3 digest.
pub type Hash = [u8; 32];

/// Read buffer size for streaming hashes and comparisons.
const BUFFER_SIZE: usize = 64 * 1024;

/// Files at least this large are hashed via mmap.
const MMAP_THRESHOLD: u64 = 16 * 1024 * 1024;

/// Streaming BLAKE3 file hasher.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown flag; a long read is abandoned once it is raised.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Compute the digest of the entire file content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read, or if
    /// shutdown was requested mid-read.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let len = file
            .metadata()
            .map_err(|e| HashError::from_io(path, e))?
            .len();

        let mut hasher = blake3::Hasher::new();

        if len >= MMAP_THRESHOLD {
            drop(file);
            log::trace!("Hashing via mmap: {}", path.display());
            hasher
                .update_mmap_rayon(path)
                .map_err(|e| HashError::from_io(path, e))?;
            return Ok(*hasher.finalize().as_bytes());
        }

        let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        loop {
            if self.is_shutdown_requested() {
                return Err(interrupted(path));
            }
            let n = reader
                .read(&mut buffer)
                .map_err(|e| HashError::from_io(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    /// Compare two files byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] naming whichever file failed to read.
    pub fn files_identical(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
        let file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;

        let len_a = file_a.metadata().map_err(|e| HashError::from_io(a, e))?.len();
        let len_b = file_b.metadata().map_err(|e| HashError::from_io(b, e))?.len();
        if len_a != len_b {
            return Ok(false);
        }

        let mut reader_a = BufReader::with_capacity(BUFFER_SIZE, file_a);
        let mut reader_b = BufReader::with_capacity(BUFFER_SIZE, file_b);
        let mut buf_a = vec![0u8; BUFFER_SIZE];
        let mut buf_b = vec![0u8; BUFFER_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(interrupted(a));
            }
            let n = read_full(&mut reader_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
            let m = read_full(&mut reader_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;
            if n != m || buf_a[..n] != buf_b[..m] {
                return Ok(false);
            }
            if n == 0 {
                return Ok(true);
            }
        }
    }
}

/// Fill `buf` as far as the reader allows; returns bytes read (0 at EOF).
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn interrupted(path: &Path) -> HashError {
    HashError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::Interrupted, "Shutdown"),
    }
}

/// Render a digest as lowercase hexadecimal (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}
