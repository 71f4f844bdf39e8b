//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file bucketing
//! - Content hashing of same-size candidates
//! - Attribution of duplicates to registered directories
//! - Pipeline orchestration across every registered directory

pub mod buckets;
pub mod finder;
pub mod hashing;
pub mod report;
pub mod resolver;

pub use buckets::{GroupingStats, SizeBuckets, SizeGroup};
pub use finder::{DuplicateFinder, FinderConfig, FinderError};
pub use hashing::{hash_candidates, HashConfig, HashGroup, HashStats};
pub use report::{DirectoryReport, DuplicateReport, ScanSummary};
pub use resolver::DuplicateResolver;
