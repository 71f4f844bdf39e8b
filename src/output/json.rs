//! JSON output formatter for duplicate reports.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "directories": [
//!     {
//!       "path": "photos",
//!       "canonical_path": "/home/user/photos",
//!       "duplicates": ["/home/user/photos/a.jpg"]
//!     }
//!   ],
//!   "summary": {
//!     "directories": 2,
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "eliminated_by_size": 60,
//!     "hashed_files": 40,
//!     "failed_files": 0,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "errors": [],
//!     "exit_code": 0,
//!     "exit_code_name": "DD000"
//!   },
//!   "generated_at": "2024-01-01T12:00:00+00:00"
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DirectoryReport, DuplicateReport, ScanSummary};
use crate::error::ExitCode;

/// One registered directory in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDirectory {
    /// Path as the user supplied it
    pub path: String,
    /// Resolved absolute path
    pub canonical_path: String,
    /// Duplicated files owned by this directory
    pub duplicates: Vec<String>,
}

impl From<&DirectoryReport> for JsonDirectory {
    fn from(entry: &DirectoryReport) -> Self {
        Self {
            path: entry.directory.display_path.to_string_lossy().into_owned(),
            canonical_path: entry.directory.canonical_path.to_string_lossy().into_owned(),
            duplicates: entry
                .duplicates
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of registered directories
    pub directories: usize,
    /// Total number of files walked
    pub total_files: usize,
    /// Total size of all walked files in bytes
    pub total_size: u64,
    /// Files skipped because no other file had their size
    pub eliminated_by_size: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files dropped because they could not be read
    pub failed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Duplicate files beyond the first copy of each group
    pub duplicate_files: usize,
    /// Bytes reclaimable by keeping one copy per group
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Messages for entries that could not be read
    pub errors: Vec<String>,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            directories: summary.directories,
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            hashed_files: summary.hashed_files,
            failed_files: summary.failed_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            errors: summary.scan_errors.iter().map(ToString::to_string).collect(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Registered directories in registration order
    pub directories: Vec<JsonDirectory>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
}

impl JsonOutput {
    /// Create a new JSON output from a report, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use dirdupe::duplicates::{DuplicateReport, ScanSummary};
    /// use dirdupe::error::ExitCode;
    /// use dirdupe::output::JsonOutput;
    ///
    /// let output = JsonOutput::new(
    ///     &DuplicateReport::default(),
    ///     &ScanSummary::default(),
    ///     ExitCode::NoDuplicates,
    /// );
    /// assert!(output.directories.is_empty());
    /// assert_eq!(output.summary.exit_code, 2);
    /// ```
    #[must_use]
    pub fn new(report: &DuplicateReport, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            directories: report.entries().iter().map(JsonDirectory::from).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
            generated_at: Utc::now(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
