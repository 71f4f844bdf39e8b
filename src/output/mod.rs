//! Output formatters for duplicate reports.
//!
//! - [`text::TextOutput`]: one line per registered directory
//! - [`json::JsonOutput`]: machine-readable document for scripting
//!
//! # Example
//!
//! ```no_run
//! use dirdupe::duplicates::DuplicateFinder;
//! use dirdupe::output::TextOutput;
//! use dirdupe::registry::DirectoryRegistry;
//!
//! let mut registry = DirectoryRegistry::new();
//! registry.register(".").unwrap();
//! let (report, _summary) = DuplicateFinder::with_defaults().find(&registry).unwrap();
//!
//! TextOutput::new(&report, false)
//!     .write_to(&mut std::io::stdout().lock())
//!     .unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
