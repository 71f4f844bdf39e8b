//! dirdupe - cross-directory duplicate file finder
//!
//! Given an ordered list of directories, dirdupe reports for each directory
//! the files it holds whose content is byte-identical to another file
//! anywhere in the set.
//!
//! # Pipeline
//!
//! 1. [`registry`]: inputs are canonicalized and deduplicated
//! 2. [`scanner::walker`]: regular files are collected per directory
//! 3. [`duplicates::buckets`]: files with a unique size are eliminated
//! 4. [`duplicates::hashing`]: remaining candidates are hashed with BLAKE3
//! 5. [`duplicates::resolver`]: duplicates are attributed to their directory
//! 6. [`output`]: the report is printed as text or JSON

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod registry;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, DuplicateReport, FinderConfig, FinderError, ScanSummary};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::registry::DirectoryRegistry;

/// Run dirdupe with parsed command-line arguments.
///
/// Directories that fail to register are reported and skipped; the scan
/// continues with the rest and the run ends as a partial success.
///
/// # Errors
///
/// Returns an error if no directory could be registered, if the scan is
/// interrupted, or if the report cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref());
    config.merge_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let handler = signal::install_handler().context("Failed to install Ctrl+C handler")?;

    let mut registry = DirectoryRegistry::new();
    let registration_errors = registry.register_all(&cli.dirs);
    for err in &registration_errors {
        log::error!("Skipping {}: {}", err.path().display(), err);
    }
    if registry.is_empty() {
        return Err(FinderError::NoDirectories)
            .context(format!("None of the {} given directories could be used", cli.dirs.len()));
    }

    let mut finder_config = FinderConfig::default()
        .with_io_threads(config.io_threads)
        .with_paranoid(config.paranoid)
        .with_walker_config(config.walker_config())
        .with_shutdown_flag(handler.get_flag());
    if config.progress && config.output == OutputFormat::Text && io::stderr().is_terminal() {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new()));
    }

    let (report, summary) = DuplicateFinder::new(finder_config).find(&registry)?;

    let exit_code = ExitCode::for_scan(&report, &summary, !registration_errors.is_empty());
    let color = !cli.no_color && io::stdout().is_terminal();
    write_report(&report, &summary, config.output, exit_code, color)?;

    Ok(exit_code)
}

fn write_report(
    report: &DuplicateReport,
    summary: &ScanSummary,
    format: OutputFormat,
    exit_code: ExitCode,
    color: bool,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Text => {
            TextOutput::new(report, color)
                .write_to(&mut out)
                .context("Failed to write report")?;
            log::info!(
                "{} duplicate files in {} groups across {} directories, {} reclaimable ({:.1}% of {})",
                summary.duplicate_files,
                summary.duplicate_groups,
                summary.directories,
                summary.reclaimable_display(),
                summary.wasted_percentage(),
                summary.total_size_display()
            );
            if !summary.scan_errors.is_empty() {
                log::warn!("{} entries could not be read", summary.scan_errors.len());
            }
        }
        OutputFormat::Json => {
            JsonOutput::new(report, summary, exit_code)
                .write_to(&mut out, true)
                .context("Failed to write JSON report")?;
        }
    }

    out.flush().context("Failed to flush output")?;
    Ok(())
}
