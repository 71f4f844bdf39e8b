//! Application configuration management.
//!
//! Settings are layered with `figment`, each source overriding the previous:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config <PATH>` or `config.toml` in the platform config dir)
//! 3. `DIRDUPE_*` environment variables (e.g. `DIRDUPE_IO_THREADS=8`)
//! 4. CLI flags
//!
//! A missing file is silently skipped; a malformed one is reported and the
//! defaults are used instead.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OutputFormat};
use crate::scanner::WalkerConfig;

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "DIRDUPE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Threads used for hashing.
    pub io_threads: usize,
    /// Confirm content matches byte by byte.
    pub paranoid: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Gitignore-style patterns excluded from the walk.
    pub ignore_patterns: Vec<String>,
    /// Smallest file size considered, in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,
    /// Largest file size considered, in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    /// Report format.
    pub output: OutputFormat,
    /// Show progress bars on stderr.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            paranoid: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            min_size: None,
            max_size: None,
            output: OutputFormat::Text,
            progress: true,
        }
    }
}

impl Config {
    /// Load the configuration from `path`, or from the default location.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load_from_path(path),
            None => {
                log::debug!("No config directory available, using defaults and environment");
                Self::extract(Self::figment())
            }
        }
    }

    /// Load the configuration from a specific TOML file.
    ///
    /// Environment variables still override values from the file.
    #[must_use]
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.exists() {
            log::debug!("Loading config from {}", path.display());
        } else {
            log::debug!("Config file {} not found, skipping", path.display());
        }
        Self::extract(Self::figment().merge(Toml::file(path)))
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    fn extract(figment: Figment) -> Self {
        match figment.merge(Env::prefixed(ENV_PREFIX)).extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Default configuration file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dirdupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply CLI flags on top of the loaded configuration.
    ///
    /// Flags that were not given leave the loaded value untouched.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        if cli.paranoid {
            self.paranoid = true;
        }
        if cli.skip_hidden {
            self.skip_hidden = true;
        }
        if !cli.ignore_patterns.is_empty() {
            self.ignore_patterns.extend(cli.ignore_patterns.iter().cloned());
        }
        if cli.min_size.is_some() {
            self.min_size = cli.min_size;
        }
        if cli.max_size.is_some() {
            self.max_size = cli.max_size;
        }
        if cli.no_progress || cli.quiet {
            self.progress = false;
        }
        self.io_threads = self.io_threads.max(1);
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_skip_hidden(self.skip_hidden)
            .with_size_limits(self.min_size, self.max_size)
            .with_ignore_patterns(self.ignore_patterns.clone())
    }
}
