//! Configuration layering: defaults < TOML file < environment < CLI flags.

use clap::Parser;
use dirdupe::cli::{Cli, OutputFormat};
use dirdupe::config::Config;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clear all DIRDUPE_* environment variables to avoid interference.
fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("DIRDUPE_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_config_hierarchy_defaults_file_env_cli() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
io_threads = 8
output = "json"
skip_hidden = true
"#,
    )
    .unwrap();

    std::env::set_var("DIRDUPE_OUTPUT", "text");
    let mut config = Config::load(Some(path.as_path()));
    std::env::remove_var("DIRDUPE_OUTPUT");

    assert_eq!(config.io_threads, 8);
    assert_eq!(config.output, OutputFormat::Text);
    assert!(config.skip_hidden);

    let cli = Cli::try_parse_from(["dirdupe", "--dir", ".", "--io-threads", "1"]).unwrap();
    config.merge_cli(&cli);
    assert_eq!(config.io_threads, 1);
    assert_eq!(config.output, OutputFormat::Text);
}

#[test]
fn test_env_list_of_patterns() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    std::env::set_var("DIRDUPE_IGNORE_PATTERNS", "[\"*.tmp\", \"cache/\"]");
    let config = Config::load(Some(dir.path().join("absent.toml").as_path()));
    std::env::remove_var("DIRDUPE_IGNORE_PATTERNS");

    assert_eq!(config.ignore_patterns, vec!["*.tmp", "cache/"]);
}

#[test]
fn test_size_limits_from_file_reach_walker() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "min_size = 100\nmax_size = 2000\n").unwrap();

    let walker = Config::load_from_path(&path).walker_config();
    assert_eq!(walker.min_size, Some(100));
    assert_eq!(walker.max_size, Some(2000));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "paranoya = true\nparanoid = true\n").unwrap();

    let config = Config::load_from_path(&path);
    assert!(config.paranoid);
}
