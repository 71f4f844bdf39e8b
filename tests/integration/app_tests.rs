//! End-to-end runs through `run_app`.

use clap::Parser;
use dirdupe::cli::Cli;
use dirdupe::error::ExitCode;
use dirdupe::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(dirs: &[&Path], extra: &[&str]) -> anyhow::Result<ExitCode> {
    let mut args = vec!["dirdupe".to_string(), "-q".to_string(), "--no-progress".to_string()];
    // Point at a config file that never exists so the user's own config is not read.
    args.push("--config".to_string());
    args.push(
        std::env::temp_dir()
            .join("dirdupe-test-no-such-config.toml")
            .to_string_lossy()
            .into_owned(),
    );
    for dir in dirs {
        args.push("--dir".to_string());
        args.push(dir.to_string_lossy().into_owned());
    }
    args.extend(extra.iter().map(|s| (*s).to_string()));
    run_app(Cli::try_parse_from(args).unwrap())
}

#[test]
fn test_duplicates_found_exit_code() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    fs::write(a.path().join("x.txt"), "hello").unwrap();
    fs::write(b.path().join("x.txt"), "hello").unwrap();

    assert_eq!(run(&[a.path(), b.path()], &[]).unwrap(), ExitCode::Success);
}

#[test]
fn test_no_duplicates_exit_code() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    fs::write(a.path().join("x.txt"), "hello").unwrap();
    fs::write(b.path().join("y.txt"), "world").unwrap();

    assert_eq!(
        run(&[a.path(), b.path()], &["--output", "json"]).unwrap(),
        ExitCode::NoDuplicates
    );
}

#[test]
fn test_missing_directory_is_partial_success() {
    let a = tempdir().unwrap();
    fs::write(a.path().join("p"), "same").unwrap();
    fs::write(a.path().join("q"), "same").unwrap();
    let missing = a.path().join("missing");

    assert_eq!(
        run(&[a.path(), &missing], &[]).unwrap(),
        ExitCode::PartialSuccess
    );
}

#[test]
fn test_no_usable_directory_is_an_error() {
    let a = tempdir().unwrap();
    let missing = a.path().join("missing");

    let err = run(&[&missing], &[]).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{:#}", err).contains("No directories registered"));
}

#[test]
fn test_scan_options_are_accepted() {
    let a = tempdir().unwrap();
    fs::write(a.path().join("big1"), vec![0u8; 2048]).unwrap();
    fs::write(a.path().join("big2"), vec![0u8; 2048]).unwrap();
    fs::write(a.path().join("s1"), "s").unwrap();
    fs::write(a.path().join("s2"), "s").unwrap();

    let code = run(
        &[a.path()],
        &["--min-size", "1KiB", "--paranoid", "--io-threads", "2", "--no-color"],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    let code = run(&[a.path()], &["--min-size", "4KiB"]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}
