use dirdupe::duplicates::{DuplicateFinder, FinderConfig};
use dirdupe::registry::DirectoryRegistry;
use dirdupe::scanner::WalkerConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}

fn registry_for(dirs: &[&Path]) -> DirectoryRegistry {
    let mut registry = DirectoryRegistry::new();
    for dir in dirs {
        registry.register(dir).unwrap();
    }
    registry
}

#[test]
fn test_same_content_in_two_directories() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    fs::write(a.path().join("x.txt"), "hello").unwrap();
    fs::write(b.path().join("x.txt"), "hello").unwrap();

    let registry = registry_for(&[a.path(), b.path()]);
    let (report, _) = DuplicateFinder::with_defaults().find(&registry).unwrap();

    let a = canonical(a.path());
    let b = canonical(b.path());
    assert_eq!(report.get(&a).unwrap(), [a.join("x.txt")]);
    assert_eq!(report.get(&b).unwrap(), [b.join("x.txt")]);
}

#[test]
fn test_same_size_different_content_not_reported() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    fs::write(a.path().join("x.txt"), "hello").unwrap();
    fs::write(b.path().join("y.txt"), "world").unwrap();

    let registry = registry_for(&[a.path(), b.path()]);
    let (report, summary) = DuplicateFinder::with_defaults().find(&registry).unwrap();

    assert_eq!(report.len(), 2);
    assert!(report.get(&canonical(a.path())).unwrap().is_empty());
    assert!(report.get(&canonical(b.path())).unwrap().is_empty());
    assert_eq!(summary.hashed_files, 2);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_duplicates_within_one_directory() {
    let a = tempdir().unwrap();
    fs::write(a.path().join("q.txt"), "same").unwrap();
    fs::write(a.path().join("p.txt"), "same").unwrap();

    let registry = registry_for(&[a.path()]);
    let (report, _) = DuplicateFinder::with_defaults().find(&registry).unwrap();

    let a = canonical(a.path());
    assert_eq!(report.get(&a).unwrap(), [a.join("p.txt"), a.join("q.txt")]);
}

#[test]
fn test_nested_registration_first_registered_owns() {
    let a = tempdir().unwrap();
    let sub = a.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("dup.txt"), "payload").unwrap();
    fs::write(a.path().join("dup.txt"), "payload").unwrap();

    let a_canon = canonical(a.path());
    let sub_canon = canonical(&sub);

    // Outer first: the outer directory owns everything below it.
    let registry = registry_for(&[a.path(), &sub]);
    let (report, summary) = DuplicateFinder::with_defaults().find(&registry).unwrap();
    assert_eq!(summary.total_files, 2);
    assert_eq!(
        report.get(&a_canon).unwrap(),
        [a_canon.join("dup.txt"), sub_canon.join("dup.txt")]
    );
    assert!(report.get(&sub_canon).unwrap().is_empty());

    // Inner first: the subdirectory keeps its own file.
    let registry = registry_for(&[&sub, a.path()]);
    let (report, summary) = DuplicateFinder::with_defaults().find(&registry).unwrap();
    assert_eq!(summary.total_files, 2);
    assert_eq!(report.get(&sub_canon).unwrap(), [sub_canon.join("dup.txt")]);
    assert_eq!(report.get(&a_canon).unwrap(), [a_canon.join("dup.txt")]);
}

#[test]
fn test_unique_size_is_never_hashed() {
    let a = tempdir().unwrap();
    fs::write(a.path().join("one.txt"), "1").unwrap();
    fs::write(a.path().join("two.txt"), "22").unwrap();
    fs::write(a.path().join("three.txt"), "333").unwrap();

    let registry = registry_for(&[a.path()]);
    let (report, summary) = DuplicateFinder::with_defaults().find(&registry).unwrap();

    assert!(report.is_clean());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_size, 3);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let a = tempdir().unwrap();
    fs::write(a.path().join("empty1"), "").unwrap();
    fs::write(a.path().join("empty2"), "").unwrap();

    let registry = registry_for(&[a.path()]);
    let (report, summary) = DuplicateFinder::with_defaults().find(&registry).unwrap();

    let a = canonical(a.path());
    assert_eq!(report.get(&a).unwrap(), [a.join("empty1"), a.join("empty2")]);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_deeply_nested_files_are_found() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let deep = a.path().join("l1").join("l2").join("l3");
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("deep.bin"), vec![7u8; 4096]).unwrap();
    fs::write(b.path().join("copy.bin"), vec![7u8; 4096]).unwrap();

    let registry = registry_for(&[a.path(), b.path()]);
    let (report, summary) = DuplicateFinder::with_defaults().find(&registry).unwrap();

    let a_canon = canonical(a.path());
    assert_eq!(
        report.get(&a_canon).unwrap(),
        [a_canon.join("l1").join("l2").join("l3").join("deep.bin")]
    );
    assert_eq!(summary.reclaimable_space, 4096);
}

#[test]
fn test_paranoid_mode_confirms_matches() {
    let a = tempdir().unwrap();
    fs::write(a.path().join("1.dat"), vec![1u8; 10_000]).unwrap();
    fs::write(a.path().join("2.dat"), vec![1u8; 10_000]).unwrap();
    fs::write(a.path().join("3.dat"), vec![2u8; 10_000]).unwrap();

    let registry = registry_for(&[a.path()]);
    let finder = DuplicateFinder::new(FinderConfig::default().with_paranoid(true));
    let (report, summary) = finder.find(&registry).unwrap();

    let a = canonical(a.path());
    assert_eq!(report.get(&a).unwrap(), [a.join("1.dat"), a.join("2.dat")]);
    assert_eq!(summary.duplicate_groups, 1);
}

#[test]
fn test_walker_filters_apply() {
    let a = tempdir().unwrap();
    fs::write(a.path().join("keep1.txt"), "content!").unwrap();
    fs::write(a.path().join("keep2.txt"), "content!").unwrap();
    fs::write(a.path().join("skip1.tmp"), "content!").unwrap();
    fs::write(a.path().join(".hidden"), "content!").unwrap();
    fs::write(a.path().join("tiny1"), "x").unwrap();
    fs::write(a.path().join("tiny2"), "x").unwrap();

    let walker_config = WalkerConfig::default()
        .with_skip_hidden(true)
        .with_size_limits(Some(2), None)
        .with_ignore_patterns(vec!["*.tmp".to_string()]);
    let registry = registry_for(&[a.path()]);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (report, summary) = finder.find(&registry).unwrap();

    let a = canonical(a.path());
    assert_eq!(summary.total_files, 2);
    assert_eq!(report.get(&a).unwrap(), [a.join("keep1.txt"), a.join("keep2.txt")]);
}

#[test]
fn test_repeated_scans_are_identical() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    for i in 0..10 {
        fs::write(a.path().join(format!("f{i}")), format!("content {}", i % 3)).unwrap();
        fs::write(b.path().join(format!("g{i}")), format!("content {}", i % 4)).unwrap();
    }

    let registry = registry_for(&[a.path(), b.path()]);
    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find(&registry).unwrap();
    let (second, _) = finder.find(&registry).unwrap();

    assert_eq!(first, second);
    assert!(!first.is_clean());
}
