use dirdupe::duplicates::{DuplicateFinder, FinderConfig};
use dirdupe::registry::DirectoryRegistry;
use dirdupe::scanner::WalkerConfig;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_clean_directory_still_reported() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let c = tempdir().unwrap();
    fs::write(a.path().join("x"), "dup").unwrap();
    fs::write(b.path().join("y"), "dup").unwrap();
    fs::write(c.path().join("z"), "unique content").unwrap();

    let mut registry = DirectoryRegistry::new();
    assert!(registry
        .register_all([a.path(), b.path(), c.path()])
        .is_empty());

    let (report, _) = DuplicateFinder::with_defaults().find(&registry).unwrap();

    let order: Vec<_> = report
        .entries()
        .iter()
        .map(|entry| entry.directory.canonical_path.clone())
        .collect();
    assert_eq!(
        order,
        vec![
            fs::canonicalize(a.path()).unwrap(),
            fs::canonicalize(b.path()).unwrap(),
            fs::canonicalize(c.path()).unwrap(),
        ]
    );
    assert_eq!(report.entries()[0].duplicates.len(), 1);
    assert_eq!(report.entries()[1].duplicates.len(), 1);
    assert!(report.entries()[2].duplicates.is_empty());
}

#[test]
fn test_same_directory_twice_is_one_entry() {
    let a = tempdir().unwrap();
    fs::write(a.path().join("f1"), "twin").unwrap();
    fs::write(a.path().join("f2"), "twin").unwrap();

    let dotted = a.path().join(".");
    let mut registry = DirectoryRegistry::new();
    registry.register(a.path()).unwrap();
    registry.register(&dotted).unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.directories()[0].display_path, dotted);

    let (report, summary) = DuplicateFinder::with_defaults().find(&registry).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(summary.total_files, 2);
    assert_eq!(report.total_duplicates(), 2);
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_is_an_alias() {
    let base = tempdir().unwrap();
    let real = base.path().join("real");
    let link = base.path().join("link");
    fs::create_dir(&real).unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();
    fs::write(real.join("a"), "one").unwrap();
    fs::write(real.join("b"), "one").unwrap();

    let mut registry = DirectoryRegistry::new();
    registry.register(&real).unwrap();
    registry.register(&link).unwrap();
    assert_eq!(registry.len(), 1);

    let (report, summary) = DuplicateFinder::with_defaults().find(&registry).unwrap();
    assert_eq!(summary.total_files, 2);
    assert_eq!(report.entries()[0].directory.display_path, link);
    assert_eq!(report.total_duplicates(), 2);
}

#[test]
fn test_name_prefix_siblings_are_separate_owners() {
    let base = tempdir().unwrap();
    let short = base.path().join("data");
    let long = base.path().join("data2");
    fs::create_dir(&short).unwrap();
    fs::create_dir(&long).unwrap();
    fs::write(short.join("f"), "shared").unwrap();
    fs::write(long.join("f"), "shared").unwrap();

    let mut registry = DirectoryRegistry::new();
    registry.register(&short).unwrap();
    registry.register(&long).unwrap();

    let (report, _) = DuplicateFinder::with_defaults().find(&registry).unwrap();
    let short = fs::canonicalize(&short).unwrap();
    let long = fs::canonicalize(&long).unwrap();
    assert_eq!(report.get(&short).unwrap(), [short.join("f")]);
    assert_eq!(report.get(&long).unwrap(), [long.join("f")]);
}

#[cfg(unix)]
#[test]
fn test_file_symlinks_are_not_followed() {
    let a = tempdir().unwrap();
    fs::write(a.path().join("target"), "content").unwrap();
    std::os::unix::fs::symlink(a.path().join("target"), a.path().join("alias")).unwrap();

    let mut registry = DirectoryRegistry::new();
    registry.register(a.path()).unwrap();

    let (report, summary) = DuplicateFinder::with_defaults().find(&registry).unwrap();
    assert_eq!(summary.total_files, 1);
    assert!(report.is_clean());
}

fn duplicates_found(dirs: &[&Path], walker_config: WalkerConfig) -> usize {
    let mut registry = DirectoryRegistry::new();
    assert!(registry.register_all(dirs.iter().copied()).is_empty());
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (report, _) = finder.find(&registry).unwrap();
    report.total_duplicates()
}

#[test]
fn test_registered_hidden_directory_survives_parent_filter() {
    let a = tempdir().unwrap();
    let stash = a.path().join(".stash");
    fs::create_dir(&stash).unwrap();
    fs::write(stash.join("one"), "dup").unwrap();
    fs::write(stash.join("two"), "dup").unwrap();
    fs::write(a.path().join(".other"), "dup").unwrap();

    let config = WalkerConfig::default().with_skip_hidden(true);
    assert_eq!(duplicates_found(&[&stash], config.clone()), 2);
    assert_eq!(duplicates_found(&[a.path(), &stash], config.clone()), 2);
    assert_eq!(duplicates_found(&[&stash, a.path()], config), 2);
}

#[test]
fn test_registered_ignored_directory_survives_parent_filter() {
    let a = tempdir().unwrap();
    let build = a.path().join("build");
    fs::create_dir(&build).unwrap();
    fs::write(build.join("out1"), "dup").unwrap();
    fs::write(build.join("out2"), "dup").unwrap();

    let config = WalkerConfig::default().with_ignore_patterns(vec!["build/".to_string()]);
    assert_eq!(duplicates_found(&[&build], config.clone()), 2);
    assert_eq!(duplicates_found(&[a.path(), &build], config), 2);
}

#[test]
fn test_nested_registration_keeps_first_owner() {
    let a = tempdir().unwrap();
    let inner = a.path().join("inner");
    fs::create_dir(&inner).unwrap();
    fs::write(inner.join("x"), "dup").unwrap();
    fs::write(a.path().join("y"), "dup").unwrap();

    let mut registry = DirectoryRegistry::new();
    registry.register(a.path()).unwrap();
    registry.register(&inner).unwrap();
    let (report, summary) = DuplicateFinder::with_defaults().find(&registry).unwrap();

    let a = fs::canonicalize(a.path()).unwrap();
    assert_eq!(summary.total_files, 2);
    assert_eq!(
        report.get(&a).unwrap(),
        [a.join("inner").join("x"), a.join("y")]
    );
    assert!(report.get(&a.join("inner")).unwrap().is_empty());
}
