use dirdupe::duplicates::{DuplicateFinder, FinderError};
use dirdupe::registry::{DirectoryRegistry, RegistryError};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_missing_directory_does_not_block_others() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    fs::write(a.path().join("x"), "dup").unwrap();
    fs::write(b.path().join("x"), "dup").unwrap();
    let missing = a.path().join("does-not-exist");

    let mut registry = DirectoryRegistry::new();
    let errors = registry.register_all([a.path(), missing.as_path(), b.path()]);

    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], RegistryError::NotFound(path) if *path == missing));
    assert_eq!(registry.len(), 2);

    let (report, _) = DuplicateFinder::with_defaults().find(&registry).unwrap();
    assert_eq!(report.total_duplicates(), 2);
}

#[test]
fn test_file_is_not_a_directory() {
    let a = tempdir().unwrap();
    let file = a.path().join("plain.txt");
    fs::write(&file, "text").unwrap();

    let mut registry = DirectoryRegistry::new();
    let err = registry.register(&file).unwrap_err();
    assert!(matches!(err, RegistryError::NotADirectory(_)));
    assert!(registry.is_empty());
}

#[test]
fn test_empty_registry_fails() {
    let result = DuplicateFinder::with_defaults().find(&DirectoryRegistry::new());
    assert!(matches!(result, Err(FinderError::NoDirectories)));
}

#[cfg(unix)]
fn permissions_enforced(path: &std::path::Path) -> bool {
    // Privileged users read through mode 000.
    fs::File::open(path).is_err()
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_keeps_bucket_siblings() {
    use std::os::unix::fs::PermissionsExt;

    let a = tempdir().unwrap();
    let locked = a.path().join("locked.txt");
    fs::write(a.path().join("one.txt"), "same bytes").unwrap();
    fs::write(a.path().join("two.txt"), "same bytes").unwrap();
    fs::write(&locked, "same bytes").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if !permissions_enforced(&locked) {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let mut registry = DirectoryRegistry::new();
    registry.register(a.path()).unwrap();
    let result = DuplicateFinder::with_defaults().find(&registry);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    let (report, summary) = result.unwrap();
    let a = fs::canonicalize(a.path()).unwrap();
    assert_eq!(report.get(&a).unwrap(), [a.join("one.txt"), a.join("two.txt")]);
    assert_eq!(summary.failed_files, 1);
    assert_eq!(summary.hashed_files, 2);
    assert_eq!(summary.scan_errors.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let closed = a.path().join("closed");
    fs::create_dir(&closed).unwrap();
    fs::write(closed.join("inside"), "dup").unwrap();
    fs::write(a.path().join("open"), "dup").unwrap();
    fs::write(b.path().join("other"), "dup").unwrap();
    fs::set_permissions(&closed, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&closed).is_ok() {
        fs::set_permissions(&closed, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let mut registry = DirectoryRegistry::new();
    registry.register(a.path()).unwrap();
    registry.register(b.path()).unwrap();
    let result = DuplicateFinder::with_defaults().find(&registry);

    fs::set_permissions(&closed, fs::Permissions::from_mode(0o755)).unwrap();

    let (report, summary) = result.unwrap();
    assert_eq!(summary.total_files, 2);
    assert_eq!(report.total_duplicates(), 2);
}

#[cfg(unix)]
#[test]
fn test_unreadable_root_is_fatal_only_for_itself() {
    use std::os::unix::fs::PermissionsExt;

    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    fs::write(b.path().join("x"), "dup").unwrap();
    fs::write(b.path().join("y"), "dup").unwrap();
    fs::set_permissions(a.path(), fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(a.path()).is_ok() {
        fs::set_permissions(a.path(), fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let mut registry = DirectoryRegistry::new();
    registry.register(a.path()).unwrap();
    registry.register(b.path()).unwrap();
    let result = DuplicateFinder::with_defaults().find(&registry);

    fs::set_permissions(a.path(), fs::Permissions::from_mode(0o755)).unwrap();

    let (report, summary) = result.unwrap();
    assert_eq!(report.len(), 2);
    assert!(report.entries()[0].duplicates.is_empty());
    assert_eq!(report.entries()[1].duplicates.len(), 2);
    assert!(summary
        .scan_errors
        .iter()
        .any(|e| matches!(e, dirdupe::scanner::ScanError::RootUnreadable { .. })));
}
