use mediadupe::duplicates::{find_duplicates, Resolver, SelectionPolicy};
use mediadupe::output::ScanReport;
use mediadupe::error::ExitCode;
use mediadupe::scanner::{Blake3Hasher, FileDescriptor, HashError, ScanError, Walker, WalkerConfig};
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use tempfile::tempdir;

#[test]
fn test_file_deleted_after_walk_is_reported() {
    let dir = tempdir().unwrap();
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        fs::write(dir.path().join(name), b"identical").unwrap();
    }

    let files: Vec<FileDescriptor> = Walker::new(vec![dir.path().to_path_buf()], WalkerConfig::default())
        .walk()
        .filter_map(Result::ok)
        .collect();
    fs::remove_file(dir.path().join("b.jpg")).unwrap();

    let outcome = find_duplicates(files, &Blake3Hasher::new());

    assert_eq!(outcome.groups.len(), 1);
    let names: Vec<String> = outcome.groups[0].files.iter().map(FileDescriptor::file_name).collect();
    assert_eq!(names, vec!["a.jpg", "c.jpg"]);
    assert_eq!(outcome.failures.len(), 1);
    assert!(matches!(outcome.failures[0].error, HashError::NotFound(_)));

    let report = ScanReport::new(outcome, Vec::new(), &Resolver::new(SelectionPolicy::Chronological));
    assert_eq!(report.exit_code(), ExitCode::PartialSuccess);
}

#[test]
fn test_nonexistent_descriptors_do_not_abort() {
    let files = vec![
        FileDescriptor::new("/nonexistent/mediadupe/1.jpg", 100, SystemTime::UNIX_EPOCH),
        FileDescriptor::new("/nonexistent/mediadupe/2.jpg", 100, SystemTime::UNIX_EPOCH),
    ];

    let outcome = find_duplicates(files, &Blake3Hasher::new());

    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.failures.len(), 2);
    for failure in &outcome.failures {
        assert!(
            matches!(failure.error, HashError::NotFound(_)),
            "Expected NotFound, got: {:?}",
            failure.error
        );
    }
}

#[test]
fn test_missing_root_does_not_stop_other_roots() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.jpg"), b"x").unwrap();

    let walker = Walker::new(
        vec![PathBuf::from("/nonexistent/mediadupe/root"), dir.path().to_path_buf()],
        WalkerConfig::default(),
    );
    let results: Vec<_> = walker.walk().collect();

    assert_eq!(results.len(), 2);
    assert!(matches!(results[0], Err(ScanError::NotFound(_))));
    assert!(results[1].is_ok());
}

#[test]
fn test_custom_hasher_errors_surface_in_failures() {
    let hasher = |f: &FileDescriptor| -> Result<[u8; 32], HashError> {
        if f.file_name().starts_with("bad") {
            Err(HashError::Other("checksum device offline".into()))
        } else {
            Ok([1; 32])
        }
    };
    let files = vec![
        FileDescriptor::new("/bad1.jpg", 8, SystemTime::UNIX_EPOCH),
        FileDescriptor::new("/good1.jpg", 8, SystemTime::UNIX_EPOCH),
        FileDescriptor::new("/good2.jpg", 8, SystemTime::UNIX_EPOCH),
        FileDescriptor::new("/bad2.jpg", 8, SystemTime::UNIX_EPOCH),
    ];

    let outcome = find_duplicates(files, &hasher);

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].len(), 2);
    assert_eq!(outcome.failures.len(), 2);
    assert!(outcome.failures.iter().all(|f| f.error.to_string() == "checksum device offline"));
}
