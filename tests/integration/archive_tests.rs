use mediadupe::duplicates::{find_duplicates, resolve_keep, SelectionPolicy};
use mediadupe::scanner::{archive, Blake3Hasher, FileDescriptor, HashError, ScanError, Walker, WalkerConfig};
use mediadupe::duplicates::ContentHasher;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use crate::common::{bmp_bytes, write_zip};

fn walk(root: &Path, config: WalkerConfig) -> Vec<Result<FileDescriptor, ScanError>> {
    Walker::new(vec![root.to_path_buf()], config).walk().collect()
}

#[test]
fn test_archive_member_duplicates_plain_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("beach.jpg"), b"beach photo content").unwrap();
    write_zip(
        &dir.path().join("phone.zip"),
        &[
            ("DCIM/beach.jpg", b"beach photo content"),
            ("DCIM/other.jpg", b"something different"),
        ],
    );

    let files: Vec<_> = walk(dir.path(), WalkerConfig::default())
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    assert_eq!(files.len(), 3);

    let outcome = find_duplicates(files, &Blake3Hasher::new());

    assert_eq!(outcome.groups.len(), 1);
    let locations = outcome.groups[0].locations();
    assert_eq!(locations.len(), 2);
    assert!(locations.iter().any(|l| l.ends_with("beach.jpg") && !l.contains("!/")));
    assert!(locations.iter().any(|l| l.ends_with("phone.zip!/DCIM/beach.jpg")));
}

#[test]
fn test_duplicates_inside_one_archive() {
    let dir = tempdir().unwrap();
    let zip_path = dir.path().join("export.zip");
    write_zip(
        &zip_path,
        &[
            ("2020/IMG_1.mp4", b"same clip"),
            ("2021/IMG_1 - Copy.mp4", b"same clip"),
        ],
    );

    let files: Vec<_> = walk(&zip_path, WalkerConfig::default())
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    let outcome = find_duplicates(files, &Blake3Hasher::new());
    assert_eq!(outcome.groups.len(), 1);

    // Both members carry the same DOS timestamp, so the clean name decides.
    let keep = resolve_keep(&outcome.groups[0], SelectionPolicy::Chronological).unwrap();
    assert_eq!(keep.file_name(), "IMG_1.mp4");
    assert!(keep.is_archive_member());
}

#[test]
fn test_no_archives_skips_containers() {
    let dir = tempdir().unwrap();
    write_zip(&dir.path().join("a.zip"), &[("x.jpg", b"x")]);
    fs::write(dir.path().join("x.jpg"), b"x").unwrap();

    let config = WalkerConfig {
        scan_archives: false,
        ..Default::default()
    };
    let files: Vec<_> = walk(dir.path(), config).into_iter().filter_map(Result::ok).collect();

    assert_eq!(files.len(), 1);
    assert!(!files[0].is_archive_member());
}

#[test]
fn test_corrupt_archive_reported_and_scan_continues() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("broken.zip"), b"definitely not a zip").unwrap();
    fs::write(dir.path().join("ok.jpg"), b"fine").unwrap();

    let results = walk(dir.path(), WalkerConfig::default());

    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(ScanError::Archive { .. }))));
    assert!(results.iter().any(|r| r.as_ref().is_ok_and(|f| f.file_name() == "ok.jpg")));
}

#[test]
fn test_member_resolution_probed_from_prefix() {
    let dir = tempdir().unwrap();
    let zip_path = dir.path().join("pics.zip");
    let image = bmp_bytes(8, 2);
    write_zip(&zip_path, &[("pic.bmp", image.as_slice())]);

    let members = archive::list_members(&zip_path, &WalkerConfig::default()).unwrap();

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].resolution.map(|r| r.area()), Some(16));
    assert_eq!(members[0].size, image.len() as u64);
}

#[test]
fn test_hash_member_matches_file_hash() {
    let dir = tempdir().unwrap();
    let zip_path = dir.path().join("a.zip");
    write_zip(&zip_path, &[("inner/photo.jpg", b"pixels")]);
    let plain = dir.path().join("photo.jpg");
    fs::write(&plain, b"pixels").unwrap();

    let hasher = Blake3Hasher::new();
    let member = FileDescriptor::new("inner/photo.jpg", 6, std::time::SystemTime::UNIX_EPOCH)
        .in_archive(&zip_path);

    assert_eq!(hasher.digest(&member).unwrap(), hasher.hash_path(&plain).unwrap());
}

#[test]
fn test_missing_member_is_hash_failure() {
    let dir = tempdir().unwrap();
    let zip_path = dir.path().join("a.zip");
    write_zip(&zip_path, &[("present.jpg", b"data")]);

    let hasher = Blake3Hasher::new();
    let ghost = FileDescriptor::new("absent.jpg", 4, std::time::SystemTime::UNIX_EPOCH)
        .in_archive(&zip_path);

    assert!(matches!(hasher.digest(&ghost), Err(HashError::Archive { .. })));
}
