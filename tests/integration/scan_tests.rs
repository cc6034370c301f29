use filetime::{set_file_mtime, FileTime};
use mediadupe::duplicates::{DuplicateFinder, FinderConfig, Resolver, SelectionPolicy};
use mediadupe::scanner::{Blake3Hasher, FileDescriptor, Walker, WalkerConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use crate::common::bmp_bytes;

fn walk(root: &Path, config: WalkerConfig) -> Vec<FileDescriptor> {
    Walker::new(vec![root.to_path_buf()], config)
        .walk()
        .filter_map(Result::ok)
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let files = walk(dir.path(), WalkerConfig::default());

    let outcome = DuplicateFinder::with_defaults().find_duplicates(files, &Blake3Hasher::new());

    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.summary.total_files, 0);
}

#[test]
fn test_scan_finds_identical_media() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"same photo bytes").unwrap();
    fs::create_dir(dir.path().join("backup")).unwrap();
    fs::write(dir.path().join("backup").join("a.jpg"), b"same photo bytes").unwrap();
    fs::write(dir.path().join("b.jpg"), b"diff photo bytes").unwrap();
    fs::write(dir.path().join("notes.txt"), b"same photo bytes").unwrap();

    let files = walk(dir.path(), WalkerConfig::default());
    assert_eq!(files.len(), 3);

    let outcome = DuplicateFinder::with_defaults().find_duplicates(files, &Blake3Hasher::new());

    assert_eq!(outcome.groups.len(), 1);
    let group = &outcome.groups[0];
    assert_eq!(group.len(), 2);
    assert_eq!(group.size, 16);
    assert_eq!(group.hash, *blake3::hash(b"same photo bytes").as_bytes());
    assert!(group.files.iter().all(|f| f.file_name() == "a.jpg"));
    assert_eq!(outcome.summary.eliminated_by_digest, 1);
}

#[test]
fn test_scan_zero_byte_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("e1.mp4"), b"").unwrap();
    fs::write(dir.path().join("e2.mp4"), b"").unwrap();

    let files = walk(dir.path(), WalkerConfig::default());
    let outcome = DuplicateFinder::with_defaults().find_duplicates(files, &Blake3Hasher::new());

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].size, 0);
}

#[test]
fn test_scan_multiple_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("holiday.png"), b"png-ish content").unwrap();
    fs::write(second.path().join("holiday (1).png"), b"png-ish content").unwrap();

    let walker = Walker::new(
        vec![first.path().to_path_buf(), second.path().to_path_buf()],
        WalkerConfig::default(),
    );
    let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    let outcome = DuplicateFinder::with_defaults().find_duplicates(files, &Blake3Hasher::new());

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].files[0].file_name(), "holiday.png");
    assert_eq!(outcome.groups[0].files[1].file_name(), "holiday (1).png");
}

#[test]
fn test_scan_probes_resolution() {
    let dir = tempdir().unwrap();
    let image = bmp_bytes(6, 4);
    fs::write(dir.path().join("x.bmp"), &image).unwrap();
    fs::write(dir.path().join("y.bmp"), &image).unwrap();

    let files = walk(dir.path(), WalkerConfig::default());
    assert!(files
        .iter()
        .all(|f| f.resolution.map(|r| (r.width, r.height)) == Some((6, 4))));

    let no_probe = walk(
        dir.path(),
        WalkerConfig {
            probe_resolution: false,
            ..Default::default()
        },
    );
    assert!(no_probe.iter().all(|f| f.resolution.is_none()));
}

#[test]
fn test_quality_policy_keeps_newest_modified_copy() {
    let dir = tempdir().unwrap();
    let old = dir.path().join("old.mov");
    let new = dir.path().join("new.mov");
    fs::write(&old, b"video frames").unwrap();
    fs::write(&new, b"video frames").unwrap();
    set_file_mtime(&old, FileTime::from_unix_time(1_000_000, 0)).unwrap();
    set_file_mtime(&new, FileTime::from_unix_time(2_000_000, 0)).unwrap();

    let files = walk(dir.path(), WalkerConfig::default());
    let mut outcome = DuplicateFinder::with_defaults().find_duplicates(files, &Blake3Hasher::new());
    assert_eq!(outcome.groups.len(), 1);

    let resolver = Resolver::new(SelectionPolicy::Quality);
    resolver.annotate(&mut outcome.groups[0]).unwrap();
    let keep = outcome.groups[0].file_to_keep.as_ref().unwrap();
    assert_eq!(keep.file_name(), "new.mov");
}

#[test]
fn test_chronological_policy_prefers_clean_name_on_disk() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("clip(1).mp4"), b"clip").unwrap();
    fs::write(dir.path().join("clip.mp4"), b"clip").unwrap();

    // Pin both timestamps so creation falls back to the same value where
    // birth time is unavailable.
    let files: Vec<FileDescriptor> = walk(dir.path(), WalkerConfig::default())
        .into_iter()
        .map(|mut f| {
            f.created = std::time::SystemTime::UNIX_EPOCH;
            f
        })
        .collect();
    let outcome = DuplicateFinder::new(FinderConfig::default().with_io_threads(2))
        .find_duplicates(files, &Blake3Hasher::new());

    let keep = Resolver::new(SelectionPolicy::Chronological)
        .resolve(&outcome.groups[0])
        .unwrap();
    assert_eq!(keep.file_name(), "clip.mp4");
}

#[test]
fn test_large_file_hashes_match_streaming() {
    let dir = tempdir().unwrap();
    let big = vec![7u8; (mediadupe::scanner::hasher::MMAP_THRESHOLD as usize) + 1];
    let path = dir.path().join("big.mkv");
    fs::write(&path, &big).unwrap();

    let hasher = Blake3Hasher::new();
    assert_eq!(hasher.hash_path(&path).unwrap(), *blake3::hash(&big).as_bytes());
}

#[test]
fn test_scan_nested_and_repeated_roots_walk_each_file_once() {
    let dir = tempdir().unwrap();
    let year = dir.path().join("2020");
    fs::create_dir(&year).unwrap();
    fs::write(year.join("only.jpg"), b"one of a kind").unwrap();
    fs::write(dir.path().join("other.jpg"), b"something else").unwrap();

    let walker = Walker::new(
        vec![
            year.clone(),
            dir.path().to_path_buf(),
            dir.path().join(".").join("2020"),
            dir.path().to_path_buf(),
        ],
        WalkerConfig::default(),
    );
    assert_eq!(walker.roots(), [dir.path().to_path_buf()]);

    let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    assert_eq!(files.len(), 2);

    let outcome = DuplicateFinder::with_defaults().find_duplicates(files, &Blake3Hasher::new());
    assert!(outcome.groups.is_empty());
}

#[test]
fn test_scan_sibling_roots_with_shared_prefix_are_both_walked() {
    let dir = tempdir().unwrap();
    let photos = dir.path().join("photos");
    let photos2 = dir.path().join("photos2");
    fs::create_dir(&photos).unwrap();
    fs::create_dir(&photos2).unwrap();
    fs::write(photos.join("a.jpg"), b"shared").unwrap();
    fs::write(photos2.join("a.jpg"), b"shared").unwrap();

    let walker = Walker::new(vec![photos, photos2], WalkerConfig::default());
    assert_eq!(walker.roots().len(), 2);

    let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    let outcome = DuplicateFinder::with_defaults().find_duplicates(files, &Blake3Hasher::new());
    assert_eq!(outcome.groups.len(), 1);
}

#[test]
#[cfg(unix)]
fn test_scan_hardlinks_are_not_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"linked photo").unwrap();
    fs::hard_link(dir.path().join("a.jpg"), dir.path().join("b.jpg")).unwrap();
    fs::write(dir.path().join("c.jpg"), b"linked photo").unwrap();

    let files = walk(dir.path(), WalkerConfig::default());
    let names: Vec<String> = files.iter().map(FileDescriptor::file_name).collect();
    assert_eq!(names, vec!["a.jpg", "c.jpg"]);

    let outcome = DuplicateFinder::with_defaults().find_duplicates(files, &Blake3Hasher::new());
    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.summary.reclaimable_space, 12);
}

#[test]
#[cfg(unix)]
fn test_scan_hardlink_pair_alone_yields_no_group() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"linked photo").unwrap();
    fs::hard_link(dir.path().join("a.jpg"), dir.path().join("b.jpg")).unwrap();

    let files = walk(dir.path(), WalkerConfig::default());
    let outcome = DuplicateFinder::with_defaults().find_duplicates(files, &Blake3Hasher::new());
    assert!(outcome.groups.is_empty());
}
