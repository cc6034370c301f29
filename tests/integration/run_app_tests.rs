use clap::Parser;
use mediadupe::cli::Cli;
use mediadupe::error::ExitCode;
use mediadupe::run_app;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

use crate::common::{env_lock, write_zip};

/// Empty config file so the user's own configuration never leaks in.
fn isolated_config() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "").unwrap();
    dir
}

fn run(config_dir: &Path, extra: &[&str]) -> anyhow::Result<ExitCode> {
    let config = config_dir.join("config.toml");
    let mut argv = vec![
        "mediadupe".to_string(),
        "-q".to_string(),
        "--config".to_string(),
        config.display().to_string(),
        "scan".to_string(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_run_no_duplicates() {
    let _guard = env_lock();
    let config = isolated_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"one").unwrap();
    fs::write(dir.path().join("b.jpg"), b"two").unwrap();

    let code = run(config.path(), &[dir.path().to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_run_with_duplicates() {
    let _guard = env_lock();
    let config = isolated_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"same").unwrap();
    fs::write(dir.path().join("a (1).jpg"), b"same").unwrap();

    let code = run(
        config.path(),
        &[dir.path().to_str().unwrap(), "--output", "json"],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    // Report-only: both copies are still there.
    assert!(dir.path().join("a.jpg").exists());
    assert!(dir.path().join("a (1).jpg").exists());
}

#[test]
fn test_run_partial_success_on_corrupt_archive() {
    let _guard = env_lock();
    let config = isolated_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"same").unwrap();
    write_zip(&dir.path().join("good.zip"), &[("a.jpg", b"same")]);
    fs::write(dir.path().join("bad.zip"), b"not a zip").unwrap();

    let code = run(config.path(), &[dir.path().to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::PartialSuccess);
}

#[test]
fn test_run_no_archives_flag() {
    let _guard = env_lock();
    let config = isolated_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"same").unwrap();
    write_zip(&dir.path().join("good.zip"), &[("a.jpg", b"same")]);

    let code = run(
        config.path(),
        &[dir.path().to_str().unwrap(), "--no-archives"],
    )
    .unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_run_missing_root_is_error() {
    let _guard = env_lock();
    let config = isolated_config();
    let err = run(config.path(), &["/nonexistent/mediadupe/root"]).unwrap_err();
    assert!(err.to_string().contains("Path not found"));
}

#[test]
fn test_run_bad_config_is_error() {
    let _guard = env_lock();
    let config = tempdir().unwrap();
    fs::write(config.path().join("config.toml"), "copy_markers = ['[']\n").unwrap();
    let dir = tempdir().unwrap();

    assert!(run(config.path(), &[dir.path().to_str().unwrap()]).is_err());
}

#[test]
fn test_run_missing_explicit_config_is_error() {
    let _guard = env_lock();
    let missing = tempdir().unwrap();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"x").unwrap();

    let err = run(missing.path(), &[dir.path().to_str().unwrap()]).unwrap_err();
    assert!(format!("{:#}", err).contains("configuration"));
}
