use figment::providers::Serialized;
use mediadupe::config::{Config, ConfigError};
use mediadupe::duplicates::SelectionPolicy;
use std::fs;
use tempfile::tempdir;

use crate::common::env_lock;

#[test]
fn test_config_defaults_extract() {
    let figment = figment::Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.policy, SelectionPolicy::Chronological);
    assert!(config.io_threads.is_none());
}

#[test]
fn test_config_load_from_toml() {
    let _guard = env_lock();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
policy = "quality"
io_threads = 3
scan_archives = false
extensions = ["jpg", "mp4"]
copy_markers = ['_dup$', '\(\d+\)$']
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();

    assert_eq!(config.policy, SelectionPolicy::Quality);
    assert_eq!(config.io_threads, Some(3));
    assert!(!config.scan_archives);
    assert_eq!(config.extensions, vec!["jpg", "mp4"]);
    // Unset keys keep their defaults.
    assert!(config.probe_resolution);

    let markers = config.copy_markers().unwrap();
    assert_eq!(markers.len(), 2);
    assert!(markers.is_copy("photo_dup"));
    assert!(markers.is_copy("photo (2)"));
    assert!(!markers.is_copy("photo - Copy"));
}

#[test]
fn test_env_overrides_file() {
    let _guard = env_lock();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "policy = \"quality\"\nio_threads = 2\n").unwrap();

    std::env::set_var("MEDIADUPE_POLICY", "chronological");
    std::env::set_var("MEDIADUPE_SKIP_HIDDEN", "true");
    let result = Config::load(Some(&path));
    std::env::remove_var("MEDIADUPE_POLICY");
    std::env::remove_var("MEDIADUPE_SKIP_HIDDEN");

    let config = result.unwrap();
    assert_eq!(config.policy, SelectionPolicy::Chronological);
    assert_eq!(config.io_threads, Some(2));
    assert!(config.skip_hidden);
}

#[test]
fn test_malformed_toml_is_error() {
    let _guard = env_lock();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "policy = \"sharpest\"\n").unwrap();

    assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Figment(_))));

    fs::write(&path, "io_threads = 0\n").unwrap();
    assert!(matches!(Config::load(Some(&path)), Err(ConfigError::ZeroThreads)));
}

#[test]
fn test_invalid_marker_pattern_in_file() {
    let _guard = env_lock();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "copy_markers = ['(unclosed']\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    let err = config.copy_markers().unwrap_err();

    assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    assert!(err.to_string().contains("(unclosed"));
}

#[test]
fn test_walker_config_from_file() {
    let _guard = env_lock();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "follow_symlinks = true\nextensions = [\".HEIC\"]\nprobe_resolution = false\n").unwrap();

    let walker = Config::load(Some(&path)).unwrap().walker_config();

    assert!(walker.follow_symlinks);
    assert!(!walker.probe_resolution);
    assert_eq!(walker.extensions, vec!["heic"]);
}
