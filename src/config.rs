//! Layered application configuration.
//!
//! Sources are merged in increasing priority:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory, or the file given with `--config`
//! 3. Environment variables prefixed `MEDIADUPE_` (e.g. `MEDIADUPE_IO_THREADS=8`)
//!
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::{CopyMarkers, PatternMarker, SelectionPolicy};
use crate::scanner::{default_extensions, WalkerConfig};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "MEDIADUPE_";

/// Errors from loading or interpreting the configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A source could not be parsed or has the wrong shape.
    #[error("Invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    MissingFile(PathBuf),

    /// A copy-marker pattern is not a valid regular expression.
    #[error("Invalid copy marker pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// The regex compiler's complaint
        source: regex::Error,
    },

    /// `io_threads` was set to zero.
    #[error("io_threads must be at least 1")]
    ZeroThreads,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hashing concurrency; `None` uses the available parallelism.
    pub io_threads: Option<usize>,
    /// Keep-selection policy.
    pub policy: SelectionPolicy,
    /// Copy-marker regexes replacing the built-in list.
    pub copy_markers: Option<Vec<String>>,
    /// Expand `.zip` containers.
    pub scan_archives: bool,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Skip dot files and directories.
    pub skip_hidden: bool,
    /// Extensions to include, without the dot. Empty means every file.
    pub extensions: Vec<String>,
    /// Read image dimensions from headers (used by the quality policy).
    pub probe_resolution: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: None,
            policy: SelectionPolicy::default(),
            copy_markers: None,
            scan_archives: true,
            follow_symlinks: false,
            skip_hidden: false,
            extensions: default_extensions(),
            probe_resolution: true,
        }
    }
}

impl Config {
    /// Load the merged configuration.
    ///
    /// With `path` set, that file must exist. Without it, the platform
    /// default `config.toml` is used when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source is malformed, the explicit file is
    /// missing, or `io_threads` is zero.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) if !p.is_file() => return Err(ConfigError::MissingFile(p.to_path_buf())),
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(ref file) = file {
            log::debug!("Reading config file {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Self = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// The platform config file location, e.g. `~/.config/mediadupe/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "mediadupe", "mediadupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.io_threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }

    /// Build the copy-marker list: the configured patterns, or the built-ins.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for the first pattern that does not compile.
    pub fn copy_markers(&self) -> Result<CopyMarkers, ConfigError> {
        let Some(ref patterns) = self.copy_markers else {
            return Ok(CopyMarkers::default());
        };

        let mut markers = CopyMarkers::none();
        for (i, pattern) in patterns.iter().enumerate() {
            let marker = PatternMarker::new(format!("config-{}", i + 1), pattern).map_err(
                |source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                },
            )?;
            markers.push(marker);
        }
        Ok(markers)
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            skip_hidden: self.skip_hidden,
            scan_archives: self.scan_archives,
            extensions: self
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            probe_resolution: self.probe_resolution,
        }
    }
}
