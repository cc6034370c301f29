//! Scanner module for file enumeration and content hashing.
//!
//! This module provides the collaborators that feed the duplicate finder:
//! - Parallel directory walking using jwalk
//! - Zip archive member enumeration without extraction
//! - Media resolution probing from image headers
//! - Content hashing with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`archive`]: Zip container listing and member streaming
//! - [`hardlink`]: Inode tracking so one file is never its own duplicate
//! - [`media`]: Width × height probing for photos
//! - [`hasher`]: BLAKE3 implementation of [`ContentHasher`](crate::duplicates::ContentHasher)
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from("/photos")], WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.location(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod archive;
pub mod hardlink;
pub mod hasher;
pub mod media;
pub mod walker;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

// Re-export main types
pub use hasher::{hash_to_hex, hex_to_hash, Blake3Hasher, Hash};
pub use walker::Walker;

/// Separator between an archive path and a member name in [`FileDescriptor::location`].
pub const ARCHIVE_SEPARATOR: &str = "!/";

/// Pixel dimensions of a photo or video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Resolution {
    /// Create a new resolution.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count.
    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Metadata for a discovered file.
///
/// A descriptor is produced once per file by the enumeration layer and is
/// never mutated afterwards. Members of an archive carry the archive path in
/// [`archive`](Self::archive) and their in-archive name in [`path`](Self::path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Absolute path, or the member name inside `archive`
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Creation time
    pub created: SystemTime,
    /// Last modification time, when the platform reports one
    #[serde(default)]
    pub modified: Option<SystemTime>,
    /// Media resolution, when it could be read from the header
    #[serde(default)]
    pub resolution: Option<Resolution>,
    /// Path of the containing archive for archive members
    #[serde(default)]
    pub archive: Option<PathBuf>,
}

impl FileDescriptor {
    /// Create a new descriptor for a plain filesystem file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `created` - Creation time
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64, created: SystemTime) -> Self {
        Self {
            path: path.into(),
            size,
            created,
            modified: None,
            resolution: None,
            archive: None,
        }
    }

    /// Set the modification time.
    #[must_use]
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Set the media resolution.
    #[must_use]
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some(Resolution::new(width, height));
        self
    }

    /// Mark this descriptor as a member of the given archive.
    #[must_use]
    pub fn in_archive(mut self, archive: impl Into<PathBuf>) -> Self {
        self.archive = Some(archive.into());
        self
    }

    /// Whether the file lives inside an archive container.
    #[must_use]
    pub fn is_archive_member(&self) -> bool {
        self.archive.is_some()
    }

    /// Base name including the extension.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Base name without the final extension.
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Full path string, with archive members rendered as `archive!/member`.
    #[must_use]
    pub fn location(&self) -> String {
        match &self.archive {
            Some(archive) => format!(
                "{}{}{}",
                archive.display(),
                ARCHIVE_SEPARATOR,
                self.path.display()
            ),
            None => self.path.display().to_string(),
        }
    }

    /// Lowercased extension, empty when there is none.
    #[must_use]
    pub fn extension(&self) -> String {
        extension_of(&self.path)
    }
}

/// Lowercased extension of a path, empty when there is none.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Photo extensions picked up by default.
pub const PHOTO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "heic", "heif", "dng", "cr2",
    "nef", "arw",
];

/// Video extensions picked up by default.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "m4v", "avi", "mkv", "mts", "m2ts", "3gp", "wmv", "webm",
];

/// Configuration for file enumeration.
///
/// Controls filtering, symlink handling, and archive expansion.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Expand `.zip` containers into their members.
    pub scan_archives: bool,

    /// Lowercased extensions to include. Empty means every file.
    pub extensions: Vec<String>,

    /// Read width × height from image headers.
    pub probe_resolution: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            skip_hidden: false,
            scan_archives: true,
            extensions: default_extensions(),
            probe_resolution: true,
        }
    }
}

impl WalkerConfig {
    /// Whether a path passes the extension filter.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let ext = extension_of(path);
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
    }
}

/// The combined photo and video extension list.
#[must_use]
pub fn default_extensions() -> Vec<String> {
    PHOTO_EXTENSIONS
        .iter()
        .chain(VIDEO_EXTENSIONS)
        .map(|s| (*s).to_string())
        .collect()
}

/// Errors that can occur during enumeration.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The archive container could not be read.
    #[error("Unreadable archive {path}: {source}")]
    Archive {
        /// Path of the archive
        path: PathBuf,
        /// The underlying zip error
        #[source]
        source: zip::result::ZipError,
    },
}

impl ScanError {
    /// Classify an I/O error into a scan error for `path`.
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(path) | Self::NotFound(path) => path,
            Self::Io { path, .. } | Self::Archive { path, .. } => path,
        }
    }
}

/// Errors that can occur while hashing a single file.
///
/// Any of these excludes only the affected file from duplicate detection.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(String),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {location}: {source}")]
    Io {
        /// Location of the file
        location: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The containing archive or the member could not be read.
    #[error("Archive error for {location}: {source}")]
    Archive {
        /// Location of the member
        location: String,
        /// The underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// Hashing was stopped by a shutdown request.
    #[error("Hashing interrupted: {0}")]
    Interrupted(String),

    /// Any other failure reported by a custom hasher.
    #[error("{0}")]
    Other(String),
}

impl HashError {
    /// Classify an I/O error into a hash error for `location`.
    pub(crate) fn from_io(location: String, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(location),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(location),
            _ => Self::Io {
                location,
                source: err,
            },
        }
    }
}
