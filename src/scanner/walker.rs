//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! [`Walker`] traverses one or more root directories and yields a
//! [`FileDescriptor`] for every photo or video it finds. Zip containers are
//! expanded into their members when [`WalkerConfig::scan_archives`] is set.
//!
//! # Features
//!
//! - Parallel directory reading via jwalk, with sorted, deterministic output
//! - Extension filtering (photo and video types by default)
//! - Overlapping and repeated roots walked once
//! - Hardlink detection via [`HardlinkTracker`]
//! - Creation time with a fallback to modification time
//! - Header-only resolution probing
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Pictures")], WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} media files", files.len());
//! ```

use std::cell::RefCell;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

use jwalk::WalkDir;

use super::hardlink::HardlinkTracker;
use super::{archive, media, FileDescriptor, ScanError, WalkerConfig};

/// Directory walker for parallel file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root paths to walk, in order
    roots: Vec<PathBuf>,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker over the given roots.
    ///
    /// Repeated roots and roots nested inside another root are dropped so
    /// that no file is yielded twice. Roots that cannot be resolved are kept
    /// and report their error from [`walk`](Self::walk).
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        Self {
            roots: normalize_roots(roots),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The roots that will be walked, after overlap removal.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk all roots, yielding file descriptors.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. A root that does not exist yields a single
    /// [`ScanError::NotFound`]. Only the first link to a hardlinked file
    /// is yielded.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileDescriptor, ScanError>> + '_ {
        let tracker = Rc::new(RefCell::new(HardlinkTracker::new()));
        self.roots
            .iter()
            .flat_map(move |root| self.walk_root(root, Rc::clone(&tracker)))
    }

    fn walk_root<'a>(
        &'a self,
        root: &'a Path,
        tracker: Rc<RefCell<HardlinkTracker>>,
    ) -> Box<dyn Iterator<Item = Result<FileDescriptor, ScanError>> + 'a> {
        let root_meta = match std::fs::metadata(root) {
            Ok(m) => m,
            Err(e) => return Box::new(std::iter::once(Err(ScanError::from_io(root, e)))),
        };

        // A single file (or archive) given directly as a root.
        if root_meta.is_file() {
            return Box::new(
                self.process_file(root.to_path_buf(), &root_meta, &tracker)
                    .into_iter(),
            );
        }

        log::info!("Walking {}", root.display());

        let walk_dir = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(|_depth, _path, _state, children| {
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        Box::new(
            walk_dir
                .into_iter()
                .take_while(move |_| {
                    let stop = self.is_shutdown_requested();
                    if stop {
                        log::debug!("Walker: Shutdown requested, stopping iteration");
                    }
                    !stop
                })
                .flat_map(move |entry_result| match entry_result {
                    Ok(entry) => {
                        let file_type = entry.file_type();
                        if file_type.is_dir() {
                            return Vec::new();
                        }
                        let path = entry.path();
                        if file_type.is_symlink() && !self.config.follow_symlinks {
                            log::trace!("Skipping symlink: {}", path.display());
                            return Vec::new();
                        }
                        match std::fs::metadata(&path) {
                            Ok(metadata) if metadata.is_file() => {
                                self.process_file(path, &metadata, &tracker)
                            }
                            Ok(_) => Vec::new(),
                            Err(e) => vec![Err(self.handle_io_error(&path, e))],
                        }
                    }
                    Err(e) => {
                        let path = e
                            .path()
                            .map_or_else(|| root.to_path_buf(), std::borrow::ToOwned::to_owned);
                        log::warn!("Walker error for {}: {}", path.display(), e);
                        vec![Err(ScanError::Io {
                            path,
                            source: std::io::Error::other(e.to_string()),
                        })]
                    }
                }),
        )
    }

    /// Turn one regular file into zero or more descriptors.
    fn process_file(
        &self,
        path: PathBuf,
        metadata: &Metadata,
        tracker: &RefCell<HardlinkTracker>,
    ) -> Vec<Result<FileDescriptor, ScanError>> {
        if tracker.borrow_mut().is_hardlink(metadata) {
            log::debug!("Skipping hardlink: {}", path.display());
            return Vec::new();
        }

        if self.config.scan_archives && archive::is_archive(&path) {
            return match archive::list_members(&path, &self.config) {
                Ok(members) => members.into_iter().map(Ok).collect(),
                Err(e) => {
                    log::warn!("{}", e);
                    vec![Err(e)]
                }
            };
        }

        if !self.config.accepts(&path) {
            log::trace!("Skipping file by extension: {}", path.display());
            return Vec::new();
        }

        vec![Ok(self.describe(path, metadata))]
    }

    /// Build a descriptor from filesystem metadata.
    fn describe(&self, path: PathBuf, metadata: &Metadata) -> FileDescriptor {
        let modified = metadata.modified().ok();
        let created = metadata
            .created()
            .ok()
            .or(modified)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let resolution = if self.config.probe_resolution {
            media::probe_file(&path)
        } else {
            None
        };

        let mut file = FileDescriptor::new(path, metadata.len(), created);
        file.modified = modified;
        file.resolution = resolution;
        file
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
            }
            std::io::ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
            }
            _ => log::warn!("I/O error for {}: {}", path.display(), error),
        }
        ScanError::from_io(path, error)
    }
}

/// Drop repeated roots and roots nested inside another root.
///
/// Roots are compared by their canonical form; the original spelling is
/// what gets walked. A root that cannot be canonicalized is always kept.
fn normalize_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let keyed: Vec<(PathBuf, Option<PathBuf>)> = roots
        .into_iter()
        .map(|root| {
            let key = std::fs::canonicalize(&root).ok();
            (root, key)
        })
        .collect();

    let mut kept = Vec::with_capacity(keyed.len());
    for (i, (root, key)) in keyed.iter().enumerate() {
        let covering = key.as_ref().and_then(|key| {
            keyed.iter().enumerate().find_map(|(j, (other_root, other))| {
                let other = other.as_ref()?;
                // Of two equal roots, the first one stays.
                let covers = j != i && key.starts_with(other) && (key != other || j < i);
                covers.then_some(other_root)
            })
        });
        match covering {
            Some(other) => log::info!(
                "Skipping {}: already covered by {}",
                root.display(),
                other.display()
            ),
            None => kept.push(root.clone()),
        }
    }
    kept
}
