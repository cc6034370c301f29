//! Hardlink detection.
//!
//! Two directory entries sharing one inode are one file on disk. Reporting
//! them as duplicates would count bytes that removing a link never frees, so
//! the walker yields only the first link it meets.
//!
//! Detection uses `(device, inode)` on Unix. Elsewhere it is disabled and
//! every entry is treated as a distinct file.

use std::collections::HashSet;
use std::fs::Metadata;

/// Remembers the inodes seen during one walk.
#[derive(Debug, Default)]
pub struct HardlinkTracker {
    seen: HashSet<InodeKey>,
}

impl HardlinkTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `metadata` and report whether its inode was already seen.
    ///
    /// The first entry for an inode returns `false`; every later link
    /// returns `true`. Files with a single link are never stored.
    pub fn is_hardlink(&mut self, metadata: &Metadata) -> bool {
        match InodeKey::from_metadata(metadata) {
            Some(key) => !self.seen.insert(key),
            None => false,
        }
    }

    /// Number of multiply-linked inodes recorded so far.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Whether this platform supports detection.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(not(unix), allow(dead_code))]
struct InodeKey {
    dev: u64,
    ino: u64,
}

impl InodeKey {
    #[cfg(unix)]
    fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        // nlink == 1 cannot collide with anything else in the walk
        (metadata.nlink() > 1).then(|| Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}
