//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! Size grouping is the first phase of duplicate detection. Files with
//! different sizes cannot share content, so bucketing by exact byte size
//! removes most candidates before any file is read. Only buckets with two or
//! more members ever reach the hashing phase.
//!
//! Zero-byte files are bucketed like any other size.
//!
//! # Example
//!
//! ```
//! use mediadupe::scanner::FileDescriptor;
//! use mediadupe::duplicates::group_by_size;
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileDescriptor::new("/a.jpg", 1024, SystemTime::now()),
//!     FileDescriptor::new("/b.jpg", 1024, SystemTime::now()),
//!     FileDescriptor::new("/c.jpg", 2048, SystemTime::now()),
//! ];
//!
//! let (buckets, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(buckets.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::scanner::{hash_to_hex, FileDescriptor, Hash};

/// Confirmed group of files with identical content.
///
/// Every member shares the same size and digest. The finder always creates
/// groups with at least two members and leaves `file_to_keep` unset; only the
/// resolver fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content digest shared by all members
    pub hash: Hash,
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Members in input order
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
    /// The member chosen for retention
    #[serde(default)]
    pub file_to_keep: Option<FileDescriptor>,
}

impl DuplicateGroup {
    /// Create a new, unresolved duplicate group.
    ///
    /// # Arguments
    ///
    /// * `hash` - Content digest
    /// * `size` - File size in bytes
    /// * `files` - Members, in input order
    #[must_use]
    pub fn new(hash: Hash, size: u64, files: Vec<FileDescriptor>) -> Self {
        Self {
            hash,
            size,
            files,
            file_to_keep: None,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Full location strings of all members.
    #[must_use]
    pub fn locations(&self) -> Vec<String> {
        self.files.iter().map(FileDescriptor::location).collect()
    }

    /// Whether the resolver has picked a file to keep.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.file_to_keep.is_some()
    }

    /// Members other than the kept one. Empty until the group is resolved.
    ///
    /// Only the first member equal to `file_to_keep` is treated as kept.
    #[must_use]
    pub fn removal_candidates(&self) -> Vec<&FileDescriptor> {
        let Some(keep) = &self.file_to_keep else {
            return Vec::new();
        };
        let kept = self.files.iter().position(|f| f == keep);
        self.files
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != kept)
            .map(|(_, f)| f)
            .collect()
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in buckets of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton buckets)
    pub eliminated_unique: usize,
    /// Number of zero-byte files encountered
    pub empty_files: usize,
    /// Number of size buckets with 2+ files
    pub size_buckets: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (phase 1 of duplicate detection).
///
/// Consumes the input once. Buckets with a single member are dropped and
/// never reach the hashing phase. Member order inside a bucket follows input
/// order. No file I/O is performed.
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileDescriptor>,
) -> (HashMap<u64, Vec<FileDescriptor>>, GroupingStats) {
    let mut all_groups: HashMap<u64, Vec<FileDescriptor>> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        if file.size == 0 {
            stats.empty_files += 1;
        }
        all_groups.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = all_groups.len();

    let filtered: HashMap<u64, Vec<FileDescriptor>> = all_groups
        .into_iter()
        .filter(|(size, files)| {
            if files.len() == 1 {
                stats.eliminated_unique += 1;
                log::trace!("Eliminated unique size {}: {}", size, files[0].location());
                false
            } else {
                stats.potential_duplicates += files.len();
                stats.size_buckets += 1;
                log::debug!("Size bucket {} bytes: {} candidates", size, files.len());
                true
            }
        })
        .collect();

    log::info!(
        "Size grouping: {} files → {} candidates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (filtered, stats)
}
