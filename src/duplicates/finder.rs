//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module runs the detection pipeline over a stream of descriptors:
//! 1. **Phase 1 - Size grouping**: Bucket files by exact size (see [`crate::duplicates::groups`])
//! 2. **Phase 2 - Content hash**: Digest every member of each surviving bucket
//!    and split the bucket by digest value
//!
//! Hashing goes through the [`ContentHasher`] capability so the finder never
//! touches the filesystem itself. A failure for one file only removes that
//! file; its siblings and all other buckets carry on.
//!
//! # Example
//!
//! ```
//! use mediadupe::duplicates::{DuplicateFinder, FinderConfig};
//! use mediadupe::scanner::{FileDescriptor, Hash, HashError};
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileDescriptor::new("/a.jpg", 3, SystemTime::UNIX_EPOCH),
//!     FileDescriptor::new("/b.jpg", 3, SystemTime::UNIX_EPOCH),
//! ];
//! // Every file hashes to the same digest
//! let hasher = |_: &FileDescriptor| -> Result<Hash, HashError> { Ok([7u8; 32]) };
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(2));
//! let outcome = finder.find_duplicates(files, &hasher);
//!
//! assert_eq!(outcome.groups.len(), 1);
//! assert!(outcome.failures.is_empty());
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{group_by_size, DuplicateGroup};
use crate::progress::ProgressCallback;
use crate::scanner::{FileDescriptor, Hash, HashError};

/// Capability that produces a content digest for one file.
///
/// Implementations own all I/O, retry and error classification. The finder
/// only distinguishes success from failure. Closures of the matching shape
/// implement this trait automatically.
pub trait ContentHasher: Send + Sync {
    /// Compute the digest of the file's full content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the content cannot be read.
    fn digest(&self, file: &FileDescriptor) -> Result<Hash, HashError>;
}

impl<F> ContentHasher for F
where
    F: Fn(&FileDescriptor) -> Result<Hash, HashError> + Send + Sync,
{
    fn digest(&self, file: &FileDescriptor) -> Result<Hash, HashError> {
        self(file)
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Maximum number of concurrent hash computations.
    /// Defaults to the available CPU parallelism.
    pub io_threads: usize,
    /// Optional shutdown flag for cooperative cancellation.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: default_io_threads(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

/// The available CPU parallelism, or 4 when it cannot be determined.
#[must_use]
pub fn default_io_threads() -> usize {
    std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
}

impl FinderConfig {
    /// Set the concurrency limit for hashing.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag for cooperative cancellation.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// A file that could not be hashed, and why.
#[derive(Debug)]
pub struct HashFailure {
    /// The file that was excluded
    pub file: FileDescriptor,
    /// The error reported by the hasher
    pub error: HashError,
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of descriptors received
    pub total_files: usize,
    /// Total size of all received files in bytes
    pub total_size: u64,
    /// Files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files whose hashing failed
    pub failed_files: usize,
    /// Hashed files with no digest peer in their size bucket
    pub eliminated_by_digest: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one kept copy per group)
    pub duplicate_files: usize,
    /// Total space held by duplicate copies
    pub reclaimable_space: u64,
    /// Duration of the run
    pub scan_duration: Duration,
    /// Whether the run was cancelled before every bucket was hashed
    pub interrupted: bool,
}

impl ScanSummary {
    /// Percentage of scanned bytes held by duplicate copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }
}

/// Result of a finder run: groups plus the per-file diagnostics.
#[derive(Debug, Default)]
pub struct FindOutcome {
    /// Confirmed duplicate groups, unresolved
    pub groups: Vec<DuplicateGroup>,
    /// Files excluded because hashing failed
    pub failures: Vec<HashFailure>,
    /// Statistics about the run
    pub summary: ScanSummary,
}

impl FindOutcome {
    /// Whether the run was cancelled.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.summary.interrupted
    }
}

/// Per-bucket hashing result.
#[derive(Default)]
struct BucketOutcome {
    groups: Vec<DuplicateGroup>,
    failures: Vec<HashFailure>,
    hashed: usize,
    unmatched: usize,
    interrupted: bool,
}

/// Duplicate finder that runs size grouping and content hashing.
///
/// Holds no mutable state between runs; the same finder may be reused.
#[derive(Debug, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find groups of identical files among `descriptors`.
    ///
    /// The input is consumed once. Every returned group has at least two
    /// members sharing size and digest, and no file appears in two groups.
    /// Groups are sorted by size (largest first), then by digest; members keep
    /// input order.
    ///
    /// When the shutdown flag is raised, buckets that were not fully hashed
    /// contribute no groups and `summary.interrupted` is set.
    pub fn find_duplicates<H>(
        &self,
        descriptors: impl IntoIterator<Item = FileDescriptor>,
        hasher: &H,
    ) -> FindOutcome
    where
        H: ContentHasher + ?Sized,
    {
        let start = Instant::now();
        let (buckets, size_stats) = group_by_size(descriptors);

        let mut summary = ScanSummary {
            total_files: size_stats.total_files,
            total_size: size_stats.total_size,
            eliminated_by_size: size_stats.eliminated_unique,
            ..Default::default()
        };

        // Largest sizes first so the most expensive buckets start early.
        let mut buckets: Vec<(u64, Vec<FileDescriptor>)> = buckets.into_iter().collect();
        buckets.sort_unstable_by(|a, b| b.0.cmp(&a.0));

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("hash", size_stats.potential_duplicates);
        }
        log::info!(
            "Hashing {} candidates in {} size buckets",
            size_stats.potential_duplicates,
            buckets.len()
        );

        let progress = AtomicUsize::new(0);
        let outcomes: Vec<BucketOutcome> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => pool.install(|| self.hash_buckets(buckets, hasher, &progress)),
            Err(e) => {
                log::warn!(
                    "Failed to create hashing thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                self.hash_buckets(buckets, hasher, &progress)
            }
        };

        let mut outcome = FindOutcome::default();
        for bucket in outcomes {
            summary.hashed_files += bucket.hashed;
            summary.failed_files += bucket.failures.len();
            summary.eliminated_by_digest += bucket.unmatched;
            summary.interrupted |= bucket.interrupted;
            outcome.groups.extend(bucket.groups);
            outcome.failures.extend(bucket.failures);
        }

        outcome
            .groups
            .sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.hash.cmp(&b.hash)));

        summary.duplicate_groups = outcome.groups.len();
        summary.duplicate_files = outcome.groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = outcome.groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start.elapsed();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hash");
        }

        if summary.interrupted {
            log::info!("Hashing interrupted by shutdown signal");
        }
        log::info!(
            "Found {} duplicate groups ({} duplicates, {} reclaimable, {} failures)",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.failed_files
        );

        outcome.summary = summary;
        outcome
    }

    fn hash_buckets<H>(
        &self,
        buckets: Vec<(u64, Vec<FileDescriptor>)>,
        hasher: &H,
        progress: &AtomicUsize,
    ) -> Vec<BucketOutcome>
    where
        H: ContentHasher + ?Sized,
    {
        buckets
            .into_par_iter()
            .map(|(size, files)| self.hash_bucket(size, files, hasher, progress))
            .collect()
    }

    /// Hash every member of one size bucket and split it by digest.
    fn hash_bucket<H>(
        &self,
        size: u64,
        files: Vec<FileDescriptor>,
        hasher: &H,
        progress: &AtomicUsize,
    ) -> BucketOutcome
    where
        H: ContentHasher + ?Sized,
    {
        // `None` marks a member skipped because of cancellation.
        let results: Vec<(FileDescriptor, Option<Result<Hash, HashError>>)> = files
            .into_par_iter()
            .map(|file| {
                if self.config.is_shutdown_requested() {
                    return (file, None);
                }
                // An `Interrupted` digest only counts as cancellation while the flag is up.
                let result = match hasher.digest(&file) {
                    Err(HashError::Interrupted(_)) if self.config.is_shutdown_requested() => None,
                    other => Some(other),
                };
                if let Some(ref callback) = self.config.progress_callback {
                    let current = progress.fetch_add(1, Ordering::Relaxed) + 1;
                    callback.on_progress(current, &file.location());
                }
                (file, result)
            })
            .collect();

        let mut bucket = BucketOutcome::default();
        let mut by_digest: HashMap<Hash, Vec<FileDescriptor>> = HashMap::new();

        for (file, result) in results {
            match result {
                None => bucket.interrupted = true,
                Some(Ok(hash)) => {
                    bucket.hashed += 1;
                    log::trace!("Digest {}: {}", crate::scanner::hash_to_hex(&hash), file.location());
                    by_digest.entry(hash).or_default().push(file);
                }
                Some(Err(error)) => {
                    log::warn!("Failed to hash {}: {}", file.location(), error);
                    bucket.failures.push(HashFailure { file, error });
                }
            }
        }

        if bucket.interrupted {
            log::debug!("Size bucket {} bytes: incomplete, no groups emitted", size);
            return bucket;
        }

        for (hash, members) in by_digest {
            if members.len() < 2 {
                bucket.unmatched += members.len();
                continue;
            }
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                crate::scanner::hash_to_hex(&hash),
                members.len(),
                size
            );
            bucket.groups.push(DuplicateGroup::new(hash, size, members));
        }

        bucket
    }
}

/// Find duplicate groups with the default configuration.
///
/// Shorthand for [`DuplicateFinder::with_defaults`] followed by
/// [`DuplicateFinder::find_duplicates`].
pub fn find_duplicates<H>(
    descriptors: impl IntoIterator<Item = FileDescriptor>,
    hasher: &H,
) -> FindOutcome
where
    H: ContentHasher + ?Sized,
{
    DuplicateFinder::with_defaults().find_duplicates(descriptors, hasher)
}
