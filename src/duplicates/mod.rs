//! Duplicate detection and keep selection.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Content digest comparison (Phase 2)
//! - Copy-marker detection on file names
//! - Choosing the one file to keep in each group

pub mod finder;
pub mod groups;
pub mod markers;
pub mod resolver;

pub use finder::{
    default_io_threads, find_duplicates, ContentHasher, DuplicateFinder, FindOutcome,
    FinderConfig, HashFailure, ScanSummary,
};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats};
pub use markers::{CopyMarker, CopyMarkers, PatternMarker};
pub use resolver::{resolve_keep, Criterion, KeepDecision, ResolveError, Resolver, SelectionPolicy};
