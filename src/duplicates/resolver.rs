//! Keep selection for duplicate groups.
//!
//! # Overview
//!
//! [`Resolver`] picks exactly one member of a [`DuplicateGroup`] to retain.
//! Each policy is a cascade of criteria: the candidate set starts as the whole
//! group and is narrowed stage by stage; as soon as one candidate remains it
//! wins. A final tie-break guarantees a single, deterministic winner.
//!
//! ## Chronological policy
//!
//! 1. Earliest creation time (exact equality for ties)
//! 2. Clean file name, i.e. no copy marker in the stem. When no candidate
//!    is clean, the whole tied set carries on
//! 3. Full path string, ascending
//!
//! ## Quality policy
//!
//! 1. Largest resolution area; missing resolution ranks below `0x0`
//! 2. Newest modification time; missing ranks oldest
//! 3. Shortest file name (base name including extension)
//! 4. First in input order
//!
//! The resolver performs no I/O and holds no mutable state.
//!
//! # Example
//!
//! ```
//! use mediadupe::duplicates::{DuplicateGroup, Resolver, SelectionPolicy};
//! use mediadupe::scanner::FileDescriptor;
//! use std::time::{Duration, SystemTime};
//!
//! let at = |s| SystemTime::UNIX_EPOCH + Duration::from_secs(s);
//! let group = DuplicateGroup::new([0u8; 32], 10, vec![
//!     FileDescriptor::new("/a/photo(1).jpg", 10, at(100)),
//!     FileDescriptor::new("/b/photo.jpg", 10, at(100)),
//! ]);
//!
//! let resolver = Resolver::new(SelectionPolicy::Chronological);
//! let keep = resolver.resolve(&group).unwrap();
//! assert_eq!(keep.location(), "/b/photo.jpg");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::groups::DuplicateGroup;
use super::markers::CopyMarkers;
use crate::scanner::FileDescriptor;

/// Which cascade of criteria decides the keeper.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Earliest creation, then clean name, then path order
    #[default]
    Chronological,
    /// Highest resolution, then newest modification, then shortest name, then input order
    Quality,
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chronological => write!(f, "chronological"),
            Self::Quality => write!(f, "quality"),
        }
    }
}

/// The criterion that settled a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Unique earliest creation time
    EarliestCreated,
    /// Only member without a copy marker
    CleanName,
    /// Lowest full path string
    PathOrder,
    /// Unique largest resolution area
    HighestResolution,
    /// Unique newest modification time
    NewestModified,
    /// Unique shortest file name
    ShortestName,
    /// First of the remaining ties in input order
    InputOrder,
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EarliestCreated => "earliest creation time",
            Self::CleanName => "clean file name",
            Self::PathOrder => "path order",
            Self::HighestResolution => "highest resolution",
            Self::NewestModified => "newest modification time",
            Self::ShortestName => "shortest file name",
            Self::InputOrder => "input order",
        };
        f.write_str(text)
    }
}

/// Outcome of resolving one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeepDecision {
    /// Index of the kept member in `group.files`
    pub index: usize,
    /// The stage that produced the single winner
    pub criterion: Criterion,
}

impl KeepDecision {
    fn new(index: usize, criterion: Criterion) -> Self {
        Self { index, criterion }
    }
}

/// Errors from keep selection.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The group has fewer than two members.
    #[error("Invalid group: {members} member(s), at least 2 required")]
    InvalidGroup {
        /// Number of members found
        members: usize,
    },
}

#[derive(Clone, Copy)]
enum Prefer {
    Smallest,
    Largest,
}

/// Keep the candidates whose key equals the best key, in their current order.
fn narrow<K, F>(files: &[FileDescriptor], candidates: Vec<usize>, prefer: Prefer, key: F) -> Vec<usize>
where
    K: Ord,
    F: Fn(&FileDescriptor) -> K,
{
    let keys = candidates.iter().map(|&i| key(&files[i]));
    let best = match prefer {
        Prefer::Smallest => keys.min(),
        Prefer::Largest => keys.max(),
    };
    match best {
        Some(best) => candidates
            .into_iter()
            .filter(|&i| key(&files[i]) == best)
            .collect(),
        None => candidates,
    }
}

/// Deterministic keep selection for duplicate groups.
#[derive(Debug, Default)]
pub struct Resolver {
    policy: SelectionPolicy,
    markers: CopyMarkers,
}

impl Resolver {
    /// Create a resolver with the built-in copy markers.
    #[must_use]
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            markers: CopyMarkers::default(),
        }
    }

    /// Replace the copy-marker list used by the chronological policy.
    #[must_use]
    pub fn with_copy_markers(mut self, markers: CopyMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// The active policy.
    #[must_use]
    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Decide which member to keep and why.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidGroup`] if the group has fewer than two members.
    pub fn decide(&self, group: &DuplicateGroup) -> Result<KeepDecision, ResolveError> {
        if group.files.len() < 2 {
            return Err(ResolveError::InvalidGroup {
                members: group.files.len(),
            });
        }

        let decision = match self.policy {
            SelectionPolicy::Chronological => self.chronological(&group.files),
            SelectionPolicy::Quality => Self::quality(&group.files),
        };

        log::debug!(
            "Group {}: keeping {} ({})",
            group.hash_hex(),
            group.files[decision.index].location(),
            decision.criterion
        );
        Ok(decision)
    }

    /// The member to keep.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidGroup`] if the group has fewer than two members.
    pub fn resolve<'g>(&self, group: &'g DuplicateGroup) -> Result<&'g FileDescriptor, ResolveError> {
        let decision = self.decide(group)?;
        Ok(&group.files[decision.index])
    }

    /// Resolve the group and record the keeper in `file_to_keep`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidGroup`] if the group has fewer than two
    /// members; the group is left untouched.
    pub fn annotate(&self, group: &mut DuplicateGroup) -> Result<KeepDecision, ResolveError> {
        let decision = self.decide(group)?;
        group.file_to_keep = Some(group.files[decision.index].clone());
        Ok(decision)
    }

    fn chronological(&self, files: &[FileDescriptor]) -> KeepDecision {
        let all: Vec<usize> = (0..files.len()).collect();

        let tied = narrow(files, all, Prefer::Smallest, |f| f.created);
        if tied.len() == 1 {
            return KeepDecision::new(tied[0], Criterion::EarliestCreated);
        }

        let clean: Vec<usize> = tied
            .iter()
            .copied()
            .filter(|&i| !self.markers.is_copy(&files[i].stem()))
            .collect();
        let remaining = match clean.len() {
            1 => return KeepDecision::new(clean[0], Criterion::CleanName),
            // Nobody is clean: the marker stage must not eliminate anyone.
            0 => tied,
            _ => clean,
        };

        let index = remaining
            .iter()
            .copied()
            .min_by_key(|&i| files[i].location())
            .unwrap_or(remaining[0]);
        KeepDecision::new(index, Criterion::PathOrder)
    }

    fn quality(files: &[FileDescriptor]) -> KeepDecision {
        let all: Vec<usize> = (0..files.len()).collect();

        let by_resolution = narrow(files, all, Prefer::Largest, |f| {
            f.resolution.map(|r| r.area())
        });
        if by_resolution.len() == 1 {
            return KeepDecision::new(by_resolution[0], Criterion::HighestResolution);
        }

        let by_modified = narrow(files, by_resolution, Prefer::Largest, |f| f.modified);
        if by_modified.len() == 1 {
            return KeepDecision::new(by_modified[0], Criterion::NewestModified);
        }

        let by_name = narrow(files, by_modified, Prefer::Smallest, |f| {
            f.file_name().chars().count()
        });
        if by_name.len() == 1 {
            return KeepDecision::new(by_name[0], Criterion::ShortestName);
        }

        KeepDecision::new(by_name[0], Criterion::InputOrder)
    }
}

/// Pick the member of `group` to keep under `policy`, with the built-in copy markers.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidGroup`] if the group has fewer than two members.
pub fn resolve_keep(
    group: &DuplicateGroup,
    policy: SelectionPolicy,
) -> Result<FileDescriptor, ResolveError> {
    Resolver::new(policy).resolve(group).cloned()
}
