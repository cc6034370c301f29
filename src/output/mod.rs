//! Report formatters for scan results.
//!
//! A [`ScanReport`] bundles what one run produced: every duplicate group with
//! the member chosen for retention, the files that could not be read, and
//! the summary. It is rendered by:
//! - [`text`] for terminals
//! - [`json`] for scripting
//!
//! # Example
//!
//! ```
//! use mediadupe::duplicates::{find_duplicates, Resolver, SelectionPolicy};
//! use mediadupe::output::{ScanReport, text::TextOutput};
//! use mediadupe::scanner::{FileDescriptor, Hash, HashError};
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileDescriptor::new("/a.jpg", 3, SystemTime::UNIX_EPOCH),
//!     FileDescriptor::new("/b(1).jpg", 3, SystemTime::UNIX_EPOCH),
//! ];
//! let hasher = |_: &FileDescriptor| -> Result<Hash, HashError> { Ok([1u8; 32]) };
//!
//! let outcome = find_duplicates(files, &hasher);
//! let report = ScanReport::new(outcome, Vec::new(), &Resolver::new(SelectionPolicy::Chronological));
//!
//! let text = TextOutput::new(&report).render();
//! assert!(text.contains("KEEP  /a.jpg"));
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;

use crate::duplicates::{DuplicateGroup, FindOutcome, HashFailure, KeepDecision, Resolver, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::ScanError;

/// A duplicate group together with its keep decision.
#[derive(Debug, Clone)]
pub struct ResolvedGroup {
    /// The group, with `file_to_keep` filled in
    pub group: DuplicateGroup,
    /// Which member is kept and which criterion decided it
    pub decision: KeepDecision,
}

/// Everything one scan produced.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Resolved duplicate groups, in finder order
    pub groups: Vec<ResolvedGroup>,
    /// Files excluded because their content could not be read
    pub failures: Vec<HashFailure>,
    /// Paths the walker could not enumerate
    pub scan_errors: Vec<ScanError>,
    /// Finder statistics
    pub summary: ScanSummary,
}

impl ScanReport {
    /// Resolve every group of `outcome` and bundle the result.
    ///
    /// Groups the resolver rejects are logged and left out.
    #[must_use]
    pub fn new(outcome: FindOutcome, scan_errors: Vec<ScanError>, resolver: &Resolver) -> Self {
        let groups = outcome
            .groups
            .into_iter()
            .filter_map(|mut group| match resolver.annotate(&mut group) {
                Ok(decision) => Some(ResolvedGroup { group, decision }),
                Err(e) => {
                    log::warn!("Skipping group {}: {}", group.hash_hex(), e);
                    None
                }
            })
            .collect();

        Self {
            groups,
            failures: outcome.failures,
            scan_errors,
            summary: outcome.summary,
        }
    }

    /// Whether any file or path was skipped because of an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty() || !self.scan_errors.is_empty()
    }

    /// The process exit code this report maps to.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.summary.interrupted {
            ExitCode::Interrupted
        } else if self.groups.is_empty() {
            ExitCode::NoDuplicates
        } else if self.has_errors() {
            ExitCode::PartialSuccess
        } else {
            ExitCode::Success
        }
    }
}
