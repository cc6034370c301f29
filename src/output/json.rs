//! JSON report for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "hash": "1a2b3c...",
//!       "size": 2048,
//!       "keep": "/backup/a.jpg",
//!       "criterion": "earliest_created",
//!       "files": ["/photos/a.jpg", "/backup/a.jpg"]
//!     }
//!   ],
//!   "failures": [
//!     { "location": "/photos/x.jpg", "stage": "hash", "error": "unreadable" }
//!   ],
//!   "summary": {
//!     "total_files": 5,
//!     "total_size": 4126,
//!     "duplicate_groups": 2,
//!     "duplicate_files": 2,
//!     "reclaimable_space": 2058,
//!     "scan_duration_ms": 12,
//!     "interrupted": false,
//!     "exit_code": 3,
//!     "exit_code_name": "MD003"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use super::{ResolvedGroup, ScanReport};
use crate::duplicates::{Criterion, ScanSummary};
use crate::error::ExitCode;

/// One duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// BLAKE3 digest as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Location of the member to keep
    pub keep: String,
    /// Criterion that chose `keep`
    pub criterion: Criterion,
    /// Locations of all members, in input order
    pub files: Vec<String>,
}

impl JsonGroup {
    fn from_resolved(resolved: &ResolvedGroup) -> Self {
        let group = &resolved.group;
        Self {
            hash: group.hash_hex(),
            size: group.size,
            keep: group.files[resolved.decision.index].location(),
            criterion: resolved.decision.criterion,
            files: group.locations(),
        }
    }
}

/// Where a file was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    /// Enumeration (walker or archive listing)
    Scan,
    /// Content hashing
    Hash,
}

/// A file or path that was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    /// Location of the skipped file
    pub location: String,
    /// Pipeline stage that failed
    pub stage: FailureStage,
    /// Error message
    pub error: String,
}

/// Summary statistics.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files received by the finder
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Files eliminated because their size was unique
    pub eliminated_by_size: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Number of duplicate files (excluding one kept copy per group)
    pub duplicate_files: usize,
    /// Bytes held by duplicate copies
    pub reclaimable_space: u64,
    /// Duration of the finder run in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the run was interrupted
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "MD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    fn new(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            hashed_files: summary.hashed_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            interrupted: summary.interrupted,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Resolved duplicate groups
    pub groups: Vec<JsonGroup>,
    /// Skipped files
    pub failures: Vec<JsonFailure>,
    /// Statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document for a report.
    #[must_use]
    pub fn new(report: &ScanReport) -> Self {
        let failures = report
            .scan_errors
            .iter()
            .map(|e| JsonFailure {
                location: e.path().display().to_string(),
                stage: FailureStage::Scan,
                error: e.to_string(),
            })
            .chain(report.failures.iter().map(|f| JsonFailure {
                location: f.file.location(),
                stage: FailureStage::Hash,
                error: f.error.to_string(),
            }))
            .collect();

        Self {
            groups: report.groups.iter().map(JsonGroup::from_resolved).collect(),
            failures,
            summary: JsonSummary::new(&report.summary, report.exit_code()),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON output: {0}")]
    Io(#[from] std::io::Error),
}
