//! Plain-text report.
//!
//! ```text
//! Group 1: 2 files, 2.0 KiB each, hash 1a2b3c4d5e6f
//!   KEEP  /backup/a.jpg  (earliest creation time)
//!   DUPE  /photos/a.jpg
//!
//! Skipped 1 unreadable file:
//!   /photos/x.jpg: unreadable
//!
//! 5 files scanned (4.1 KiB), 2 duplicate groups, 2 duplicates, 2.0 KiB reclaimable (49.6%)
//! ```

use std::fmt;
use std::io::Write;

use bytesize::ByteSize;

use super::ScanReport;

/// Length of the digest prefix shown per group.
const HASH_PREFIX: usize = 12;

/// Text formatter over a [`ScanReport`].
#[derive(Debug)]
pub struct TextOutput<'a> {
    report: &'a ScanReport,
}

impl<'a> TextOutput<'a> {
    /// Wrap a report.
    #[must_use]
    pub fn new(report: &'a ScanReport) -> Self {
        Self { report }
    }

    /// Render the whole report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the rendered report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.render().as_bytes())
    }
}

impl fmt::Display for TextOutput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;

        for (n, resolved) in report.groups.iter().enumerate() {
            let group = &resolved.group;
            let hash = group.hash_hex();
            writeln!(
                f,
                "Group {}: {} files, {} each, hash {}",
                n + 1,
                group.len(),
                ByteSize::b(group.size),
                &hash[..HASH_PREFIX.min(hash.len())]
            )?;
            for (i, file) in group.files.iter().enumerate() {
                if i == resolved.decision.index {
                    writeln!(f, "  KEEP  {}  ({})", file.location(), resolved.decision.criterion)?;
                } else {
                    writeln!(f, "  DUPE  {}", file.location())?;
                }
            }
            writeln!(f)?;
        }

        let skipped = report.failures.len() + report.scan_errors.len();
        if skipped > 0 {
            writeln!(
                f,
                "Skipped {} unreadable {}:",
                skipped,
                if skipped == 1 { "file" } else { "files" }
            )?;
            for failure in &report.failures {
                writeln!(f, "  {}: {}", failure.file.location(), failure.error)?;
            }
            for error in &report.scan_errors {
                writeln!(f, "  {}: {}", error.path().display(), error)?;
            }
            writeln!(f)?;
        }

        let summary = &report.summary;
        if summary.interrupted {
            writeln!(f, "Scan interrupted; results are incomplete.")?;
        }
        if report.groups.is_empty() {
            writeln!(
                f,
                "{} files scanned ({}), no duplicates found",
                summary.total_files,
                summary.total_size_display()
            )
        } else {
            writeln!(
                f,
                "{} files scanned ({}), {} duplicate groups, {} duplicates, {} reclaimable ({:.1}%)",
                summary.total_files,
                summary.total_size_display(),
                summary.duplicate_groups,
                summary.duplicate_files,
                summary.reclaimable_display(),
                summary.wasted_percentage()
            )
        }
    }
}
