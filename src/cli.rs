//! Command-line interface definitions for mediadupe.
//!
//! Global options (verbosity, config file, error format) come first, then a
//! subcommand.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under two roots, keeping the earliest copy
//! mediadupe scan ~/Pictures /mnt/backup/photos
//!
//! # Prefer the highest-resolution copy, JSON report
//! mediadupe scan ~/Pictures --policy quality --output json
//!
//! # Verbose mode for debugging
//! mediadupe -v scan ~/Pictures
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;
use crate::duplicates::SelectionPolicy;

/// Duplicate photo and video finder.
///
/// Groups files with identical content, including members of zip archives,
/// and reports which copy of each group to keep. Nothing is deleted or moved.
#[derive(Debug, Parser)]
#[command(name = "mediadupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (default: platform config directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories, files or zip archives for duplicates
    Scan(ScanArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Roots to scan, in priority order
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Which copy to keep in each group
    #[arg(short, long, value_enum)]
    pub policy: Option<SelectionPolicy>,

    /// Number of concurrent hashing threads
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Do not look inside zip archives
    #[arg(long)]
    pub no_archives: bool,

    /// Follow symbolic links during scan
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

impl ScanArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let Some(threads) = self.io_threads {
            config.io_threads = Some(usize::from(threads));
        }
        if self.no_archives {
            config.scan_archives = false;
        }
        if self.follow_symlinks {
            config.follow_symlinks = true;
        }
        if self.skip_hidden {
            config.skip_hidden = true;
        }
    }
}

/// Report format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable KEEP/DUPE listing
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
