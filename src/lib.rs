//! mediadupe - duplicate photo and video finder
//!
//! Finds byte-identical media files across directory trees and zip archives
//! using size grouping and BLAKE3 content hashing, then picks the one copy of
//! each group worth keeping. The library never modifies the filesystem.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, Resolver};
use crate::error::ExitCode;
use crate::output::{JsonOutput, ScanReport, TextOutput};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::{Blake3Hasher, Walker};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a root is missing, the
/// signal handler cannot be installed, or the report cannot be written.
/// Unreadable individual files are not errors; they end up in the report.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let Commands::Scan(args) = cli.command;

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);
    log::debug!("Effective configuration: {:?}", config);

    scan(&args, &config, cli.quiet)
}

fn scan(args: &ScanArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    for root in &args.paths {
        if !root.exists() {
            anyhow::bail!("Path not found: {}", root.display());
        }
    }

    let markers = config.copy_markers()?;
    let handler = signal::install_handler()?;
    let progress = Arc::new(Progress::new(quiet));

    let walker = Walker::new(args.paths.clone(), config.walker_config())
        .with_shutdown_flag(handler.get_flag());
    let mut files = Vec::new();
    let mut scan_errors = Vec::new();

    progress.on_phase_start("walk", 0);
    for item in walker.walk() {
        match item {
            Ok(file) => {
                let location = file.location();
                files.push(file);
                progress.on_progress(files.len(), &location);
            }
            Err(e) => scan_errors.push(e),
        }
    }
    progress.on_phase_end("walk");
    log::info!(
        "Found {} media files under {} root(s), {} unreadable paths",
        files.len(),
        args.paths.len(),
        scan_errors.len()
    );

    let mut finder_config = FinderConfig::default()
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress.clone());
    if let Some(threads) = config.io_threads {
        finder_config = finder_config.with_io_threads(threads);
    }
    let hasher = Blake3Hasher::new().with_shutdown_flag(handler.get_flag());
    let outcome = DuplicateFinder::new(finder_config).find_duplicates(files, &hasher);

    let resolver = Resolver::new(config.policy).with_copy_markers(markers);
    let mut report = ScanReport::new(outcome, scan_errors, &resolver);
    // The walk may have stopped early even if hashing had nothing left to do.
    report.summary.interrupted |= handler.is_shutdown_requested();

    let mut out = io::stdout().lock();
    match args.output {
        OutputFormat::Text => TextOutput::new(&report)
            .write_to(&mut out)
            .context("Failed to write report")?,
        OutputFormat::Json => JsonOutput::new(&report)
            .write_to(&mut out, true)
            .context("Failed to write report")?,
    }

    Ok(report.exit_code())
}
