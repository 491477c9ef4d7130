//! Configuration types for pdf-press
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - Ghostscript quality presets

use crate::error::ConfigError;
use clap::{Parser, ValueEnum};
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 256;

/// Incremental parallel PDF corpus compressor
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pdf-press",
    version,
    about = "Incremental parallel PDF corpus compressor",
    long_about = "Re-compresses only the PDFs that changed since the last run (or were never\n\
                  processed), using Ghostscript and a durable JSON tracking file.\n\n\
                  Compressed output replaces the original only when it beats the configured\n\
                  savings threshold; originals are never modified in place.",
    after_help = "EXAMPLES:\n    \
        pdf-press data/amendment-pdfs\n    \
        pdf-press data/amendment-pdfs data/fiscal-note-pdfs -t data/tracking.json\n    \
        pdf-press corpus/ --quality screen --min-savings 10 -w 8\n    \
        pdf-press corpus/ --dry-run\n    \
        pdf-press corpus/ --max-age-hours 0  # recheck everything"
)]
pub struct CliArgs {
    /// Directories to scan for documents (recursive; missing ones are skipped)
    #[arg(value_name = "DIR", required = true)]
    pub roots: Vec<PathBuf>,

    /// JSON file recording per-file compression outcomes
    #[arg(
        short = 't',
        long,
        default_value = "compression-tracking.json",
        value_name = "FILE"
    )]
    pub tracking_file: PathBuf,

    /// Ghostscript quality preset
    #[arg(long, value_enum, default_value_t = Quality::Ebook)]
    pub quality: Quality,

    /// Number of worker threads
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Report what would be compressed without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Minimum size reduction (percent) required to keep a compressed file
    #[arg(long, default_value = "5.0", value_name = "PCT")]
    pub min_savings: f64,

    /// Skip files checked within this many hours (0 = recheck everything)
    #[arg(long, default_value = "24", value_name = "HOURS")]
    pub max_age_hours: u64,

    /// File extension to process
    #[arg(long, default_value = "pdf", value_name = "EXT")]
    pub extension: String,

    /// Exclude paths matching pattern (can be repeated)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// External compressor program
    #[arg(long, default_value = "gs", value_name = "PROG")]
    pub compressor: String,

    /// Kill compressor invocations after this many seconds (0 = no timeout)
    #[arg(long, default_value = "0", value_name = "SECS")]
    pub tool_timeout: u64,

    /// Fail instead of starting fresh when the tracking file is corrupt
    #[arg(long)]
    pub strict_tracking: bool,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (show per-file outcomes)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Ghostscript PDFSETTINGS quality preset
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// 72 dpi images, smallest output
    Screen,
    /// 150 dpi images, good for on-screen reading
    Ebook,
    /// 300 dpi images
    Printer,
    /// Color-preserving, largest output
    Prepress,
}

impl Quality {
    /// The -dPDFSETTINGS value for this preset
    pub fn gs_setting(self) -> &'static str {
        match self {
            Quality::Screen => "/screen",
            Quality::Ebook => "/ebook",
            Quality::Printer => "/printer",
            Quality::Prepress => "/prepress",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quality::Screen => "screen",
            Quality::Ebook => "ebook",
            Quality::Printer => "printer",
            Quality::Prepress => "prepress",
        };
        f.write_str(name)
    }
}

fn default_workers() -> usize {
    // Compression is CPU bound, one worker per core
    num_cpus::get()
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct PressConfig {
    /// Directories to process
    pub roots: Vec<PathBuf>,

    /// Tracking file path (shared across roots)
    pub tracking_file: PathBuf,

    /// Compression quality preset
    pub quality: Quality,

    /// Number of worker threads
    pub worker_count: usize,

    /// Report without mutating anything
    pub dry_run: bool,

    /// Minimum size reduction (percent) to accept a compression
    pub min_savings_percent: f64,

    /// Age under which a checked file is skipped without I/O
    pub max_age: Duration,

    /// Tracked file extension (without dot)
    pub extension: String,

    /// Compiled exclude patterns
    pub exclude_patterns: Vec<Regex>,

    /// External compressor program
    pub compressor: String,

    /// Per-invocation tool time limit
    pub tool_timeout: Option<Duration>,

    /// Hard-fail on a corrupt tracking file
    pub strict_tracking: bool,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl PressConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        if !args.min_savings.is_finite() || !(0.0..=100.0).contains(&args.min_savings) {
            return Err(ConfigError::InvalidMinSavings {
                percent: args.min_savings,
            });
        }

        if args.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::EmptyExtension);
        }

        // The tracking file itself may not exist yet, but its directory must
        if let Some(parent) = args.tracking_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(ConfigError::InvalidTrackingPath {
                    path: args.tracking_file.clone(),
                    reason: format!("Parent directory '{}' does not exist", parent.display()),
                });
            }
        }

        let exclude_patterns = args
            .exclude_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            roots: args.roots,
            tracking_file: args.tracking_file,
            quality: args.quality,
            worker_count: args.workers,
            dry_run: args.dry_run,
            min_savings_percent: args.min_savings,
            max_age: Duration::from_secs(args.max_age_hours * 3600),
            extension: args.extension.trim_start_matches('.').to_string(),
            exclude_patterns,
            compressor: args.compressor,
            tool_timeout: match args.tool_timeout {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            strict_tracking: args.strict_tracking,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }

    /// Check if a path should be excluded
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_patterns.iter().any(|re| re.is_match(path))
    }
}
