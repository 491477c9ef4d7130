//! pdf-press - Incremental Parallel PDF Corpus Compressor
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use pdf_press::config::{CliArgs, PressConfig};
use pdf_press::progress::{self, ProgressReporter};
use pdf_press::scheduler::{RunStats, Scheduler};
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose);

    let config = PressConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        progress::print_header(&config);
    }

    let scheduler = Scheduler::new(config.clone());

    // Graceful shutdown: stop dispatching, keep already-collected work
    let shutdown_flag = scheduler.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, finishing in-flight work...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    let reporter = config.show_progress.then(ProgressReporter::new);

    let mut overall = RunStats::default();
    let mut total_duration = Duration::ZERO;
    let mut interrupted = false;

    for root in &config.roots {
        if scheduler.is_shutdown() {
            interrupted = true;
            break;
        }

        if !root.exists() {
            warn!(root = %root.display(), "Directory not found, skipping");
            if config.show_progress {
                println!("Directory not found: {}", root.display());
            }
            continue;
        }

        if let Some(ref reporter) = reporter {
            reporter.set_status(&format!("Compressing {}", root.display()));
        }

        let result = scheduler
            .run(root)
            .with_context(|| format!("Compression run failed for '{}'", root.display()))?;

        if let Some(ref reporter) = reporter {
            reporter.set_status("");
        }
        if config.show_progress {
            progress::print_root_summary(root, &result);
        }

        overall.merge(&result.stats);
        total_duration += result.duration;
        if !result.completed {
            interrupted = true;
        }
    }

    if let Some(ref reporter) = reporter {
        reporter.finish_and_clear();
    }

    progress::print_summary(&overall, total_duration, config.dry_run, interrupted);

    if overall.failed > 0 {
        info!(failed = overall.failed, "Run completed with per-file errors");
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
