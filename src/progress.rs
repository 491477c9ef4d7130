//! Progress and summary reporting
//!
//! Provides a live spinner during runs plus styled header and summary
//! output once a run (or the whole invocation) finishes.

use crate::config::PressConfig;
use crate::scheduler::{RunResult, RunStats};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Spinner shown while a run is in flight
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header at the start of the invocation
pub fn print_header(config: &PressConfig) {
    println!();
    println!(
        "{} {}",
        style("pdf-press").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    for root in &config.roots {
        println!("  {} {}", style("Root:").bold(), root.display());
    }
    println!("  {} {}", style("Quality:").bold(), config.quality);
    println!("  {} {}", style("Workers:").bold(), config.worker_count);
    println!(
        "  {} {}%",
        style("Min savings:").bold(),
        config.min_savings_percent
    );
    println!(
        "  {} {}",
        style("Tracking:").bold(),
        config.tracking_file.display()
    );
    if config.dry_run {
        println!("  {}", style("Dry run - nothing will be modified").yellow());
    }
    println!();
}

/// Print the summary for a single root
pub fn print_root_summary(root: &Path, result: &RunResult) {
    let stats = &result.stats;

    println!();
    println!(
        "{} {}",
        style("Summary for").bold(),
        style(root.display()).cyan()
    );
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Files found:").bold(),
        format_number(stats.files_found)
    );
    println!(
        "  {} {}",
        style("Fresh (skipped):").bold(),
        format_number(stats.fresh)
    );
    println!(
        "  {} {}",
        style("Checked:").bold(),
        format_number(stats.checked)
    );
    if stats.would_compress > 0 {
        println!(
            "  {} {}",
            style("Would compress:").bold(),
            format_number(stats.would_compress)
        );
    } else {
        println!(
            "  {} {}",
            style("Compressed:").bold(),
            format_number(stats.compressed)
        );
        println!(
            "  {} {}",
            style("Unchanged:").bold(),
            format_number(stats.unchanged)
        );
        println!(
            "  {} {}",
            style("Rejected:").bold(),
            format_number(stats.rejected)
        );
    }
    if stats.failed > 0 {
        println!(
            "  {} {}",
            style("Failed:").yellow().bold(),
            format_number(stats.failed)
        );
    }
    println!(
        "  {} {}",
        style("Space saved:").bold(),
        format_size(stats.bytes_saved, BINARY)
    );
    println!(
        "  {} {:.1}s",
        style("Duration:").bold(),
        result.duration.as_secs_f64()
    );
    if !result.store_verified {
        println!(
            "  {}",
            style("Warning: tracking file verification mismatch").yellow()
        );
    }
}

/// Print the overall summary across all roots
pub fn print_summary(stats: &RunStats, duration: Duration, dry_run: bool, interrupted: bool) {
    println!();
    if interrupted {
        println!("{}", style("Compression Interrupted").yellow().bold());
    } else {
        println!("{}", style("Compression Complete").green().bold());
    }
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Total files:").bold(),
        format_number(stats.files_found)
    );
    println!(
        "  {} {}",
        style("Compressed:").bold(),
        format_number(stats.compressed)
    );
    println!(
        "  {} {}",
        style("Unchanged:").bold(),
        format_number(stats.fresh + stats.unchanged)
    );
    println!(
        "  {} {}",
        style("Skipped/Errors:").bold(),
        format_number(stats.rejected + stats.failed)
    );
    println!(
        "  {} {}",
        style("Space saved:").bold(),
        format_size(stats.bytes_saved, BINARY)
    );
    println!(
        "  {} {:.1}s",
        style("Duration:").bold(),
        duration.as_secs_f64()
    );
    if dry_run {
        println!();
        println!(
            "{}",
            style("Note: this was a dry run; no files were modified.").yellow()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }
}
