//! Run scheduler - orchestrates one compression run over a root
//!
//! The scheduler is responsible for:
//! - Loading the tracking store
//! - Enumerating and partitioning candidate files
//! - Fanning work out across the worker pool
//! - Applying outcomes to the store under single-writer discipline
//! - Persisting and verifying the store, and reporting run statistics
//!
//! Workers receive immutable record snapshots and send outcomes back over
//! a channel; only this module's thread ever mutates the store, so the
//! store itself needs no locking.

pub mod worker;

use crate::compressor::{Compressor, FileTask, Outcome, MINIMAL_SAVINGS};
use crate::config::PressConfig;
use crate::error::{Result, WorkerError};
use crate::scanner;
use crate::scheduler::worker::Worker;
use crate::staleness;
use crate::tracking::{FileRecord, TrackingStore};
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, unbounded};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Counters accumulated over one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Matching files found under the root
    pub files_found: u64,

    /// Files skipped by the recent-check age shortcut
    pub fresh: u64,

    /// Files dispatched to workers whose outcomes were collected
    pub checked: u64,

    /// Files rewritten with an accepted compression
    pub compressed: u64,

    /// Files confirmed unchanged by fingerprint or hash
    pub unchanged: u64,

    /// Files whose compression fell below the savings threshold
    pub rejected: u64,

    /// Files that failed (tool error, I/O error)
    pub failed: u64,

    /// Files a dry run would have compressed
    pub would_compress: u64,

    /// Total bytes saved by accepted compressions
    pub bytes_saved: u64,
}

impl RunStats {
    /// Fold another run's counters into this one (multi-root totals)
    pub fn merge(&mut self, other: &RunStats) {
        self.files_found += other.files_found;
        self.fresh += other.fresh;
        self.checked += other.checked;
        self.compressed += other.compressed;
        self.unchanged += other.unchanged;
        self.rejected += other.rejected;
        self.failed += other.failed;
        self.would_compress += other.would_compress;
        self.bytes_saved += other.bytes_saved;
    }
}

/// Result of a completed run over one root
#[derive(Debug)]
pub struct RunResult {
    /// Accumulated counters
    pub stats: RunStats,

    /// Wall-clock time for the run
    pub duration: Duration,

    /// Whether every dispatched task was collected (false if interrupted)
    pub completed: bool,

    /// Whether the post-save read-back check passed (true when no save ran)
    pub store_verified: bool,
}

/// Coordinates one compression run at a time
pub struct Scheduler {
    config: Arc<PressConfig>,
    shutdown: Arc<AtomicBool>,
}

impl Scheduler {
    /// Create a scheduler for the given configuration
    pub fn new(config: PressConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the shutdown flag (for signal handlers)
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Whether shutdown has been requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Run the pipeline over `root`, reading and persisting the tracking
    /// store at the configured path.
    ///
    /// Per-file failures are counted, never fatal; the only error paths
    /// out of here are store-level I/O and a dead worker pool.
    pub fn run(&self, root: &Path) -> Result<RunResult> {
        let config = &self.config;
        let start = Instant::now();
        let now = Utc::now();

        info!(
            root = %root.display(),
            workers = config.worker_count,
            quality = %config.quality,
            dry_run = config.dry_run,
            "Starting compression run"
        );

        let mut store = TrackingStore::load(&config.tracking_file, config.strict_tracking)?;
        let mut stats = RunStats::default();

        let files = scanner::find_files(root, config);
        stats.files_found = files.len() as u64;

        if files.is_empty() {
            info!(root = %root.display(), "No matching files found");
            return Ok(RunResult {
                stats,
                duration: start.elapsed(),
                completed: true,
                store_verified: true,
            });
        }

        // Partition by the cheap age check; everything else goes to the pool
        let mut candidates = Vec::new();
        for path in files {
            let key = path.to_string_lossy().into_owned();
            let record = store.get(&key).cloned();
            if staleness::is_fresh(record.as_ref(), now, config.max_age) {
                stats.fresh += 1;
            } else {
                candidates.push(FileTask { path, record });
            }
        }

        debug!(
            found = stats.files_found,
            fresh = stats.fresh,
            candidates = candidates.len(),
            "Candidates partitioned"
        );

        let dispatched = candidates.len();
        if dispatched > 0 {
            self.run_pool(candidates, &mut store, &mut stats, now)?;
        }

        let completed = stats.checked == dispatched as u64 && !self.is_shutdown();

        // Dry runs never touch the tracking file
        let store_verified = if config.dry_run {
            true
        } else {
            store.save(&config.tracking_file)?;
            TrackingStore::verify(&config.tracking_file, store.len())
        };

        let duration = start.elapsed();
        info!(
            checked = stats.checked,
            compressed = stats.compressed,
            unchanged = stats.unchanged,
            failed = stats.failed,
            bytes_saved = stats.bytes_saved,
            duration_secs = duration.as_secs(),
            completed,
            "Run finished"
        );

        Ok(RunResult {
            stats,
            duration,
            completed,
            store_verified,
        })
    }

    /// Fan the candidate list out across the worker pool and apply
    /// outcomes as they arrive.
    fn run_pool(
        &self,
        candidates: Vec<FileTask>,
        store: &mut TrackingStore,
        stats: &mut RunStats,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let config = &self.config;
        let pool_size = config.worker_count.min(candidates.len());

        // The candidate list is already materialized, so the queue can hold
        // all of it; the bound that matters is the worker pool.
        let (task_tx, task_rx) = bounded::<FileTask>(candidates.len());
        let (outcome_tx, outcome_rx) = unbounded::<(PathBuf, Outcome)>();

        let compressor = Compressor::from_config(config);
        let mut workers = Vec::with_capacity(pool_size);
        for id in 0..pool_size {
            workers.push(Worker::spawn(
                id,
                compressor.clone(),
                config.min_savings_percent,
                config.dry_run,
                task_rx.clone(),
                outcome_tx.clone(),
                Arc::clone(&self.shutdown),
            )?);
        }
        drop(task_rx);
        drop(outcome_tx);

        debug!(count = workers.len(), "Workers spawned");

        for task in candidates {
            if task_tx.send(task).is_err() {
                // Workers only drop their receivers after draining the
                // queue, so a failed send means they were shut down early
                if self.is_shutdown() {
                    break;
                }
                return Err(WorkerError::QueueSendFailed.into());
            }
        }
        drop(task_tx);

        // Single-writer discipline: only this loop mutates the store
        for (path, outcome) in outcome_rx.iter() {
            stats.checked += 1;
            self.apply_outcome(store, stats, now, path, outcome);
        }

        for worker in workers {
            if let Err(e) = worker.join() {
                warn!(error = %e, "Worker failed to join cleanly");
            }
        }

        Ok(())
    }

    /// Apply one worker outcome to the store and the run counters.
    fn apply_outcome(
        &self,
        store: &mut TrackingStore,
        stats: &mut RunStats,
        now: DateTime<Utc>,
        path: PathBuf,
        outcome: Outcome,
    ) {
        let key = path.to_string_lossy().into_owned();

        match outcome {
            Outcome::Compressed {
                original_size,
                compressed_size,
                content_hash,
                fingerprint,
            } => {
                let saved = original_size.saturating_sub(compressed_size);
                stats.compressed += 1;
                stats.bytes_saved += saved;
                info!(
                    path = %path.display(),
                    original_size,
                    compressed_size,
                    saved,
                    "Compressed"
                );
                store.insert(
                    key,
                    FileRecord::compressed(
                        content_hash,
                        fingerprint,
                        original_size,
                        compressed_size,
                        now,
                    ),
                );
            }
            Outcome::Rejected {
                content_hash,
                fingerprint,
            } => {
                stats.rejected += 1;
                debug!(path = %path.display(), "Savings below threshold, keeping original");
                store.insert(
                    key,
                    FileRecord::rejected(content_hash, fingerprint, MINIMAL_SAVINGS, now),
                );
            }
            Outcome::Unchanged {
                fingerprint,
                content_hash,
            } => {
                stats.unchanged += 1;
                store
                    .entry_or_default(key)
                    .mark_checked(fingerprint, content_hash, now);
            }
            Outcome::WouldCompress { original_size } => {
                stats.would_compress += 1;
                info!(
                    path = %path.display(),
                    size = original_size,
                    "Would compress (dry run)"
                );
            }
            Outcome::Failed { message } => {
                stats.failed += 1;
                warn!(path = %path.display(), error = %message, "Compression failed");
                store.entry_or_default(key).mark_failed(&message, now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliArgs;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn config(root: &Path, tracking: &Path, extra: &[&str]) -> PressConfig {
        let mut argv = vec![
            "pdf-press".to_string(),
            root.display().to_string(),
            "--tracking-file".to_string(),
            tracking.display().to_string(),
            "--workers".to_string(),
            "2".to_string(),
            "--quiet".to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        PressConfig::from_args(CliArgs::parse_from(argv)).unwrap()
    }

    #[test]
    fn test_empty_root_short_circuits() {
        let dir = tempdir().unwrap();
        let tracking = dir.path().join("tracking.json");
        let scheduler = Scheduler::new(config(dir.path(), &tracking, &[]));

        let result = scheduler.run(dir.path()).unwrap();
        assert_eq!(result.stats, RunStats::default());
        assert!(result.completed);
        // No files → no save
        assert!(!tracking.exists());
    }

    #[test]
    fn test_dry_run_never_writes_tracking_file() {
        let dir = tempdir().unwrap();
        let tracking = dir.path().join("tracking.json");
        fs::write(dir.path().join("doc.pdf"), b"0123456789").unwrap();

        let scheduler = Scheduler::new(config(dir.path(), &tracking, &["--dry-run"]));
        let result = scheduler.run(dir.path()).unwrap();

        assert_eq!(result.stats.would_compress, 1);
        assert!(result.completed);
        assert!(!tracking.exists());
    }

    #[test]
    fn test_failed_tool_is_counted_not_fatal() {
        let dir = tempdir().unwrap();
        let tracking = dir.path().join("tracking.json");
        fs::write(dir.path().join("doc.pdf"), b"0123456789").unwrap();

        let scheduler = Scheduler::new(config(
            dir.path(),
            &tracking,
            &["--compressor", "definitely-not-a-real-binary"],
        ));
        let result = scheduler.run(dir.path()).unwrap();

        assert_eq!(result.stats.failed, 1);
        assert_eq!(result.stats.compressed, 0);
        assert!(result.completed);

        // The failure is recorded for the next run
        let store = TrackingStore::load(&tracking, true).unwrap();
        let key = dir.path().join("doc.pdf").to_string_lossy().into_owned();
        let record = store.get(&key).unwrap();
        assert_eq!(record.skipped, Some(true));
        assert!(record.reason.as_deref().unwrap().starts_with("error:"));
    }

    #[test]
    fn test_stats_merge() {
        let mut a = RunStats {
            files_found: 10,
            compressed: 2,
            bytes_saved: 100,
            ..RunStats::default()
        };
        let b = RunStats {
            files_found: 5,
            compressed: 1,
            bytes_saved: 50,
            failed: 1,
            ..RunStats::default()
        };
        a.merge(&b);

        assert_eq!(a.files_found, 15);
        assert_eq!(a.compressed, 3);
        assert_eq!(a.bytes_saved, 150);
        assert_eq!(a.failed, 1);
    }
}
