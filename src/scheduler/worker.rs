//! Worker threads for the compression pool
//!
//! Each worker pulls file tasks from the shared queue, runs the per-file
//! pipeline, and sends the outcome back to the scheduler. Workers never
//! touch the tracking store: every task carries its own record snapshot,
//! and all store mutation happens on the scheduler thread.

use crate::compressor::{self, Compressor, FileTask, Outcome};
use crate::error::WorkerError;
use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// A worker thread processing file tasks
pub struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a new worker thread
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        id: usize,
        compressor: Compressor,
        min_savings_percent: f64,
        dry_run: bool,
        tasks: Receiver<FileTask>,
        outcomes: Sender<(PathBuf, Outcome)>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("press-{id}"))
            .spawn(move || {
                worker_loop(
                    id,
                    compressor,
                    min_savings_percent,
                    dry_run,
                    tasks,
                    outcomes,
                    shutdown,
                )
            })
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| WorkerError::Panicked { id: self.id })?;
        }
        Ok(())
    }
}

/// Main worker loop: drain the task queue until it closes or shutdown is
/// signalled. Undone tasks simply stay unprocessed; the scheduler counts
/// collected outcomes against dispatched tasks to detect interruption.
fn worker_loop(
    id: usize,
    compressor: Compressor,
    min_savings_percent: f64,
    dry_run: bool,
    tasks: Receiver<FileTask>,
    outcomes: Sender<(PathBuf, Outcome)>,
    shutdown: Arc<AtomicBool>,
) {
    debug!(worker = id, "Worker starting");

    for task in tasks.iter() {
        if shutdown.load(Ordering::Relaxed) {
            debug!(worker = id, "Shutdown signalled, abandoning queue");
            break;
        }

        trace!(worker = id, path = %task.path.display(), "Processing file");
        let outcome = compressor::process_file(&task, &compressor, min_savings_percent, dry_run);
        trace!(
            worker = id,
            path = %task.path.display(),
            outcome = outcome.label(),
            "File processed"
        );

        if outcomes.send((task.path, outcome)).is_err() {
            // Scheduler went away; nothing left to report to
            break;
        }
    }

    debug!(worker = id, "Worker shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Quality;
    use crossbeam_channel::unbounded;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_worker_processes_queue_and_exits() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        fs::write(&path, b"bytes").unwrap();

        let (task_tx, task_rx) = unbounded::<FileTask>();
        let (outcome_tx, outcome_rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker = Worker::spawn(
            0,
            Compressor::new("definitely-not-a-real-binary", Quality::Ebook, None),
            5.0,
            true, // dry run: tool is never launched
            task_rx,
            outcome_tx,
            shutdown,
        )
        .unwrap();

        task_tx
            .send(FileTask {
                path: path.clone(),
                record: None,
            })
            .unwrap();
        drop(task_tx);

        let (reported_path, outcome) = outcome_rx.recv().unwrap();
        assert_eq!(reported_path, path);
        assert!(matches!(outcome, Outcome::WouldCompress { .. }));

        worker.join().unwrap();
    }

    #[test]
    fn test_worker_stops_on_shutdown() {
        let (task_tx, task_rx) = unbounded::<FileTask>();
        let (outcome_tx, outcome_rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(true));

        let worker = Worker::spawn(
            1,
            Compressor::new("gs", Quality::Ebook, None),
            5.0,
            false,
            task_rx,
            outcome_tx,
            shutdown,
        )
        .unwrap();

        task_tx
            .send(FileTask {
                path: "/nonexistent.pdf".into(),
                record: None,
            })
            .unwrap();
        drop(task_tx);

        worker.join().unwrap();
        // Task was abandoned, not processed
        assert!(outcome_rx.try_recv().is_err());
    }
}
