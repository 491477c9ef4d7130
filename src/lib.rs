//! pdf-press - Incremental Parallel PDF Corpus Compressor
//!
//! Re-compresses a large, slowly-changing corpus of PDF documents using an
//! external compressor (Ghostscript), touching only files that changed
//! since the last run or were never successfully processed. A durable JSON
//! tracking file records per-file outcomes, so repeated runs converge to a
//! stable, minimal-size corpus without redoing work.
//!
//! # Features
//!
//! - **Layered staleness detection**: recent-check age, then size/mtime
//!   fingerprint, then content hash - large unchanged files are almost
//!   never re-read, and content drift is still caught.
//!
//! - **Parallel compression**: a bounded pool of worker threads, each
//!   invoking its own compressor process; outcomes flow back to a single
//!   coordinator over channels.
//!
//! - **Safe replacement**: the compressor writes to a sibling scratch
//!   file; the original is only ever replaced by an atomic rename, and a
//!   rejected or failed attempt leaves no trace.
//!
//! - **Durable bookkeeping**: the tracking file is written through a temp
//!   file plus atomic rename and verified by a read-back check.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Directory Scanner                           │
//! │                 (recursive *.pdf enumeration)                    │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ candidate paths
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Scheduler                                │
//! │   age partition ──► fresh (skipped)                              │
//! │        │                                                         │
//! │        ▼ task queue (crossbeam bounded)                          │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐        ┌─────────┐       │
//! │  │Worker 1 │  │Worker 2 │  │Worker 3 │  ...   │Worker N │       │
//! │  │ probe + │  │ probe + │  │ probe + │        │ probe + │       │
//! │  │   gs    │  │   gs    │  │   gs    │        │   gs    │       │
//! │  └────┬────┘  └────┬────┘  └────┬────┘        └────┬────┘       │
//! │       └────────────┴─────┬──────┴───────────────────┘           │
//! │                          │ outcomes                             │
//! │                          ▼                                      │
//! │            ┌──────────────────────────┐                         │
//! │            │  Tracking Store update   │                         │
//! │            │  (single-writer, in mem) │                         │
//! │            └────────────┬─────────────┘                         │
//! └─────────────────────────┼───────────────────────────────────────┘
//!                           ▼
//!                ┌──────────────────┐
//!                │  tracking.json   │
//!                │ (atomic replace) │
//!                └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Compress a corpus, tracking state next to it
//! pdf-press data/amendment-pdfs -t data/tracking.json
//!
//! # Several corpora sharing one tracking file, aggressive quality
//! pdf-press data/amendments data/fiscal-notes --quality screen -w 8
//!
//! # See what a run would do
//! pdf-press data/amendments --dry-run
//! ```

pub mod compressor;
pub mod config;
pub mod content;
pub mod error;
pub mod progress;
pub mod scanner;
pub mod scheduler;
pub mod staleness;
pub mod tracking;

pub use compressor::{Compressor, FileTask, Outcome};
pub use config::{CliArgs, PressConfig, Quality};
pub use error::{PressError, Result};
pub use scheduler::{RunResult, RunStats, Scheduler};
pub use tracking::{FileRecord, Fingerprint, TrackingStore};
