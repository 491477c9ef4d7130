//! Durable per-file compression tracking
//!
//! The tracking store is a JSON mapping from file path to the outcome of
//! that file's last evaluation. It is loaded once at the start of a run,
//! mutated in memory by the scheduler as worker outcomes arrive, and
//! persisted wholesale (atomically) at the end.

pub mod record;
pub mod store;

pub use record::{FileRecord, Fingerprint};
pub use store::TrackingStore;
