//! Content inspection for change detection
//!
//! Provides the streaming content checksums that back the authoritative
//! layer of staleness detection.

pub mod checksum;

pub use checksum::{hash_bytes, hash_file};
