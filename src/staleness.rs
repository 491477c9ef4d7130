//! Layered staleness detection
//!
//! Decides, per file, whether it must be re-submitted for compression.
//! Checks run cheapest-first:
//!
//! 1. recent-check age (timestamp arithmetic, no I/O) - scheduler side
//! 2. size/mtime fingerprint (one stat) - worker side
//! 3. content hash (full read) - worker side
//!
//! A file with no prior record is always stale. Setting the max age to
//! zero disables the age shortcut entirely, which reproduces full-rescan
//! behavior through the same code path.

use crate::content::checksum;
use crate::tracking::{FileRecord, Fingerprint};
use chrono::{DateTime, TimeDelta, Utc};
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

/// Result of the deep (fingerprint, then hash) probe run inside a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The file is identical to its last check. `content_hash` is set only
    /// when the probe had to fall through to hashing, so the caller can
    /// backfill the record.
    Unchanged {
        fingerprint: Fingerprint,
        content_hash: Option<String>,
    },

    /// Content differs from the last check, or the file was never seen.
    Stale { fingerprint: Fingerprint },
}

/// Layer 1: was this file checked recently enough to skip entirely?
///
/// No I/O beyond the timestamp comparison. `max_age` of zero always
/// answers no.
pub fn is_fresh(record: Option<&FileRecord>, now: DateTime<Utc>, max_age: Duration) -> bool {
    if max_age.is_zero() {
        return false;
    }

    let Some(last_checked) = record.and_then(|r| r.last_checked) else {
        return false;
    };

    let limit = TimeDelta::from_std(max_age).unwrap_or(TimeDelta::MAX);
    now.signed_duration_since(last_checked) < limit
}

/// Capture the cheap fingerprint from file metadata.
pub fn fingerprint_of(meta: &Metadata) -> Fingerprint {
    let modified_unix = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    Fingerprint {
        size_bytes: meta.len(),
        modified_unix,
    }
}

/// Layers 2 and 3: stat the file, compare fingerprints, and only hash when
/// the fingerprint no longer matches.
///
/// Errors (file vanished, unreadable) propagate to the caller, which
/// records them as a per-file failure.
pub fn probe(path: &Path, record: Option<&FileRecord>) -> io::Result<Probe> {
    let meta = std::fs::metadata(path)?;
    let current = fingerprint_of(&meta);

    if let Some(stored) = record.and_then(|r| r.fingerprint()) {
        if stored == current {
            return Ok(Probe::Unchanged {
                fingerprint: current,
                content_hash: None,
            });
        }
    }

    let Some(stored_hash) = record.and_then(|r| r.content_hash.as_deref()) else {
        return Ok(Probe::Stale {
            fingerprint: current,
        });
    };

    let current_hash = checksum::hash_file(path)?;
    if current_hash == stored_hash {
        Ok(Probe::Unchanged {
            fingerprint: current,
            content_hash: Some(current_hash),
        })
    } else {
        Ok(Probe::Stale {
            fingerprint: current,
        })
    }
}
