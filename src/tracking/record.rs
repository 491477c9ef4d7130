//! Tracking record for a single file
//!
//! All fields are optional and omitted from JSON when absent, so records
//! written by earlier versions of the pipeline (hash-only, no fingerprint)
//! still round-trip and upgrade in place on the next check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest reason string kept in a record
const MAX_REASON_CHARS: usize = 160;

/// Cheap file identity: byte count plus mtime, captured at check time.
///
/// An exact match lets the staleness probe skip hashing; any difference
/// falls through to the content hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    /// File size in bytes
    pub size_bytes: u64,

    /// Modification time as unix seconds
    pub modified_unix: i64,
}

/// The persisted outcome of the last evaluation of one file.
///
/// Invariants:
/// - if `last_compressed` is set, the file on disk is the compressed
///   version and `content_hash` reflects the post-compression bytes
/// - every update fully overwrites the prior record for the path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// SHA-256 of file bytes at last successful check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    /// File size at last check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// File mtime (unix seconds) at last check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_unix: Option<i64>,

    /// Last time this file was examined at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,

    /// Last time this file was actually rewritten
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_compressed: Option<DateTime<Utc>>,

    /// Size before the accepted compression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size: Option<u64>,

    /// Size after the accepted compression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressed_size: Option<u64>,

    /// compressed_size / original_size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,

    /// Set when the file was evaluated but intentionally left unmodified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,

    /// Why the file was skipped ("minimal_savings" or an error tag)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FileRecord {
    /// Record for an accepted compression: the file on disk is now the
    /// compressed version, identified by `content_hash`/`fingerprint`.
    pub fn compressed(
        content_hash: String,
        fingerprint: Fingerprint,
        original_size: u64,
        compressed_size: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            content_hash: Some(content_hash),
            size_bytes: Some(fingerprint.size_bytes),
            modified_unix: Some(fingerprint.modified_unix),
            last_checked: Some(now),
            last_compressed: Some(now),
            original_size: Some(original_size),
            compressed_size: Some(compressed_size),
            compression_ratio: Some(compressed_size as f64 / original_size as f64),
            skipped: None,
            reason: None,
        }
    }

    /// Record for a deliberate skip (threshold rejection): the original is
    /// untouched, and the stored hash lets future runs skip it cheaply.
    pub fn rejected(
        content_hash: String,
        fingerprint: Fingerprint,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            content_hash: Some(content_hash),
            size_bytes: Some(fingerprint.size_bytes),
            modified_unix: Some(fingerprint.modified_unix),
            last_checked: Some(now),
            skipped: Some(true),
            reason: Some(reason.to_string()),
            ..Self::default()
        }
    }

    /// Confirm the file unchanged: bump `last_checked`, refresh the
    /// fingerprint, and backfill the hash when the probe computed one.
    pub fn mark_checked(
        &mut self,
        fingerprint: Fingerprint,
        content_hash: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.size_bytes = Some(fingerprint.size_bytes);
        self.modified_unix = Some(fingerprint.modified_unix);
        if let Some(hash) = content_hash {
            self.content_hash = Some(hash);
        }
        self.last_checked = Some(now);
    }

    /// Record a per-file failure. Prior hash/fingerprint fields are kept:
    /// if the file later changes, the hash layer still detects it.
    pub fn mark_failed(&mut self, message: &str, now: DateTime<Utc>) {
        let first_line = message.lines().next().unwrap_or("unknown");
        let tag: String = format!("error: {first_line}")
            .chars()
            .take(MAX_REASON_CHARS)
            .collect();

        self.skipped = Some(true);
        self.reason = Some(tag);
        self.last_checked = Some(now);
    }

    /// The stored fingerprint, if both halves are present.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        Some(Fingerprint {
            size_bytes: self.size_bytes?,
            modified_unix: self.modified_unix?,
        })
    }
}
