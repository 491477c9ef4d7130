//! Tracking store persistence
//!
//! The store is loaded once per run and written back wholesale at the end.
//! Saves go through a named temp file in the destination directory followed
//! by an atomic persist, so a reader never observes a half-written file.
//!
//! A missing tracking file is an empty store. A present-but-unparseable one
//! is treated as empty with a warning (availability over durability: a lost
//! tracking file only costs re-hashing on the next run), unless strict mode
//! asks for a hard failure.

use crate::error::{TrackingError, TrackingResult};
use crate::tracking::record::FileRecord;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// In-memory mapping from file path to its tracking record
#[derive(Debug, Default)]
pub struct TrackingStore {
    records: HashMap<String, FileRecord>,
}

impl TrackingStore {
    /// Load the store from `path`.
    ///
    /// Absent file → empty store. Unparseable file → empty store with a
    /// warning, or `TrackingError::Corrupt` when `strict` is set.
    pub fn load(path: &Path, strict: bool) -> TrackingResult<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No tracking file, starting fresh");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(TrackingError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        match serde_json::from_slice::<HashMap<String, FileRecord>>(&bytes) {
            Ok(records) => {
                debug!(path = %path.display(), count = records.len(), "Tracking data loaded");
                Ok(Self { records })
            }
            Err(e) if strict => Err(TrackingError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Tracking file unparseable, starting fresh"
                );
                Ok(Self::default())
            }
        }
    }

    /// Persist the store to `path`.
    ///
    /// Serializes to pretty JSON, writes to a temp file in the destination
    /// directory, and atomically renames it over the target.
    pub fn save(&self, path: &Path) -> TrackingResult<()> {
        let json = serde_json::to_vec_pretty(&self.records)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let write_err = |source: io::Error| TrackingError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        debug!(path = %path.display(), count = self.records.len(), "Tracking data saved");
        Ok(())
    }

    /// Post-save read-back sanity check.
    ///
    /// Returns whether the file on disk parses and holds `expected` records.
    /// A mismatch is reported but never fatal.
    pub fn verify(path: &Path, expected: usize) -> bool {
        match Self::load(path, false) {
            Ok(reloaded) if reloaded.len() == expected => true,
            Ok(reloaded) => {
                warn!(
                    path = %path.display(),
                    expected,
                    actual = reloaded.len(),
                    "Tracking file verification mismatch"
                );
                false
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Tracking file verification failed");
                false
            }
        }
    }

    /// Look up the record for a path.
    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.records.get(path)
    }

    /// Replace the record for a path.
    pub fn insert(&mut self, path: String, record: FileRecord) {
        self.records.insert(path, record);
    }

    /// Mutable access to the record for a path, creating an empty one if
    /// the path has never been seen.
    pub fn entry_or_default(&mut self, path: String) -> &mut FileRecord {
        self.records.entry(path).or_default()
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::record::Fingerprint;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = TrackingStore::load(&dir.path().join("nope.json"), false).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracking.json");

        let fingerprint = Fingerprint {
            size_bytes: 600,
            modified_unix: 12345,
        };
        let mut store = TrackingStore::default();
        store.insert(
            "/data/a.pdf".into(),
            FileRecord::compressed("hash-a".into(), fingerprint, 1000, 600, Utc::now()),
        );
        store.insert(
            "/data/b.pdf".into(),
            FileRecord::rejected("hash-b".into(), fingerprint, "minimal_savings", Utc::now()),
        );
        store.save(&path).unwrap();

        let reloaded = TrackingStore::load(&path, true).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded.get("/data/a.pdf").unwrap().content_hash.as_deref(),
            Some("hash-a")
        );
        assert_eq!(
            reloaded.get("/data/b.pdf").unwrap().reason.as_deref(),
            Some("minimal_savings")
        );
    }

    #[test]
    fn test_corrupt_file_default_starts_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracking.json");
        fs::write(&path, b"{ not json").unwrap();

        let store = TrackingStore::load(&path, false).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_strict_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracking.json");
        fs::write(&path, b"{ not json").unwrap();

        let err = TrackingStore::load(&path, true).unwrap_err();
        assert!(matches!(err, TrackingError::Corrupt { .. }));
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracking.json");

        let mut store = TrackingStore::default();
        store.insert("/data/a.pdf".into(), FileRecord::default());
        store.save(&path).unwrap();
        store.insert("/data/b.pdf".into(), FileRecord::default());
        store.save(&path).unwrap();

        let reloaded = TrackingStore::load(&path, true).unwrap();
        assert_eq!(reloaded.len(), 2);

        // Only the tracking file itself remains in the directory
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_verify() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracking.json");

        let mut store = TrackingStore::default();
        store.insert("/data/a.pdf".into(), FileRecord::default());
        store.save(&path).unwrap();

        assert!(TrackingStore::verify(&path, 1));
        assert!(!TrackingStore::verify(&path, 2));
        assert!(!TrackingStore::verify(&dir.path().join("missing.json"), 1));
    }

    #[test]
    fn test_entry_or_default() {
        let mut store = TrackingStore::default();
        store
            .entry_or_default("/data/new.pdf".into())
            .mark_failed("boom", Utc::now());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("/data/new.pdf").unwrap().skipped, Some(true));
    }
}
