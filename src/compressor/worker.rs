//! Per-file compression pipeline
//!
//! `process_file` is the whole of one worker's job for one candidate:
//! deep staleness probe, dry-run short-circuit, tool invocation into a
//! scratch file, threshold policy, and atomic promotion. Every exit path
//! is infallible from the scheduler's point of view: errors become
//! `Outcome::Failed` data, and the scratch file never outlives the call.

use crate::compressor::{Compressor, Outcome, MINIMAL_SAVINGS};
use crate::content::checksum;
use crate::staleness::{self, Probe};
use crate::tracking::FileRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One unit of work: a candidate path plus the scheduler's snapshot of
/// its tracking record.
#[derive(Debug, Clone)]
pub struct FileTask {
    /// Candidate file
    pub path: PathBuf,

    /// Immutable snapshot of the file's record at dispatch time
    pub record: Option<FileRecord>,
}

/// Suffix appended to the input file name for the scratch output
const SCRATCH_SUFFIX: &str = ".pressing";

/// Scratch file path: a sibling of the input, so the final rename never
/// crosses a filesystem boundary.
fn scratch_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(SCRATCH_SUFFIX);
    input.with_file_name(name)
}

/// Scratch file lifetime guard: removes the file on drop unless it was
/// promoted over the original.
struct ScratchGuard {
    path: PathBuf,
    armed: bool,
}

impl ScratchGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// The scratch file was renamed over the original; nothing to clean.
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove scratch file"
                );
            }
        }
    }
}

/// Evaluate one candidate file. Never panics, never leaves a scratch
/// file behind, never touches the original unless a compression is
/// accepted.
pub fn process_file(
    task: &FileTask,
    compressor: &Compressor,
    min_savings_percent: f64,
    dry_run: bool,
) -> Outcome {
    match try_process(task, compressor, min_savings_percent, dry_run) {
        Ok(outcome) => outcome,
        Err(e) => Outcome::Failed {
            message: e.to_string(),
        },
    }
}

fn try_process(
    task: &FileTask,
    compressor: &Compressor,
    min_savings_percent: f64,
    dry_run: bool,
) -> io::Result<Outcome> {
    // Deep staleness checks (fingerprint, then hash); the cheap age check
    // already ran in the scheduler before dispatch.
    let fingerprint = match staleness::probe(&task.path, task.record.as_ref())? {
        Probe::Unchanged {
            fingerprint,
            content_hash,
        } => {
            return Ok(Outcome::Unchanged {
                fingerprint,
                content_hash,
            })
        }
        Probe::Stale { fingerprint } => fingerprint,
    };

    let original_size = fingerprint.size_bytes;

    if dry_run {
        return Ok(Outcome::WouldCompress { original_size });
    }

    let scratch = scratch_path(&task.path);
    let mut guard = ScratchGuard::new(scratch.clone());

    if let Err(e) = compressor.run(&task.path, &scratch) {
        return Ok(Outcome::Failed {
            message: e.to_string(),
        });
    }

    let compressed_size = fs::metadata(&scratch)?.len();
    let threshold = original_size as f64 * (1.0 - min_savings_percent / 100.0);

    if (compressed_size as f64) < threshold {
        fs::rename(&scratch, &task.path)?;
        guard.disarm();

        let content_hash = checksum::hash_file(&task.path)?;
        let fingerprint = staleness::fingerprint_of(&fs::metadata(&task.path)?);

        debug!(
            path = %task.path.display(),
            original_size,
            compressed_size,
            "Replaced with compressed version"
        );
        Ok(Outcome::Compressed {
            original_size,
            compressed_size,
            content_hash,
            fingerprint,
        })
    } else {
        debug!(
            path = %task.path.display(),
            original_size,
            compressed_size,
            reason = MINIMAL_SAVINGS,
            "Keeping original"
        );
        let content_hash = checksum::hash_file(&task.path)?;
        Ok(Outcome::Rejected {
            content_hash,
            fingerprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Quality;
    use tempfile::tempdir;

    #[test]
    fn test_scratch_path_is_sibling() {
        let scratch = scratch_path(Path::new("/data/docs/report.pdf"));
        assert_eq!(scratch, Path::new("/data/docs/report.pdf.pressing"));
    }

    #[test]
    fn test_scratch_guard_removes_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.pdf.pressing");
        fs::write(&path, b"partial output").unwrap();

        drop(ScratchGuard::new(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_guard_disarmed_keeps_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.pdf.pressing");
        fs::write(&path, b"promoted output").unwrap();

        let mut guard = ScratchGuard::new(path.clone());
        guard.disarm();
        drop(guard);
        assert!(path.exists());
    }

    #[test]
    fn test_missing_candidate_is_failed() {
        let dir = tempdir().unwrap();
        let task = FileTask {
            path: dir.path().join("vanished.pdf"),
            record: None,
        };
        let compressor = Compressor::new("gs", Quality::Ebook, None);

        let outcome = process_file(&task, &compressor, 5.0, false);
        assert!(matches!(outcome, Outcome::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_producing_no_output_is_failed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        fs::write(&path, b"original bytes").unwrap();

        // `true` exits 0 without writing the scratch file
        let compressor = Compressor::new("true", Quality::Ebook, None);
        let task = FileTask {
            path: path.clone(),
            record: None,
        };

        let outcome = process_file(&task, &compressor, 5.0, false);
        assert!(matches!(outcome, Outcome::Failed { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"original bytes");
        assert!(!scratch_path(&path).exists());
    }

    #[test]
    fn test_dry_run_reports_without_invoking_tool() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        fs::write(&path, b"original bytes").unwrap();

        // The program does not exist; dry run must not try to launch it
        let compressor = Compressor::new("definitely-not-a-real-binary", Quality::Ebook, None);
        let task = FileTask {
            path: path.clone(),
            record: None,
        };

        let outcome = process_file(&task, &compressor, 5.0, true);
        assert_eq!(outcome, Outcome::WouldCompress { original_size: 14 });
        assert_eq!(fs::read(&path).unwrap(), b"original bytes");
    }
}
