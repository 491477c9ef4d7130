//! Candidate file enumeration
//!
//! Recursively finds files with the tracked extension under a root.
//! Unreadable entries are warned about and skipped; the walk never fails
//! the run. The result is sorted and deduplicated by path, which is what
//! guarantees at-most-one in-flight compression per file downstream.

use crate::config::PressConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Find all matching files under `root`, recursively.
pub fn find_files(root: &Path, config: &PressConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if !has_extension(&path, &config.extension) {
            continue;
        }
        if config.is_excluded(&path.to_string_lossy()) {
            debug!(path = %path.display(), "Excluded by pattern");
            continue;
        }

        files.push(path);
    }

    files.sort();
    files.dedup();
    files
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliArgs;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn config(root: &Path, extra: &[&str]) -> PressConfig {
        let mut argv = vec!["pdf-press".to_string(), root.display().to_string()];
        argv.extend(extra.iter().map(|s| s.to_string()));
        PressConfig::from_args(CliArgs::parse_from(argv)).unwrap()
    }

    #[test]
    fn test_finds_files_recursively() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.pdf"), b"a").unwrap();
        fs::create_dir_all(dir.path().join("sub/deep")).unwrap();
        fs::write(dir.path().join("sub/b.pdf"), b"b").unwrap();
        fs::write(dir.path().join("sub/deep/c.pdf"), b"c").unwrap();

        let files = find_files(dir.path(), &config(dir.path(), &[]));
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_ignores_other_extensions_and_dirs() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.pdf"), b"a").unwrap();
        fs::write(dir.path().join("b.txt"), b"b").unwrap();
        fs::write(dir.path().join("noext"), b"c").unwrap();
        fs::create_dir(dir.path().join("dir.pdf")).unwrap();

        let files = find_files(dir.path(), &config(dir.path(), &[]));
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.pdf"));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("upper.PDF"), b"a").unwrap();

        let files = find_files(dir.path(), &config(dir.path(), &[]));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_exclude_patterns() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("keep.pdf"), b"a").unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();
        fs::write(dir.path().join("archive/old.pdf"), b"b").unwrap();

        let files = find_files(dir.path(), &config(dir.path(), &["--exclude", "archive"]));
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.pdf"));
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let files = find_files(&missing, &config(dir.path(), &[]));
        assert!(files.is_empty());
    }

    #[test]
    fn test_results_are_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("z.pdf"), b"z").unwrap();
        fs::write(dir.path().join("a.pdf"), b"a").unwrap();
        fs::write(dir.path().join("m.pdf"), b"m").unwrap();

        let files = find_files(dir.path(), &config(dir.path(), &[]));
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }
}
