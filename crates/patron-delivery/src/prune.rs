//! Retention cleanup of the working directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::IoContext;
use crate::Result;

/// Default retention period in days.
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

const SECONDS_PER_DAY: u64 = 86_400;

/// What a prune pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PruneSummary {
    /// Files deleted.
    pub removed: Vec<PathBuf>,
    /// Regular files inside the retention window.
    pub kept: usize,
    /// Files that could not be inspected or deleted.
    pub failed: usize,
}

/// Delete regular files in `dir` last modified before `now - retention_days`.
///
/// Subdirectories (including the archive) are never touched. Failures on
/// individual files are logged and counted; only an unreadable `dir` is an
/// error.
pub fn prune(dir: &Path, retention_days: u64, now: SystemTime) -> Result<PruneSummary> {
    let window = Duration::from_secs(retention_days.saturating_mul(SECONDS_PER_DAY));
    let cutoff = now.checked_sub(window).unwrap_or(UNIX_EPOCH);
    let mut summary = PruneSummary::default();

    for entry in fs::read_dir(dir).at(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                summary.failed += 1;
                continue;
            }
        };
        let path = entry.path();

        let modified = match entry.metadata().and_then(|m| {
            if m.is_file() {
                m.modified().map(Some)
            } else {
                Ok(None)
            }
        }) {
            Ok(Some(modified)) => modified,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Cannot inspect {}: {}", path.display(), e);
                summary.failed += 1;
                continue;
            }
        };

        if modified >= cutoff {
            summary.kept += 1;
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Removed expired file {}", path.display());
                summary.removed.push(path);
            }
            Err(e) => {
                log::warn!("Could not remove {}: {}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    log::info!(
        "Retention pass on {}: {} removed, {} kept, {} failed",
        dir.display(),
        summary.removed.len(),
        summary.kept,
        summary.failed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn file_aged(dir: &Path, name: &str, now: SystemTime, age: Duration) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(now - age)
            .unwrap();
        path
    }

    #[test]
    fn test_prune_removes_only_expired_files() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let day = Duration::from_secs(SECONDS_PER_DAY);
        let old = file_aged(dir.path(), "old.zip", now, day * 8);
        let fresh = file_aged(dir.path(), "new.zip", now, day * 6);

        let summary = prune(dir.path(), 7, now).unwrap();
        assert_eq!(summary.removed, vec![old.clone()]);
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.failed, 0);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn test_file_at_cutoff_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        // Whole seconds, so the stored mtime lands exactly on the cutoff.
        let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
        let now = UNIX_EPOCH + Duration::from_secs(since_epoch.as_secs());
        let day = Duration::from_secs(SECONDS_PER_DAY);
        let edge = file_aged(dir.path(), "edge.zip", now, day * 7);

        let summary = prune(dir.path(), 7, now).unwrap();
        assert!(summary.removed.is_empty());
        assert_eq!(summary.kept, 1);
        assert!(edge.exists());
    }

    #[test]
    fn test_prune_never_touches_directories() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let archive = dir.path().join("archive");
        fs::create_dir(&archive).unwrap();
        let month = Duration::from_secs(30 * SECONDS_PER_DAY);
        let nested = file_aged(&archive, "ancient.zip", now, month);

        let summary = prune(dir.path(), 7, now).unwrap();
        assert!(summary.removed.is_empty());
        assert!(archive.is_dir());
        assert!(nested.exists());
    }

    #[test]
    fn test_zero_retention_clears_everything_older_than_now() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        file_aged(dir.path(), "a.txt", now, Duration::from_secs(60));
        file_aged(dir.path(), "b.txt", now, Duration::from_secs(1));

        let summary = prune(dir.path(), 0, now).unwrap();
        assert_eq!(summary.removed.len(), 2);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_huge_retention_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        file_aged(dir.path(), "a.txt", now, Duration::from_secs(365 * SECONDS_PER_DAY));

        let summary = prune(dir.path(), u64::MAX, now).unwrap();
        assert!(summary.removed.is_empty());
        assert_eq!(summary.kept, 1);
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(prune(&dir.path().join("gone"), 7, SystemTime::now()).is_err());
    }
}
