//! Atomic artifact packaging for patron exports.
//!
//! Every artifact is written to a hidden temporary sibling first and renamed
//! into place only after it has been fully written and synced. A failure at
//! any point removes the temporary file, so the final path either holds a
//! complete artifact or nothing.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let zip = patron_package::package_text(
//!     "<users/>",
//!     Path::new("data/alma-20260101-120000.zip"),
//!     "alma-20260101-120000.xml",
//! )?;
//! # Ok::<(), patron_package::Error>(())
//! ```

mod error;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use error::IoContext;
pub use error::{Error, Result};

/// Write `text` as the single entry `entry_name` of a deflate ZIP at `zip_path`.
///
/// Entry timestamps are fixed so identical text yields identical bytes.
pub fn package_text(text: &str, zip_path: &Path, entry_name: &str) -> Result<PathBuf> {
    write_atomic(zip_path, |file| {
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        zip.start_file(entry_name, options)?;
        zip.write_all(text.as_bytes()).at(zip_path)?;
        let file = zip.finish()?;
        file.sync_all().at(zip_path)?;
        Ok(())
    })?;

    log::info!("Packaged {} into {}", entry_name, zip_path.display());
    Ok(zip_path.to_path_buf())
}

/// Write lines to `path`, each terminated by a newline, atomically.
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<PathBuf> {
    write_atomic(path, |file| {
        let mut writer = BufWriter::new(file);
        for line in lines {
            writer.write_all(line.as_ref().as_bytes()).at(path)?;
            writer.write_all(b"\n").at(path)?;
        }
        let file = writer.into_inner().map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e.into_error(),
        })?;
        file.sync_all().at(path)?;
        Ok(())
    })?;

    log::info!("Wrote {} lines to {}", lines.len(), path.display());
    Ok(path.to_path_buf())
}

/// Temporary sibling used while `path` is being written.
pub fn partial_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;
    Ok(path.with_file_name(format!(".{}.partial", name)))
}

fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    let partial = partial_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).at(parent)?;
    }

    let result = File::create(&partial)
        .at(&partial)
        .and_then(write)
        .and_then(|()| fs::rename(&partial, path).at(path));

    if result.is_err() && partial.exists() {
        if let Err(e) = fs::remove_file(&partial) {
            log::warn!("Could not remove {}: {}", partial.display(), e);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_package_single_entry() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("alma-20260101-120000.zip");

        package_text("<users/>", &zip_path, "alma-20260101-120000.xml").unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "alma-20260101-120000.xml");
        assert_eq!(entry.compression(), CompressionMethod::Deflated);

        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        assert_eq!(text, "<users/>");
        assert!(!partial_path(&zip_path).unwrap().exists());
    }

    #[test]
    fn test_package_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.zip");
        let b = dir.path().join("b.zip");

        package_text("<users><user/></users>", &a, "x.xml").unwrap();
        package_text("<users><user/></users>", &b, "x.xml").unwrap();
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }

    #[test]
    fn test_failure_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the final rename fail.
        let target = dir.path().join("blocked.zip");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        assert!(package_text("<users/>", &target, "blocked.xml").is_err());
        assert!(!partial_path(&target).unwrap().exists());
        assert!(target.is_dir());
    }

    #[test]
    fn test_write_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("opal_1.txt");

        write_lines(&path, &["HDR", "row 1", "row 2"]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "HDR\nrow 1\nrow 2\n");
    }

    #[test]
    fn test_overwrite_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        write_lines(&path, &["old"]).unwrap();
        write_lines(&path, &["new"]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
    }
}
