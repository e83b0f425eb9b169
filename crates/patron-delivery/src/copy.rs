//! Local archive and network-directory delivery.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::IoContext;
use crate::{Error, Outcome, Result};

/// Layout of dated archive directories.
pub const ARCHIVE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Copy the artifact into `archive_root/<date>/`, creating it if needed.
///
/// An artifact with the same name already archived that day is replaced.
pub fn archive(artifact: &Path, archive_root: &Path, date: NaiveDate) -> Outcome {
    let dir = archive_root.join(date.format(ARCHIVE_DATE_FORMAT).to_string());
    let result = fs::create_dir_all(&dir)
        .at(&dir)
        .and_then(|()| copy_into(artifact, &dir));
    Outcome::from_result("archive", result)
}

/// Copy the artifact into a network directory, when one is configured.
///
/// The directory must already exist; a missing share is reported, not created.
pub fn deliver(artifact: &Path, destination: Option<&Path>) -> Outcome {
    match destination {
        Some(dir) => Outcome::from_result("deliver", copy_into(artifact, dir)),
        None => Outcome::skipped("deliver", "no network directory configured"),
    }
}

/// Copy `source` into `dir` under the same file name, keeping its mtime.
///
/// The copy lands under a temporary name and is renamed into place.
pub fn copy_into(source: &Path, dir: &Path) -> Result<PathBuf> {
    let name = source
        .file_name()
        .ok_or_else(|| Error::InvalidPath(source.to_path_buf()))?;
    let target = dir.join(name);
    let partial = dir.join(format!(".{}.partial", name.to_string_lossy()));

    let result =
        copy_preserving(source, &partial).and_then(|()| fs::rename(&partial, &target).at(&target));
    if result.is_err() && partial.exists() {
        if let Err(e) = fs::remove_file(&partial) {
            log::warn!("Could not remove {}: {}", partial.display(), e);
        }
    }
    result.map(|()| target)
}

fn copy_preserving(source: &Path, target: &Path) -> Result<()> {
    let modified = fs::metadata(source).at(source)?.modified().at(source)?;
    fs::copy(source, target).at(target)?;

    let file = File::options().write(true).open(target).at(target)?;
    file.set_modified(modified).at(target)?;
    file.sync_all().at(target)?;
    Ok(())
}
