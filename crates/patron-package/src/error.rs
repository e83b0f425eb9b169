//! Error types for packaging.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing an artifact.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on a specific path.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ZIP writer error.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The target path has no usable file name.
    #[error("invalid artifact path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for packaging operations.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) trait IoContext<T> {
    fn at(self, path: &std::path::Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
