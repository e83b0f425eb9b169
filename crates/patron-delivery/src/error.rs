//! Error types for delivery steps.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Errors raised by archive, delivery, transfer and retention steps.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on a specific path.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The path has no usable file name.
    #[error("invalid artifact path: {0}")]
    InvalidPath(PathBuf),

    /// The remote transport reported a failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote transport did not finish in time.
    #[error("transport timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for delivery operations.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
