//! Error type for the run pipeline.

use thiserror::Error;

/// Fatal errors that halt a run before its artifact exists.
#[derive(Debug, Error)]
pub enum Error {
    /// Query or connection failure.
    #[error("source error: {0}")]
    Source(#[from] patron_source::Error),

    /// Rendering failure.
    #[error("serialization error: {0}")]
    Xml(#[from] patron_xml::Error),

    /// Artifact could not be written.
    #[error("packaging error: {0}")]
    Package(#[from] patron_package::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
