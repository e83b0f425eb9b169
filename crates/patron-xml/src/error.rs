//! Error types for document building and serialization.

use thiserror::Error;

/// Errors raised while building or rendering export documents.
#[derive(Debug, Error)]
pub enum Error {
    /// One record could not be turned into a document.
    #[error("cannot build record {record}: {source}")]
    Build {
        record: String,
        #[source]
        source: patron_common::Error,
    },

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, Error>;
