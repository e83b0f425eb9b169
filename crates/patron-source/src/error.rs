//! Error types for source reading.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while querying the relational source.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot document could not be decoded.
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The statement failed to execute.
    #[error("query {query} failed: {message}")]
    Query { query: String, message: String },

    /// A required column is absent from the result set.
    #[error("query {query} returned no column {column}")]
    MissingColumn { query: String, column: String },

    /// A join key could not be normalised.
    #[error("query {query}: {source}")]
    MalformedKey {
        query: String,
        #[source]
        source: patron_common::Error,
    },

    /// The statement exceeded its deadline.
    #[error("query {query} timed out after {timeout:?}")]
    Timeout { query: String, timeout: Duration },
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, Error>;
