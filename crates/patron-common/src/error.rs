//! Error types for patron-common.

use thiserror::Error;

/// Common error type for patron operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A key value could not be coerced to a numeric person key.
    #[error("malformed person key: {value:?}")]
    MalformedKey { value: String },

    /// Timestamp text did not match any accepted layout.
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
