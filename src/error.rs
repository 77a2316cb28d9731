//! Error types for ISBN lookups and the cache tiers.

use std::fmt;

/// Result type for cache, serialization and configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a metadata lookup that did not produce a book.
///
/// Every [`MetadataSource`](crate::source::MetadataSource) and the
/// [`LookupPipeline`](crate::pipeline::LookupPipeline) report failures with
/// exactly these kinds, so callers can match on them exhaustively and render a
/// distinct message for each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The identifier did not normalize to a valid ISBN-13.
    ///
    /// Returned before any cache or network access happens.
    InvalidIsbn,

    /// Transport-level failure, or a non-success HTTP status other than 429.
    ///
    /// Carries the underlying cause as text.
    Network(String),

    /// The source answered but had no usable record for the ISBN.
    ///
    /// A record without a title counts as not found.
    NotFound,

    /// The source answered with a body that could not be decoded.
    Decoding(String),

    /// The source signalled throttling (HTTP 429).
    ///
    /// This is per source: the pipeline still tries the fallback.
    RateLimited,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::InvalidIsbn => write!(f, "Invalid ISBN"),
            LookupError::Network(cause) => write!(f, "Network error: {}", cause),
            LookupError::NotFound => write!(f, "Book not found"),
            LookupError::Decoding(cause) => write!(f, "Decoding error: {}", cause),
            LookupError::RateLimited => write!(f, "Rate limited"),
        }
    }
}

impl std::error::Error for LookupError {}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LookupError::Decoding(e.to_string())
        } else {
            LookupError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(e: serde_json::Error) -> Self {
        LookupError::Decoding(e.to_string())
    }
}

/// Infrastructure errors raised by the cache tiers and configuration.
///
/// These never cross the `lookup_by_isbn` boundary: the pipeline treats a
/// failed durable read as a miss and a failed durable write as a no-op.
#[derive(Debug, Clone)]
pub enum Error {
    /// Serialization failed when converting a record to cache bytes.
    SerializationError(String),

    /// Deserialization failed when converting cache bytes to a record.
    ///
    /// **Recovery:** the entry is dropped and refetched from a source.
    DeserializationError(String),

    /// A decoded record failed validation (e.g. blank title).
    ValidationError(String),

    /// Durable storage error (filesystem, bad key).
    BackendError(String),

    /// Invalid configuration.
    ConfigError(String),

    /// Invalid cache entry: bad magic or corrupted envelope.
    InvalidCacheEntry(String),

    /// Schema version mismatch between code and a stored record.
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from stored entry)
        found: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::InvalidCacheEntry(msg) => write!(f, "Invalid cache entry: {}", msg),
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Cache version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::BackendError(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::BackendError(e.to_string())
        } else if e.is_syntax() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}
