//! Postcard-based record serialization with versioned envelopes.
//!
//! Durable cache records are stored in this format:
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│ VERSION (varint)│POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "ISBK"              u32                postcard::to_allocvec(T)
//! ```
//!
//! The header is checked before the payload is decoded, so a record written by
//! another program or an older schema is rejected without touching its body.
//!
//! ```rust
//! use isbn_kit::serialization::{serialize_for_cache, deserialize_from_cache};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Shelf {
//!     id: u64,
//!     name: String,
//! }
//!
//! # fn main() -> isbn_kit::Result<()> {
//! let shelf = Shelf { id: 1, name: "To read".to_string() };
//! let bytes = serialize_for_cache(&shelf)?;
//! let back: Shelf = deserialize_from_cache(&bytes)?;
//! assert_eq!(shelf, back);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Magic header for isbn-kit records: b"ISBK"
pub const CACHE_MAGIC: [u8; 4] = *b"ISBK";

/// Current schema version.
///
/// Increment on any breaking change to a cached type (field added, removed,
/// reordered or retyped). Records with another version read as a miss and are
/// refetched.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope for durable records.
///
/// ```rust
/// use isbn_kit::serialization::CacheEnvelope;
///
/// let envelope = CacheEnvelope::new("data");
/// assert_eq!(envelope.magic, *b"ISBK");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheEnvelope<T> {
    /// Magic header: must be b"ISBK"
    pub magic: [u8; 4],
    /// Schema version: must match CURRENT_SCHEMA_VERSION
    pub version: u32,
    /// The record itself
    pub payload: T,
}

impl<T> CacheEnvelope<T> {
    /// Create a new envelope with current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: CACHE_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

#[derive(Deserialize)]
struct EnvelopeHeader {
    magic: [u8; 4],
    version: u32,
}

/// Serialize a value with envelope for durable storage.
///
/// # Errors
///
/// Returns `Error::SerializationError` if Postcard serialization fails.
pub fn serialize_for_cache<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let envelope = CacheEnvelope::new(value);
    postcard::to_allocvec(&envelope).map_err(|e| {
        log::error!("Cache serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Deserialize a value from durable storage with validation.
///
/// 1. Header must decode and carry magic b"ISBK"
/// 2. Version must equal CURRENT_SCHEMA_VERSION
/// 3. Payload must decode completely
///
/// # Errors
///
/// - `Error::InvalidCacheEntry`: Missing header or invalid magic
/// - `Error::VersionMismatch`: Schema version mismatch
/// - `Error::DeserializationError`: Corrupted Postcard payload
pub fn deserialize_from_cache<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let (header, payload): (EnvelopeHeader, &'de [u8]) = postcard::take_from_bytes(bytes)
        .map_err(|e| {
            log::warn!("Cache entry has no readable header: {}", e);
            Error::InvalidCacheEntry(format!("unreadable header: {}", e))
        })?;

    if header.magic != CACHE_MAGIC {
        log::warn!(
            "Invalid cache entry: expected magic {:?}, got {:?}",
            CACHE_MAGIC,
            header.magic
        );
        return Err(Error::InvalidCacheEntry(format!(
            "Invalid magic: expected {:?}, got {:?}",
            CACHE_MAGIC, header.magic
        )));
    }

    if header.version != CURRENT_SCHEMA_VERSION {
        log::warn!(
            "Cache version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION,
            header.version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: header.version,
        });
    }

    postcard::from_bytes(payload).map_err(|e| {
        log::error!("Cache deserialization failed: {}", e);
        Error::DeserializationError(e.to_string())
    })
}
