//! Cached record types.

use crate::error::{Error, Result};
use crate::isbn::Isbn;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::Hash;

/// Trait for records stored in the cache tiers.
///
/// The durable key of a record is `"{prefix}:{key}"`, and the prefix doubles
/// as the on-disk namespace of the [`FileBackend`](crate::backend::FileBackend).
pub trait CacheEntity: Send + Sync + Serialize + for<'de> Deserialize<'de> + Clone {
    /// Type of the record's key.
    type Key: Display + Clone + Send + Sync + Eq + Hash + 'static;

    /// Return the record's cache key.
    fn cache_key(&self) -> Self::Key;

    /// Namespace for this record type, e.g. `"isbn"`.
    fn cache_prefix() -> &'static str;

    /// Serialize for durable storage.
    ///
    /// See [`crate::serialization`] for the envelope format.
    fn serialize_for_cache(&self) -> Result<Vec<u8>> {
        crate::serialization::serialize_for_cache(self)
    }

    /// Deserialize from durable storage, checking magic and schema version.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidCacheEntry`: Bad magic or corrupted envelope
    /// - `Error::VersionMismatch`: Schema version changed
    /// - `Error::DeserializationError`: Corrupted payload
    fn deserialize_from_cache(bytes: &[u8]) -> Result<Self> {
        crate::serialization::deserialize_from_cache(bytes)
    }

    /// Validate a record after it was loaded from a cache tier.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Book metadata resolved for one ISBN.
///
/// Built by a [`MetadataSource`](crate::source::MetadataSource) or loaded from
/// a cache tier; never mutated afterwards. Only `title` is guaranteed, every
/// other field is whatever the provider supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub authors: Vec<String>,
    pub isbn: Isbn,
    pub cover_url: Option<String>,
    pub publisher: Option<String>,
    /// Free-form, as published by the provider ("2018", "May 2018", "2018-01-06").
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub page_count: Option<u32>,
}

impl BookMetadata {
    /// Minimal record with only the required fields set.
    pub fn new(isbn: Isbn, title: impl Into<String>) -> Self {
        BookMetadata {
            title: title.into(),
            authors: Vec::new(),
            isbn,
            cover_url: None,
            publisher: None,
            published_date: None,
            description: None,
            page_count: None,
        }
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cover_url(mut self, url: impl Into<String>) -> Self {
        self.cover_url = Some(url.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        self.published_date = Some(date.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_page_count(mut self, pages: u32) -> Self {
        self.page_count = Some(pages);
        self
    }
}

impl CacheEntity for BookMetadata {
    type Key = Isbn;

    fn cache_key(&self) -> Self::Key {
        self.isbn.clone()
    }

    fn cache_prefix() -> &'static str {
        "isbn"
    }

    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::ValidationError(format!(
                "record for {} has no title",
                self.isbn
            )));
        }
        Ok(())
    }
}
