//! Cache key management utilities.

use crate::entity::CacheEntity;

/// Builder for cache keys.
pub struct CacheKeyBuilder;

impl CacheKeyBuilder {
    /// Build full cache key from entity type and ID.
    pub fn build<T: CacheEntity>(id: &T::Key) -> String {
        format!("{}:{}", T::cache_prefix(), id)
    }

    /// Split a key into `(prefix, id)`.
    ///
    /// Returns `None` when there is no `:` separator or either side is empty.
    pub fn split(key: &str) -> Option<(&str, &str)> {
        let (prefix, id) = key.split_once(':')?;
        if prefix.is_empty() || id.is_empty() {
            return None;
        }
        Some((prefix, id))
    }
}
