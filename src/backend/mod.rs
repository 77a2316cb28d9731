//! Durable cache tier backends.

use crate::error::Result;

pub mod file;
pub mod inmemory;

pub use file::FileBackend;
pub use inmemory::InMemoryBackend;

/// Trait for the byte-oriented durable cache tier.
///
/// Keys have the form `"{prefix}:{id}"` (see
/// [`CacheKeyBuilder`](crate::key::CacheKeyBuilder)); values are serialized
/// records. Entries are never evicted by the backend, only overwritten.
///
/// All methods take `&self`: implementations synchronize internally so that
/// concurrent lookups can share one backend.
///
/// The pipeline never propagates these errors. A failed `get` reads as a miss
/// and a failed `set` is logged and dropped.
#[allow(async_fn_in_trait)]
pub trait CacheBackend: Send + Sync + Clone {
    /// Retrieve a value by key.
    ///
    /// # Returns
    /// - `Ok(Some(bytes))` - Value stored
    /// - `Ok(None)` - Nothing stored under this key
    ///
    /// # Errors
    /// Returns `Err` if the storage could not be read.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns `Err` if the value could not be persisted.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove a value. Removing a missing key succeeds.
    ///
    /// # Errors
    /// Returns `Err` if the storage could not be modified.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key is stored.
    ///
    /// # Errors
    /// Returns `Err` if the storage could not be read.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Remove every stored value.
    ///
    /// # Errors
    /// Returns `Err` if the storage could not be modified.
    async fn clear_all(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_backend_exists_default() {
        let backend = InMemoryBackend::new();
        backend
            .set("isbn:9780134685991", vec![1, 2, 3])
            .await
            .expect("Failed to set key");
        assert!(backend
            .exists("isbn:9780134685991")
            .await
            .expect("Failed to check exists"));
        assert!(!backend
            .exists("isbn:9780306406157")
            .await
            .expect("Failed to check exists"));
    }
}
