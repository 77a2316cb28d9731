//! Filesystem durable tier: one file per key.
//!
//! A key `"{prefix}:{id}"` is stored at `{root}/{prefix}/{id}.bin`, so every
//! record type gets its own namespace directory. Files are written to a
//! sibling temp file and renamed into place, so readers see either the old or
//! the new record, never a partial one. Writers to the same key are serialized
//! with a per-key async lock; a lock entry lives only while some writer holds
//! it.

use super::CacheBackend;
use crate::error::{Error, Result};
use crate::key::CacheKeyBuilder;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

const RECORD_EXTENSION: &str = "bin";

/// Durable backend storing records as files under a root directory.
///
/// Directories are created on first write; constructing the backend does no
/// I/O. Clones share the same root and lock table.
///
/// ```no_run
/// use isbn_kit::backend::{CacheBackend, FileBackend};
///
/// # async fn example() -> isbn_kit::Result<()> {
/// let backend = FileBackend::new("/var/cache/isbn-kit");
/// backend.set("isbn:9780134685991", b"record".to_vec()).await?;
/// // -> /var/cache/isbn-kit/isbn/9780134685991.bin
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FileBackend {
    root: PathBuf,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl FileBackend {
    /// Create a backend rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        FileBackend {
            root: root.as_ref().to_path_buf(),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Root directory of the backend.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a key.
    ///
    /// # Errors
    /// Returns `Error::BackendError` if the key is not `"{prefix}:{id}"` or
    /// either part contains anything but ASCII letters, digits, `-` and `_`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let (prefix, id) = CacheKeyBuilder::split(key)
            .ok_or_else(|| Error::BackendError(format!("malformed cache key: {:?}", key)))?;
        if !is_safe_segment(prefix) || !is_safe_segment(id) {
            return Err(Error::BackendError(format!(
                "cache key not usable as a file name: {:?}",
                key
            )));
        }
        Ok(self
            .root
            .join(prefix)
            .join(format!("{}.{}", id, RECORD_EXTENSION)))
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks.entry(key.to_string()).or_default().clone()
    }

    /// Give back the caller's handle and drop the key's entry once the table
    /// holds the only reference. Call only after the guard is released.
    fn release_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.locks.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Write `value` to `tmp`, then rename it over `path`. The temp file is
    /// removed on any failure.
    async fn write_atomically(&self, tmp: &Path, path: &Path, value: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::map_io_error(e, parent))?;
        }
        if let Err(e) = fs::write(tmp, value).await {
            let _ = fs::remove_file(tmp).await;
            return Err(Self::map_io_error(e, tmp));
        }
        if let Err(e) = fs::rename(tmp, path).await {
            let _ = fs::remove_file(tmp).await;
            return Err(Self::map_io_error(e, path));
        }
        Ok(())
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> Error {
        Error::BackendError(format!("{}: {}", path.display(), e))
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl CacheBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => {
                debug!("✓ File GET {} -> HIT", key);
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("✓ File GET {} -> MISS", key);
                Ok(None)
            }
            Err(e) => Err(Self::map_io_error(e, &path)),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension(format!("{}.tmp", RECORD_EXTENSION));

        let lock = self.lock_for(key);
        let written = {
            let _guard = lock.lock().await;
            self.write_atomically(&tmp, &path, &value).await
        };
        self.release_lock(key, lock);
        written?;

        debug!("✓ File SET {} ({} bytes)", key, value.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        let lock = self.lock_for(key);
        let removed = {
            let _guard = lock.lock().await;
            fs::remove_file(&path).await
        };
        self.release_lock(key, lock);

        match removed {
            Ok(()) => {
                debug!("✓ File DELETE {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::map_io_error(e, &path)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| Self::map_io_error(e, &path))
    }

    async fn clear_all(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(Self::map_io_error(e, &self.root)),
        }
        warn!("⚠ File CLEAR_ALL executed - removed {}", self.root.display());
        Ok(())
    }
}
