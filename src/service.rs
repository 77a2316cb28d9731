//! High-level lookup service for applications.
//!
//! Provides a convenient wrapper around LookupPipeline with Arc for easy sharing.

use crate::backend::{CacheBackend, FileBackend};
use crate::config::LookupConfig;
use crate::entity::BookMetadata;
use crate::error::{LookupError, Result};
use crate::memory::MemoryCache;
use crate::observability::{LookupMetrics, NoOpMetrics};
use crate::pipeline::{LookupPipeline, Resolution};
use crate::source::{FallbackSource, GoogleBooksSource, MetadataSource, OpenLibrarySource};
use crate::strategy::LookupStrategy;
use std::sync::Arc;

/// Open Library first, Google Books second.
pub type DefaultSource = FallbackSource<OpenLibrarySource, GoogleBooksSource>;

/// High-level lookup service.
///
/// Wraps `LookupPipeline` in `Arc` for easy sharing without requiring
/// external `Arc<Mutex<>>` wrappers. Both cache tiers synchronize internally,
/// so clones can look up concurrently.
///
/// # Example
///
/// ```no_run
/// use isbn_kit::{LookupConfig, LookupService};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = LookupService::from_config(&LookupConfig::from_env()?)?;
///
/// let book = service.lookup_by_isbn("978-0-13-468599-1").await?;
/// println!("{} by {}", book.title, book.authors.join(", "));
/// # Ok(())
/// # }
/// ```
pub struct LookupService<B: CacheBackend = FileBackend, S: MetadataSource = DefaultSource> {
    pipeline: Arc<LookupPipeline<B, S>>,
}

impl<B: CacheBackend, S: MetadataSource> Clone for LookupService<B, S> {
    fn clone(&self) -> Self {
        LookupService {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

impl LookupService {
    /// Build the standard service: file-backed durable tier under
    /// `config.cache_dir`, Open Library with Google Books as fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration does not validate or
    /// the HTTP client cannot be built.
    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        Self::from_config_with_metrics(config, Box::new(NoOpMetrics))
    }

    /// Like [`from_config`](Self::from_config), with a custom metrics handler.
    ///
    /// # Errors
    ///
    /// Same as [`from_config`](Self::from_config).
    pub fn from_config_with_metrics(
        config: &LookupConfig,
        metrics: Box<dyn LookupMetrics>,
    ) -> Result<Self> {
        config.validate()?;
        let client = config.http_client()?;

        let primary = OpenLibrarySource::new(client.clone(), config.open_library_url.as_str());
        let mut fallback = GoogleBooksSource::new(client, config.google_books_url.as_str());
        if let Some(key) = &config.google_books_api_key {
            fallback = fallback.with_api_key(key.as_str());
        }

        info!(
            "Book lookups cached under {} (memory capacity {})",
            config.cache_dir.display(),
            config.memory_capacity
        );

        let pipeline = LookupPipeline::new(
            FileBackend::new(&config.cache_dir),
            FallbackSource::new(primary, fallback),
        )
        .with_memory(MemoryCache::new(config.memory_capacity))
        .with_metrics(metrics);

        Ok(LookupService::new(pipeline))
    }
}

impl<B: CacheBackend, S: MetadataSource> LookupService<B, S> {
    /// Share an already assembled pipeline.
    pub fn new(pipeline: LookupPipeline<B, S>) -> Self {
        LookupService {
            pipeline: Arc::new(pipeline),
        }
    }

    /// See [`LookupPipeline::lookup_by_isbn`].
    ///
    /// # Errors
    ///
    /// `LookupError::InvalidIsbn` for unusable input, otherwise the fallback
    /// source's failure.
    pub async fn lookup_by_isbn(&self, raw: &str) -> std::result::Result<BookMetadata, LookupError> {
        self.pipeline.lookup_by_isbn(raw).await
    }

    /// See [`LookupPipeline::resolve`].
    ///
    /// # Errors
    ///
    /// Same as [`lookup_by_isbn`](Self::lookup_by_isbn), plus `NotFound` on a
    /// `CacheOnly` miss.
    pub async fn resolve(
        &self,
        raw: &str,
        strategy: LookupStrategy,
    ) -> std::result::Result<Resolution, LookupError> {
        self.pipeline.resolve(raw, strategy).await
    }

    /// See [`LookupPipeline::lookup_many`].
    pub async fn lookup_many<I, R>(
        &self,
        raws: I,
    ) -> Vec<std::result::Result<BookMetadata, LookupError>>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        self.pipeline.lookup_many(raws).await
    }

    /// Get reference to underlying pipeline (for advanced use).
    pub fn pipeline(&self) -> &LookupPipeline<B, S> {
        &self.pipeline
    }
}
