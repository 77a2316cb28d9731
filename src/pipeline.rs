//! Lookup pipeline - main entry point for ISBN lookups.

use crate::backend::CacheBackend;
use crate::entity::{BookMetadata, CacheEntity};
use crate::error::{Error, LookupError};
use crate::isbn::{normalize, Isbn};
use crate::key::CacheKeyBuilder;
use crate::memory::{MemoryCache, DEFAULT_MEMORY_CAPACITY};
use crate::observability::{CacheTier, LookupMetrics, NoOpMetrics};
use crate::source::MetadataSource;
use crate::strategy::LookupStrategy;
use futures::future::join_all;
use std::fmt;
use std::time::Instant;

/// Where a lookup result came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    Memory,
    Durable,
    /// Named metadata source, e.g. `"open-library"`.
    Source(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Memory => f.write_str("memory"),
            Origin::Durable => f.write_str("durable"),
            Origin::Source(name) => write!(f, "source:{}", name),
        }
    }
}

/// A resolved book and the tier or source that answered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub book: BookMetadata,
    pub origin: Origin,
}

/// Core lookup pipeline: memory tier, durable tier, then metadata sources.
///
/// The pipeline owns its tiers. Memory and durable writes happen only after a
/// successful source lookup; durable-tier failures are logged and absorbed,
/// never surfaced to the caller.
///
/// ```
/// use isbn_kit::backend::InMemoryBackend;
/// use isbn_kit::source::StaticSource;
/// use isbn_kit::{BookMetadata, LookupPipeline};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let isbn = "9780134685991".parse().unwrap();
/// let source = StaticSource::new("canned")
///     .with_book(BookMetadata::new(isbn, "Effective Java"));
/// let pipeline = LookupPipeline::new(InMemoryBackend::new(), source);
///
/// let book = pipeline.lookup_by_isbn("978-0-13-468599-1").await.unwrap();
/// assert_eq!(book.title, "Effective Java");
/// # }
/// ```
pub struct LookupPipeline<B: CacheBackend, S: MetadataSource> {
    memory: MemoryCache<BookMetadata>,
    backend: B,
    source: S,
    metrics: Box<dyn LookupMetrics>,
}

impl<B: CacheBackend, S: MetadataSource> LookupPipeline<B, S> {
    /// Create a pipeline with a default-sized memory tier.
    pub fn new(backend: B, source: S) -> Self {
        LookupPipeline {
            memory: MemoryCache::new(DEFAULT_MEMORY_CAPACITY),
            backend,
            source,
            metrics: Box::new(NoOpMetrics),
        }
    }

    /// Replace the memory tier.
    pub fn with_memory(mut self, memory: MemoryCache<BookMetadata>) -> Self {
        self.memory = memory;
        self
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn LookupMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Resolve a raw identifier with the default [`LookupStrategy::CacheFirst`].
    ///
    /// # Errors
    ///
    /// - `LookupError::InvalidIsbn`: `raw` does not normalize; nothing was touched
    /// - any other kind: the fallback source's failure after the primary failed
    pub async fn lookup_by_isbn(&self, raw: &str) -> Result<BookMetadata, LookupError> {
        self.resolve(raw, LookupStrategy::CacheFirst)
            .await
            .map(|resolution| resolution.book)
    }

    /// Resolve a raw identifier with an explicit strategy, reporting which
    /// tier or source answered.
    ///
    /// # Errors
    ///
    /// Same as [`lookup_by_isbn`](Self::lookup_by_isbn); additionally
    /// `LookupError::NotFound` for a [`LookupStrategy::CacheOnly`] miss.
    pub async fn resolve(
        &self,
        raw: &str,
        strategy: LookupStrategy,
    ) -> Result<Resolution, LookupError> {
        let timer = Instant::now();

        // Step 1: Normalize before touching any tier
        let isbn = normalize(raw).ok_or_else(|| {
            debug!("Rejected identifier {:?}", raw);
            LookupError::InvalidIsbn
        })?;
        let cache_key = CacheKeyBuilder::build::<BookMetadata>(&isbn);

        debug!(
            "» Lookup for key: {} (strategy: {})",
            cache_key, strategy
        );

        // Step 2: Cache tiers
        if strategy.reads_cache() {
            if let Some(book) = self.memory.get(&cache_key) {
                self.metrics
                    .record_cache_hit(CacheTier::Memory, &cache_key, timer.elapsed());
                return Ok(Resolution {
                    book,
                    origin: Origin::Memory,
                });
            }

            if let Some(book) = self.read_durable(&isbn, &cache_key).await {
                self.memory.put(&cache_key, book.clone());
                self.metrics
                    .record_cache_hit(CacheTier::Durable, &cache_key, timer.elapsed());
                return Ok(Resolution {
                    book,
                    origin: Origin::Durable,
                });
            }

            self.metrics.record_cache_miss(&cache_key, timer.elapsed());
        }

        if !strategy.uses_sources() {
            debug!("✗ Cache miss ({}) - no source lookup", strategy);
            return Err(LookupError::NotFound);
        }

        // Step 3: Metadata sources
        let sourced = match self.fetch(&isbn).await {
            Ok(sourced) => sourced,
            Err(e) => {
                self.metrics
                    .record_source_error(self.source.name(), &cache_key, &e.to_string());
                return Err(e);
            }
        };
        self.metrics
            .record_source_hit(&sourced.source, &cache_key, timer.elapsed());

        // Step 4: Warm both tiers
        self.store(&cache_key, &sourced.book).await;

        info!(
            "✓ Resolved {} via {} in {:?}",
            isbn,
            sourced.source,
            timer.elapsed()
        );
        Ok(Resolution {
            book: sourced.book,
            origin: Origin::Source(sourced.source),
        })
    }

    /// Look up several raw identifiers concurrently on the current task.
    ///
    /// Results are returned in input order. Identical identifiers are not
    /// deduplicated.
    pub async fn lookup_many<I, R>(&self, raws: I) -> Vec<Result<BookMetadata, LookupError>>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let lookups = raws
            .into_iter()
            .map(|raw| async move { self.lookup_by_isbn(raw.as_ref()).await });
        join_all(lookups).await
    }

    /// Get the memory tier (clones share its contents).
    pub fn memory(&self) -> &MemoryCache<BookMetadata> {
        &self.memory
    }

    /// Get backend reference (for advanced use).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get source reference.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Ask the sources, rejecting records no cache tier would accept.
    async fn fetch(&self, isbn: &Isbn) -> Result<crate::source::Sourced, LookupError> {
        let sourced = self.source.resolve(isbn).await?;
        if let Err(e) = sourced.book.validate() {
            warn!("{} returned an unusable record: {}", sourced.source, e);
            return Err(LookupError::NotFound);
        }
        Ok(sourced)
    }

    /// Read the durable tier. Errors, undecodable records, invalid records
    /// and records filed under another ISBN all read as absent.
    async fn read_durable(&self, isbn: &Isbn, cache_key: &str) -> Option<BookMetadata> {
        let bytes = match self.backend.get(cache_key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("Durable read failed for {}: {}", cache_key, e);
                self.metrics
                    .record_cache_error(CacheTier::Durable, cache_key, &e.to_string());
                return None;
            }
        };

        let decoded = BookMetadata::deserialize_from_cache(&bytes)
            .and_then(|book| book.validate().map(|()| book))
            .and_then(|book| {
                if book.isbn == *isbn {
                    Ok(book)
                } else {
                    Err(Error::ValidationError(format!(
                        "record holds {} instead of {}",
                        book.isbn, isbn
                    )))
                }
            });
        match decoded {
            Ok(book) => Some(book),
            Err(e) => {
                warn!("Discarding unreadable record {}: {}", cache_key, e);
                self.metrics
                    .record_cache_error(CacheTier::Durable, cache_key, &e.to_string());
                if let Err(e) = self.backend.delete(cache_key).await {
                    debug!("Could not delete {}: {}", cache_key, e);
                }
                None
            }
        }
    }

    /// Memory tier first, then the durable tier. A durable failure leaves the
    /// memory entry in place.
    async fn store(&self, cache_key: &str, book: &BookMetadata) {
        self.memory.put(cache_key, book.clone());

        let written = match book.serialize_for_cache() {
            Ok(bytes) => self.backend.set(cache_key, bytes).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!("Durable write failed for {}: {}", cache_key, e);
            self.metrics
                .record_cache_error(CacheTier::Durable, cache_key, &e.to_string());
        }
    }
}
