//! Metadata sources: remote catalogs that resolve an ISBN to book metadata.
//!
//! Two HTTP providers are built in, [`OpenLibrarySource`] and
//! [`GoogleBooksSource`]. [`FallbackSource`] composes two sources in a fixed
//! priority order, and [`StaticSource`] serves canned outcomes for tests.
//!
//! # Implementing MetadataSource
//!
//! A source issues at most one request per lookup and reports every failure
//! as a [`LookupError`]; it never panics across the boundary:
//!
//! - transport failure → `Network`
//! - HTTP 429 → `RateLimited`
//! - other non-success status → `Network("HTTP <code>")`
//! - unparseable body → `Decoding`
//! - no record, or a record without a title → `NotFound`

use crate::entity::{BookMetadata, CacheEntity};
use crate::error::LookupError;
use crate::isbn::Isbn;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub mod google_books;
mod http;
pub mod open_library;

pub use google_books::GoogleBooksSource;
pub use open_library::OpenLibrarySource;

/// A book that a source resolved, with the name of the source that answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced {
    pub book: BookMetadata,
    pub source: String,
}

/// Trait for metadata source implementations.
///
/// Mirrors the lookup contract of the pipeline but takes an already
/// normalized [`Isbn`], so sources never see invalid identifiers.
#[allow(async_fn_in_trait)]
pub trait MetadataSource: Send + Sync {
    /// Short identifier used in logs and metrics, e.g. `"open-library"`.
    fn name(&self) -> &str;

    /// Resolve an ISBN.
    ///
    /// # Errors
    /// Any [`LookupError`] kind except `InvalidIsbn`.
    async fn lookup(&self, isbn: &Isbn) -> Result<BookMetadata, LookupError>;

    /// Resolve an ISBN and report which source answered.
    ///
    /// A record that would not pass [`CacheEntity::validate`] is this source's
    /// `NotFound`, so a composite moves on to its next member. Composite
    /// sources override this to name the member that succeeded.
    async fn resolve(&self, isbn: &Isbn) -> Result<Sourced, LookupError> {
        let book = self.lookup(isbn).await?;
        if let Err(e) = book.validate() {
            warn!("{} returned an unusable record: {}", self.name(), e);
            return Err(LookupError::NotFound);
        }
        Ok(Sourced {
            book,
            source: self.name().to_string(),
        })
    }
}

/// Primary source with a fallback, tried in that fixed order.
///
/// The fallback runs after *any* primary failure, including `RateLimited`,
/// which only describes the primary. When both fail, the fallback's error is
/// returned unchanged. There is no retry beyond the single fallback attempt.
pub struct FallbackSource<P: MetadataSource, F: MetadataSource> {
    primary: P,
    fallback: F,
    name: String,
}

impl<P: MetadataSource, F: MetadataSource> FallbackSource<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        let name = format!("{}+{}", primary.name(), fallback.name());
        FallbackSource {
            primary,
            fallback,
            name,
        }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<P: MetadataSource, F: MetadataSource> MetadataSource for FallbackSource<P, F> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, isbn: &Isbn) -> Result<BookMetadata, LookupError> {
        self.resolve(isbn).await.map(|sourced| sourced.book)
    }

    async fn resolve(&self, isbn: &Isbn) -> Result<Sourced, LookupError> {
        match self.primary.resolve(isbn).await {
            Ok(sourced) => Ok(sourced),
            Err(primary_err) => {
                warn!(
                    "{} failed for {}: {}; trying {}",
                    self.primary.name(),
                    isbn,
                    primary_err,
                    self.fallback.name()
                );
                self.fallback.resolve(isbn).await
            }
        }
    }
}

/// Source with canned per-ISBN outcomes.
///
/// Counts every call, which makes "the network was not touched" assertions
/// straightforward. ISBNs without a canned outcome get the default outcome,
/// `NotFound` unless changed with [`StaticSource::failing_with`].
///
/// ```
/// use isbn_kit::source::{MetadataSource, StaticSource};
/// use isbn_kit::{BookMetadata, LookupError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let isbn = "9780134685991".parse().unwrap();
/// let source = StaticSource::new("canned")
///     .with_book(BookMetadata::new(isbn, "Effective Java"));
///
/// let other = "9780306406157".parse().unwrap();
/// assert_eq!(source.lookup(&other).await, Err(LookupError::NotFound));
/// assert_eq!(source.calls(), 1);
/// # }
/// ```
pub struct StaticSource {
    name: String,
    outcomes: HashMap<Isbn, Result<BookMetadata, LookupError>>,
    default_outcome: LookupError,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: impl Into<String>) -> Self {
        StaticSource {
            name: name.into(),
            outcomes: HashMap::new(),
            default_outcome: LookupError::NotFound,
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve `book` for its own ISBN.
    pub fn with_book(mut self, book: BookMetadata) -> Self {
        self.outcomes.insert(book.isbn.clone(), Ok(book));
        self
    }

    /// Fail lookups of `isbn` with `error`.
    pub fn with_failure(mut self, isbn: Isbn, error: LookupError) -> Self {
        self.outcomes.insert(isbn, Err(error));
        self
    }

    /// Fail every ISBN without a canned outcome with `error`.
    pub fn failing_with(mut self, error: LookupError) -> Self {
        self.default_outcome = error;
        self
    }

    /// Number of lookups served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetadataSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, isbn: &Isbn) -> Result<BookMetadata, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcomes.get(isbn) {
            Some(outcome) => outcome.clone(),
            None => Err(self.default_outcome.clone()),
        }
    }
}

impl<S: MetadataSource> MetadataSource for std::sync::Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn lookup(&self, isbn: &Isbn) -> Result<BookMetadata, LookupError> {
        (**self).lookup(isbn).await
    }

    async fn resolve(&self, isbn: &Isbn) -> Result<Sourced, LookupError> {
        (**self).resolve(isbn).await
    }
}

/// Upgrade an `http://` or protocol-relative URL to `https://`.
pub(crate) fn secure_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("http://") {
        format!("https://{}", rest)
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        url.to_string()
    }
}

/// Trimmed, non-empty text.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn isbn(s: &str) -> Isbn {
        s.parse().expect("valid ISBN")
    }

    fn book() -> BookMetadata {
        BookMetadata::new(isbn("9780134685991"), "Effective Java")
    }

    #[tokio::test]
    async fn test_static_source_outcomes() {
        let source = StaticSource::new("canned")
            .with_book(book())
            .with_failure(isbn("9780306406157"), LookupError::RateLimited);

        assert_eq!(source.lookup(&isbn("9780134685991")).await, Ok(book()));
        assert_eq!(
            source.lookup(&isbn("9780306406157")).await,
            Err(LookupError::RateLimited)
        );
        assert_eq!(
            source.lookup(&isbn("9780804429573")).await,
            Err(LookupError::NotFound)
        );
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_fallback_not_called_when_primary_succeeds() {
        let primary = Arc::new(StaticSource::new("primary").with_book(book()));
        let fallback = Arc::new(StaticSource::new("fallback"));
        let chain = FallbackSource::new(Arc::clone(&primary), Arc::clone(&fallback));

        let sourced = chain.resolve(&isbn("9780134685991")).await.unwrap();
        assert_eq!(sourced.book, book());
        assert_eq!(sourced.source, "primary");
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_fallback_after_each_primary_failure_kind() {
        let failures = [
            LookupError::NotFound,
            LookupError::RateLimited,
            LookupError::Network("connection reset".to_string()),
            LookupError::Decoding("expected object".to_string()),
        ];

        for failure in failures {
            let primary = StaticSource::new("primary").failing_with(failure.clone());
            let fallback = Arc::new(StaticSource::new("fallback").with_book(book()));
            let chain = FallbackSource::new(primary, Arc::clone(&fallback));

            let sourced = chain.resolve(&isbn("9780134685991")).await;
            assert_eq!(
                sourced.map(|s| s.source),
                Ok("fallback".to_string()),
                "primary failure {:?} should fall back",
                failure
            );
            assert_eq!(fallback.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_fallback_error_wins_when_both_fail() {
        let primary = StaticSource::new("primary").failing_with(LookupError::RateLimited);
        let fallback = StaticSource::new("fallback")
            .failing_with(LookupError::Network("timed out".to_string()));
        let chain = FallbackSource::new(primary, fallback);

        assert_eq!(chain.name(), "primary+fallback");
        assert_eq!(
            chain.lookup(&isbn("9780134685991")).await,
            Err(LookupError::Network("timed out".to_string()))
        );
    }

    #[tokio::test]
    async fn test_untitled_record_is_not_found() {
        let source = StaticSource::new("sloppy")
            .with_book(BookMetadata::new(isbn("9780134685991"), "   "));

        assert_eq!(
            source.resolve(&isbn("9780134685991")).await,
            Err(LookupError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_untitled_primary_record_falls_back() {
        let primary = Arc::new(
            StaticSource::new("primary").with_book(BookMetadata::new(isbn("9780134685991"), "")),
        );
        let fallback = Arc::new(StaticSource::new("fallback").with_book(book()));
        let chain = FallbackSource::new(Arc::clone(&primary), Arc::clone(&fallback));

        let sourced = chain.resolve(&isbn("9780134685991")).await;

        assert_eq!(
            sourced,
            Ok(Sourced {
                book: book(),
                source: "fallback".to_string(),
            })
        );
        assert_eq!((primary.calls(), fallback.calls()), (1, 1));
    }

    #[test]
    fn test_secure_url() {
        assert_eq!(
            secure_url("http://books.google.com/content?id=1"),
            "https://books.google.com/content?id=1"
        );
        assert_eq!(
            secure_url("//covers.openlibrary.org/b/id/1-L.jpg"),
            "https://covers.openlibrary.org/b/id/1-L.jpg"
        );
        assert_eq!(secure_url("https://example.org/a.jpg"), "https://example.org/a.jpg");
    }
}
