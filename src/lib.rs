//! # isbn-kit
//!
//! ISBN normalization and a resilient, cache-first book metadata lookup.
//!
//! ## Features
//!
//! - **Normalizer:** ISBN-10 and ISBN-13 validation, hyphen/space stripping,
//!   ISBN-10 to ISBN-13 conversion ([`isbn::normalize`], [`isbn::is_valid`])
//! - **Two cache tiers:** bounded LRU memory tier in front of a durable,
//!   file-per-key tier that survives restarts
//! - **Two metadata sources:** Open Library, falling back to Google Books on
//!   any failure
//! - **Typed failures:** every lookup ends in a [`BookMetadata`] or one
//!   [`LookupError`] kind
//! - **Observable:** logging through the `log` facade, metrics hooks via
//!   [`observability::LookupMetrics`]
//!
//! ## Quick Start
//!
//! Use [`LookupService`] for the standard setup:
//!
//! ```no_run
//! use isbn_kit::{LookupConfig, LookupError, LookupService};
//!
//! # #[tokio::main]
//! # async fn main() -> isbn_kit::Result<()> {
//! let service = LookupService::from_config(&LookupConfig::default())?;
//!
//! match service.lookup_by_isbn("0-306-40615-2").await {
//!     Ok(book) => println!("{} ({})", book.title, book.isbn),
//!     Err(LookupError::InvalidIsbn) => println!("that is not an ISBN"),
//!     Err(LookupError::NotFound) => println!("no catalog knows this book"),
//!     Err(LookupError::RateLimited) => println!("slow down"),
//!     Err(e) => println!("lookup failed: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Custom tiers and sources
//!
//! Use [`LookupPipeline`] for explicit control:
//!
//! ```
//! use isbn_kit::backend::InMemoryBackend;
//! use isbn_kit::source::StaticSource;
//! use isbn_kit::{LookupPipeline, LookupStrategy};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pipeline = LookupPipeline::new(InMemoryBackend::new(), StaticSource::new("empty"));
//!
//! let offline = pipeline
//!     .resolve("9780134685991", LookupStrategy::CacheOnly)
//!     .await;
//! assert!(offline.is_err());
//! # }
//! ```

#[macro_use]
extern crate log;

pub mod backend;
pub mod config;
pub mod entity;
pub mod error;
pub mod isbn;
pub mod key;
pub mod memory;
pub mod observability;
pub mod pipeline;
pub mod serialization;
pub mod service;
pub mod source;
pub mod strategy;

// Re-exports for convenience
pub use backend::CacheBackend;
pub use config::LookupConfig;
pub use entity::{BookMetadata, CacheEntity};
pub use error::{Error, LookupError, Result};
pub use isbn::{is_valid, normalize, Isbn};
pub use pipeline::{LookupPipeline, Origin, Resolution};
pub use service::LookupService;
pub use source::MetadataSource;
pub use strategy::LookupStrategy;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
