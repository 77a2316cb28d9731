//! Lookup configuration.

use crate::error::{Error, Result};
use crate::memory::DEFAULT_MEMORY_CAPACITY;
use crate::source::google_books::GOOGLE_BOOKS_BASE_URL;
use crate::source::open_library::OPEN_LIBRARY_BASE_URL;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = concat!("isbn-kit/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const CACHE_DIR_NAME: &str = "isbn-kit";

/// Configuration for a [`LookupService`](crate::service::LookupService).
#[derive(Clone, Debug)]
pub struct LookupConfig {
    /// Base URL of the Open Library API.
    pub open_library_url: String,
    /// Base URL of the Google Books API.
    pub google_books_url: String,
    /// Optional Google Books API key.
    pub google_books_api_key: Option<String>,
    /// Root directory of the durable tier.
    pub cache_dir: PathBuf,
    /// Number of records kept in the memory tier.
    pub memory_capacity: u64,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout: Duration,
    /// User-Agent header sent to both providers.
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            open_library_url: OPEN_LIBRARY_BASE_URL.to_string(),
            google_books_url: GOOGLE_BOOKS_BASE_URL.to_string(),
            google_books_api_key: None,
            cache_dir: default_cache_dir(),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            request_timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Platform cache directory, or the temp directory when there is none.
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CACHE_DIR_NAME)
}

impl LookupConfig {
    /// Defaults overridden by environment variables:
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `ISBN_KIT_CACHE_DIR` | `cache_dir` |
    /// | `ISBN_KIT_MEMORY_CAPACITY` | `memory_capacity` |
    /// | `ISBN_KIT_TIMEOUT_SECS` | `request_timeout` |
    /// | `ISBN_KIT_USER_AGENT` | `user_agent` |
    /// | `ISBN_KIT_OPEN_LIBRARY_URL` | `open_library_url` |
    /// | `ISBN_KIT_GOOGLE_BOOKS_URL` | `google_books_url` |
    /// | `ISBN_KIT_GOOGLE_BOOKS_KEY` | `google_books_api_key` |
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `var`.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if a numeric variable does not parse.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = var("ISBN_KIT_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(capacity) = var("ISBN_KIT_MEMORY_CAPACITY") {
            config.memory_capacity = parse_number("ISBN_KIT_MEMORY_CAPACITY", &capacity)?;
        }
        if let Some(secs) = var("ISBN_KIT_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_number("ISBN_KIT_TIMEOUT_SECS", &secs)?);
        }
        if let Some(agent) = var("ISBN_KIT_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(url) = var("ISBN_KIT_OPEN_LIBRARY_URL") {
            config.open_library_url = url;
        }
        if let Some(url) = var("ISBN_KIT_GOOGLE_BOOKS_URL") {
            config.google_books_url = url;
        }
        if let Some(key) = var("ISBN_KIT_GOOGLE_BOOKS_KEY").filter(|k| !k.is_empty()) {
            config.google_books_api_key = Some(key);
        }

        Ok(config)
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_memory_capacity(mut self, capacity: u64) -> Self {
        self.memory_capacity = capacity;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn with_open_library_url(mut self, url: impl Into<String>) -> Self {
        self.open_library_url = url.into();
        self
    }

    pub fn with_google_books_url(mut self, url: impl Into<String>) -> Self {
        self.google_books_url = url.into();
        self
    }

    pub fn with_google_books_api_key(mut self, key: impl Into<String>) -> Self {
        self.google_books_api_key = Some(key.into());
        self
    }

    /// Check the configuration for values no lookup could work with.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.memory_capacity == 0 {
            return Err(Error::ConfigError(
                "memory_capacity must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::ConfigError(
                "request_timeout must be positive".to_string(),
            ));
        }
        for (field, url) in [
            ("open_library_url", &self.open_library_url),
            ("google_books_url", &self.google_books_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(Error::ConfigError(format!(
                    "{} must be an http(s) URL, got {:?}",
                    field, url
                )));
            }
        }
        if self.cache_dir.as_os_str().is_empty() {
            return Err(Error::ConfigError("cache_dir must not be empty".to_string()));
        }
        Ok(())
    }

    /// HTTP client shared by both sources.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if the client cannot be built.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("failed to build HTTP client: {}", e)))
    }
}

fn parse_number<N: std::str::FromStr>(name: &str, value: &str) -> Result<N> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::ConfigError(format!("{} is not a number: {:?}", name, value)))
}
