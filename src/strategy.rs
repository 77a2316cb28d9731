//! Lookup strategies.
//!
//! | Strategy | Cache hit | Cache miss | Use case |
//! |----------|-----------|------------|----------|
//! | **CacheFirst** | Return | Ask sources, warm caches | Default |
//! | **CacheOnly** | Return | `NotFound`, no network | Offline mode |
//! | **Refresh** | Ignored | Ask sources, overwrite caches | User asked to re-fetch |
//!
//! ```
//! use isbn_kit::strategy::LookupStrategy;
//!
//! assert_eq!(LookupStrategy::default(), LookupStrategy::CacheFirst);
//! ```

/// Strategy enum controlling which tiers a lookup consults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LookupStrategy {
    /// Memory tier, then durable tier, then metadata sources.
    ///
    /// Flow:
    /// 1. Check memory; return on hit
    /// 2. Check durable storage; promote to memory and return on hit
    /// 3. Ask the sources
    /// 4. Store the result in both tiers
    #[default]
    CacheFirst,

    /// Cache tiers only. A miss is `LookupError::NotFound` and no request is
    /// sent.
    CacheOnly,

    /// Skip cache reads and ask the sources; a success overwrites both tiers.
    ///
    /// On failure the cached record, if any, is left untouched.
    Refresh,
}

impl LookupStrategy {
    pub(crate) fn reads_cache(&self) -> bool {
        !matches!(self, LookupStrategy::Refresh)
    }

    pub(crate) fn uses_sources(&self) -> bool {
        !matches!(self, LookupStrategy::CacheOnly)
    }
}

impl std::fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupStrategy::CacheFirst => write!(f, "CacheFirst"),
            LookupStrategy::CacheOnly => write!(f, "CacheOnly"),
            LookupStrategy::Refresh => write!(f, "Refresh"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_display() {
        assert_eq!(LookupStrategy::CacheFirst.to_string(), "CacheFirst");
        assert_eq!(LookupStrategy::CacheOnly.to_string(), "CacheOnly");
        assert_eq!(LookupStrategy::Refresh.to_string(), "Refresh");
    }

    #[test]
    fn test_strategy_default() {
        assert_eq!(LookupStrategy::default(), LookupStrategy::CacheFirst);
    }

    #[test]
    fn test_strategy_tiers() {
        assert!(LookupStrategy::CacheFirst.reads_cache());
        assert!(LookupStrategy::CacheFirst.uses_sources());
        assert!(LookupStrategy::CacheOnly.reads_cache());
        assert!(!LookupStrategy::CacheOnly.uses_sources());
        assert!(!LookupStrategy::Refresh.reads_cache());
        assert!(LookupStrategy::Refresh.uses_sources());
    }
}
