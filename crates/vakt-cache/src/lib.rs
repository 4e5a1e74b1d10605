//! # vakt-cache
//!
//! Best-effort response caching for the vakt pipeline. A [`CacheBackend`]
//! abstracts the store behind `lookup`/`store`-style operations so the
//! in-memory default can be swapped for an external keyed store without
//! touching call sites; every operation is fallible, and callers treat
//! any failure as a miss or a no-op. Caching is never load-bearing for
//! correctness.

pub mod backends;
pub mod config;
pub mod middleware;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use backends::memory::MemoryBackend;
pub use config::CacheConfig;
pub use middleware::response_cache::{
    CacheBypass, CachedResponse, KeyFn, ResponseCacheConfig, ResponseCacheMiddleware,
};

/// Cache operation errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Storage behind the response cache.
///
/// Implementations own TTL bookkeeping; expiry is evaluated lazily on
/// read, so a backend needs no background sweep to be correct.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a live value; expired entries read as absent
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store a value, overwriting any existing entry for the key
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()>;

    /// Remove one entry; returns whether it existed
    async fn forget(&self, key: &str) -> CacheResult<bool>;

    /// Whether a live entry exists
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Remove every entry
    async fn flush(&self) -> CacheResult<()>;

    /// Hit/miss counters, where the backend tracks them
    async fn stats(&self) -> CacheResult<CacheStats> {
        Ok(CacheStats::default())
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_keys: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}
