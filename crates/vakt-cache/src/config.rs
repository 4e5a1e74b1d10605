//! Cache backend configuration

use std::time::Duration;

/// Memory backend configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entry count bound; the oldest-accessed entry is evicted when a
    /// put would exceed it. `None` means unbounded.
    pub max_entries: Option<usize>,
    /// TTL applied when a put passes none
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: Some(10_000),
            default_ttl: Duration::from_secs(300),
        }
    }
}

impl CacheConfig {
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
}
