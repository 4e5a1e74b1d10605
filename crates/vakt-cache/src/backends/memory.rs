//! In-memory cache backend
//!
//! Entries live in a concurrent map with lazy TTL expiry: a read that
//! finds an expired entry removes it and reports a miss, so no
//! background sweep is needed for correctness. The entry count is
//! bounded; a put over the bound evicts the oldest-accessed entry first.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use crate::{CacheBackend, CacheConfig, CacheResult, CacheStats};

#[derive(Debug)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
    last_accessed: RwLock<Instant>,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            data,
            expires_at: ttl.map(|ttl| now + ttl),
            last_accessed: RwLock::new(now),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }

    fn access(&self) -> Vec<u8> {
        *self.last_accessed.write() = Instant::now();
        self.data.clone()
    }
}

/// Bounded in-memory backend
pub struct MemoryBackend {
    entries: DashMap<String, CacheEntry>,
    config: CacheConfig,
    stats: Arc<Mutex<CacheStats>>,
}

impl MemoryBackend {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            stats: Arc::new(Mutex::new(CacheStats::default())),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Drop expired entries, then the oldest-accessed entries until the
    /// bound holds again. The map stays small enough that a scan beats
    /// maintaining a separate recency index.
    fn evict_if_needed(&self) {
        let Some(max_entries) = self.config.max_entries else {
            return;
        };
        if self.entries.len() < max_entries {
            return;
        }

        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired())
            .map(|entry| entry.key().clone())
            .collect();
        for key in expired {
            self.entries.remove(&key);
        }

        while self.entries.len() >= max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| *entry.value().last_accessed.read())
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(key);
                self.stats.lock().misses += 1;
                return Ok(None);
            }

            let data = entry.access();
            self.stats.lock().hits += 1;
            Ok(Some(data))
        } else {
            self.stats.lock().misses += 1;
            Ok(None)
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
        self.evict_if_needed();
        let ttl = ttl.or(Some(self.config.default_ttl));
        self.entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn forget(&self, key: &str) -> CacheResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(key);
                return Ok(false);
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn flush(&self) -> CacheResult<()> {
        self.entries.clear();
        Ok(())
    }

    async fn stats(&self) -> CacheResult<CacheStats> {
        let stats = self.stats.lock();
        Ok(CacheStats {
            hits: stats.hits,
            misses: stats.misses,
            total_keys: self.entries.len() as u64,
        })
    }
}
