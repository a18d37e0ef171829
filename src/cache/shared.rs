//! Shared Response Cache
//!
//! Thread-safe cache handle injected into the forwarder.

use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore};
use crate::error::Result;

// == Response Cache Trait ==
/// Cache contract used by the forwarder.
///
/// `get` and `add` are each atomic. Nothing ties a miss, the fetch that
/// follows it and the later `add` together, so concurrent misses on the
/// same key may each fetch and store; the last `add` wins.
pub trait ResponseCache: Send + Sync {
    /// Returns the cached body for `key`, refreshing its recency.
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Stores `body` under `key`, evicting the least recently used entry
    /// when full. Returns the evicted key.
    fn add(&self, key: String, body: Bytes) -> Option<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn stats(&self) -> CacheStats;
}

// == LRU Response Cache ==
/// [`CacheStore`] behind a mutex.
///
/// The lock is only held inside a single call, never across I/O.
#[derive(Debug)]
pub struct LruResponseCache {
    store: Mutex<CacheStore>,
}

impl LruResponseCache {
    /// Fails with a configuration error when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            store: Mutex::new(CacheStore::new(capacity)?),
        })
    }

    /// Membership test without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    /// Cached keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys()
    }

    fn lock(&self) -> MutexGuard<'_, CacheStore> {
        // Poisoning only means another request panicked; entries are whole.
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ResponseCache for LruResponseCache {
    fn get(&self, key: &str) -> Option<Bytes> {
        self.lock().get(key)
    }

    fn add(&self, key: String, body: Bytes) -> Option<String> {
        let evicted = self.lock().add(key, body);
        if let Some(ref oldest) = evicted {
            debug!(key = %oldest, "Evicted least recently used cache entry");
        }
        evicted
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    fn stats(&self) -> CacheStats {
        self.lock().stats()
    }
}
