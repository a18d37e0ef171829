//! Cache Store Module
//!
//! Bounded map from resolved target URL to response body bytes, with
//! least-recently-used eviction.

use std::collections::HashMap;

use bytes::Bytes;

use crate::cache::{CacheStats, LruTracker};
use crate::error::{ProxyError, Result};

// == Cache Store ==
/// Single-threaded cache engine. Wrap it in a lock to share it.
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, Bytes>,
    lru: LruTracker,
    stats: CacheStats,
    capacity: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store holding at most `capacity` bodies.
    ///
    /// A zero capacity is a configuration error.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ProxyError::Configuration(
                "cache capacity must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            entries: HashMap::with_capacity(capacity),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            capacity,
        })
    }

    // == Add ==
    /// Inserts or overwrites `key`, refreshing its recency.
    ///
    /// Returns the key evicted to make room, if any.
    pub fn add(&mut self, key: String, body: Bytes) -> Option<String> {
        let mut evicted = None;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(oldest) = self.lru.evict_oldest() {
                self.entries.remove(&oldest);
                self.stats.record_eviction();
                evicted = Some(oldest);
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, body);
        self.stats.record_insertion();
        self.stats.set_total_entries(self.entries.len());

        evicted
    }

    // == Get ==
    /// Looks up `key`, refreshing its recency on a hit.
    pub fn get(&mut self, key: &str) -> Option<Bytes> {
        match self.entries.get(key) {
            Some(body) => {
                let body = body.clone();
                self.lru.touch(key);
                self.stats.record_hit();
                Some(body)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// Membership test that leaves recency and stats untouched.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Keys ==
    /// Cached keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.lru.keys_oldest_first().cloned().collect()
    }

    // == Stats ==
    /// Returns a snapshot of the counters with the current entry count.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of cached bodies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Capacity ==
    /// Returns the maximum number of cached bodies.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
