//! Response DTOs for the proxy's own endpoints

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of LRU evictions
    pub evictions: u64,
    /// Number of stored responses, overwrites included
    pub insertions: u64,
    /// Current number of cached responses
    pub total_entries: usize,
    /// Maximum number of cached responses
    pub capacity: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    /// Snapshot time in RFC 3339 format
    pub timestamp: String,
}

impl StatsResponse {
    /// Builds a snapshot from cache statistics.
    pub fn new(stats: &CacheStats, capacity: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            insertions: stats.insertions,
            total_entries: stats.total_entries,
            capacity,
            hit_rate: stats.hit_rate(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
