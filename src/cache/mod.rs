//! Cache Module
//!
//! Bounded in-memory response cache with LRU eviction, keyed by resolved
//! target URL.

mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use lru::LruTracker;
pub use shared::{LruResponseCache, ResponseCache};
pub use stats::CacheStats;
pub use store::CacheStore;
