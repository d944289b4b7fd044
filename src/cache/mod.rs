//! Cache Containers Module
//!
//! Provides the in-memory containers behind memoization: an LRU-bounded
//! ordered map and a TTL-expiring map composed on top of it.

mod bounded;
mod expiring;
mod lru;
mod stats;


// Re-export public types
pub use bounded::LruMap;
pub use expiring::TtlMap;
pub use lru::LruTracker;
pub use stats::CacheStats;
