//! Memo Cache - An in-process async memoization cache
//!
//! Wraps fallible asynchronous operations with argument-keyed result
//! caching, bounded by LRU eviction and optionally expired by TTL.

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod memo;

pub use cache::{CacheStats, LruMap, TtlMap};
pub use config::MemoConfig;
pub use error::{CacheError, MemoError, Result};
pub use key::{ArgValue, CacheKey, CallArgs, KeyDeriver};
pub use memo::{Memoized, Memoizer};
