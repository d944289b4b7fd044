//! Error types for the memoization cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the cache containers and key derivation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not present (or expired) on a strict lookup
    #[error("key not found in cache")]
    KeyNotFound,

    /// Call arguments could not be turned into a cache key
    #[error("cannot derive cache key: {0}")]
    KeyDerivation(String),
}

// == Memoized Call Error ==
/// Error surfaced by a memoized call: either the cache rejected the call's
/// arguments, or the wrapped operation itself failed.
///
/// Operation failures are propagated unchanged and are never cached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoError<E> {
    /// The call's arguments could not form a cache key
    #[error("cache error: {0}")]
    Cache(CacheError),

    /// The wrapped operation failed
    #[error("operation failed: {0}")]
    Op(E),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
