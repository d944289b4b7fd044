//! Expiring Map Module
//!
//! TTL expiry composed on top of the bounded LRU map: entries are stored
//! with their expiration instant and lazily deleted by the read path.

use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::cache::LruMap;
use crate::error::{CacheError, Result};

// == TTL Map ==
/// A bounded LRU map whose entries expire a fixed duration after each
/// write.
///
/// Expiration is lazy: an entry whose deadline has passed is treated as
/// absent by every read-path operation and removed as a side effect of
/// that read. The clock is [`tokio::time::Instant`], so tests can drive
/// expiry with a paused runtime clock instead of sleeping.
#[derive(Debug)]
pub struct TtlMap<K, V> {
    /// Values stored alongside their expiration instant
    inner: LruMap<K, (V, Instant)>,
    /// Fixed time-to-live applied at write time
    ttl: Duration,
}

impl<K: Hash + Eq + Clone, V> TtlMap<K, V> {
    // == Constructor ==
    /// Creates a map whose entries live for `ttl` after each write, bounded
    /// to `max_entries` entries (`None` or `Some(0)` = unbounded).
    pub fn new(ttl: Duration, max_entries: Option<usize>) -> Self {
        Self {
            inner: LruMap::new(max_entries),
            ttl,
        }
    }

    // == Insert ==
    /// Stores `(value, now() + ttl)`, inheriting the inner map's promotion
    /// and eviction. Overwriting a key resets its deadline.
    ///
    /// Returns the entry evicted by the size bound, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let expires_at = Instant::now() + self.ttl;
        self.inner
            .insert(key, (value, expires_at))
            .map(|(evicted_key, (evicted_value, _))| (evicted_key, evicted_value))
    }

    // == Contains ==
    /// True iff the key is present and not expired.
    ///
    /// An expired entry is deleted by this check, hence `&mut`.
    pub fn contains_key(&mut self, key: &K) -> bool {
        if self.remove_if_expired(key) {
            return false;
        }
        self.inner.contains_key(key)
    }

    // == Get ==
    /// Returns the live value and promotes its recency; an expired entry is
    /// deleted and reported as a miss.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.remove_if_expired(key) {
            return None;
        }
        self.inner.get(key).map(|(value, _)| value)
    }

    // == Lookup ==
    /// Strict form of [`get`](Self::get): `KeyNotFound` on miss or expiry.
    pub fn lookup(&mut self, key: &K) -> Result<&V> {
        self.get(key).ok_or(CacheError::KeyNotFound)
    }

    // == Remove ==
    /// Removes an entry by key regardless of expiry, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key).map(|(value, _)| value)
    }

    // == Remove Expired ==
    /// Sweeps out every expired entry.
    ///
    /// Lazy deletion already keeps the read path correct; this is for hosts
    /// that want to reclaim memory for entries that are never read again.
    /// Returns the number of entries removed.
    pub fn remove_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<K> = self
            .inner
            .iter()
            .filter(|(_, entry)| entry.1 <= now)
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in &expired_keys {
            self.inner.remove(key);
        }

        if count > 0 {
            trace!(count, "swept expired entries");
        }
        count
    }

    // == Clear ==
    /// Removes all entries.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    // == Length ==
    /// Number of stored entries, counting expired ones not yet deleted.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Expiry Check ==
    /// Deletes the entry if its deadline has passed. The deadline is
    /// compared against a fresh `now()`; an entry expires at exactly
    /// `expires_at`, not after it.
    fn remove_if_expired(&mut self, key: &K) -> bool {
        let expired = match self.inner.peek(key) {
            Some((_, expires_at)) => *expires_at <= Instant::now(),
            None => false,
        };
        if expired {
            self.inner.remove(key);
            trace!("lazily removed expired entry on read");
        }
        expired
    }
}
