//! Bounded Map Module
//!
//! Order-preserving key-value storage with LRU eviction: HashMap storage
//! combined with an LRU tracker.

use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::LruTracker;
use crate::error::{CacheError, Result};

// == LRU Map ==
/// A size-bounded map that promotes entries on read and write and evicts
/// the least recently used entry when the bound is exceeded.
///
/// Recency is a strict total order, so the eviction candidate is always
/// unique and is never the key just written.
#[derive(Debug)]
pub struct LruMap<K, V> {
    /// Key-value storage
    entries: HashMap<K, V>,
    /// LRU access tracker
    order: LruTracker<K>,
    /// Maximum number of entries, None = unbounded
    max_entries: Option<usize>,
}

impl<K: Hash + Eq + Clone, V> LruMap<K, V> {
    // == Constructor ==
    /// Creates a map bounded to `max_entries` entries.
    ///
    /// `None` and `Some(0)` both mean unbounded.
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            order: LruTracker::new(),
            max_entries: max_entries.filter(|max| *max > 0),
        }
    }

    /// Creates an unbounded map.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    // == Contains ==
    /// True iff the key is present. Pure membership test: does not alter
    /// recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    // == Get ==
    /// Returns the stored value and promotes the key's recency on hit.
    /// A miss has no side effects.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.entries.contains_key(key) {
            self.order.touch(key);
        }
        self.entries.get(key)
    }

    // == Peek ==
    /// Returns the stored value without promoting recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    // == Lookup ==
    /// Strict form of [`get`](Self::get): `KeyNotFound` on miss.
    pub fn lookup(&mut self, key: &K) -> Result<&V> {
        self.get(key).ok_or(CacheError::KeyNotFound)
    }

    // == Insert ==
    /// Inserts or overwrites, always promoting the key to most recently
    /// used.
    ///
    /// If the post-insert size exceeds the bound, the least recently used
    /// entry is evicted and returned. The evicted entry is never the key
    /// just written, since that key was just promoted.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.entries.insert(key.clone(), value);
        self.order.touch(&key);

        if let Some(max) = self.max_entries {
            if self.entries.len() > max {
                if let Some(oldest) = self.order.evict_oldest() {
                    return self.entries.remove(&oldest).map(|evicted| (oldest, evicted));
                }
            }
        }
        None
    }

    // == Remove ==
    /// Removes an entry by key, returning its value if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.order.remove(key);
        Some(value)
    }

    // == Clear ==
    /// Removes all entries and resets the recency order.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    // == Iterate ==
    /// Iterates all live entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// Iterates keys by recency, least recently used first.
    pub fn keys_oldest_first(&self) -> impl Iterator<Item = &K> {
        self.order.iter_oldest_first()
    }

    /// The least recently used key, if any.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.peek_oldest()
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured bound, if any.
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }
}
