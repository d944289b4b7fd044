//! Configuration Module
//!
//! Cache settings for a memoized operation, with builder-style
//! construction and optional loading from environment variables.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default size bound, matching a comfortably large working set.
const DEFAULT_MAX_ENTRIES: usize = 1024;

// == Memo Config ==
/// Cache configuration for one memoized operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoConfig {
    /// Maximum number of cached results, None = unbounded
    pub max_entries: Option<usize>,
    /// Time-to-live for cached results, None = non-expiring
    pub ttl: Option<Duration>,
    /// Leading positional arguments excluded from cache identity
    pub skip_args: usize,
}

impl MemoConfig {
    // == Constructor ==
    /// Creates the default configuration: 1024 entries, non-expiring,
    /// no skipped arguments.
    pub fn new() -> Self {
        Self::default()
    }

    // == Builders ==
    /// Bounds the cache to `max` entries.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Removes the size bound.
    pub fn unbounded(mut self) -> Self {
        self.max_entries = None;
        self
    }

    /// Expires cached results `ttl` after each write.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Disables time-based expiry.
    pub fn no_expiry(mut self) -> Self {
        self.ttl = None;
        self
    }

    /// Excludes the first `count` positional arguments from cache identity.
    pub fn with_skip_args(mut self, count: usize) -> Self {
        self.skip_args = count;
        self
    }

    // == From Environment ==
    /// Creates a MemoConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_MAX_ENTRIES` - Maximum cached results; 0 means unbounded
    ///   (default: 1024)
    /// - `MEMO_TTL_SECS` - Time-to-live in seconds; unset means
    ///   non-expiring (default: unset)
    /// - `MEMO_SKIP_ARGS` - Leading positional arguments to skip
    ///   (default: 0)
    pub fn from_env() -> Self {
        let max_entries = env::var("MEMO_MAX_ENTRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_ENTRIES);

        Self {
            max_entries: if max_entries == 0 {
                None
            } else {
                Some(max_entries)
            },
            ttl: env::var("MEMO_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
            skip_args: env::var("MEMO_SKIP_ARGS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            max_entries: Some(DEFAULT_MAX_ENTRIES),
            ttl: None,
            skip_args: 0,
        }
    }
}
