//! Memoizer Module
//!
//! Wraps a fallible asynchronous operation with argument-keyed result
//! caching: cache hits skip the operation, misses invoke it and store the
//! result, and a per-call bypass flag forces recomputation while keeping
//! the cache warm.

use std::future::Future;

use tracing::{debug, trace};

use crate::cache::{CacheStats, LruMap, TtlMap};
use crate::config::MemoConfig;
use crate::error::MemoError;
use crate::key::{CacheKey, CallArgs, KeyDeriver};

// == Backend ==
/// Storage behind one memoized operation: TTL-expiring when a TTL is
/// configured, plain LRU otherwise. Non-expiring mode bypasses the TTL
/// layer entirely since there is nothing to expire.
#[derive(Debug)]
enum Backend<T> {
    Plain(LruMap<CacheKey, T>),
    Expiring(TtlMap<CacheKey, T>),
}

impl<T> Backend<T> {
    fn from_config(config: &MemoConfig) -> Self {
        match config.ttl {
            Some(ttl) => Backend::Expiring(TtlMap::new(ttl, config.max_entries)),
            None => Backend::Plain(LruMap::new(config.max_entries)),
        }
    }

    fn get(&mut self, key: &CacheKey) -> Option<&T> {
        match self {
            Backend::Plain(map) => map.get(key),
            Backend::Expiring(map) => map.get(key),
        }
    }

    /// Returns true when the insert evicted an older entry.
    fn insert(&mut self, key: CacheKey, value: T) -> bool {
        match self {
            Backend::Plain(map) => map.insert(key, value).is_some(),
            Backend::Expiring(map) => map.insert(key, value).is_some(),
        }
    }

    fn clear(&mut self) {
        match self {
            Backend::Plain(map) => map.clear(),
            Backend::Expiring(map) => map.clear(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Backend::Plain(map) => map.len(),
            Backend::Expiring(map) => map.len(),
        }
    }
}

// == Memoizer ==
/// Entry point for memoization: holds the cache configuration and wraps
/// asynchronous operations.
///
/// ```
/// use memo_cache::{CallArgs, MemoConfig, Memoizer};
///
/// # tokio_test::block_on(async {
/// let mut doubled = Memoizer::new(MemoConfig::new().with_max_entries(128))
///     .wrap(|args: CallArgs| async move {
///         let n = args.pos(0).and_then(|v| v.as_i64()).unwrap_or(0);
///         Ok::<i64, std::convert::Infallible>(n * 2)
///     });
///
/// assert_eq!(doubled.call(CallArgs::new().arg(21)).await.unwrap(), 42);
/// // Second call with equal arguments is served from the cache
/// assert_eq!(doubled.call(CallArgs::new().arg(21)).await.unwrap(), 42);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Memoizer {
    config: MemoConfig,
}

impl Memoizer {
    // == Constructor ==
    /// Creates a memoizer that wraps operations with the given cache
    /// settings.
    pub fn new(config: MemoConfig) -> Self {
        Self { config }
    }

    /// The cache settings applied to wrapped operations.
    pub fn config(&self) -> &MemoConfig {
        &self.config
    }

    // == Wrap ==
    /// Wraps an asynchronous operation with its own cache instance.
    ///
    /// Each wrapped operation owns exactly one cache; keys derive only from
    /// that operation's arguments, so collisions across operations cannot
    /// occur.
    pub fn wrap<Op, Fut, T, E>(&self, op: Op) -> Memoized<Op, T>
    where
        Op: Fn(CallArgs) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Clone,
    {
        Memoized {
            op,
            deriver: KeyDeriver::new(self.config.skip_args),
            backend: Backend::from_config(&self.config),
            stats: CacheStats::new(),
        }
    }
}

// == Memoized Operation ==
/// An asynchronous operation wrapped with its own result cache.
///
/// The API takes `&mut self`: the cache is single-owner and its
/// bookkeeping runs synchronously between awaits. Hosts that share an
/// instance across tasks must wrap it in a lock; no deduplication is
/// provided between calls racing on the same key (both may invoke the
/// operation, last write wins).
#[derive(Debug)]
pub struct Memoized<Op, T> {
    /// The wrapped operation
    op: Op,
    /// Derives cache keys from call arguments
    deriver: KeyDeriver,
    /// Cached results
    backend: Backend<T>,
    /// Hit/miss/eviction accounting
    stats: CacheStats,
}

impl<Op, Fut, T, E> Memoized<Op, T>
where
    Op: Fn(CallArgs) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    T: Clone,
{
    // == Call ==
    /// Invokes the operation through the cache.
    ///
    /// Equivalent to [`call_with`](Self::call_with) with `use_cache = true`.
    pub async fn call(&mut self, args: CallArgs) -> Result<T, MemoError<E>> {
        self.call_with(args, true).await
    }

    // == Call With ==
    /// Invokes the operation, optionally bypassing the cache.
    ///
    /// With `use_cache = true`, a hit returns the cached value without
    /// invoking the operation; a miss invokes it, stores the result, and
    /// returns it. With `use_cache = false`, the operation always runs and
    /// its fresh result refreshes the cached entry, so callers can force
    /// recomputation while keeping the cache warm.
    ///
    /// Key derivation failures surface as [`MemoError::Cache`] before the
    /// operation is invoked. Operation failures surface as
    /// [`MemoError::Op`] and are never cached; the store happens strictly
    /// after successful completion, so a cancelled await leaves the cache
    /// unmodified.
    pub async fn call_with(
        &mut self,
        args: CallArgs,
        use_cache: bool,
    ) -> Result<T, MemoError<E>> {
        let key = self.deriver.derive(&args).map_err(MemoError::Cache)?;

        if use_cache {
            if let Some(value) = self.backend.get(&key) {
                let value = value.clone();
                self.stats.record_hit();
                trace!(?key, "cache hit");
                return Ok(value);
            }
            self.stats.record_miss();
            trace!(?key, "cache miss");
        } else {
            trace!(?key, "cache bypassed, recomputing");
        }

        let value = (self.op)(args).await.map_err(MemoError::Op)?;

        if self.backend.insert(key, value.clone()) {
            self.stats.record_eviction();
            debug!("evicted least recently used entry");
        }
        self.stats.set_entries(self.backend.len());

        Ok(value)
    }

    // == Clear Cache ==
    /// Removes all cached results and resets the statistics. Subsequent
    /// calls behave as if the cache were empty.
    pub fn clear_cache(&mut self) {
        self.backend.clear();
        self.stats = CacheStats::new();
        debug!("cache cleared");
    }

    // == Stats ==
    /// A snapshot of the cache's performance counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_entries(self.backend.len());
        stats
    }

    // == Length ==
    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.backend.len() == 0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::advance;

    use crate::error::CacheError;

    /// Doubles its first positional argument, counting invocations.
    fn doubling_op(
        calls: &Arc<AtomicUsize>,
    ) -> impl Fn(CallArgs) -> std::future::Ready<Result<i64, Infallible>> {
        let calls = Arc::clone(calls);
        move |args: CallArgs| {
            calls.fetch_add(1, Ordering::SeqCst);
            let n = args.pos(0).and_then(|v| v.as_i64()).unwrap_or(0);
            std::future::ready(Ok(n * 2))
        }
    }

    #[tokio::test]
    async fn test_second_call_is_a_hit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut memo = Memoizer::new(MemoConfig::default()).wrap(doubling_op(&calls));

        assert_eq!(memo.call(CallArgs::new().arg(21)).await.unwrap(), 42);
        assert_eq!(memo.call(CallArgs::new().arg(21)).await.unwrap(), 42);

        // The operation ran exactly once
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.stats().hits, 1);
        assert_eq!(memo.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_differing_args_miss() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut memo = Memoizer::new(MemoConfig::default()).wrap(doubling_op(&calls));

        memo.call(CallArgs::new().arg(1)).await.unwrap();
        memo.call(CallArgs::new().arg(2)).await.unwrap();
        memo.call(CallArgs::new().arg(1).named("flag", true))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_bypass_recomputes_and_refreshes() {
        let counter = Arc::new(AtomicUsize::new(0));
        let op = {
            let counter = Arc::clone(&counter);
            move |_args: CallArgs| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Ok::<usize, Infallible>(n))
            }
        };
        let mut memo = Memoizer::new(MemoConfig::default()).wrap(op);
        let args = || CallArgs::new().arg("k");

        // First call computes 0 and caches it
        assert_eq!(memo.call(args()).await.unwrap(), 0);
        assert_eq!(memo.call(args()).await.unwrap(), 0);

        // Bypass recomputes (1) and refreshes the entry
        assert_eq!(memo.call_with(args(), false).await.unwrap(), 1);

        // A cached call now sees the refreshed value without recomputing
        assert_eq!(memo.call(args()).await.unwrap(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_miss() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut memo = Memoizer::new(MemoConfig::default()).wrap(doubling_op(&calls));

        memo.call(CallArgs::new().arg(7)).await.unwrap();
        memo.clear_cache();
        memo.call(CallArgs::new().arg(7)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(memo.len() == 1);
    }

    #[tokio::test]
    async fn test_skip_args_ignores_leading_argument() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = MemoConfig::default().with_skip_args(1);
        let op = {
            let calls = Arc::clone(&calls);
            move |args: CallArgs| {
                calls.fetch_add(1, Ordering::SeqCst);
                let n = args.pos(1).and_then(|v| v.as_i64()).unwrap_or(0);
                std::future::ready(Ok::<i64, Infallible>(n))
            }
        };
        let mut memo = Memoizer::new(config).wrap(op);

        // Calls differ only in the skipped leading argument
        memo.call(CallArgs::new().arg("conn-1").arg(5)).await.unwrap();
        memo.call(CallArgs::new().arg("conn-2").arg(5)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lru_eviction_scenario() {
        // maxsize=2: insert a, b, c in order; a is evicted.
        // Read b, insert d; c is evicted.
        let calls = Arc::new(AtomicUsize::new(0));
        let config = MemoConfig::default().with_max_entries(2);
        let op = {
            let calls = Arc::clone(&calls);
            move |args: CallArgs| {
                calls.fetch_add(1, Ordering::SeqCst);
                let s = args.pos(0).and_then(|v| v.as_str()).unwrap_or("").to_string();
                std::future::ready(Ok::<String, Infallible>(s))
            }
        };
        let mut memo = Memoizer::new(config).wrap(op);
        let args = |k: &str| CallArgs::new().arg(k);

        memo.call(args("a")).await.unwrap();
        memo.call(args("b")).await.unwrap();
        memo.call(args("c")).await.unwrap();
        assert_eq!(memo.stats().evictions, 1);

        memo.call(args("b")).await.unwrap(); // hit, promotes b
        memo.call(args("d")).await.unwrap(); // evicts c
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        memo.call(args("b")).await.unwrap(); // still cached
        memo.call(args("d")).await.unwrap(); // still cached
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        memo.call(args("a")).await.unwrap(); // evicted earlier, recomputes
        memo.call(args("c")).await.unwrap(); // evicted earlier, recomputes
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry_reinvokes_operation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = MemoConfig::default().with_ttl(Duration::from_secs(5));
        let mut memo = Memoizer::new(config).wrap(doubling_op(&calls));

        memo.call(CallArgs::new().arg(3)).await.unwrap();

        advance(Duration::from_secs(3)).await;
        memo.call(CallArgs::new().arg(3)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1, "3s after write: hit");

        advance(Duration::from_secs(3)).await;
        memo.call(CallArgs::new().arg(3)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2, "6s after write: miss");
    }

    #[tokio::test]
    async fn test_operation_failure_is_not_cached() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let op = {
            let attempts = Arc::clone(&attempts);
            move |_args: CallArgs| {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                std::future::ready(if n == 0 {
                    Err("upstream unavailable".to_string())
                } else {
                    Ok(n)
                })
            }
        };
        let mut memo = Memoizer::new(MemoConfig::default()).wrap(op);
        let args = || CallArgs::new().arg("k");

        let err = memo.call(args()).await.unwrap_err();
        assert!(matches!(err, MemoError::Op(ref msg) if msg == "upstream unavailable"));
        assert!(memo.is_empty(), "failure must not be cached");

        // The retry invokes the operation again and caches the success
        assert_eq!(memo.call(args()).await.unwrap(), 1);
        assert_eq!(memo.call(args()).await.unwrap(), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_key_derivation_failure_skips_operation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut memo = Memoizer::new(MemoConfig::default()).wrap(doubling_op(&calls));

        let err = memo.call(CallArgs::new().arg(f64::NAN)).await.unwrap_err();
        assert!(matches!(
            err,
            MemoError::Cache(CacheError::KeyDerivation(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0, "operation must not run");
        assert!(memo.is_empty());

        // Bypass cannot dodge derivation either: the refresh needs a key
        let err = memo
            .call_with(CallArgs::new().arg(f64::NAN), false)
            .await
            .unwrap_err();
        assert!(matches!(err, MemoError::Cache(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stats_snapshot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut memo = Memoizer::new(MemoConfig::default()).wrap(doubling_op(&calls));

        memo.call(CallArgs::new().arg(1)).await.unwrap(); // miss
        memo.call(CallArgs::new().arg(1)).await.unwrap(); // hit
        memo.call(CallArgs::new().arg(2)).await.unwrap(); // miss
        memo.call_with(CallArgs::new().arg(2), false).await.unwrap(); // bypass

        let stats = memo.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.hit_rate(), 1.0 / 3.0);
    }
}
