//! Per-instance concurrency envelope for policy cores.
//!
//! Policy cores are single-threaded by design; this wrapper supplies
//! the locking discipline: every operation acquires the instance's
//! exclusive mutex before touching internal state and releases it on
//! every exit path. Operations on one wrapped instance are therefore
//! linearizable — their observable effects correspond to some serial
//! order consistent with real time.
//!
//! For the adaptive composition this single top-level mutex is also the
//! whole locking story: the two halves inside
//! [`ArcCache`](crate::policy::arc::ArcCache) carry no locks of their
//! own, so the ghost-transfer step and the main-path step of one
//! operation are atomic together.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use evictkit::concurrent::ConcurrentLruCache;
//! use evictkit::policy::lru::LruCache;
//!
//! let cache: Arc<ConcurrentLruCache<u64, String>> =
//!     Arc::new(ConcurrentLruCache::new(LruCache::new(100)));
//!
//! let writer = cache.clone();
//! thread::spawn(move || {
//!     writer.put(1, "one".to_string());
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(cache.get(&1), Some("one".to_string()));
//! ```

use parking_lot::Mutex;
use std::marker::PhantomData;

use crate::policy::arc::ArcCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LrukCache;
use crate::traits::{CachePolicy, ConcurrentPolicy};

/// Mutex envelope turning any policy core into a shareable instance.
///
/// The `K`/`V` parameters pin down which `CachePolicy` impl of `P` the
/// wrapper speaks; they carry no data.
#[derive(Debug)]
pub struct ConcurrentCache<K, V, P>
where
    P: CachePolicy<K, V>,
{
    inner: Mutex<P>,
    _marker: PhantomData<fn(K, V) -> (K, V)>,
}

/// Thread-safe LRU instance.
pub type ConcurrentLruCache<K, V> = ConcurrentCache<K, V, LruCache<K, V>>;
/// Thread-safe LFU instance.
pub type ConcurrentLfuCache<K, V> = ConcurrentCache<K, V, LfuCache<K, V>>;
/// Thread-safe LRU-K instance.
pub type ConcurrentLrukCache<K, V> = ConcurrentCache<K, V, LrukCache<K, V>>;
/// Thread-safe adaptive instance; the single mutex here is the locking
/// discipline for both halves.
pub type ConcurrentArcCache<K, V> = ConcurrentCache<K, V, ArcCache<K, V>>;

impl<K, V, P> ConcurrentCache<K, V, P>
where
    P: CachePolicy<K, V>,
{
    /// Wraps a policy core.
    pub fn new(policy: P) -> Self {
        Self {
            inner: Mutex::new(policy),
            _marker: PhantomData,
        }
    }

    /// Inserts or overwrites under the instance lock.
    pub fn put(&self, key: K, value: V) -> bool {
        self.inner.lock().put(key, value)
    }

    /// Looks a key up under the instance lock.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
    }

    /// Probes for a key without policy side effects.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if no entries are live.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the current capacity.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    /// Runs `f` on the locked core; the lock spans the whole closure.
    ///
    /// This is the escape hatch to policy-specific operations:
    ///
    /// ```
    /// use evictkit::concurrent::ConcurrentLruCache;
    /// use evictkit::policy::lru::LruCache;
    ///
    /// let cache: ConcurrentLruCache<u32, &str> =
    ///     ConcurrentLruCache::new(LruCache::new(10));
    /// cache.put(1, "one");
    /// assert_eq!(cache.with_mut(|lru| lru.remove(&1)), Some("one"));
    /// ```
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Runs `f` on a shared view of the locked core.
    pub fn with<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.inner.lock())
    }
}

impl<K, V, P> ConcurrentPolicy for ConcurrentCache<K, V, P> where P: CachePolicy<K, V> + Send {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn basic_ops_through_the_lock() {
        let cache: ConcurrentLruCache<u32, String> = ConcurrentCache::new(LruCache::new(4));
        assert!(cache.put(1, "one".to_string()));
        assert_eq!(cache.get(&1), Some("one".to_string()));
        assert!(cache.contains(&1));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn with_mut_reaches_policy_specific_ops() {
        let cache: ConcurrentLfuCache<u32, u32> =
            ConcurrentCache::new(LfuCache::new(4, 1_000_000));
        cache.put(1, 10);
        cache.get(&1);
        assert_eq!(cache.with(|lfu| lfu.frequency(&1)), Some(2));
        cache.with_mut(|lfu| lfu.purge());
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let cache: Arc<ConcurrentLruCache<u64, u64>> =
            Arc::new(ConcurrentCache::new(LruCache::new(128)));

        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..32 {
                        cache.put(t * 100 + i, i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 128);
        for t in 0..4u64 {
            assert_eq!(cache.get(&(t * 100 + 31)), Some(31));
        }
    }

    #[test]
    fn arc_composition_is_atomic_per_call() {
        let cache: ConcurrentArcCache<u32, u32> = ConcurrentCache::new(ArcCache::new(4, 2));
        cache.put(1, 10);
        cache.get(&1);
        assert_eq!(cache.with(|arc| arc.frequent_len()), 1);
    }
}
