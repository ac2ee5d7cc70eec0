//! # Cache Policy Contract
//!
//! This module defines the trait contract shared by every replacement
//! policy in the crate, plus the extension trait for policies that keep
//! a ghost list and can trade capacity with a sibling.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────────────────────────────┐
//!                 │           CachePolicy<K, V>              │
//!                 │                                          │
//!                 │  put(&mut, K, V) → bool                  │
//!                 │  get(&mut, &K) → Option<V>               │
//!                 │  contains(&, &K) → bool                  │
//!                 │  len(&) → usize                          │
//!                 │  is_empty(&) → bool                      │
//!                 │  capacity(&) → usize                     │
//!                 │  clear(&mut)                             │
//!                 └───────────────────┬──────────────────────┘
//!                                     │
//!                                     ▼
//!                 ┌──────────────────────────────────────────┐
//!                 │           GhostTracked<K>                │
//!                 │                                          │
//!                 │  check_ghost(&mut, &K) → bool            │
//!                 │  ghost_len(&) → usize                    │
//!                 │  increase_capacity(&mut)                 │
//!                 │  decrease_capacity(&mut) → bool          │
//!                 └──────────────────────────────────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait              | Extends       | Purpose                              |
//! |--------------------|---------------|--------------------------------------|
//! | `CachePolicy`      | -             | Universal put/get contract           |
//! | `GhostTracked`     | -             | Ghost probing + capacity shifting    |
//! | `ConcurrentPolicy` | `Send + Sync` | Marker for thread-safe wrappers      |
//!
//! ## Contract Notes
//!
//! - `put` reports `false` only when the policy stores nothing (capacity
//!   0 or an admission gate that has not yet opened); it never fails
//!   otherwise.
//! - `get` is a mutating operation on every policy: it refreshes
//!   recency, bumps frequency, or advances an admission counter. Use
//!   [`contains`](CachePolicy::contains) for a side-effect-free probe.
//! - Values are returned by clone. Every policy mutates on `get`, and
//!   the concurrency wrappers cannot hand references out of a lock, so
//!   `V: Clone` is the crate-wide currency (wrap large payloads in
//!   `Arc<T>` to make the clone a refcount bump).
//!
//! ## Thread Safety
//!
//! Policy cores are **not** thread-safe. Wrap a core in
//! [`ConcurrentCache`](crate::concurrent::ConcurrentCache) for a
//! linearizable per-instance envelope, or in
//! [`ShardedCache`](crate::sharded::ShardedCache) for hash-partitioned
//! fan-out with per-partition locking.

use std::hash::Hash;

/// Core operations every replacement policy supports.
///
/// # Type Parameters
///
/// - `K`: Key type (implementations require `Eq + Hash + Clone`)
/// - `V`: Value type (implementations require `Clone`)
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruCache;
/// use evictkit::traits::CachePolicy;
///
/// fn warm<C: CachePolicy<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.put(*key, value.clone());
///     }
/// }
///
/// let mut cache = LruCache::new(100);
/// warm(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CachePolicy<K, V> {
    /// Inserts or overwrites a key-value pair.
    ///
    /// Returns `true` when the mapping is live afterwards. A capacity-0
    /// policy accepts the call as a no-op and returns `false`; an
    /// admission-gated policy (LRU-K) returns `false` while the key is
    /// still held back in its history.
    fn put(&mut self, key: K, value: V) -> bool;

    /// Looks a key up, refreshing the policy's bookkeeping for it.
    ///
    /// Returns `None` on a miss. Hits update recency / frequency /
    /// admission state as the policy dictates.
    fn get(&mut self, key: &K) -> Option<V>;

    /// Checks whether a key is live without touching eviction state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the number of live entries.
    fn len(&self) -> usize;

    /// Returns `true` if no entries are live.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current capacity in entries.
    fn capacity(&self) -> usize;

    /// Drops every live entry (ghost state included) and resets counters.
    fn clear(&mut self);
}

/// Policies that remember evicted keys in a ghost list and can shift
/// capacity one unit at a time.
///
/// This is the surface the adaptive composition
/// ([`ArcCache`](crate::policy::arc::ArcCache)) drives: a ghost hit on
/// one half triggers a capacity transfer from the other half.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruCache;
/// use evictkit::traits::{CachePolicy, GhostTracked};
///
/// let mut cache = LruCache::new(1);
/// cache.put(1, "a");
/// cache.put(2, "b"); // evicts 1 into the ghost list
///
/// assert!(cache.check_ghost(&1));
/// assert!(!cache.check_ghost(&1)); // consumed
/// ```
pub trait GhostTracked<K> {
    /// Consumes a ghost entry for `key`, returning `true` if one existed.
    fn check_ghost(&mut self, key: &K) -> bool;

    /// Returns the number of keys currently remembered as ghosts.
    fn ghost_len(&self) -> usize;

    /// Grows the main capacity by one entry.
    fn increase_capacity(&mut self);

    /// Shrinks the main capacity by one entry, evicting first if the
    /// policy is full. Returns `false` (no-op) when capacity is already 0.
    fn decrease_capacity(&mut self) -> bool;
}

/// Marker trait for cache wrappers that are safe to use concurrently.
///
/// Implementors guarantee every operation acquires the instance's
/// exclusive lock, making operations on a single instance linearizable.
pub trait ConcurrentPolicy: Send + Sync {}

/// Blanket convenience: any `CachePolicy` over hashable keys can report
/// whether a probe would hit, without committing to a policy type.
///
/// # Example
///
/// ```
/// use evictkit::policy::lfu::LfuCache;
/// use evictkit::traits::{CachePolicy, probe_many};
///
/// let mut cache = LfuCache::new(10, 1_000_000);
/// cache.put("a", 1);
/// cache.put("b", 2);
///
/// assert_eq!(probe_many(&cache, &["a", "b", "c"]), 2);
/// ```
pub fn probe_many<K, V, C>(cache: &C, keys: &[K]) -> usize
where
    K: Eq + Hash,
    C: CachePolicy<K, V>,
{
    keys.iter().filter(|key| cache.contains(key)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal policy used to exercise the trait defaults without pulling
    // in a real eviction structure.
    struct VecPolicy {
        data: Vec<(u32, String)>,
        capacity: usize,
    }

    impl CachePolicy<u32, String> for VecPolicy {
        fn put(&mut self, key: u32, value: String) -> bool {
            if self.capacity == 0 {
                return false;
            }
            if let Some((_, existing)) = self.data.iter_mut().find(|(k, _)| *k == key) {
                *existing = value;
                return true;
            }
            if self.data.len() >= self.capacity {
                self.data.remove(0);
            }
            self.data.push((key, value));
            true
        }

        fn get(&mut self, key: &u32) -> Option<String> {
            self.data
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }

        fn contains(&self, key: &u32) -> bool {
            self.data.iter().any(|(k, _)| k == key)
        }

        fn len(&self) -> usize {
            self.data.len()
        }

        fn capacity(&self) -> usize {
            self.capacity
        }

        fn clear(&mut self) {
            self.data.clear();
        }
    }

    #[test]
    fn is_empty_tracks_len() {
        let mut policy = VecPolicy {
            data: Vec::new(),
            capacity: 2,
        };
        assert!(policy.is_empty());
        policy.put(1, "one".to_string());
        assert!(!policy.is_empty());
    }

    #[test]
    fn zero_capacity_put_reports_false() {
        let mut policy = VecPolicy {
            data: Vec::new(),
            capacity: 0,
        };
        assert!(!policy.put(1, "one".to_string()));
        assert_eq!(policy.get(&1), None);
    }

    #[test]
    fn probe_many_counts_live_keys() {
        let mut policy = VecPolicy {
            data: Vec::new(),
            capacity: 4,
        };
        policy.put(1, "a".to_string());
        policy.put(2, "b".to_string());
        assert_eq!(probe_many(&policy, &[1, 2, 3]), 2);
    }
}
