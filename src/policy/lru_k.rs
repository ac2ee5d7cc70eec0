//! LRU-K admission-gated replacement policy.
//!
//! A plain LRU cache admits every key it sees, so a one-time scan can
//! flush the working set. LRU-K keeps a key out of the main cache until
//! it has been observed `k` times; until then the key lives in a small
//! LRU *history* that records its observation count and the most
//! recently offered value.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       LrukCache<K, V> Layout                        │
//! │                                                                     │
//! │   history: LruCache<K, {hits, pending}>     admitted: LruCache<K,V> │
//! │   (capacity: history_capacity)              (capacity: capacity)    │
//! │                                                                     │
//! │     put/get on unadmitted key                                       │
//! │        │  hits += 1                                                 │
//! │        ▼                                                            │
//! │     hits >= k ? ──no──► stay in history (value parked as pending)   │
//! │        │ yes                                                        │
//! │        ▼                                                            │
//! │     drop history record, admit (key, value) into the main LRU       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pending value rides inside the history record, so when the
//! history LRU evicts a key it necessarily drops the parked value with
//! it: the history is the only place unadmitted state can live, and it
//! is bounded.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::lru_k::LrukCache;
//! use evictkit::traits::CachePolicy;
//!
//! let mut cache = LrukCache::new(10, 10, 2);
//!
//! // First sighting parks the value in the history.
//! assert!(!cache.put("a", 1));
//! assert!(!cache.contains(&"a"));
//!
//! // Second observation admits it.
//! assert_eq!(cache.get(&"a"), Some(1));
//! assert!(cache.contains(&"a"));
//! ```
//!
//! ## Thread Safety
//!
//! `LrukCache` is single-threaded. Wrap it in
//! [`ConcurrentCache`](crate::concurrent::ConcurrentCache) or shard it
//! with [`ShardedCache`](crate::sharded::ShardedCache) for concurrent
//! use.

use std::hash::Hash;

use crate::policy::lru::LruCache;
use crate::traits::CachePolicy;

#[derive(Debug, Clone)]
struct HistoryRecord<V> {
    hits: usize,
    pending: Option<V>,
}

/// LRU cache that admits a key only after `k` observations.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Eq + Hash + Clone`
/// - `V`: Value type, must be `Clone`
///
/// # Example
///
/// ```
/// use evictkit::policy::lru_k::LrukCache;
/// use evictkit::traits::CachePolicy;
///
/// // k = 3: two observations are not enough.
/// let mut cache = LrukCache::new(10, 10, 3);
/// cache.put(1, "page");
/// cache.put(1, "page");
/// assert!(!cache.contains(&1));
///
/// cache.put(1, "page");
/// assert!(cache.contains(&1));
/// ```
#[derive(Debug)]
pub struct LrukCache<K, V> {
    k: usize,
    admitted: LruCache<K, V>,
    history: LruCache<K, HistoryRecord<V>>,
}

impl<K, V> LrukCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an LRU-K cache.
    ///
    /// - `capacity`: entries in the admitted (main) cache.
    /// - `history_capacity`: keys tracked while not yet admitted.
    /// - `k`: observations required for admission (clamped to at least 1).
    pub fn new(capacity: usize, history_capacity: usize, k: usize) -> Self {
        Self {
            k: k.max(1),
            admitted: LruCache::new(capacity),
            history: LruCache::new(history_capacity),
        }
    }

    /// Returns the admission threshold.
    pub fn k_value(&self) -> usize {
        self.k
    }

    /// Returns the number of keys currently tracked in the history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn bump_history(&mut self, key: &K) -> (usize, Option<V>) {
        let record = self.history.get(key);
        let hits = record.as_ref().map(|r| r.hits).unwrap_or(0) + 1;
        let pending = record.and_then(|r| r.pending);
        (hits, pending)
    }

}

#[cfg(any(test, debug_assertions))]
impl<K, V> LrukCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn debug_validate_invariants(&self) {
        self.admitted.debug_validate_invariants();
        self.history.debug_validate_invariants();
    }
}

impl<K, V> CachePolicy<K, V> for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Offers a value. Returns `true` once the mapping is live in the
    /// admitted cache; `false` while the key is still held in the
    /// history.
    fn put(&mut self, key: K, value: V) -> bool {
        if self.admitted.contains(&key) {
            return self.admitted.put(key, value);
        }

        let (hits, _pending) = self.bump_history(&key);
        if hits >= self.k {
            self.history.remove(&key);
            self.admitted.put(key, value)
        } else {
            self.history.put(
                key,
                HistoryRecord {
                    hits,
                    pending: Some(value),
                },
            );
            false
        }
    }

    /// Looks a key up. Counts as an observation whether or not the
    /// admitted cache hit; an unadmitted key whose count reaches `k`
    /// with a parked value is admitted and served from it.
    fn get(&mut self, key: &K) -> Option<V> {
        let main_hit = self.admitted.get(key);
        let (hits, pending) = self.bump_history(key);
        self.history.put(
            key.clone(),
            HistoryRecord {
                hits,
                pending: pending.clone(),
            },
        );

        if main_hit.is_some() {
            return main_hit;
        }

        if hits >= self.k {
            if let Some(value) = pending {
                self.history.remove(key);
                self.admitted.put(key.clone(), value.clone());
                return Some(value);
            }
        }

        None
    }

    fn contains(&self, key: &K) -> bool {
        self.admitted.contains(key)
    }

    fn len(&self) -> usize {
        self.admitted.len()
    }

    fn capacity(&self) -> usize {
        self.admitted.capacity()
    }

    fn clear(&mut self) {
        self.admitted.clear();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_requires_k_observations() {
        let mut cache = LrukCache::new(4, 4, 2);

        assert!(!cache.put("a", 1));
        assert!(!cache.contains(&"a"));
        assert_eq!(cache.len(), 0);

        // Second observation (the get) admits and serves the parked value.
        assert_eq!(cache.get(&"a"), Some(1));
        assert!(cache.contains(&"a"));
        assert_eq!(cache.get(&"a"), Some(1));
    }

    #[test]
    fn two_puts_also_admit() {
        let mut cache = LrukCache::new(4, 4, 2);
        assert!(!cache.put(1, "x"));
        assert!(cache.put(1, "y"));
        assert_eq!(cache.get(&1), Some("y"));
    }

    #[test]
    fn single_put_leaves_key_unadmitted() {
        let mut cache = LrukCache::new(1, 4, 2);
        assert!(!cache.put("b", 2));
        assert!(!cache.contains(&"b"));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn get_without_parked_value_stays_out() {
        let mut cache: LrukCache<u32, u32> = LrukCache::new(4, 4, 2);
        // Observations arrive only through gets: no value was ever
        // offered, so nothing can be admitted.
        assert_eq!(cache.get(&7), None);
        assert_eq!(cache.get(&7), None);
        assert_eq!(cache.get(&7), None);
        assert!(!cache.contains(&7));
    }

    #[test]
    fn admitted_key_updates_directly() {
        let mut cache = LrukCache::new(4, 4, 2);
        cache.put(1, "old");
        cache.put(1, "mid"); // admitted here
        assert!(cache.put(1, "new"));
        assert_eq!(cache.get(&1), Some("new"));
    }

    #[test]
    fn k_one_degenerates_to_lru() {
        let mut cache = LrukCache::new(2, 4, 1);
        assert!(cache.put(1, "a"));
        assert!(cache.contains(&1));
        assert_eq!(cache.get(&1), Some("a"));
    }

    #[test]
    fn k_zero_clamps_to_one() {
        let cache: LrukCache<u32, u32> = LrukCache::new(4, 4, 0);
        assert_eq!(cache.k_value(), 1);
    }

    #[test]
    fn history_eviction_drops_pending_value() {
        // History holds one key: offering a second unadmitted key evicts
        // the first observation record, parked value included.
        let mut cache = LrukCache::new(4, 1, 2);
        cache.put("a", 1);
        cache.put("b", 2); // evicts "a"'s history record

        // "a" starts over: one more observation is not enough.
        assert_eq!(cache.get(&"a"), None);
        assert!(!cache.contains(&"a"));
        assert_eq!(cache.history_len(), 1);
    }

    #[test]
    fn admission_evicts_from_main_cache() {
        let mut cache = LrukCache::new(1, 4, 2);
        cache.put("a", 1);
        cache.get(&"a"); // "a" admitted
        assert!(cache.contains(&"a"));

        cache.put("b", 2);
        cache.get(&"b"); // "b" admitted, "a" evicted (capacity 1)
        assert!(cache.contains(&"b"));
        assert!(!cache.contains(&"a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_capacity_admits_nothing() {
        let mut cache = LrukCache::new(0, 4, 2);
        assert!(!cache.put(1, "a"));
        assert!(!cache.put(1, "a")); // would admit, but capacity is 0
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn clear_resets_both_structures() {
        let mut cache = LrukCache::new(4, 4, 2);
        cache.put(1, "a");
        cache.put(1, "a");
        cache.put(2, "b");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.history_len(), 0);
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn churn_keeps_invariants() {
        let mut cache = LrukCache::new(4, 8, 3);
        for i in 0..300u32 {
            cache.put(i % 19, i);
            cache.get(&(i % 13));
        }
        assert!(cache.len() <= 4);
        cache.debug_validate_invariants();
    }
}
