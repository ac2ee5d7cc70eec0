//! Adaptive replacement policy composed of an LRU half and an LFU half.
//!
//! Neither recency nor frequency wins on every workload. This policy
//! runs both: a recency half ([`LruCache`]) absorbs new arrivals, a
//! frequency half ([`LfuCache`]) holds keys that proved reuse, and the
//! ghost lists of the two halves steer a one-unit-at-a-time capacity
//! transfer between them. A workload that keeps re-touching recently
//! evicted keys grows the recency half; a workload that keeps
//! re-touching frequency-evicted keys grows the frequency half.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         ArcCache<K, V> Layout                       │
//! │                                                                     │
//! │   recent: LruCache<K, V>             frequent: LfuCache<K, V>       │
//! │   ┌───────────────────────┐          ┌───────────────────────┐      │
//! │   │ main list + index     │          │ freq buckets + index  │      │
//! │   │ ghost list (keys)     │          │ ghost list (keys)     │      │
//! │   │ capacity: C ± shifts  │          │ capacity: C ∓ shifts  │      │
//! │   └───────────┬───────────┘          └───────────▲───────────┘      │
//! │               │    access_count >= threshold     │                  │
//! │               └────────────── promote ───────────┘                  │
//! │                                                                     │
//! │   Ghost-driven transfer (start of every put/get):                   │
//! │     key in recent ghost  ⇒ frequent −1 capacity, recent +1          │
//! │     key in frequent ghost ⇒ recent −1 capacity, frequent +1         │
//! │     (the shift applies only if the donor's decrement succeeded)     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation Flow
//!
//! ```text
//!   put(key, value):
//!     1. Consume ghost hits, shifting capacity if one fires
//!     2. Insert/update in the recency half (always)
//!     3. If the frequency half already holds the key, update it too
//!
//!   get(key):
//!     1. Consume ghost hits, shifting capacity if one fires
//!     2. Probe the recency half; on a hit whose access count reached
//!        the transform threshold, copy the entry into the frequency
//!        half (promotion), then return the value
//!     3. On a recency miss, probe the frequency half directly
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::arc::ArcCache;
//! use evictkit::traits::CachePolicy;
//!
//! let mut cache = ArcCache::new(4, 2);
//! cache.put("page", 1);
//!
//! // Second observation reaches the threshold: promoted.
//! cache.get(&"page");
//! assert_eq!(cache.frequent_len(), 1);
//! ```
//!
//! ## Thread Safety
//!
//! `ArcCache` is single-threaded; the two halves carry no locks of
//! their own. Wrap the whole composition in
//! [`ConcurrentCache`](crate::concurrent::ConcurrentCache) — one
//! top-level mutex makes every operation, ghost transfer included,
//! atomic.

use std::hash::Hash;

use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::traits::{CachePolicy, GhostTracked};

/// Adaptive cache balancing a recency half against a frequency half.
///
/// Both halves start at `capacity` entries; ghost hits move capacity
/// between them one unit at a time.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Eq + Hash + Clone`
/// - `V`: Value type, must be `Clone`
///
/// # Example
///
/// ```
/// use evictkit::policy::arc::ArcCache;
/// use evictkit::traits::CachePolicy;
///
/// let mut cache: ArcCache<u32, String> = ArcCache::new(100, 2);
/// cache.put(1, "one".to_string());
/// assert_eq!(cache.get(&1), Some("one".to_string()));
/// ```
#[derive(Debug)]
pub struct ArcCache<K, V> {
    capacity: usize,
    transform_threshold: usize,
    recent: LruCache<K, V>,
    frequent: LfuCache<K, V>,
}

impl<K, V> ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an adaptive cache whose halves each start at `capacity`
    /// entries, promoting a recency entry into the frequency half once
    /// its access count reaches `transform_threshold`.
    pub fn new(capacity: usize, transform_threshold: usize) -> Self {
        Self {
            capacity,
            transform_threshold,
            recent: LruCache::new(capacity),
            frequent: LfuCache::with_default_aging(capacity),
        }
    }

    /// Returns the promotion threshold.
    pub fn transform_threshold(&self) -> usize {
        self.transform_threshold
    }

    /// Returns the number of entries in the recency half.
    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    /// Returns the number of entries in the frequency half.
    pub fn frequent_len(&self) -> usize {
        self.frequent.len()
    }

    /// Returns the recency half's current capacity.
    pub fn recent_capacity(&self) -> usize {
        self.recent.capacity()
    }

    /// Returns the frequency half's current capacity.
    pub fn frequent_capacity(&self) -> usize {
        self.frequent.capacity()
    }

    /// Returns `true` if the recency half remembers `key` as a ghost.
    pub fn recent_ghost_contains(&self, key: &K) -> bool {
        self.recent.ghost_contains(key)
    }

    /// Returns `true` if the frequency half remembers `key` as a ghost.
    pub fn frequent_ghost_contains(&self, key: &K) -> bool {
        self.frequent.ghost_contains(key)
    }

    /// Consumes a ghost hit on either half and shifts one unit of
    /// capacity toward the half that lost the key. Returns `true` if a
    /// ghost fired.
    fn check_ghost_caches(&mut self, key: &K) -> bool {
        if self.recent.check_ghost(key) {
            if self.frequent.decrease_capacity() {
                self.recent.increase_capacity();
            }
            true
        } else if self.frequent.check_ghost(key) {
            if self.recent.decrease_capacity() {
                self.frequent.increase_capacity();
            }
            true
        } else {
            false
        }
    }

}

#[cfg(any(test, debug_assertions))]
impl<K, V> ArcCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn debug_validate_invariants(&self) {
        assert_eq!(
            self.recent.capacity() + self.frequent.capacity(),
            self.capacity * 2,
            "capacity transfer must conserve the total budget"
        );
        self.recent.debug_validate_invariants();
        self.frequent.debug_validate_invariants();
    }
}

impl<K, V> CachePolicy<K, V> for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) -> bool {
        self.check_ghost_caches(&key);

        let in_frequent = self.frequent.contains(&key);
        let stored = self.recent.put(key.clone(), value.clone());
        if in_frequent {
            // Keep the promoted copy coherent.
            self.frequent.put(key, value);
            return true;
        }
        stored
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.check_ghost_caches(key);

        if let Some((value, count)) = self.recent.get_with_count(key) {
            if count >= self.transform_threshold {
                self.frequent.put(key.clone(), value.clone());
            }
            return Some(value);
        }
        self.frequent.get(key)
    }

    fn contains(&self, key: &K) -> bool {
        self.recent.contains(key) || self.frequent.contains(key)
    }

    /// Resident entries summed across both halves. A promoted key that
    /// is still recent is resident in each half and counts in each.
    fn len(&self) -> usize {
        self.recent.len() + self.frequent.len()
    }

    /// Combined capacity of the two halves (twice the construction
    /// capacity; transfers conserve the sum).
    fn capacity(&self) -> usize {
        self.recent.capacity() + self.frequent.capacity()
    }

    fn clear(&mut self) {
        self.recent = LruCache::new(self.capacity);
        self.frequent = LfuCache::with_default_aging(self.capacity);
    }
}
