//! Least-Frequently-Used (LFU) replacement policy with dynamic aging.
//!
//! Evicts the entry with the lowest access frequency; ties break toward
//! the entry that reached that frequency earliest. Two additions keep
//! the plain LFU idea workable on real workloads:
//!
//! - **Ghost list**: evicted keys are remembered (values discarded) so
//!   re-references to recently evicted keys are detectable, and the
//!   adaptive composition can shift capacity in response.
//! - **Aging**: long-lived entries accumulate frequency they no longer
//!   deserve after a workload shift. When the running average access
//!   count per live entry exceeds a configured ceiling, every frequency
//!   is reduced by half the ceiling (floored at 1) and the bookkeeping
//!   is rescaled to match, collapsing the stale tail while preserving
//!   relative order.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        LfuCache<K, V> Layout                        │
//! │                                                                     │
//! │   buckets: FrequencyBuckets<K, V>                                   │
//! │                                                                     │
//! │      freq 1 ──► [d]                min_freq = 1                     │
//! │      freq 3 ──► [a] ◄──► [c]                                        │
//! │      freq 7 ──► [b]                                                 │
//! │                 front = least-recently-promoted = victim            │
//! │                   │                                                 │
//! │                   ▼ on eviction (key only)                          │
//! │   ghost: GhostList<K>                                               │
//! │                                                                     │
//! │   aging counters: total_accesses, max_average                       │
//! │      running average = total_accesses / len                         │
//! │      average > max_average  ⇒  rescale(max_average / 2)             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation           | Time  | Notes                                   |
//! |---------------------|-------|-----------------------------------------|
//! | `put`               | O(1)* | *O(n) when the access triggers aging    |
//! | `get`               | O(1)* | Bumps frequency, repositions            |
//! | `purge`             | O(n)  | Drops everything, resets counters       |
//! | `check_ghost`       | O(1)  | Consumes a ghost entry                  |
//! | `decrease_capacity` | O(1)  | Evicts the LFU victim first if full     |
//!
//! The aging sweep is O(n) but its trigger is rate-limited by
//! `max_average`: the running average must climb past the ceiling again
//! before the next sweep.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::lfu::LfuCache;
//! use evictkit::traits::CachePolicy;
//!
//! let mut cache = LfuCache::new(2, 1_000_000);
//! cache.put("hot", 1);
//! cache.put("cold", 2);
//! cache.get(&"hot");
//! cache.get(&"hot");
//!
//! // "cold" has the lower frequency, so it is the victim.
//! cache.put("new", 3);
//! assert!(cache.contains(&"hot"));
//! assert!(!cache.contains(&"cold"));
//! ```
//!
//! ## Thread Safety
//!
//! `LfuCache` is single-threaded. Wrap it in
//! [`ConcurrentCache`](crate::concurrent::ConcurrentCache) or shard it
//! with [`ShardedCache`](crate::sharded::ShardedCache) for concurrent
//! use.

use std::hash::Hash;

use crate::ds::freq_buckets::FrequencyBuckets;
use crate::ds::ghost_list::GhostList;
use crate::traits::{CachePolicy, GhostTracked};

/// Aging ceiling used when the caller does not care about aging: the
/// running average realistically never reaches it.
pub const DEFAULT_MAX_AVERAGE: u64 = 1_000_000;

/// LFU cache with frequency aging and a ghost list.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Eq + Hash + Clone`
/// - `V`: Value type, must be `Clone`
///
/// # Example
///
/// ```
/// use evictkit::policy::lfu::LfuCache;
/// use evictkit::traits::CachePolicy;
///
/// let mut cache: LfuCache<u32, String> = LfuCache::new(100, 1_000);
/// cache.put(1, "one".to_string());
/// assert_eq!(cache.frequency(&1), Some(1));
/// cache.get(&1);
/// assert_eq!(cache.frequency(&1), Some(2));
/// ```
#[derive(Debug)]
pub struct LfuCache<K, V> {
    buckets: FrequencyBuckets<K, V>,
    ghost: GhostList<K>,
    capacity: usize,
    max_average: u64,
    total_accesses: u64,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an LFU cache holding at most `capacity` entries, with
    /// aging triggered once the running average access count exceeds
    /// `max_average`.
    ///
    /// The ghost list capacity is fixed to `capacity`. A capacity of 0
    /// creates a cache that accepts operations but stores nothing.
    pub fn new(capacity: usize, max_average: u64) -> Self {
        Self {
            buckets: FrequencyBuckets::with_capacity(capacity),
            ghost: GhostList::new(capacity),
            capacity,
            max_average,
            total_accesses: 0,
        }
    }

    /// Creates an LFU cache whose aging ceiling is high enough to never
    /// trigger in practice ([`DEFAULT_MAX_AVERAGE`]).
    pub fn with_default_aging(capacity: usize) -> Self {
        Self::new(capacity, DEFAULT_MAX_AVERAGE)
    }

    /// Returns the access frequency recorded for `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.buckets.frequency(key)
    }

    /// Returns the running average access count per live entry.
    pub fn running_average(&self) -> u64 {
        match self.len() {
            0 => 0,
            len => self.total_accesses / len as u64,
        }
    }

    /// Returns `true` if `key` is remembered in the ghost list.
    pub fn ghost_contains(&self, key: &K) -> bool {
        self.ghost.contains(key)
    }

    /// Drops every entry and ghost, and resets the aging counters.
    pub fn purge(&mut self) {
        self.buckets.clear();
        self.ghost.clear();
        self.total_accesses = 0;
    }

    /// One observed access: bump the counter and age if the average
    /// climbed past the ceiling.
    fn record_access(&mut self) {
        self.total_accesses += 1;
        let len = self.buckets.len() as u64;
        if len > 0 && self.total_accesses / len > self.max_average {
            self.total_accesses = self.buckets.rescale(self.max_average / 2);
        }
    }

    fn evict_least_frequent(&mut self) {
        if let Some((key, _value, freq)) = self.buckets.pop_min() {
            self.total_accesses = self.total_accesses.saturating_sub(freq);
            self.ghost.record(key);
        }
    }

}

#[cfg(any(test, debug_assertions))]
impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn debug_validate_invariants(&self) {
        assert!(self.buckets.len() <= self.capacity);
        self.buckets.debug_validate_invariants();
        self.ghost.debug_validate_invariants();
    }
}

impl<K, V> CachePolicy<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) -> bool {
        if self.buckets.contains(&key) {
            self.buckets.set_value(&key, value);
            self.buckets.touch(&key);
            self.record_access();
            return true;
        }

        if self.capacity == 0 {
            return false;
        }

        if self.buckets.len() >= self.capacity {
            self.evict_least_frequent();
        }

        // A re-materializing key must not linger in the ghost index.
        self.ghost.take(&key);

        self.buckets.insert(key, value);
        self.record_access();
        true
    }

    fn get(&mut self, key: &K) -> Option<V> {
        if !self.buckets.contains(key) {
            return None;
        }
        self.buckets.touch(key);
        self.record_access();
        self.buckets.value(key).cloned()
    }

    fn contains(&self, key: &K) -> bool {
        self.buckets.contains(key)
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.purge();
    }
}

impl<K, V> GhostTracked<K> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn check_ghost(&mut self, key: &K) -> bool {
        self.ghost.take(key)
    }

    fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    fn increase_capacity(&mut self) {
        self.capacity += 1;
    }

    fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.buckets.len() == self.capacity {
            self.evict_least_frequent();
        }
        self.capacity -= 1;
        true
    }
}
