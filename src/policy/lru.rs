//! Least-Recently-Used (LRU) replacement policy.
//!
//! Evicts the entry whose last access is furthest in the past. This
//! implementation pairs the main recency list with a ghost list of the
//! same capacity: evicted keys are remembered (values discarded) so a
//! caller can detect re-references to recently evicted keys, and the
//! adaptive composition can shift capacity toward whichever axis the
//! workload punishes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        LruCache<K, V> Layout                        │
//! │                                                                     │
//! │   index: FxHashMap<K, SlotId>      list: LinkedList<Entry>          │
//! │                                                                     │
//! │   ┌──────────┬─────────┐           front            back            │
//! │   │   Key    │ SlotId  │            MRU              LRU            │
//! │   ├──────────┼─────────┤             │                │             │
//! │   │  "p3"    │  id_2   │──────────► [p3] ◄──► [p1] ◄──► [p2]        │
//! │   │  "p1"    │  id_0   │                                │           │
//! │   │  "p2"    │  id_1   │                              evict         │
//! │   └──────────┴─────────┘                                │           │
//! │                                                         ▼           │
//! │   ghost: GhostList<K>  ◄──────────── key only, value dropped        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A key is in the index **iff** its entry occupies a position in the
//! main list; it is in the ghost index **iff** it occupies a position in
//! the ghost list; it is never in both.
//!
//! ## Operations
//!
//! | Operation             | Time | Notes                                  |
//! |-----------------------|------|----------------------------------------|
//! | `put`                 | O(1) | May evict the LRU entry into the ghost |
//! | `get`                 | O(1) | Moves to MRU, bumps access count       |
//! | `remove`              | O(1) | Unconditional, no ghost record         |
//! | `check_ghost`         | O(1) | Consumes a ghost entry                 |
//! | `increase_capacity`   | O(1) |                                        |
//! | `decrease_capacity`   | O(1) | Evicts first if full                   |
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::lru::LruCache;
//! use evictkit::traits::CachePolicy;
//!
//! let mut cache = LruCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//!
//! // Touch "a" so "b" becomes the eviction victim.
//! cache.get(&"a");
//! cache.put("c", 3);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert!(cache.ghost_contains(&"b"));
//! ```
//!
//! ## Thread Safety
//!
//! `LruCache` is single-threaded. Wrap it in
//! [`ConcurrentCache`](crate::concurrent::ConcurrentCache) or shard it
//! with [`ShardedCache`](crate::sharded::ShardedCache) for concurrent
//! use.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::ghost_list::GhostList;
use crate::ds::linked_list::LinkedList;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;
use crate::traits::{CachePolicy, GhostTracked};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    access_count: usize,
}

/// LRU cache with a ghost list remembering recent evictions.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Eq + Hash + Clone`
/// - `V`: Value type, must be `Clone`
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruCache;
/// use evictkit::traits::CachePolicy;
///
/// let mut cache: LruCache<u32, String> = LruCache::new(100);
/// cache.put(1, "one".to_string());
/// assert_eq!(cache.get(&1), Some("one".to_string()));
/// assert_eq!(cache.get(&2), None);
/// ```
#[derive(Debug)]
pub struct LruCache<K, V> {
    list: LinkedList<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    ghost: GhostList<K>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an LRU cache holding at most `capacity` entries.
    ///
    /// The ghost list capacity is fixed to the same value. A capacity of
    /// 0 creates a cache that accepts operations but stores nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: LinkedList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ghost: GhostList::new(capacity),
            capacity,
        }
    }

    /// Looks `key` up and returns its value together with the
    /// post-increment access count.
    ///
    /// The access count is the promotion signal consumed by the adaptive
    /// composition; plain callers can use [`get`](CachePolicy::get).
    pub fn get_with_count(&mut self, key: &K) -> Option<(V, usize)> {
        let id = *self.index.get(key)?;
        self.list.move_to_front(id);
        let entry = self.list.get_mut(id)?;
        entry.access_count += 1;
        Some((entry.value.clone(), entry.access_count))
    }

    /// Returns `key`'s access count without refreshing its position.
    pub fn access_count(&self, key: &K) -> Option<usize> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| entry.access_count)
    }

    /// Removes `key` unconditionally; no-op on miss.
    ///
    /// Removal is total: any ghost trace of the key is dropped as well,
    /// so a subsequent probe sees the key in neither index.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.ghost.take(key);
        let id = self.index.remove(key)?;
        self.list.remove(id).map(|entry| entry.value)
    }

    /// Returns `true` if `key` is remembered in the ghost list.
    pub fn ghost_contains(&self, key: &K) -> bool {
        self.ghost.contains(key)
    }

    /// Returns the key currently at the LRU end, if any.
    pub fn peek_lru(&self) -> Option<&K> {
        self.list.back().map(|entry| &entry.key)
    }

    /// Reports the first violated structural invariant, if any.
    ///
    /// Unlike `debug_validate_invariants`, this never panics and is
    /// available in release builds.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.list.len() != self.index.len() {
            return Err(InvariantError::new(format!(
                "main list holds {} nodes but the index maps {} keys",
                self.list.len(),
                self.index.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} live entries exceed capacity {}",
                self.list.len(),
                self.capacity
            )));
        }
        for key in self.index.keys() {
            if self.ghost.contains(key) {
                return Err(InvariantError::new(
                    "a key is present in both the main and ghost indices",
                ));
            }
        }
        Ok(())
    }

    fn evict_least_recent(&mut self) {
        if let Some(entry) = self.list.pop_back() {
            self.index.remove(&entry.key);
            self.ghost.record(entry.key);
        }
    }
}

#[cfg(any(test, debug_assertions))]
impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.list.len(), self.index.len());
        assert!(self.list.len() <= self.capacity);
        for (key, &id) in &self.index {
            let entry = self.list.get(id).expect("indexed entry missing");
            assert_eq!(&entry.key, key);
            assert!(!self.ghost.contains(key), "key live and ghosted");
        }
        self.list.debug_validate_invariants();
        self.ghost.debug_validate_invariants();
    }
}

impl<K, V> CachePolicy<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) -> bool {
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                entry.value = value;
            }
            self.list.move_to_front(id);
            return true;
        }

        if self.capacity == 0 {
            return false;
        }

        if self.list.len() >= self.capacity {
            self.evict_least_recent();
        }

        // A re-materializing key must not linger in the ghost index.
        self.ghost.take(&key);

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
            access_count: 1,
        });
        self.index.insert(key, id);
        true
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.get_with_count(key).map(|(value, _)| value)
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.list.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
        self.ghost.clear();
    }
}

impl<K, V> GhostTracked<K> for LruCache<K, V>
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
        if self.list.len() == self.capacity {
            self.evict_least_recent();
        }
        self.capacity -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_roundtrip() {
        let mut cache = LruCache::new(4);
        assert!(cache.put(1, "one"));
        assert!(cache.put(2, "two"));
        assert_eq!(cache.get(&1), Some("one"));
        assert_eq!(cache.get(&3), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn put_overwrites_and_refreshes() {
        let mut cache = LruCache::new(2);
        cache.put(1, "a");
        cache.put(2, "b");

        // Overwrite makes key 1 most-recent, so key 2 is the victim.
        cache.put(1, "a2");
        cache.put(3, "c");

        assert_eq!(cache.get(&1), Some("a2"));
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn eviction_takes_least_recent_into_ghost() {
        let mut cache = LruCache::new(3);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");
        cache.get(&1);
        cache.put(4, "d");

        assert!(!cache.contains(&2));
        assert!(cache.ghost_contains(&2));
        for key in [1, 3, 4] {
            assert!(cache.contains(&key), "key {key} should have survived");
        }
        cache.debug_validate_invariants();
    }

    #[test]
    fn ghost_entry_consumed_by_check() {
        let mut cache = LruCache::new(1);
        cache.put(1, "a");
        cache.put(2, "b");

        assert!(cache.check_ghost(&1));
        assert!(!cache.check_ghost(&1));
        assert_eq!(cache.ghost_len(), 0);
    }

    #[test]
    fn reinsert_clears_ghost_trace() {
        let mut cache = LruCache::new(1);
        cache.put(1, "a");
        cache.put(2, "b"); // 1 becomes a ghost
        assert!(cache.ghost_contains(&1));

        cache.put(1, "a2"); // 2 becomes a ghost, 1 re-materializes
        assert!(cache.contains(&1));
        assert!(!cache.ghost_contains(&1));
        assert!(cache.ghost_contains(&2));
        cache.debug_validate_invariants();
    }

    #[test]
    fn get_bumps_access_count() {
        let mut cache = LruCache::new(4);
        cache.put(1, "a");
        assert_eq!(cache.access_count(&1), Some(1));
        cache.get(&1);
        cache.get(&1);
        assert_eq!(cache.access_count(&1), Some(3));

        // A value overwrite does not count as an access.
        cache.put(1, "a2");
        assert_eq!(cache.access_count(&1), Some(3));
    }

    #[test]
    fn get_with_count_reports_post_increment() {
        let mut cache = LruCache::new(4);
        cache.put(1, "a");
        assert_eq!(cache.get_with_count(&1), Some(("a", 2)));
        assert_eq!(cache.get_with_count(&1), Some(("a", 3)));
        assert_eq!(cache.get_with_count(&9), None);
    }

    #[test]
    fn remove_is_unconditional_and_total() {
        let mut cache = LruCache::new(2);
        cache.put(1, "a");
        assert_eq!(cache.remove(&1), Some("a"));
        assert_eq!(cache.remove(&1), None);

        cache.put(2, "b");
        cache.put(3, "c");
        cache.put(4, "d"); // 2 ghosted
        assert!(cache.ghost_contains(&2));
        cache.remove(&2);
        assert!(!cache.ghost_contains(&2));
    }

    #[test]
    fn capacity_shift_evicts_when_full() {
        let mut cache = LruCache::new(2);
        cache.put(1, "a");
        cache.put(2, "b");

        assert!(cache.decrease_capacity());
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(&1)); // LRU evicted by the shrink
        assert!(cache.ghost_contains(&1));

        cache.increase_capacity();
        assert_eq!(cache.capacity(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn decrease_capacity_stops_at_zero() {
        let mut cache: LruCache<u32, &str> = LruCache::new(1);
        assert!(cache.decrease_capacity());
        assert!(!cache.decrease_capacity());
        assert_eq!(cache.capacity(), 0);
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut cache = LruCache::new(0);
        assert!(!cache.put(1, "a"));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_resets_all_state() {
        let mut cache = LruCache::new(2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c"); // ghost for 1
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.ghost_len(), 0);
        assert_eq!(cache.get(&2), None);
        cache.debug_validate_invariants();
    }

    #[test]
    fn peek_lru_matches_eviction_order() {
        let mut cache = LruCache::new(3);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");
        assert_eq!(cache.peek_lru(), Some(&1));
        cache.get(&1);
        assert_eq!(cache.peek_lru(), Some(&2));
    }

    #[test]
    fn heavy_churn_keeps_invariants() {
        let mut cache = LruCache::new(8);
        for i in 0..200u32 {
            cache.put(i % 13, i);
            if i % 3 == 0 {
                cache.get(&(i % 7));
            }
            if i % 11 == 0 {
                cache.remove(&(i % 5));
            }
        }
        assert!(cache.len() <= 8);
        cache.debug_validate_invariants();
        assert!(cache.check_invariants().is_ok());
    }
}
