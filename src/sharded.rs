//! Hash-partitioned fan-out over independent policy instances.
//!
//! A single mutex-wrapped cache serializes every caller. Sharding
//! splits the capacity across `N` independent partitions, each with its
//! own policy instance and its own lock, and routes each key by hash:
//!
//! ```text
//!   key ──► ShardSelector ──► partition i ──► Mutex<P> ──► put/get
//!
//!   ┌───────────┬───────────┬───────────┬───────────┐
//!   │ shard 0   │ shard 1   │ shard 2   │ shard 3   │
//!   │ P, ⌈C/N⌉  │ P, ⌈C/N⌉  │ P, ⌈C/N⌉  │ P, ⌈C/N⌉  │
//!   └───────────┴───────────┴───────────┴───────────┘
//! ```
//!
//! There is no cross-partition coordination: eviction is strictly local
//! to the partition that owns the key, and ordering guarantees hold per
//! partition only. Aggregate throughput scales with uncorrelated key
//! distributions at the cost of global eviction optimality.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::sharded::ShardedCache;
//!
//! // 1024 total entries across 8 LRU partitions.
//! let cache = ShardedCache::lru(1024, 8);
//! cache.put(42u64, "answer");
//! assert_eq!(cache.get(&42), Some("answer"));
//! ```

use parking_lot::Mutex;
use std::hash::Hash;
use std::marker::PhantomData;
use std::thread;

use crate::ds::shard::ShardSelector;
use crate::policy::arc::ArcCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LrukCache;
use crate::traits::{CachePolicy, ConcurrentPolicy};

/// Sharded wrapper dispatching keys to independent policy partitions.
///
/// Construct via the policy-specific constructors ([`lru`](Self::lru),
/// [`lfu`](Self::lfu), [`lru_k`](Self::lru_k),
/// [`adaptive`](Self::adaptive)) or bring any policy with
/// [`with_partitions`](Self::with_partitions).
#[derive(Debug)]
pub struct ShardedCache<K, V, P>
where
    P: CachePolicy<K, V>,
{
    shards: Vec<Mutex<P>>,
    selector: ShardSelector,
    _marker: PhantomData<fn(K, V) -> (K, V)>,
}

/// Resolves a requested slice count: 0 falls back to the host's logical
/// CPU count.
fn resolve_slices(slice_count: usize) -> usize {
    if slice_count > 0 {
        slice_count
    } else {
        thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }
}

/// Splits a total capacity into per-partition capacity, rounding up.
fn slice_capacity(total_capacity: usize, slices: usize) -> usize {
    total_capacity.div_ceil(slices)
}

impl<K, V, P> ShardedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: CachePolicy<K, V>,
{
    /// Builds a sharded cache from a per-partition factory.
    ///
    /// `make` receives each partition's capacity (`⌈total/N⌉`) and
    /// returns that partition's policy instance. A `slice_count` of 0
    /// falls back to the host's logical CPU count.
    pub fn with_partitions(
        total_capacity: usize,
        slice_count: usize,
        mut make: impl FnMut(usize) -> P,
    ) -> Self {
        let slices = resolve_slices(slice_count);
        let per_slice = slice_capacity(total_capacity, slices);
        Self {
            shards: (0..slices).map(|_| Mutex::new(make(per_slice))).collect(),
            selector: ShardSelector::new(slices, 0),
            _marker: PhantomData,
        }
    }

    /// Returns the number of partitions.
    pub fn partition_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the partition index `key` routes to.
    pub fn partition_for(&self, key: &K) -> usize {
        self.selector.shard_for_key(key)
    }

    /// Returns the live-entry count of one partition.
    pub fn partition_len(&self, index: usize) -> usize {
        self.shards[index].lock().len()
    }

    /// Inserts or overwrites in the owning partition.
    pub fn put(&self, key: K, value: V) -> bool {
        let shard = &self.shards[self.selector.shard_for_key(&key)];
        shard.lock().put(key, value)
    }

    /// Looks a key up in its owning partition.
    pub fn get(&self, key: &K) -> Option<V> {
        let shard = &self.shards[self.selector.shard_for_key(key)];
        shard.lock().get(key)
    }

    /// Probes the owning partition without policy side effects.
    pub fn contains(&self, key: &K) -> bool {
        let shard = &self.shards[self.selector.shard_for_key(key)];
        shard.lock().contains(key)
    }

    /// Sums live entries across all partitions.
    ///
    /// The sum is assembled partition by partition; concurrent writers
    /// can move the true total while it is being taken.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    /// Returns `true` if every partition is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.lock().is_empty())
    }

    /// Sums partition capacities (≥ the requested total, by rounding).
    pub fn capacity(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.lock().capacity())
            .sum()
    }

    /// Clears every partition, one lock at a time.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().clear();
        }
    }
}

impl<K, V> ShardedCache<K, V, LruCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LRU: `total_capacity` entries across `slice_count`
    /// partitions (0 = logical CPU count).
    pub fn lru(total_capacity: usize, slice_count: usize) -> Self {
        Self::with_partitions(total_capacity, slice_count, LruCache::new)
    }

    /// Removes `key` from its owning partition; no-op on miss.
    pub fn remove(&self, key: &K) -> Option<V> {
        let shard = &self.shards[self.selector.shard_for_key(key)];
        shard.lock().remove(key)
    }
}

impl<K, V> ShardedCache<K, V, LfuCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LFU with the given aging ceiling per partition.
    pub fn lfu(total_capacity: usize, slice_count: usize, max_average: u64) -> Self {
        Self::with_partitions(total_capacity, slice_count, |capacity| {
            LfuCache::new(capacity, max_average)
        })
    }

    /// Purges every partition: all entries dropped, counters reset.
    pub fn purge(&self) {
        for shard in &self.shards {
            shard.lock().purge();
        }
    }
}

impl<K, V> ShardedCache<K, V, LrukCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LRU-K; each partition gets `⌈history/N⌉` history slots.
    pub fn lru_k(
        total_capacity: usize,
        slice_count: usize,
        history_capacity: usize,
        k: usize,
    ) -> Self {
        let slices = resolve_slices(slice_count);
        let history_per_slice = slice_capacity(history_capacity, slices);
        Self::with_partitions(total_capacity, slices, |capacity| {
            LrukCache::new(capacity, history_per_slice, k)
        })
    }
}

impl<K, V> ShardedCache<K, V, ArcCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded adaptive cache with the given promotion threshold.
    pub fn adaptive(total_capacity: usize, slice_count: usize, transform_threshold: usize) -> Self {
        Self::with_partitions(total_capacity, slice_count, |capacity| {
            ArcCache::new(capacity, transform_threshold)
        })
    }
}

impl<K, V, P> ConcurrentPolicy for ShardedCache<K, V, P> where P: CachePolicy<K, V> + Send {}
