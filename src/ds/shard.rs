//! Deterministic key-to-partition mapping for sharded caches.
//!
//! ```text
//!   key ──► DefaultHasher(seed, key) ──► hash % shards ──► partition index
//! ```
//!
//! Properties:
//! - Deterministic: the same `(key, seed, shards)` always yields the
//!   same partition.
//! - Seed isolation: different seeds produce different distributions,
//!   which sidesteps pathological collisions between co-located caches.
//! - Uniform: keys spread evenly given a reasonable `Hash` impl.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic shard selector using a seeded standard hash.
///
/// # Example
///
/// ```
/// use evictkit::ds::ShardSelector;
///
/// let selector = ShardSelector::new(8, 42);
/// let shard = selector.shard_for_key(&"my_key");
/// assert!(shard < 8);
/// assert_eq!(selector.shard_for_key(&"my_key"), shard);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` partitions with the given `seed`.
    ///
    /// The shard count is clamped to at least 1.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    /// Returns the number of partitions.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps a key to a partition index in `[0, shards)`.
    pub fn shard_for_key<K: Hash>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards
    }
}

impl Default for ShardSelector {
    /// Creates a single-partition selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}
