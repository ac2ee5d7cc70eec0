//! Unified cache builder over all replacement policies.
//!
//! Provides a single construction path when the policy is chosen at
//! runtime (configuration files, experiments, tier wiring) while the
//! concrete types stay available for callers that need policy-specific
//! operations like `remove` or `purge`.
//!
//! ## Example
//!
//! ```
//! use evictkit::builder::{CacheBuilder, PolicyKind};
//! use evictkit::traits::CachePolicy;
//!
//! let mut cache = CacheBuilder::new(100).build::<u64, String>(PolicyKind::Lru);
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::arc::ArcCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LrukCache;
use crate::traits::CachePolicy;

/// Available replacement policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyKind {
    /// Least Recently Used eviction.
    Lru,
    /// LRU with a `k`-observation admission gate.
    LruK {
        /// Capacity of the not-yet-admitted observation history.
        history_capacity: usize,
        /// Observations required before a key is admitted.
        k: usize,
    },
    /// Least Frequently Used eviction with dynamic aging.
    Lfu {
        /// Running-average ceiling that triggers the aging sweep.
        max_average: u64,
    },
    /// Adaptive LRU/LFU composition.
    Arc {
        /// Access count at which a recency entry is promoted.
        transform_threshold: usize,
    },
}

/// Policy-erased cache produced by [`CacheBuilder`].
#[derive(Debug)]
pub struct Cache<K, V> {
    inner: CacheInner<K, V>,
}

#[derive(Debug)]
enum CacheInner<K, V> {
    Lru(LruCache<K, V>),
    LruK(LrukCache<K, V>),
    Lfu(LfuCache<K, V>),
    Arc(ArcCache<K, V>),
}

impl<K, V> CachePolicy<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) -> bool {
        match &mut self.inner {
            CacheInner::Lru(cache) => cache.put(key, value),
            CacheInner::LruK(cache) => cache.put(key, value),
            CacheInner::Lfu(cache) => cache.put(key, value),
            CacheInner::Arc(cache) => cache.put(key, value),
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        match &mut self.inner {
            CacheInner::Lru(cache) => cache.get(key),
            CacheInner::LruK(cache) => cache.get(key),
            CacheInner::Lfu(cache) => cache.get(key),
            CacheInner::Arc(cache) => cache.get(key),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Lru(cache) => cache.contains(key),
            CacheInner::LruK(cache) => cache.contains(key),
            CacheInner::Lfu(cache) => cache.contains(key),
            CacheInner::Arc(cache) => cache.contains(key),
        }
    }

    fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(cache) => cache.len(),
            CacheInner::LruK(cache) => cache.len(),
            CacheInner::Lfu(cache) => cache.len(),
            CacheInner::Arc(cache) => cache.len(),
        }
    }

    fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(cache) => cache.capacity(),
            CacheInner::LruK(cache) => cache.capacity(),
            CacheInner::Lfu(cache) => cache.capacity(),
            CacheInner::Arc(cache) => cache.capacity(),
        }
    }

    fn clear(&mut self) {
        match &mut self.inner {
            CacheInner::Lru(cache) => cache.clear(),
            CacheInner::LruK(cache) => cache.clear(),
            CacheInner::Lfu(cache) => cache.clear(),
            CacheInner::Arc(cache) => cache.clear(),
        }
    }
}

/// Builder for policy-erased cache instances.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder {
    capacity: usize,
}

impl CacheBuilder {
    /// Starts a builder for a cache of `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Builds a cache with the given policy, clamping degenerate
    /// parameters the way the concrete constructors do.
    pub fn build<K, V>(self, policy: PolicyKind) -> Cache<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        let inner = match policy {
            PolicyKind::Lru => CacheInner::Lru(LruCache::new(self.capacity)),
            PolicyKind::LruK {
                history_capacity,
                k,
            } => CacheInner::LruK(LrukCache::new(self.capacity, history_capacity, k)),
            PolicyKind::Lfu { max_average } => {
                CacheInner::Lfu(LfuCache::new(self.capacity, max_average))
            },
            PolicyKind::Arc {
                transform_threshold,
            } => CacheInner::Arc(ArcCache::new(self.capacity, transform_threshold)),
        };
        Cache { inner }
    }

    /// Builds a cache with the given policy, rejecting invalid
    /// parameters instead of clamping them.
    pub fn try_build<K, V>(self, policy: PolicyKind) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        match &policy {
            PolicyKind::LruK { k, .. } if *k == 0 => {
                return Err(ConfigError::new("lru-k admission threshold k must be >= 1"));
            },
            PolicyKind::Lfu { max_average } if *max_average == 0 => {
                return Err(ConfigError::new("lfu max_average must be >= 1"));
            },
            PolicyKind::Arc {
                transform_threshold,
            } if *transform_threshold == 0 => {
                return Err(ConfigError::new("arc transform_threshold must be >= 1"));
            },
            _ => {},
        }
        Ok(self.build(policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_policies_honor_the_contract() {
        let policies = [
            PolicyKind::Lru,
            PolicyKind::LruK {
                history_capacity: 16,
                k: 1,
            },
            PolicyKind::Lfu {
                max_average: 1_000_000,
            },
            PolicyKind::Arc {
                transform_threshold: 2,
            },
        ];

        for policy in policies {
            let mut cache = CacheBuilder::new(10).build::<u64, String>(policy.clone());

            assert!(cache.put(1, "one".to_string()), "{policy:?}");
            cache.put(2, "two".to_string());

            assert_eq!(cache.get(&1), Some("one".to_string()), "{policy:?}");
            assert_eq!(cache.get(&3), None, "{policy:?}");
            assert!(cache.contains(&1), "{policy:?}");
            assert!(!cache.contains(&99), "{policy:?}");

            cache.put(1, "ONE".to_string());
            assert_eq!(cache.get(&1), Some("ONE".to_string()), "{policy:?}");

            cache.clear();
            assert!(cache.is_empty(), "{policy:?}");
            assert_eq!(cache.get(&1), None, "{policy:?}");
        }
    }

    #[test]
    fn capacity_is_enforced() {
        let mut cache = CacheBuilder::new(2).build::<u64, u64>(PolicyKind::Lru);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&1));
    }

    #[test]
    fn try_build_rejects_degenerate_parameters() {
        assert!(
            CacheBuilder::new(10)
                .try_build::<u64, u64>(PolicyKind::LruK {
                    history_capacity: 10,
                    k: 0
                })
                .is_err()
        );
        assert!(
            CacheBuilder::new(10)
                .try_build::<u64, u64>(PolicyKind::Lfu { max_average: 0 })
                .is_err()
        );
        assert!(
            CacheBuilder::new(10)
                .try_build::<u64, u64>(PolicyKind::Arc {
                    transform_threshold: 0
                })
                .is_err()
        );
        assert!(
            CacheBuilder::new(10)
                .try_build::<u64, u64>(PolicyKind::Lru)
                .is_ok()
        );
    }
}
