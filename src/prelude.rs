pub use crate::builder::{Cache, CacheBuilder, PolicyKind};
pub use crate::concurrent::{
    ConcurrentArcCache, ConcurrentCache, ConcurrentLfuCache, ConcurrentLruCache,
    ConcurrentLrukCache,
};
pub use crate::ds::{FrequencyBuckets, GhostList, LinkedList, ShardSelector, SlotArena, SlotId};
pub use crate::policy::{ArcCache, LfuCache, LruCache, LrukCache};
pub use crate::sharded::ShardedCache;
pub use crate::traits::{CachePolicy, ConcurrentPolicy, GhostTracked};
