//! Frequency bucket index: frequency → ordered list of entries.
//!
//! Entries carry a frequency counter; every observed frequency owns a
//! doubly-linked order list of the entries currently at that frequency.
//! Within a bucket the order is arrival order at that frequency, so the
//! front is the least-recently-promoted entry and is the eviction
//! victim when the bucket is the minimum.
//!
//! ```text
//!   buckets: FxHashMap<u64, Bucket>        entries: SlotArena<Entry>
//!
//!   freq 1 ──► [d]                          min_freq = 1
//!   freq 3 ──► [a] ◄──► [c]
//!   freq 7 ──► [b]
//!              front        back
//!              (evict)      (newest at this freq)
//! ```
//!
//! `rescale` supports frequency aging: every entry's counter drops by a
//! delta (floored at 1) and is repositioned, preserving relative order.
//!
//! All single-entry operations are O(1) except when the minimum bucket
//! empties, which costs a scan over the distinct frequencies present.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    freq: u64,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug, Default)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

/// Index of entries keyed both by `K` and by access frequency.
///
/// # Example
///
/// ```
/// use evictkit::ds::FrequencyBuckets;
///
/// let mut buckets = FrequencyBuckets::new();
/// buckets.insert("a", 1);
/// buckets.insert("b", 2);
/// buckets.touch(&"a"); // "a" now at frequency 2
///
/// // "b" is the minimum-frequency victim
/// let (key, value, freq) = buckets.pop_min().unwrap();
/// assert_eq!((key, value, freq), ("b", 2, 1));
/// ```
#[derive(Debug)]
pub struct FrequencyBuckets<K, V> {
    entries: SlotArena<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    buckets: FxHashMap<u64, Bucket>,
    min_freq: u64,
}

impl<K, V> FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            entries: SlotArena::new(),
            index: FxHashMap::default(),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    /// Creates an empty index with reserved entry capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SlotArena::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` has a live entry.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the frequency of `key`, if live.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| entry.freq)
    }

    /// Returns the smallest frequency with live entries, if any.
    pub fn min_freq(&self) -> Option<u64> {
        if self.min_freq == 0 { None } else { Some(self.min_freq) }
    }

    /// Returns a reference to the value stored for `key`.
    pub fn value(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| &entry.value)
    }

    /// Replaces the value for `key`, returning the previous one.
    pub fn set_value(&mut self, key: &K, value: V) -> Option<V> {
        let id = *self.index.get(key)?;
        self.entries
            .get_mut(id)
            .map(|entry| std::mem::replace(&mut entry.value, value))
    }

    /// Inserts `key` at frequency 1, appended to bucket 1.
    ///
    /// Returns `false` if the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }

        let id = self.entries.insert(Entry {
            key: key.clone(),
            value,
            freq: 1,
            prev: None,
            next: None,
        });
        self.index.insert(key, id);

        let bucket = self.buckets.entry(1).or_default();
        Self::list_push_back(&mut self.entries, bucket, id);
        self.min_freq = 1;
        true
    }

    /// Increments `key`'s frequency and repositions it; returns the new
    /// frequency.
    ///
    /// When the vacated bucket was the minimum and empties, the minimum
    /// advances to the new frequency (provably the smallest remaining).
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        let freq = self.entries.get(id)?.freq;

        if freq == u64::MAX {
            // Counter saturated: refresh position only.
            let bucket = self.buckets.get_mut(&freq)?;
            Self::list_detach(&mut self.entries, bucket, id);
            Self::list_push_back(&mut self.entries, bucket, id);
            return Some(freq);
        }

        let new_freq = freq + 1;
        self.detach_from_bucket(freq, id);
        if !self.buckets.contains_key(&freq) && self.min_freq == freq {
            self.min_freq = new_freq;
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.freq = new_freq;
        }
        let bucket = self.buckets.entry(new_freq).or_default();
        Self::list_push_back(&mut self.entries, bucket, id);

        Some(new_freq)
    }

    /// Removes and returns the front entry of the minimum bucket.
    pub fn pop_min(&mut self) -> Option<(K, V, u64)> {
        let freq = self.min_freq;
        if freq == 0 {
            return None;
        }

        let id = self.buckets.get(&freq)?.head?;
        self.detach_from_bucket(freq, id);
        if !self.buckets.contains_key(&freq) && self.min_freq == freq {
            self.min_freq = self.smallest_bucket();
        }

        let entry = self.entries.remove(id)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value, entry.freq))
    }

    /// Peeks at the current eviction victim without removing it.
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let id = self.buckets.get(&self.min_freq)?.head?;
        let entry = self.entries.get(id)?;
        Some((&entry.key, entry.freq))
    }

    /// Removes `key` outright, returning its value and frequency.
    pub fn remove(&mut self, key: &K) -> Option<(V, u64)> {
        let id = self.index.remove(key)?;
        let freq = self.entries.get(id)?.freq;

        self.detach_from_bucket(freq, id);
        if !self.buckets.contains_key(&freq) && self.min_freq == freq {
            self.min_freq = self.smallest_bucket();
        }

        self.entries.remove(id).map(|entry| (entry.value, entry.freq))
    }

    /// Reduces every frequency by `delta` (floored at 1), repositioning
    /// all entries while preserving relative order.
    ///
    /// Returns the sum of the post-rescale frequencies.
    pub fn rescale(&mut self, delta: u64) -> u64 {
        if self.is_empty() {
            return 0;
        }

        // Walk buckets in ascending frequency so the (freq, position)
        // ordering survives the merge into lower buckets.
        let mut freqs: Vec<u64> = self.buckets.keys().copied().collect();
        freqs.sort_unstable();

        let mut ordered = Vec::with_capacity(self.len());
        for freq in &freqs {
            let mut current = self.buckets[freq].head;
            while let Some(id) = current {
                ordered.push(id);
                current = self.entries.get(id).and_then(|entry| entry.next);
            }
        }

        self.buckets.clear();
        let mut total = 0u64;
        for id in ordered {
            let new_freq = {
                let entry = self.entries.get_mut(id).expect("rescaled entry missing");
                entry.freq = entry.freq.saturating_sub(delta).max(1);
                entry.prev = None;
                entry.next = None;
                entry.freq
            };
            total += new_freq;
            let bucket = self.buckets.entry(new_freq).or_default();
            Self::list_push_back(&mut self.entries, bucket, id);
        }

        self.min_freq = self.smallest_bucket();
        total
    }

    /// Drops every entry and bucket.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }

    fn smallest_bucket(&self) -> u64 {
        self.buckets.keys().copied().min().unwrap_or(0)
    }

    /// Detaches `id` from its bucket, erasing the bucket if it empties.
    fn detach_from_bucket(&mut self, freq: u64, id: SlotId) {
        let mut emptied = false;
        if let Some(bucket) = self.buckets.get_mut(&freq) {
            Self::list_detach(&mut self.entries, bucket, id);
            emptied = bucket.head.is_none();
        }
        if emptied {
            self.buckets.remove(&freq);
        }
    }

    fn list_push_back(entries: &mut SlotArena<Entry<K, V>>, bucket: &mut Bucket, id: SlotId) {
        let old_tail = bucket.tail;
        if let Some(entry) = entries.get_mut(id) {
            entry.prev = old_tail;
            entry.next = None;
        }
        match old_tail {
            Some(tail) => {
                if let Some(prev) = entries.get_mut(tail) {
                    prev.next = Some(id);
                }
            },
            None => bucket.head = Some(id),
        }
        bucket.tail = Some(id);
    }

    fn list_detach(entries: &mut SlotArena<Entry<K, V>>, bucket: &mut Bucket, id: SlotId) {
        let (prev, next) = match entries.get(id) {
            Some(entry) => (entry.prev, entry.next),
            None => return,
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_entry) = entries.get_mut(prev_id) {
                    prev_entry.next = next;
                }
            },
            None => bucket.head = next,
        }
        match next {
            Some(next_id) => {
                if let Some(next_entry) = entries.get_mut(next_id) {
                    next_entry.prev = prev;
                }
            },
            None => bucket.tail = prev,
        }

        if let Some(entry) = entries.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.len(), self.index.len());

        if self.is_empty() {
            assert!(self.buckets.is_empty());
            assert_eq!(self.min_freq, 0);
            return;
        }

        assert!(self.min_freq > 0);
        assert!(self.buckets.contains_key(&self.min_freq));
        assert_eq!(self.min_freq, self.smallest_bucket());

        let mut counted = 0usize;
        for (&freq, bucket) in &self.buckets {
            assert!(bucket.head.is_some());
            assert!(bucket.tail.is_some());

            let mut current = bucket.head;
            let mut last = None;
            while let Some(id) = current {
                let entry = self.entries.get(id).expect("bucket entry missing");
                assert_eq!(entry.freq, freq);
                assert_eq!(entry.prev, last);
                assert_eq!(self.index.get(&entry.key), Some(&id));
                last = Some(id);
                current = entry.next;
                counted += 1;
            }
            assert_eq!(bucket.tail, last);
        }
        assert_eq!(counted, self.len());
    }
}

impl<K, V> Default for FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_starts_at_frequency_one() {
        let mut buckets = FrequencyBuckets::new();
        assert!(buckets.insert("a", 10));
        assert!(!buckets.insert("a", 11));
        assert_eq!(buckets.frequency(&"a"), Some(1));
        assert_eq!(buckets.min_freq(), Some(1));
        assert_eq!(buckets.value(&"a"), Some(&10));
    }

    #[test]
    fn touch_moves_between_buckets() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a", 1);
        buckets.insert("b", 2);

        assert_eq!(buckets.touch(&"a"), Some(2));
        assert_eq!(buckets.touch(&"a"), Some(3));
        assert_eq!(buckets.frequency(&"a"), Some(3));
        assert_eq!(buckets.frequency(&"b"), Some(1));
        assert_eq!(buckets.min_freq(), Some(1));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn touch_advances_min_when_bucket_empties() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("only", 1);
        assert_eq!(buckets.min_freq(), Some(1));
        buckets.touch(&"only");
        assert_eq!(buckets.min_freq(), Some(2));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn peek_min_matches_next_victim() {
        let mut buckets = FrequencyBuckets::new();
        assert_eq!(buckets.peek_min(), None);
        buckets.insert("a", 1);
        buckets.insert("b", 2);
        buckets.touch(&"a");

        assert_eq!(buckets.peek_min(), Some((&"b", 1)));
        assert_eq!(buckets.pop_min().unwrap().0, "b");
    }

    #[test]
    fn pop_min_takes_least_recently_promoted() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("first", 1);
        buckets.insert("second", 2);
        buckets.insert("third", 3);

        // All at frequency 1: arrival order decides.
        assert_eq!(buckets.pop_min().unwrap().0, "first");
        assert_eq!(buckets.pop_min().unwrap().0, "second");
        assert_eq!(buckets.pop_min().unwrap().0, "third");
        assert_eq!(buckets.pop_min(), None);
        assert_eq!(buckets.min_freq(), None);
    }

    #[test]
    fn pop_min_recomputes_min_across_gap() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("cold", 1);
        buckets.insert("hot", 2);
        for _ in 0..4 {
            buckets.touch(&"hot");
        }

        assert_eq!(buckets.pop_min().unwrap().0, "cold");
        assert_eq!(buckets.min_freq(), Some(5));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn remove_arbitrary_entry() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a", 1);
        buckets.insert("b", 2);
        buckets.touch(&"b");

        assert_eq!(buckets.remove(&"b"), Some((2, 2)));
        assert_eq!(buckets.remove(&"b"), None);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets.min_freq(), Some(1));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn set_value_keeps_frequency() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a", 1);
        buckets.touch(&"a");
        assert_eq!(buckets.set_value(&"a", 9), Some(1));
        assert_eq!(buckets.value(&"a"), Some(&9));
        assert_eq!(buckets.frequency(&"a"), Some(2));
    }

    #[test]
    fn rescale_floors_at_one_and_preserves_order() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("cold", 0);
        buckets.insert("warm", 0);
        buckets.insert("hot", 0);
        for _ in 0..2 {
            buckets.touch(&"warm");
        }
        for _ in 0..9 {
            buckets.touch(&"hot");
        }
        // cold=1, warm=3, hot=10

        let total = buckets.rescale(4);
        assert_eq!(buckets.frequency(&"cold"), Some(1));
        assert_eq!(buckets.frequency(&"warm"), Some(1));
        assert_eq!(buckets.frequency(&"hot"), Some(6));
        assert_eq!(total, 8);
        assert_eq!(buckets.min_freq(), Some(1));

        // Within the merged minimum bucket, the colder entry still
        // evicts first.
        assert_eq!(buckets.pop_min().unwrap().0, "cold");
        assert_eq!(buckets.pop_min().unwrap().0, "warm");
        assert_eq!(buckets.pop_min().unwrap().0, "hot");
    }

    #[test]
    fn clear_resets_everything() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a", 1);
        buckets.touch(&"a");
        buckets.clear();
        assert!(buckets.is_empty());
        assert_eq!(buckets.min_freq(), None);
        assert_eq!(buckets.pop_min(), None);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn invariants_hold_after_churn() {
        let mut buckets = FrequencyBuckets::new();
        for i in 0..32u32 {
            buckets.insert(i, i);
        }
        for i in 0..32u32 {
            for _ in 0..(i % 5) {
                buckets.touch(&i);
            }
        }
        for i in (0..32u32).step_by(3) {
            buckets.remove(&i);
        }
        buckets.rescale(1);
        for _ in 0..5 {
            buckets.pop_min();
        }
        buckets.debug_validate_invariants();
    }
}
