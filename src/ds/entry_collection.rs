//! One level of the memo trie: hash code → bucket of entry handles.
//!
//! ## Architecture
//!
//! ```text
//!   EntryCollection (one key position)
//!   ┌───────────────────────────────────────────────────────┐
//!   │ buckets: FxHashMap<HashCode, Vec<EntryId>>            │
//!   │                                                       │
//!   │   hash 0x4000..  → [ #3 ]                             │
//!   │   hash NaN       → [ #0, #5, #9 ]   (collisions)      │
//!   │   hash 0         → [ #1 ]                             │
//!   └───────────────────────────────────────────────────────┘
//! ```
//!
//! Buckets keep insertion order; the lookup engine scans them front to back
//! and the first entry whose key `equals` the probe wins. The collection only
//! stores handles: keys and results live in the engine's
//! [`EntryArena`](crate::ds::EntryArena).

use rustc_hash::FxHashMap;

use crate::comparator::HashCode;
use crate::ds::entry_arena::EntryId;

#[derive(Debug, Default)]
pub struct EntryCollection {
    buckets: FxHashMap<HashCode, Vec<EntryId>>,
    len: usize,
}

impl EntryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(buckets: usize) -> Self {
        Self {
            buckets: FxHashMap::with_capacity_and_hasher(buckets, Default::default()),
            len: 0,
        }
    }

    /// Entries sharing `hash`, oldest first. Empty if none.
    #[inline]
    pub fn bucket(&self, hash: HashCode) -> &[EntryId] {
        self.buckets
            .get(&hash)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Appends `id` to the bucket for `hash`, creating the bucket if needed.
    /// Returns the bucket length before the push.
    pub fn push(&mut self, hash: HashCode, id: EntryId) -> usize {
        let bucket = self.buckets.entry(hash).or_default();
        let before = bucket.len();
        bucket.push(id);
        self.len += 1;
        before
    }

    /// Total entries across all buckets.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Length of the longest bucket.
    pub fn max_bucket_len(&self) -> usize {
        self.buckets.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HashCode, &[EntryId])> {
        self.buckets
            .iter()
            .map(|(hash, ids)| (*hash, ids.as_slice()))
    }
}
