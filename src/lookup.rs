//! Multi-key memo lookup engine.
//!
//! Memoizes one result per distinct *ordered* key sequence. Each key position
//! is one level of a trie; each level maps a comparator hash to a bucket of
//! entries that are told apart with the comparator's `equals`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                        MemoLookup<K, V> Layout                              │
//! │                                                                             │
//! │   empty_keys: Slot<V>            (the zero-length key sequence)             │
//! │                                                                             │
//! │   levels: Vec<EntryCollection>   entries: EntryArena<Entry<K, V>>           │
//! │                                                                             │
//! │   levels[0] (position 0)                                                    │
//! │   ┌────────────────────────┐      #0 { key: 5, children: 1, Pending }       │
//! │   │ h(5) → [#0]            │─────►#2 { key: 2, children: 2, Pending }       │
//! │   │ h(2) → [#2]            │                                              │
//! │   └────────────────────────┘                                              │
//! │   levels[1] (position 1, under #0)                                          │
//! │   ┌────────────────────────┐      #1 { key: 3, children: -, Computed(2) }   │
//! │   │ h(3) → [#1]            │                                              │
//! │   └────────────────────────┘                                              │
//! │   levels[2] (position 1, under #2)                                          │
//! │   ┌────────────────────────┐      #3 { key: 1, children: -, Computed(1) }   │
//! │   │ h(1) → [#3]            │                                              │
//! │   └────────────────────────┘                                              │
//! │                                                                             │
//! │   State after get_or_add([5, 3]) and get_or_add([2, 1]) with a - b          │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lookup Flow
//!
//! ```text
//!   get_or_add(keys, comparators, compute):
//!     keys empty → use empty_keys slot
//!     for position i in 0..len:
//!       c = comparators.at(i)            (override or default)
//!       bucket = level[c.hash(keys[i])]
//!       entry = first e in bucket with c.equals(keys[i], e.key)
//!               or append a new Pending entry
//!       descend into entry's child level (created lazily) unless last
//!     last entry's slot:
//!       Computed(v) → v
//!       Pending     → compute(keys)  (full key sequence)
//!                     Ok(v)  → Computed(v), return v
//!                     Err(e) → stays Pending, return e
//! ```
//!
//! ## Key Components
//!
//! - [`Slot`]: two-state result cell, `Pending` or `Computed(V)`.
//! - [`SlotRef`]: handle to a resolved slot, used by re-entrant adapters.
//! - [`MemoLookup`]: the trie itself.
//!
//! ## Operations
//!
//! | Operation         | Cost                                  | Notes                        |
//! |-------------------|---------------------------------------|------------------------------|
//! | `get_or_add`      | O(len × bucket scan)                  | creates missing entries      |
//! | `try_get_or_add`  | O(len × bucket scan)                  | `Err` is never memoized      |
//! | `get`             | O(len × bucket scan)                  | probe, creates nothing       |
//! | `resolve`         | O(len × bucket scan)                  | walk only, no compute        |
//! | `fill`            | O(1)                                  | first value wins             |
//!
//! ## Re-entrancy
//!
//! `get_or_add` holds `&mut self` while `compute` runs, so `compute` cannot
//! reach the same engine. Callers that need recursion split the call:
//! [`resolve`](MemoLookup::resolve), release the engine, compute, then
//! [`fill`](MemoLookup::fill). Entries are never moved or removed, so a
//! [`SlotRef`] stays valid across the gap.
//!
//! ## Thread Safety
//!
//! Not synchronized. See [`SyncMemoCell`](crate::memoize::SyncMemoCell)
//! (feature `concurrency`) for a lock-protected wrapper.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::comparator::ComparatorSet;
//! use memokit::lookup::MemoLookup;
//!
//! let comparators = ComparatorSet::<i64>::new();
//! let mut lookup = MemoLookup::new();
//! let mut calls = 0;
//!
//! for keys in [[5, 3], [2, 1], [5, 3], [2, 1]] {
//!     let value = *lookup.get_or_add(&keys, &comparators, |k| {
//!         calls += 1;
//!         k[0] - k[1]
//!     });
//!     assert_eq!(value, keys[0] - keys[1]);
//! }
//! assert_eq!(calls, 2);
//! ```

use std::convert::Infallible;
use std::fmt::Debug;

use tracing::{debug, trace};

use crate::comparator::{Comparator, ComparatorSet, HashCode};
use crate::ds::{EntryArena, EntryCollection, EntryId};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::MemoMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::MemoMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    MemoMetricsReadRecorder, MemoMetricsRecorder, MetricsSnapshotProvider,
};

const ROOT_LEVEL: usize = 0;

/// Result cell of a memo entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot<V> {
    /// Not computed yet (or every attempt so far failed).
    #[default]
    Pending,
    Computed(V),
}

impl<V> Slot<V> {
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending)
    }

    #[inline]
    pub fn is_computed(&self) -> bool {
        matches!(self, Slot::Computed(_))
    }

    #[inline]
    pub fn value(&self) -> Option<&V> {
        match self {
            Slot::Computed(value) => Some(value),
            Slot::Pending => None,
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            Slot::Computed(value) => Some(value),
            Slot::Pending => None,
        }
    }

    /// Stores `value` if pending. Returns the stored value and whether
    /// `value` was the one stored.
    fn fill(&mut self, value: V) -> (&V, bool) {
        let stored = match self {
            Slot::Pending => {
                *self = Slot::Computed(value);
                true
            }
            Slot::Computed(_) => false,
        };
        let Slot::Computed(kept) = self else {
            unreachable!("pending slot is written before this point")
        };
        (&*kept, stored)
    }
}

/// Handle to the result slot a key sequence resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRef {
    /// The slot of the zero-length key sequence.
    EmptyKeys,
    /// The slot of the entry for the last key position.
    Entry(EntryId),
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    /// Key position this entry sits at.
    position: usize,
    /// Level holding entries for `position + 1`, created on first descent.
    children: Option<usize>,
    slot: Slot<V>,
}

/// Trie of memoized results keyed by ordered key sequences.
#[derive(Debug)]
pub struct MemoLookup<K, V> {
    entries: EntryArena<Entry<K, V>>,
    levels: Vec<EntryCollection>,
    empty_keys: Slot<V>,
    computed: usize,
    #[cfg(feature = "metrics")]
    metrics: MemoMetrics,
}

impl<K, V> MemoLookup<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Preallocates room for `capacity` root-level entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: EntryArena::with_capacity(capacity),
            levels: vec![EntryCollection::with_capacity(capacity)],
            empty_keys: Slot::Pending,
            computed: 0,
            #[cfg(feature = "metrics")]
            metrics: MemoMetrics::default(),
        }
    }

    /// Number of trie entries across all positions.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of slots holding a computed value, the zero-length slot included.
    pub fn computed_count(&self) -> usize {
        self.computed
    }

    /// Number of trie levels, the root included.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Returns `true` if nothing has been memoized and no entry exists.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.empty_keys.is_pending()
    }

    /// Result slot behind `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was resolved by a different engine.
    pub fn slot(&self, slot: SlotRef) -> &Slot<V> {
        match slot {
            SlotRef::EmptyKeys => &self.empty_keys,
            SlotRef::Entry(id) => &self.entries[id].slot,
        }
    }

    /// Stores `value` in `slot` unless it is already computed, and returns
    /// the stored value. A computed slot is never overwritten.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was resolved by a different engine.
    pub fn fill(&mut self, slot: SlotRef, value: V) -> &V {
        let target = match slot {
            SlotRef::EmptyKeys => &mut self.empty_keys,
            SlotRef::Entry(id) => &mut self.entries[id].slot,
        };
        let (stored_value, stored) = target.fill(value);
        if stored {
            self.computed += 1;
            #[cfg(feature = "metrics")]
            self.metrics.record_compute();
        } else {
            #[cfg(feature = "metrics")]
            self.metrics.record_fill_refused();
            debug!(?slot, "memo slot already computed; keeping first value");
        }
        stored_value
    }

    /// Records that computing the value for `slot` failed. The slot stays
    /// pending, so the next lookup of the same keys computes again.
    pub fn abandon(&mut self, slot: SlotRef) {
        #[cfg(feature = "metrics")]
        self.metrics.record_compute_failure();
        debug!(?slot, "memo computation failed; slot left pending");
    }

    /// Value behind a slot already known to be computed.
    fn stored(&self, slot: SlotRef) -> &V {
        let Slot::Computed(value) = self.slot(slot) else {
            unreachable!("slot {slot:?} checked as computed")
        };
        value
    }

    fn child_level(&mut self, id: EntryId) -> usize {
        if let Some(level) = self.entries[id].children {
            return level;
        }
        let level = self.levels.len();
        self.levels.push(EntryCollection::new());
        self.entries[id].children = Some(level);
        level
    }

    /// First entry in the `hash` bucket of `level` equal to `key`, and the
    /// number of comparisons it took.
    fn scan(
        &self,
        level: usize,
        hash: HashCode,
        key: &K,
        comparator: &dyn Comparator<K>,
    ) -> (Option<EntryId>, u64) {
        let mut steps = 0;
        for &id in self.levels[level].bucket(hash) {
            steps += 1;
            if comparator.equals(key, &self.entries[id].key) {
                return (Some(id), steps);
            }
        }
        (None, steps)
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MemoMetricsSnapshot {
        MemoMetricsSnapshot {
            lookups: self.metrics.lookups,
            hits: self.metrics.hits,
            misses: self.metrics.misses,
            computes: self.metrics.computes,
            compute_failures: self.metrics.compute_failures,
            fills_refused: self.metrics.fills_refused,
            entries_created: self.metrics.entries_created,
            collisions: self.metrics.collisions,
            scan_steps: self.metrics.scan_steps,
            probes: self.metrics.probes.get(),
            probe_hits: self.metrics.probe_hits.get(),
            entries: self.entries.len(),
            computed: self.computed,
            levels: self.levels.len(),
        }
    }
}

impl<K, V> MemoLookup<K, V>
where
    K: Clone,
{
    /// Returns the memoized value for `keys`, running `compute` with the full
    /// key sequence if there is none yet.
    pub fn get_or_add<F>(&mut self, keys: &[K], comparators: &ComparatorSet<K>, compute: F) -> &V
    where
        F: FnOnce(&[K]) -> V,
    {
        match self.try_get_or_add(keys, comparators, |keys| {
            Ok::<V, Infallible>(compute(keys))
        }) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_add`](Self::get_or_add) with a fallible `compute`.
    ///
    /// An `Err` is handed back unchanged and nothing is stored: the next call
    /// with equal keys runs `compute` again.
    pub fn try_get_or_add<E, F>(
        &mut self,
        keys: &[K],
        comparators: &ComparatorSet<K>,
        compute: F,
    ) -> Result<&V, E>
    where
        F: FnOnce(&[K]) -> Result<V, E>,
    {
        let slot = self.resolve(keys, comparators);
        if self.slot(slot).is_pending() {
            trace!(arity = keys.len(), ?slot, "computing memo value");
            return match compute(keys) {
                Ok(value) => Ok(self.fill(slot, value)),
                Err(err) => {
                    self.abandon(slot);
                    Err(err)
                },
            };
        }
        Ok(self.stored(slot))
    }

    /// Walks the trie for `keys`, creating missing entries, and returns the
    /// result slot at the end of the path. Nothing is computed.
    pub fn resolve(&mut self, keys: &[K], comparators: &ComparatorSet<K>) -> SlotRef {
        let Some(last) = keys.len().checked_sub(1) else {
            self.record_lookup(SlotRef::EmptyKeys);
            return SlotRef::EmptyKeys;
        };

        let mut level = ROOT_LEVEL;
        for (position, key) in keys[..last].iter().enumerate() {
            let id = self.find_or_insert(level, position, key, comparators.at(position));
            level = self.child_level(id);
        }
        let id = self.find_or_insert(level, last, &keys[last], comparators.at(last));

        let slot = SlotRef::Entry(id);
        self.record_lookup(slot);
        slot
    }

    fn find_or_insert(
        &mut self,
        level: usize,
        position: usize,
        key: &K,
        comparator: &dyn Comparator<K>,
    ) -> EntryId {
        let hash = comparator.hash(key);
        let (found, _steps) = self.scan(level, hash, key, comparator);
        #[cfg(feature = "metrics")]
        for _ in 0.._steps {
            self.metrics.record_scan_step();
        }
        if let Some(id) = found {
            return id;
        }

        let id = self.entries.insert(Entry {
            key: key.clone(),
            position,
            children: None,
            slot: Slot::Pending,
        });
        let bucket_len = self.levels[level].push(hash, id);
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_entry_created();
            if bucket_len > 0 {
                self.metrics.record_collision();
            }
        }
        trace!(position, hash, bucket_len = bucket_len + 1, "memo entry created");
        id
    }

    #[cfg(feature = "metrics")]
    fn record_lookup(&mut self, slot: SlotRef) {
        if self.slot(slot).is_pending() {
            self.metrics.record_miss();
        } else {
            self.metrics.record_hit();
        }
    }

    #[cfg(not(feature = "metrics"))]
    fn record_lookup(&mut self, _slot: SlotRef) {}
}

impl<K, V> MemoLookup<K, V> {
    /// Returns the memoized value for `keys` without creating entries.
    pub fn get(&self, keys: &[K], comparators: &ComparatorSet<K>) -> Option<&V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_probe();

        let slot = if keys.is_empty() {
            &self.empty_keys
        } else {
            let mut level = Some(ROOT_LEVEL);
            let mut found = None;
            for (position, key) in keys.iter().enumerate() {
                let comparator = comparators.at(position);
                let (id, _) = self.scan(level?, comparator.hash(key), key, comparator);
                let id = id?;
                level = self.entries[id].children;
                found = Some(id);
            }
            &self.entries[found?].slot
        };

        let value = slot.value();
        #[cfg(feature = "metrics")]
        if value.is_some() {
            self.metrics.record_probe_hit();
        }
        value
    }

    /// Verifies the trie structure against `comparators`.
    ///
    /// Checks that every entry is reachable exactly once, sits at the
    /// position of its level, lives in the bucket of its own hash, and is not
    /// `equals` to an older entry in the same bucket; and that the computed
    /// count matches the slots. Only meaningful for comparators that honor
    /// the hash/equals contract.
    pub fn check_invariants(&self, comparators: &ComparatorSet<K>) -> Result<(), InvariantError>
    where
        K: Debug,
    {
        if self.levels.is_empty() {
            return Err(InvariantError::new("root level missing"));
        }

        let mut level_position: Vec<Option<usize>> = vec![None; self.levels.len()];
        level_position[ROOT_LEVEL] = Some(0);
        for (id, entry) in self.entries.iter() {
            let Some(child) = entry.children else {
                continue;
            };
            if child == ROOT_LEVEL || child >= self.levels.len() {
                return Err(InvariantError::new(format!(
                    "entry {:?} points at invalid child level {}",
                    id, child
                )));
            }
            if level_position[child].is_some() {
                return Err(InvariantError::new(format!(
                    "level {} has more than one parent",
                    child
                )));
            }
            level_position[child] = Some(entry.position + 1);
        }

        let mut seen = vec![false; self.entries.len()];
        for (level, collection) in self.levels.iter().enumerate() {
            let Some(position) = level_position[level] else {
                return Err(InvariantError::new(format!(
                    "level {} is not reachable from the root",
                    level
                )));
            };
            let comparator = comparators.at(position);
            let mut level_len = 0;
            for (hash, bucket) in collection.iter() {
                for (i, &id) in bucket.iter().enumerate() {
                    let entry = self.entries.get(id).ok_or_else(|| {
                        InvariantError::new(format!("level {}: stale entry {:?}", level, id))
                    })?;
                    if std::mem::replace(&mut seen[id.index()], true) {
                        return Err(InvariantError::new(format!(
                            "entry {:?} reachable more than once",
                            id
                        )));
                    }
                    if entry.position != position {
                        return Err(InvariantError::new(format!(
                            "entry {:?} has position {} in a level for position {}",
                            id, entry.position, position
                        )));
                    }
                    if comparator.hash(&entry.key) != hash {
                        return Err(InvariantError::new(format!(
                            "entry {:?} with key {:?} is in bucket {:#x} but hashes elsewhere",
                            id, entry.key, hash
                        )));
                    }
                    for &older in &bucket[..i] {
                        if comparator.equals(&entry.key, &self.entries[older].key) {
                            return Err(InvariantError::new(format!(
                                "entries {:?} and {:?} have equal keys {:?}",
                                older, id, entry.key
                            )));
                        }
                    }
                    level_len += 1;
                }
            }
            if level_len != collection.len() {
                return Err(InvariantError::new(format!(
                    "level {} counts {} entries but buckets hold {}",
                    level,
                    collection.len(),
                    level_len
                )));
            }
        }

        if let Some(orphan) = seen.iter().position(|reached| !reached) {
            return Err(InvariantError::new(format!(
                "entry #{} is not in any bucket",
                orphan
            )));
        }

        let computed = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.slot.is_computed())
            .count()
            + usize::from(self.empty_keys.is_computed());
        if computed != self.computed {
            return Err(InvariantError::new(format!(
                "computed count {} != computed slots {}",
                self.computed, computed
            )));
        }

        Ok(())
    }
}

impl<K, V> Default for MemoLookup<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<MemoMetricsSnapshot> for MemoLookup<K, V> {
    fn snapshot(&self) -> MemoMetricsSnapshot {
        self.metrics_snapshot()
    }
}
