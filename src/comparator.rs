//! Equality/hash contracts used to identify a key at one trie position.
//!
//! ## Architecture
//!
//! ```text
//!   ComparatorSet<K>
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ overrides: [ None, Some(parity), None ]   default: Strict    │
//!   │              pos 0  pos 1         pos 2                      │
//!   └──────────────────────────────────────────────────────────────┘
//!
//!   at(0) → Strict     (gap)
//!   at(1) → parity     (override)
//!   at(2) → Strict     (gap)
//!   at(7) → Strict     (past the end)
//! ```
//!
//! A [`Comparator`] must satisfy `equals(a, b) ⇒ hash(a) == hash(b)`. Nothing
//! else is required: the hash may collide freely, since the lookup engine
//! always confirms a bucket match with `equals`. A comparator that breaks the
//! contract only causes extra recomputation or missed hits, never a crash.
//!
//! ## Key Components
//!
//! - [`StrictEquality`]: default; `PartialEq` for equality and the coerced
//!   numeric value for the hash.
//! - [`HashEquality`]: `Hash + Eq` keys hashed with `FxHasher`.
//! - [`FnComparator`] / [`comparator`]: a comparator built from two closures.
//! - [`ComparatorSet`]: sparse per-position overrides plus a default.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::comparator::{comparator, Comparator, ComparatorSet};
//!
//! let parity = comparator(
//!     |n: &i64| n.rem_euclid(2) as u64,
//!     |a: &i64, b: &i64| a.rem_euclid(2) == b.rem_euclid(2),
//! );
//!
//! let mut set = ComparatorSet::<i64>::new();
//! set.set(1, parity);
//!
//! assert!(!set.at(0).equals(&2, &4));
//! assert!(set.at(1).equals(&2, &4));
//! ```

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use rustc_hash::FxBuildHasher;

use crate::value::NumericCoerce;

/// Hash value produced by a [`Comparator`].
pub type HashCode = u64;

/// Hash and equality for keys at one position.
pub trait Comparator<K: ?Sized>: Send + Sync {
    /// Hash code for `key`. Equal keys must produce equal hash codes.
    fn hash(&self, key: &K) -> HashCode;

    /// Returns `true` if `a` and `b` identify the same key.
    fn equals(&self, a: &K, b: &K) -> bool;
}

impl<K: ?Sized, C: Comparator<K> + ?Sized> Comparator<K> for Arc<C> {
    #[inline]
    fn hash(&self, key: &K) -> HashCode {
        (**self).hash(key)
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (**self).equals(a, b)
    }
}

/// Maps a coerced number to a bucket: all NaNs share one code, `-0.0` is `0.0`.
#[inline]
pub fn numeric_hash(n: f64) -> HashCode {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0
    } else {
        n.to_bits()
    }
}

// ---------------------------------------------------------------------------
// Built-in comparators
// ---------------------------------------------------------------------------

/// Strict equality with a numeric-coercion hash.
///
/// Values that do not coerce to a number all land in the `NaN` bucket and
/// are told apart by `equals` alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrictEquality;

impl<K> Comparator<K> for StrictEquality
where
    K: NumericCoerce + PartialEq + ?Sized,
{
    #[inline]
    fn hash(&self, key: &K) -> HashCode {
        numeric_hash(key.to_number())
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Std `Hash + Eq` keys, hashed with `FxHasher`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashEquality;

impl<K> Comparator<K> for HashEquality
where
    K: Hash + Eq + ?Sized,
{
    #[inline]
    fn hash(&self, key: &K) -> HashCode {
        FxBuildHasher.hash_one(key)
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Comparator assembled from a hash closure and an equality closure.
#[derive(Clone, Copy)]
pub struct FnComparator<H, E> {
    hash: H,
    equals: E,
}

impl<H, E> fmt::Debug for FnComparator<H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComparator").finish_non_exhaustive()
    }
}

impl<K, H, E> Comparator<K> for FnComparator<H, E>
where
    K: ?Sized,
    H: Fn(&K) -> HashCode + Send + Sync,
    E: Fn(&K, &K) -> bool + Send + Sync,
{
    #[inline]
    fn hash(&self, key: &K) -> HashCode {
        (self.hash)(key)
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (self.equals)(a, b)
    }
}

/// Builds a comparator from closures.
pub fn comparator<K, H, E>(hash: H, equals: E) -> FnComparator<H, E>
where
    K: ?Sized,
    H: Fn(&K) -> HashCode + Send + Sync,
    E: Fn(&K, &K) -> bool + Send + Sync,
{
    FnComparator { hash, equals }
}

// ---------------------------------------------------------------------------
// ComparatorSet
// ---------------------------------------------------------------------------

/// Shared, type-erased comparator.
pub type SharedComparator<K> = Arc<dyn Comparator<K>>;

/// Sparse, position-aligned comparators with a fallback default.
pub struct ComparatorSet<K: ?Sized> {
    overrides: Vec<Option<SharedComparator<K>>>,
    default: SharedComparator<K>,
}

impl<K> ComparatorSet<K>
where
    K: NumericCoerce + PartialEq + ?Sized + 'static,
{
    /// Empty set falling back to [`StrictEquality`] everywhere.
    pub fn new() -> Self {
        Self::with_default(StrictEquality)
    }

    /// Builds a set from a position-aligned sequence where `None` is a gap.
    pub fn from_sparse<I>(comparators: I) -> Self
    where
        I: IntoIterator<Item = Option<SharedComparator<K>>>,
    {
        let mut set = Self::new();
        set.overrides = comparators.into_iter().collect();
        set.trim();
        set
    }
}

impl<K> Default for ComparatorSet<K>
where
    K: NumericCoerce + PartialEq + ?Sized + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ?Sized + 'static> ComparatorSet<K> {
    /// Empty set falling back to `default` everywhere.
    pub fn with_default(default: impl Comparator<K> + 'static) -> Self {
        Self {
            overrides: Vec::new(),
            default: Arc::new(default),
        }
    }

    /// Overrides the comparator for `position`. Returns the previous override.
    pub fn set(
        &mut self,
        position: usize,
        comparator: impl Comparator<K> + 'static,
    ) -> Option<SharedComparator<K>> {
        self.set_shared(position, Arc::new(comparator))
    }

    /// Like [`set`](Self::set) for an already shared comparator.
    pub fn set_shared(
        &mut self,
        position: usize,
        comparator: SharedComparator<K>,
    ) -> Option<SharedComparator<K>> {
        if self.overrides.len() <= position {
            self.overrides.resize_with(position + 1, || None);
        }
        self.overrides[position].replace(comparator)
    }

    /// Removes the override for `position`, restoring the default there.
    pub fn clear(&mut self, position: usize) -> Option<SharedComparator<K>> {
        let previous = self.overrides.get_mut(position)?.take();
        self.trim();
        previous
    }

    /// Replaces the fallback comparator.
    pub fn set_default(&mut self, default: impl Comparator<K> + 'static) {
        self.set_default_shared(Arc::new(default));
    }

    /// Like [`set_default`](Self::set_default) for an already shared comparator.
    pub fn set_default_shared(&mut self, default: SharedComparator<K>) {
        self.default = default;
    }

    fn trim(&mut self) {
        while matches!(self.overrides.last(), Some(None)) {
            self.overrides.pop();
        }
    }
}

impl<K: ?Sized> ComparatorSet<K> {
    /// Comparator that governs `position`.
    #[inline]
    pub fn at(&self, position: usize) -> &dyn Comparator<K> {
        match self.overrides.get(position) {
            Some(Some(comparator)) => comparator.as_ref(),
            _ => self.default.as_ref(),
        }
    }

    /// Returns `true` if `position` has its own comparator.
    pub fn is_overridden(&self, position: usize) -> bool {
        matches!(self.overrides.get(position), Some(Some(_)))
    }

    /// Number of overridden positions.
    pub fn overrides(&self) -> usize {
        self.overrides.iter().filter(|c| c.is_some()).count()
    }

    /// One past the highest overridden position.
    pub fn span(&self) -> usize {
        self.overrides.len()
    }

    /// Returns `true` if the fallback is the `other` instance itself.
    pub(crate) fn default_is(&self, other: &SharedComparator<K>) -> bool {
        Arc::ptr_eq(&self.default, other)
    }
}

impl<K: ?Sized> Clone for ComparatorSet<K> {
    fn clone(&self) -> Self {
        Self {
            overrides: self.overrides.clone(),
            default: Arc::clone(&self.default),
        }
    }
}

impl<K: ?Sized> fmt::Debug for ComparatorSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let positions: Vec<usize> = self
            .overrides
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|_| i))
            .collect();
        f.debug_struct("ComparatorSet")
            .field("overridden_positions", &positions)
            .finish_non_exhaustive()
    }
}
