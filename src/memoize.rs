//! Function adapters over [`MemoLookup`].
//!
//! These turn a function into its memoized counterpart: the call's arguments
//! become the key sequence, the original function becomes the compute
//! callback, and the adapter owns one lookup engine for as long as the
//! memoized function lives.
//!
//! ## Calling conventions
//!
//! ```text
//!   Uniform (any arity, one key type)       Fixed arity (typed arguments)
//!   ────────────────────────────────       ──────────────────────────────
//!   Memoized<K, V, E>                       memoize0 .. memoize4
//!     call(&[K]) -> V                         impl Fn(A, B, ..) -> R
//!     try_call(&[K]) -> Result<V, E>          keys: [A.into(), B.into(), ..]
//!     recursive(|this, keys| ..)              (Value keys)
//! ```
//!
//! [`Memoized`] takes the whole argument list as a slice, so one wrapper type
//! covers every arity; [`Value`] makes the slice heterogeneous when needed.
//! The `memoizeN` functions keep a typed signature for a fixed number of
//! arguments and convert each argument to a [`Value`] key.
//!
//! ## Re-entrancy
//!
//! [`MemoCell`] resolves the slot, releases the engine, runs the compute
//! callback, then re-acquires the engine to store the result. The callback is
//! therefore free to call back into the same memoized function, which is what
//! makes [`Memoized::recursive`] reuse its own sub-results.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::memoize::{memoize2, Memoized};
//!
//! let sub = memoize2(|a: i64, b: i64| a - b);
//! assert_eq!(sub(5, 3), 2);
//! assert_eq!(sub(5, 3), 2);
//!
//! let fib: Memoized<u64, u64> = Memoized::recursive(|fib: &Memoized<u64, u64>, keys: &[u64]| {
//!     let n = keys[0];
//!     if n < 2 { n } else { fib.call(&[n - 1]) + fib.call(&[n - 2]) }
//! });
//! assert_eq!(fib.call(&[90]), 2_880_067_194_370_816_120);
//! assert_eq!(fib.computed_count(), 91);
//! ```

use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt::{self, Debug};

use crate::comparator::ComparatorSet;
use crate::error::InvariantError;
use crate::lookup::MemoLookup;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::MemoMetricsSnapshot;
use crate::value::{NumericCoerce, Value};

// ---------------------------------------------------------------------------
// MemoCell
// ---------------------------------------------------------------------------

/// A lookup engine bound to its comparators, callable through `&self`.
pub struct MemoCell<K, V> {
    lookup: RefCell<MemoLookup<K, V>>,
    comparators: ComparatorSet<K>,
}

impl<K, V> MemoCell<K, V> {
    pub fn new(comparators: ComparatorSet<K>) -> Self {
        Self::with_lookup(MemoLookup::new(), comparators)
    }

    /// Wraps an existing (possibly preallocated) engine.
    pub fn with_lookup(lookup: MemoLookup<K, V>, comparators: ComparatorSet<K>) -> Self {
        Self {
            lookup: RefCell::new(lookup),
            comparators,
        }
    }

    pub fn comparators(&self) -> &ComparatorSet<K> {
        &self.comparators
    }

    pub fn entry_count(&self) -> usize {
        self.lookup.borrow().entry_count()
    }

    pub fn computed_count(&self) -> usize {
        self.lookup.borrow().computed_count()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        K: Debug,
    {
        self.lookup.borrow().check_invariants(&self.comparators)
    }

    pub fn into_lookup(self) -> MemoLookup<K, V> {
        self.lookup.into_inner()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MemoMetricsSnapshot {
        self.lookup.borrow().metrics_snapshot()
    }
}

impl<K, V> MemoCell<K, V>
where
    K: Clone,
    V: Clone,
{
    /// Memoized value for `keys`; `compute` runs without the engine borrowed.
    pub fn get_or_compute<F>(&self, keys: &[K], compute: F) -> V
    where
        F: FnOnce(&[K]) -> V,
    {
        match self.get_or_try_compute(keys, |keys| Ok::<V, Infallible>(compute(keys))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`get_or_compute`](Self::get_or_compute). An `Err`
    /// is returned as is and nothing is stored.
    pub fn get_or_try_compute<E, F>(&self, keys: &[K], compute: F) -> Result<V, E>
    where
        F: FnOnce(&[K]) -> Result<V, E>,
    {
        let slot = {
            let mut lookup = self.lookup.borrow_mut();
            let slot = lookup.resolve(keys, &self.comparators);
            if let Some(value) = lookup.slot(slot).value() {
                return Ok(value.clone());
            }
            slot
        };

        match compute(keys) {
            Ok(value) => Ok(self.lookup.borrow_mut().fill(slot, value).clone()),
            Err(err) => {
                self.lookup.borrow_mut().abandon(slot);
                Err(err)
            },
        }
    }

    /// Memoized value for `keys` if there is one. Creates no entries.
    pub fn get(&self, keys: &[K]) -> Option<V> {
        self.lookup
            .borrow()
            .get(keys, &self.comparators)
            .cloned()
    }
}

impl<K, V> Debug for MemoCell<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lookup = self.lookup.try_borrow();
        let mut s = f.debug_struct("MemoCell");
        match lookup {
            Ok(lookup) => s
                .field("entries", &lookup.entry_count())
                .field("computed", &lookup.computed_count()),
            Err(_) => s.field("entries", &"<computing>"),
        };
        s.field("comparators", &self.comparators).finish()
    }
}

// ---------------------------------------------------------------------------
// Memoized
// ---------------------------------------------------------------------------

type Body<K, V, E> = dyn Fn(&Memoized<K, V, E>, &[K]) -> Result<V, E>;

/// A memoized function over a uniform key slice.
///
/// Equivalent of wrapping a function once: every distinct (under the
/// comparators) argument sequence is computed at most once per `Memoized`
/// and later calls return the stored value. Errors from a fallible function
/// are returned but never stored.
pub struct Memoized<K, V, E = Infallible> {
    cell: MemoCell<K, V>,
    body: Box<Body<K, V, E>>,
}

impl<K, V> Memoized<K, V, Infallible>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    /// Memoizes `f` with the default comparator at every position.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[K]) -> V + 'static,
        K: NumericCoerce + PartialEq,
    {
        Self::with_comparators(f, ComparatorSet::new())
    }

    pub fn with_comparators<F>(f: F, comparators: ComparatorSet<K>) -> Self
    where
        F: Fn(&[K]) -> V + 'static,
    {
        Self::from_parts(
            MemoCell::new(comparators),
            Box::new(move |_: &Self, keys: &[K]| Ok(f(keys))),
        )
    }

    /// Memoizes a recursive function. `f` receives the memoized function
    /// itself and should recurse through it so sub-results are shared.
    pub fn recursive<F>(f: F) -> Self
    where
        F: Fn(&Self, &[K]) -> V + 'static,
        K: NumericCoerce + PartialEq,
    {
        Self::recursive_with_comparators(f, ComparatorSet::new())
    }

    pub fn recursive_with_comparators<F>(f: F, comparators: ComparatorSet<K>) -> Self
    where
        F: Fn(&Self, &[K]) -> V + 'static,
    {
        Self::from_parts(
            MemoCell::new(comparators),
            Box::new(move |this: &Self, keys: &[K]| Ok(f(this, keys))),
        )
    }

    pub fn call(&self, keys: &[K]) -> V {
        match self.try_call(keys) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

impl<K, V, E> Memoized<K, V, E>
where
    K: Clone + 'static,
    V: Clone + 'static,
    E: 'static,
{
    /// Memoizes a fallible `f`. Only `Ok` results are stored.
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(&[K]) -> Result<V, E> + 'static,
        K: NumericCoerce + PartialEq,
    {
        Self::fallible_with_comparators(f, ComparatorSet::new())
    }

    pub fn fallible_with_comparators<F>(f: F, comparators: ComparatorSet<K>) -> Self
    where
        F: Fn(&[K]) -> Result<V, E> + 'static,
    {
        Self::from_parts(
            MemoCell::new(comparators),
            Box::new(move |_: &Self, keys: &[K]| f(keys)),
        )
    }

    pub fn recursive_fallible<F>(f: F) -> Self
    where
        F: Fn(&Self, &[K]) -> Result<V, E> + 'static,
        K: NumericCoerce + PartialEq,
    {
        Self::recursive_fallible_with_comparators(f, ComparatorSet::new())
    }

    pub fn recursive_fallible_with_comparators<F>(f: F, comparators: ComparatorSet<K>) -> Self
    where
        F: Fn(&Self, &[K]) -> Result<V, E> + 'static,
    {
        Self::from_parts(MemoCell::new(comparators), Box::new(f))
    }

    pub(crate) fn from_parts(cell: MemoCell<K, V>, body: Box<Body<K, V, E>>) -> Self {
        Self { cell, body }
    }

    /// Calls the memoized function. Errors propagate unchanged and are not
    /// memoized.
    pub fn try_call(&self, keys: &[K]) -> Result<V, E> {
        self.cell
            .get_or_try_compute(keys, |keys| (self.body)(self, keys))
    }

    /// Stored result for `keys`, without calling the function.
    pub fn cached(&self, keys: &[K]) -> Option<V> {
        self.cell.get(keys)
    }

    pub fn cell(&self) -> &MemoCell<K, V> {
        &self.cell
    }

    pub fn entry_count(&self) -> usize {
        self.cell.entry_count()
    }

    pub fn computed_count(&self) -> usize {
        self.cell.computed_count()
    }
}

impl<K, V, E> Debug for Memoized<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("cell", &self.cell)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Fixed-arity family
// ---------------------------------------------------------------------------

macro_rules! fixed_arity {
    ($name:ident, $name_with:ident, $count:literal; $($arg:ident: $ty:ident),*) => {
        #[doc = concat!(
            "Memoizes a function of ", $count,
            ". Each argument becomes a [`Value`] key."
        )]
        pub fn $name<$($ty,)* R, F>(f: F) -> impl Fn($($ty),*) -> R
        where
            $($ty: Clone + Into<Value>,)*
            R: Clone,
            F: Fn($($ty),*) -> R,
        {
            $name_with(f, ComparatorSet::new())
        }

        #[doc = concat!("[`", stringify!($name), "`] with explicit per-position comparators.")]
        pub fn $name_with<$($ty,)* R, F>(
            f: F,
            comparators: ComparatorSet<Value>,
        ) -> impl Fn($($ty),*) -> R
        where
            $($ty: Clone + Into<Value>,)*
            R: Clone,
            F: Fn($($ty),*) -> R,
        {
            let cell = MemoCell::new(comparators);
            move |$($arg: $ty),*| {
                let keys: &[Value] = &[$(Into::<Value>::into($arg.clone())),*];
                cell.get_or_compute(keys, |_| f($($arg),*))
            }
        }
    };
}

fixed_arity!(memoize0, memoize0_with, "no arguments";);
fixed_arity!(memoize1, memoize1_with, "one argument"; a: A);
fixed_arity!(memoize2, memoize2_with, "two arguments"; a: A, b: B);
fixed_arity!(memoize3, memoize3_with, "three arguments"; a: A, b: B, c: C);
fixed_arity!(memoize4, memoize4_with, "four arguments"; a: A, b: B, c: C, d: D);

// ---------------------------------------------------------------------------
// SyncMemoCell
// ---------------------------------------------------------------------------

/// Lock-protected [`MemoCell`] for callers on several threads.
///
/// The lock covers walking and filling the trie, never the compute
/// callback. Two threads that miss on equal keys at the same time both
/// compute; the first value stored wins and both return it. Callers that need
/// strict at-most-once execution under contention must coordinate themselves.
#[cfg(feature = "concurrency")]
pub struct SyncMemoCell<K, V> {
    lookup: parking_lot::Mutex<MemoLookup<K, V>>,
    comparators: ComparatorSet<K>,
}

#[cfg(feature = "concurrency")]
impl<K, V> SyncMemoCell<K, V> {
    pub fn new(comparators: ComparatorSet<K>) -> Self {
        Self::with_lookup(MemoLookup::new(), comparators)
    }

    pub fn with_lookup(lookup: MemoLookup<K, V>, comparators: ComparatorSet<K>) -> Self {
        Self {
            lookup: parking_lot::Mutex::new(lookup),
            comparators,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.lookup.lock().entry_count()
    }

    pub fn computed_count(&self) -> usize {
        self.lookup.lock().computed_count()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        K: Debug,
    {
        self.lookup.lock().check_invariants(&self.comparators)
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MemoMetricsSnapshot {
        self.lookup.lock().metrics_snapshot()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> SyncMemoCell<K, V>
where
    K: Clone,
    V: Clone,
{
    pub fn get_or_compute<F>(&self, keys: &[K], compute: F) -> V
    where
        F: FnOnce(&[K]) -> V,
    {
        match self.get_or_try_compute(keys, |keys| Ok::<V, Infallible>(compute(keys))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    pub fn get_or_try_compute<E, F>(&self, keys: &[K], compute: F) -> Result<V, E>
    where
        F: FnOnce(&[K]) -> Result<V, E>,
    {
        let slot = {
            let mut lookup = self.lookup.lock();
            let slot = lookup.resolve(keys, &self.comparators);
            if let Some(value) = lookup.slot(slot).value() {
                return Ok(value.clone());
            }
            slot
        };

        match compute(keys) {
            Ok(value) => Ok(self.lookup.lock().fill(slot, value).clone()),
            Err(err) => {
                self.lookup.lock().abandon(slot);
                Err(err)
            },
        }
    }

    pub fn get(&self, keys: &[K]) -> Option<V> {
        self.lookup.lock().get(keys, &self.comparators).cloned()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> Debug for SyncMemoCell<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncMemoCell")
            .field("comparators", &self.comparators)
            .finish_non_exhaustive()
    }
}
