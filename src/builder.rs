//! Builder for memoizers with per-position comparators.
//!
//! Collects comparator overrides, an optional fallback comparator, a declared
//! arity and a capacity hint, then validates them once in the `try_*`
//! constructors.
//!
//! ## Example
//!
//! ```rust
//! use memokit::builder::MemoBuilder;
//! use memokit::comparator::HashEquality;
//!
//! let memo = MemoBuilder::<u64>::new()
//!     .arity(2)
//!     .comparator_at(1, HashEquality)
//!     .capacity(64)
//!     .try_build(|keys: &[u64]| keys[0].pow(keys[1] as u32))
//!     .unwrap();
//! assert_eq!(memo.call(&[2, 10]), 1024);
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use crate::comparator::{Comparator, ComparatorSet, SharedComparator};
use crate::error::ConfigError;
use crate::lookup::MemoLookup;
use crate::memoize::{MemoCell, Memoized};
use crate::value::NumericCoerce;

/// Builder for [`MemoLookup`], [`MemoCell`] and [`Memoized`] instances.
pub struct MemoBuilder<K: ?Sized> {
    overrides: Vec<(usize, SharedComparator<K>)>,
    default: Option<SharedComparator<K>>,
    arity: Option<usize>,
    capacity: usize,
}

impl<K> MemoBuilder<K>
where
    K: NumericCoerce + PartialEq + 'static,
{
    pub fn new() -> Self {
        Self {
            overrides: Vec::new(),
            default: None,
            arity: None,
            capacity: 0,
        }
    }

    /// Comparator for key position `position`.
    pub fn comparator_at(mut self, position: usize, comparator: impl Comparator<K> + 'static) -> Self {
        let comparator: SharedComparator<K> = Arc::new(comparator);
        self.overrides.push((position, comparator));
        self
    }

    /// Fallback for positions without an override. Defaults to
    /// [`StrictEquality`](crate::comparator::StrictEquality).
    pub fn default_comparator(mut self, comparator: impl Comparator<K> + 'static) -> Self {
        let comparator: SharedComparator<K> = Arc::new(comparator);
        self.default = Some(comparator);
        self
    }

    /// Declares how many keys every call passes. Only used to validate
    /// override positions; calls of other lengths are still accepted.
    pub fn arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Expected number of distinct root keys.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Validates the overrides and assembles the comparator set.
    pub fn try_comparators(&self) -> Result<ComparatorSet<K>, ConfigError> {
        let mut set = ComparatorSet::new();
        if let Some(default) = &self.default {
            set.set_default_shared(Arc::clone(default));
        }
        for (position, comparator) in &self.overrides {
            if let Some(arity) = self.arity.filter(|arity| position >= arity) {
                return Err(ConfigError::new(format!(
                    "comparator at position {} exceeds declared arity {}",
                    position, arity
                )));
            }
            if set.set_shared(*position, Arc::clone(comparator)).is_some() {
                return Err(ConfigError::new(format!(
                    "comparator for position {} given more than once",
                    position
                )));
            }
        }
        Ok(set)
    }

    /// Builds a bare engine plus the comparators to call it with.
    pub fn try_build_lookup<V>(&self) -> Result<(MemoLookup<K, V>, ComparatorSet<K>), ConfigError> {
        let comparators = self.try_comparators()?;
        Ok((MemoLookup::with_capacity(self.capacity), comparators))
    }

    pub fn try_build_cell<V>(&self) -> Result<MemoCell<K, V>, ConfigError> {
        let (lookup, comparators) = self.try_build_lookup()?;
        Ok(MemoCell::with_lookup(lookup, comparators))
    }

    pub fn try_build<V, F>(&self, f: F) -> Result<Memoized<K, V>, ConfigError>
    where
        K: Clone,
        V: Clone + 'static,
        F: Fn(&[K]) -> V + 'static,
    {
        Ok(Memoized::from_parts(
            self.try_build_cell()?,
            Box::new(move |_: &Memoized<K, V>, keys: &[K]| Ok::<V, Infallible>(f(keys))),
        ))
    }

    pub fn try_build_recursive<V, F>(&self, f: F) -> Result<Memoized<K, V>, ConfigError>
    where
        K: Clone,
        V: Clone + 'static,
        F: Fn(&Memoized<K, V>, &[K]) -> V + 'static,
    {
        Ok(Memoized::from_parts(
            self.try_build_cell()?,
            Box::new(move |this: &Memoized<K, V>, keys: &[K]| Ok::<V, Infallible>(f(this, keys))),
        ))
    }

    pub fn try_build_fallible<V, E, F>(&self, f: F) -> Result<Memoized<K, V, E>, ConfigError>
    where
        K: Clone,
        V: Clone + 'static,
        E: 'static,
        F: Fn(&[K]) -> Result<V, E> + 'static,
    {
        Ok(Memoized::from_parts(
            self.try_build_cell()?,
            Box::new(move |_: &Memoized<K, V, E>, keys: &[K]| f(keys)),
        ))
    }
}

impl<K> Default for MemoBuilder<K>
where
    K: NumericCoerce + PartialEq + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ?Sized> std::fmt::Debug for MemoBuilder<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let positions: Vec<usize> = self.overrides.iter().map(|(p, _)| *p).collect();
        f.debug_struct("MemoBuilder")
            .field("overrides", &positions)
            .field("custom_default", &self.default.is_some())
            .field("arity", &self.arity)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::{comparator, HashEquality, StrictEquality};

    #[test]
    fn empty_builder_uses_strict_equality() {
        let set = MemoBuilder::<f64>::new().try_comparators().unwrap();
        assert_eq!(set.overrides(), 0);
        assert!(set.at(0).equals(&0.0, &-0.0));
        assert!(!set.at(0).equals(&f64::NAN, &f64::NAN));
    }

    #[test]
    fn overrides_land_on_their_positions() {
        let set = MemoBuilder::<u64>::new()
            .arity(3)
            .comparator_at(2, HashEquality)
            .try_comparators()
            .unwrap();
        assert!(!set.is_overridden(0));
        assert!(!set.is_overridden(1));
        assert!(set.is_overridden(2));
        assert_eq!(set.span(), 3);
    }

    #[test]
    fn duplicate_position_is_rejected() {
        let err = MemoBuilder::<i64>::new()
            .comparator_at(1, StrictEquality)
            .comparator_at(1, HashEquality)
            .try_comparators()
            .unwrap_err();
        assert!(err.message().contains("position 1"));
    }

    #[test]
    fn override_past_arity_is_rejected() {
        let err = MemoBuilder::<i64>::new()
            .arity(1)
            .comparator_at(3, StrictEquality)
            .try_build(|k: &[i64]| k.len())
            .unwrap_err();
        assert!(err.to_string().contains("arity 1"));
    }

    #[test]
    fn custom_default_is_shared_not_rewrapped() {
        let builder = MemoBuilder::<u64>::new().default_comparator(HashEquality);
        let set = builder.try_comparators().unwrap();
        let default = builder.default.as_ref().unwrap();
        assert!(set.default_is(default));
        assert_eq!(Arc::strong_count(default), 2);
    }

    #[test]
    fn custom_default_applies_to_every_position() {
        let memo = MemoBuilder::<i64>::new()
            .default_comparator(comparator(
                |n: &i64| n.unsigned_abs(),
                |a: &i64, b: &i64| a.abs() == b.abs(),
            ))
            .try_build(|k: &[i64]| k.iter().map(|n| n.abs()).sum::<i64>())
            .unwrap();
        assert_eq!(memo.call(&[-2, 3]), 5);
        assert_eq!(memo.call(&[2, -3]), 5);
        assert_eq!(memo.computed_count(), 1);
    }

    #[test]
    fn recursive_and_fallible_builds() {
        let fact = MemoBuilder::<u64>::new()
            .capacity(32)
            .try_build_recursive(|this: &Memoized<u64, u64>, k: &[u64]| {
                if k[0] <= 1 { 1 } else { k[0] * this.call(&[k[0] - 1]) }
            })
            .unwrap();
        assert_eq!(fact.call(&[10]), 3_628_800);
        assert_eq!(fact.computed_count(), 10);

        let checked = MemoBuilder::<u64>::new()
            .try_build_fallible(|k: &[u64]| k[0].checked_mul(k[1]).ok_or("overflow"))
            .unwrap();
        assert_eq!(checked.try_call(&[u64::MAX, 2]), Err("overflow"));
        assert_eq!(checked.try_call(&[3, 2]), Ok(6));
    }

    #[test]
    fn build_lookup_and_cell() {
        let (mut lookup, comparators) = MemoBuilder::<u8>::new()
            .capacity(4)
            .try_build_lookup::<u8>()
            .unwrap();
        assert_eq!(*lookup.get_or_add(&[1, 2], &comparators, |k| k[0] + k[1]), 3);

        let cell = MemoBuilder::<u8>::new().try_build_cell::<u16>().unwrap();
        assert_eq!(cell.get_or_compute(&[200, 100], |k| u16::from(k[0]) + u16::from(k[1])), 300);
    }

    #[test]
    fn debug_lists_positions() {
        let builder = MemoBuilder::<u8>::new().comparator_at(4, HashEquality).arity(5);
        let dbg = format!("{:?}", builder);
        assert!(dbg.contains("overrides: [4]"));
        assert!(dbg.contains("arity: Some(5)"));
    }
}
