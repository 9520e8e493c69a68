//! memokit: multi-key memoization over a trie of per-position comparators.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod comparator;
pub mod ds;
pub mod error;
pub mod lookup;
pub mod memoize;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod value;
