//! Error types for the memokit library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned when the lookup trie violates one of its
//!   structural invariants (see [`MemoLookup::check_invariants`]).
//! - [`ConfigError`]: Returned when a [`MemoBuilder`] is given an inconsistent
//!   configuration (duplicate comparator positions, overrides past the
//!   declared arity).
//!
//! The lookup engine defines no error kinds of its own: a failing compute
//! callback hands its error straight back to the caller and nothing is cached.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::builder::MemoBuilder;
//! use memokit::comparator::HashEquality;
//! use memokit::error::ConfigError;
//!
//! let ok = MemoBuilder::<u64>::new()
//!     .arity(2)
//!     .comparator_at(1, HashEquality)
//!     .try_comparators();
//! assert!(ok.is_ok());
//!
//! let bad: Result<_, ConfigError> = MemoBuilder::<u64>::new()
//!     .arity(1)
//!     .comparator_at(3, HashEquality)
//!     .try_comparators();
//! assert!(bad.is_err());
//! ```
//!
//! [`MemoLookup::check_invariants`]: crate::lookup::MemoLookup::check_invariants
//! [`MemoBuilder`]: crate::builder::MemoBuilder

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal trie invariants are violated.
///
/// Produced by [`MemoLookup::check_invariants`](crate::lookup::MemoLookup::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when memoizer configuration is inconsistent.
///
/// Produced by the `try_*` methods of
/// [`MemoBuilder`](crate::builder::MemoBuilder).
///
/// # Example
///
/// ```
/// use memokit::builder::MemoBuilder;
/// use memokit::comparator::StrictEquality;
///
/// let err = MemoBuilder::<i64>::new()
///     .comparator_at(0, StrictEquality)
///     .comparator_at(0, StrictEquality)
///     .try_comparators()
///     .unwrap_err();
/// assert!(err.to_string().contains("position 0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
