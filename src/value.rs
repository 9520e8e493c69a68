//! Dynamic key values and numeric coercion.
//!
//! [`Value`] is the uniform key type used when the arguments of a memoized
//! call are heterogeneous: each position may carry a different kind of value
//! and the trie only needs to hash and compare them.
//!
//! ## Equality
//!
//! `Value` implements *strict* equality:
//!
//! | Left / right            | Equal when                         |
//! |-------------------------|------------------------------------|
//! | `Number` / `Number`     | IEEE `==` (`NaN != NaN`, `0 == -0`) |
//! | `Integer` / `Integer`   | same integer                       |
//! | `Integer` / `Number`    | the float is exactly that integer  |
//! | `Str` / `Str`           | same contents                      |
//! | `Object` / `Object`     | same allocation (identity)         |
//! | `Bool`, `Null`, `Undefined` | same variant and payload       |
//! | different variants      | never                              |
//!
//! There is no implicit conversion: `Number(1.0)` and `Str("1")` are distinct.
//!
//! 64-bit and pointer-sized integers beyond `±2^53` do not fit an `f64`
//! exactly and convert to `Integer`, so `2^53` and `2^53 + 1` stay distinct
//! keys. Smaller integers convert to `Number`.
//!
//! ## Numeric coercion
//!
//! [`NumericCoerce`] maps a key to an `f64`. The default comparator uses it as
//! its hash, which is deliberately coarse: every non-numeric string, every
//! object and `Undefined` coerce to `NaN` and share a single bucket.
//!
//! ```
//! use memokit::value::{NumericCoerce, Value};
//!
//! assert_eq!(Value::from(" 42 ").to_number(), 42.0);
//! assert_eq!(Value::from("").to_number(), 0.0);
//! assert!(Value::from("forty-two").to_number().is_nan());
//! assert_eq!(Value::Null.to_number(), 0.0);
//! assert_eq!(Value::from(true).to_number(), 1.0);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Conversion of a key to a number, used by the default hash.
pub trait NumericCoerce {
    /// Returns the numeric interpretation of `self`, or `NaN` if there is none.
    fn to_number(&self) -> f64;
}

impl<T: NumericCoerce + ?Sized> NumericCoerce for &T {
    #[inline]
    fn to_number(&self) -> f64 {
        (**self).to_number()
    }
}

macro_rules! coerce_as_cast {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NumericCoerce for $ty {
                #[inline]
                fn to_number(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

coerce_as_cast!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl NumericCoerce for bool {
    #[inline]
    fn to_number(&self) -> f64 {
        if *self { 1.0 } else { 0.0 }
    }
}

impl NumericCoerce for str {
    fn to_number(&self) -> f64 {
        coerce_str(self)
    }
}

impl NumericCoerce for String {
    fn to_number(&self) -> f64 {
        coerce_str(self)
    }
}

/// Whitespace-trimmed decimal parse; blank strings are zero.
fn coerce_str(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// ObjectRef
// ---------------------------------------------------------------------------

/// Shared handle compared by identity.
///
/// Two `ObjectRef`s are equal only if they point at the same allocation,
/// regardless of what the allocation contains.
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn Any + Send + Sync>);

impl ObjectRef {
    /// Wraps `value` in a fresh allocation with its own identity.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Wraps an existing shared allocation, keeping its identity.
    pub fn from_arc(inner: Arc<dyn Any + Send + Sync>) -> Self {
        Self(inner)
    }

    /// Returns the payload if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns `true` if both handles refer to the same allocation.
    #[inline]
    pub fn same(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({:p})", self.addr())
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// Dynamically typed key.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value at all.
    #[default]
    Undefined,
    /// An explicit empty value.
    Null,
    Bool(bool),
    Number(f64),
    /// An integer outside the range `f64` represents exactly.
    Integer(i128),
    Str(Arc<str>),
    /// An opaque value compared by identity.
    Object(ObjectRef),
}

/// Largest magnitude below which every integer is an exact `f64`.
const MAX_EXACT_INT: i128 = 1 << 53;

impl Value {
    /// Converts an integer, keeping it exact when `f64` would round it.
    pub fn integer(n: impl Into<i128>) -> Self {
        let n = n.into();
        if (-MAX_EXACT_INT..=MAX_EXACT_INT).contains(&n) {
            Value::Number(n as f64)
        } else {
            Value::Integer(n)
        }
    }

    /// Builds an identity-compared object key.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Value::Object(ObjectRef::new(value))
    }

    /// Returns the number if this is numeric. An `Integer` is rounded to
    /// the nearest `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the number truncated to an integer if this is a finite
    /// `Number` or an `Integer` that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            Value::Integer(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Returns the string slice if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Returns the type name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) | Value::Integer(_) => "number",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Integer(a), Value::Number(b)) | (Value::Number(b), Value::Integer(a)) => {
                float_is_exactly(*b, *a)
            },
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.same(b),
            _ => false,
        }
    }
}

/// Whether `f` is the integer `n` with no rounding on either side.
fn float_is_exactly(f: f64, n: i128) -> bool {
    f.fract() == 0.0 && (i128::MIN as f64..i128::MAX as f64).contains(&f) && f as i128 == n
}

impl NumericCoerce for Value {
    fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => b.to_number(),
            Value::Number(n) => *n,
            Value::Integer(n) => *n as f64,
            Value::Str(s) => coerce_str(s),
            Value::Object(_) => f64::NAN,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Object(o) => write!(f, "object@{:p}", o.addr()),
        }
    }
}

macro_rules! value_from_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(n: $ty) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, u8, u16, u32, f32, f64);

macro_rules! value_from_wide_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(n: $ty) -> Self {
                    Value::integer(n as i128)
                }
            }
        )*
    };
}

value_from_wide_integer!(i64, isize, u64, usize);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Value::Str(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_equality_rules() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_eq!(Value::from(0.0), Value::from(-0.0));
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Null, Value::Undefined);
        assert_eq!(Value::from("abc"), Value::from(String::from("abc")));
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = ObjectRef::new(vec![1, 2, 3]);
        let b = ObjectRef::new(vec![1, 2, 3]);
        assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
        assert_ne!(Value::from(a.clone()), Value::from(b));
        assert_eq!(a.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::from("  7.5\n").to_number(), 7.5);
        assert_eq!(Value::from("   ").to_number(), 0.0);
        assert!(Value::from("x1").to_number().is_nan());
        assert!(Value::Undefined.to_number().is_nan());
        assert!(Value::object(5u8).to_number().is_nan());
        assert_eq!(Value::from(false).to_number(), 0.0);
        assert_eq!(3u16.to_number(), 3.0);
        assert_eq!((&-2i64).to_number(), -2.0);
        assert_eq!("12".to_number(), 12.0);
    }

    #[test]
    fn wide_integers_stay_exact() {
        let edge = 1i64 << 53;
        assert_eq!(Value::from(edge), Value::Number(edge as f64));
        assert!(matches!(Value::from(edge + 1), Value::Integer(_)));
        assert_ne!(Value::from(edge), Value::from(edge + 1));
        assert_ne!(Value::from(-edge), Value::from(-edge - 1));
        assert_ne!(Value::from(u64::MAX), Value::from(u64::MAX - 1));
        assert_eq!(Value::from(u64::MAX), Value::from(u64::MAX));
        assert_eq!(Value::from(usize::MAX), Value::from(usize::MAX as u64));
        assert_eq!(Value::from(7u64), Value::from(7.0));
        assert_eq!(Value::from(i64::MIN), Value::from(i64::MIN as f64));
    }

    #[test]
    fn integer_against_float_is_exact() {
        let big = (1i128 << 53) + 1;
        assert_ne!(Value::Integer(big), Value::Number(big as f64));
        assert_eq!(Value::Integer(1 << 60), Value::Number((1u64 << 60) as f64));
        assert_eq!(Value::Integer(3), Value::from(3));
        assert_ne!(Value::Integer(3), Value::from(3.5));
        assert_ne!(Value::Integer(i128::MAX), Value::from(f64::INFINITY));
        assert_ne!(Value::Integer(i128::MAX), Value::from(1e300));
    }

    #[test]
    fn equal_wide_integers_share_a_hash() {
        let a = Value::from(u64::MAX);
        let b = Value::from(u64::MAX - 1);
        assert_eq!(a.to_number(), b.to_number());
        assert_eq!(a.to_number(), Value::from(u64::MAX).to_number());
        assert_eq!(a.kind(), "number");
        assert_eq!(a.to_string(), "18446744073709551615");
        assert_eq!(a.as_i64(), None);
        assert_eq!(Value::from(i64::MAX).as_i64(), Some(i64::MAX));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::from(3.9).as_i64(), Some(3));
        assert_eq!(Value::from(f64::INFINITY).as_i64(), None);
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert_eq!(Value::from(2).as_f64(), Some(2.0));
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from("a").to_string(), "\"a\"");
    }
}
