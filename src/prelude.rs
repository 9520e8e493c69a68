pub use crate::builder::MemoBuilder;
pub use crate::comparator::{
    comparator, Comparator, ComparatorSet, FnComparator, HashCode, HashEquality, SharedComparator,
    StrictEquality,
};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::lookup::{MemoLookup, Slot, SlotRef};
#[cfg(feature = "concurrency")]
pub use crate::memoize::SyncMemoCell;
pub use crate::memoize::{
    memoize0, memoize0_with, memoize1, memoize1_with, memoize2, memoize2_with, memoize3,
    memoize3_with, memoize4, memoize4_with, MemoCell, Memoized,
};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::MemoMetricsSnapshot;
pub use crate::value::{NumericCoerce, ObjectRef, Value};
