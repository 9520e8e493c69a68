#![no_main]

use libfuzzer_sys::fuzz_target;
use memokit::comparator::{ComparatorSet, comparator};
use memokit::lookup::MemoLookup;

// Fuzz lookups under a deliberately weak hash
//
// Position 0 hashes into 2 buckets and position 1 into 1, so every level is
// resolved by bucket scans. Results must match a direct computation and the
// number of computes must equal the number of distinct pairs.
fuzz_target!(|data: &[u8]| {
    let mut comparators = ComparatorSet::<u16>::new();
    comparators.set(0, comparator(|k: &u16| u64::from(k & 1), |a: &u16, b: &u16| a == b));
    comparators.set(1, comparator(|_: &u16| 0, |a: &u16, b: &u16| a == b));

    let mut lookup: MemoLookup<u16, u32> = MemoLookup::new();
    let mut distinct = std::collections::HashSet::new();
    let mut computes = 0usize;

    for pair in data.chunks_exact(2) {
        let keys = [u16::from(pair[0] % 32), u16::from(pair[1] % 32)];
        let value = *lookup.get_or_add(&keys, &comparators, |k| {
            computes += 1;
            u32::from(k[0]) * 100 + u32::from(k[1])
        });
        assert_eq!(value, u32::from(keys[0]) * 100 + u32::from(keys[1]));
        distinct.insert(keys);
    }

    assert_eq!(computes, distinct.len());
    lookup.check_invariants(&comparators).unwrap();
});
