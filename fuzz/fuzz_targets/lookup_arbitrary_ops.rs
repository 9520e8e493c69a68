#![no_main]

use std::collections::HashMap;

use libfuzzer_sys::fuzz_target;
use memokit::comparator::ComparatorSet;
use memokit::lookup::MemoLookup;

// Fuzz arbitrary call sequences on MemoLookup
//
// Each call is a length byte followed by that many key bytes. Tests that
// every distinct sequence computes exactly once, hits return the stored
// value, probes agree with lookups and the trie stays consistent.
fuzz_target!(|data: &[u8]| {
    let comparators = ComparatorSet::<u8>::new();
    let mut lookup: MemoLookup<u8, u32> = MemoLookup::new();
    let mut model: HashMap<Vec<u8>, u32> = HashMap::new();
    let mut computes = 0usize;

    let mut idx = 0;
    while idx < data.len() {
        let op = data[idx];
        let len = usize::from(op % 6);
        idx += 1;
        if idx + len > data.len() {
            break;
        }
        let keys = &data[idx..idx + len];
        idx += len;

        if op & 0x80 != 0 {
            // probe only
            assert_eq!(lookup.get(keys, &comparators).copied(), model.get(keys).copied());
            continue;
        }

        let fresh = model.len() as u32;
        let value = *lookup.get_or_add(keys, &comparators, |_| {
            computes += 1;
            fresh
        });
        let expected = *model.entry(keys.to_vec()).or_insert(fresh);
        assert_eq!(value, expected);
    }

    assert_eq!(computes, model.len());
    assert_eq!(lookup.computed_count(), model.len());
    lookup.check_invariants(&comparators).unwrap();
});
