//! DHAT heap profiler for memokit.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use memokit::comparator::{comparator, ComparatorSet, HashEquality};
use memokit::lookup::MemoLookup;
use memokit::memoize::Memoized;
use memokit::value::Value;

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Wide, shallow trie: many distinct root keys, short sequences.
fn profile_wide() {
    println!("=== Profiling wide trie (arity 2) ===");
    let mut rng = XorShift64::new(42);
    let comparators = ComparatorSet::<u64>::new();
    let mut lookup: MemoLookup<u64, u64> = MemoLookup::new();

    for _ in 0..100_000 {
        let keys = [rng.next_u64() % 16_384, rng.next_u64() % 8];
        lookup.get_or_add(&keys, &comparators, |k| k[0] ^ k[1]);
    }

    println!(
        "  Entries: {}, computed: {}, levels: {}",
        lookup.entry_count(),
        lookup.computed_count(),
        lookup.level_count()
    );
}

/// Deep trie: long sequences sharing prefixes.
fn profile_deep() {
    println!("=== Profiling deep trie (arity 16) ===");
    let mut rng = XorShift64::new(7);
    let comparators = ComparatorSet::<u8>::with_default(HashEquality);
    let mut lookup: MemoLookup<u8, usize> = MemoLookup::new();

    for _ in 0..20_000 {
        let keys: Vec<u8> = (0..16).map(|_| (rng.next_u64() % 4) as u8).collect();
        lookup.get_or_add(&keys, &comparators, |k| k.iter().map(|&b| usize::from(b)).sum());
    }

    println!(
        "  Entries: {}, computed: {}, levels: {}",
        lookup.entry_count(),
        lookup.computed_count(),
        lookup.level_count()
    );
}

/// Every key collides: one bucket per level scanned linearly.
fn profile_collisions() {
    println!("=== Profiling colliding hashes ===");
    let mut comparators = ComparatorSet::<u32>::new();
    comparators.set(0, comparator(|_: &u32| 0, |a: &u32, b: &u32| a == b));
    let mut lookup: MemoLookup<u32, u32> = MemoLookup::new();

    for i in 0..4_096u32 {
        lookup.get_or_add(&[i], &comparators, |k| k[0] * 2);
    }

    println!("  Entries: {}", lookup.entry_count());
}

/// Recursive adapter over dynamic keys.
fn profile_recursive() {
    println!("=== Profiling recursive adapter ===");
    let paths = Memoized::recursive(|paths: &Memoized<Value, u64>, keys: &[Value]| {
        let (row, col) = (keys[0].as_i64().unwrap_or(0), keys[1].as_i64().unwrap_or(0));
        if row == 0 || col == 0 {
            1
        } else {
            paths.call(&[Value::from(row - 1), Value::from(col)])
                .wrapping_add(paths.call(&[Value::from(row), Value::from(col - 1)]))
        }
    });

    let total = paths.call(&[Value::from(200), Value::from(200)]);
    println!("  Result: {}, computed: {}", total, paths.computed_count());
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("memokit DHAT Heap Profiling");
    println!("===========================\n");

    profile_wide();
    profile_deep();
    profile_collisions();
    profile_recursive();

    println!("\n===========================");
    println!("Profile written to dhat-heap.json");
}
