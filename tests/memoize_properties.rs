// ==============================================
// MEMOIZATION PROPERTY TESTS (integration)
// ==============================================
//
// Behavioral guarantees of the public surface: results match the wrapped
// function, each distinct key sequence computes at most once, comparators
// decide identity per position, and failures are never stored.

use std::cell::Cell;
use std::rc::Rc;

use memokit::prelude::*;
use proptest::prelude::*;

fn counted<K: Clone + 'static>(
    f: impl Fn(&[K]) -> i64 + 'static,
) -> (Memoized<K, i64>, Rc<Cell<usize>>)
where
    K: NumericCoerce + PartialEq,
{
    let calls = Rc::new(Cell::new(0));
    let seen = calls.clone();
    let memo = Memoized::new(move |keys: &[K]| {
        calls.set(calls.get() + 1);
        f(keys)
    });
    (memo, seen)
}

// ==============================================
// Identity of key sequences
// ==============================================

mod identity {
    use super::*;

    #[test]
    fn different_order_is_a_different_call() {
        let (memo, calls) = counted(|k: &[i64]| k[0] - k[1]);
        assert_eq!(memo.call(&[5, 3]), 2);
        assert_eq!(memo.call(&[3, 5]), -2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn prefix_is_a_different_call() {
        let (memo, calls) = counted(|k: &[i64]| k.len() as i64);
        assert_eq!(memo.call(&[1]), 1);
        assert_eq!(memo.call(&[1, 2]), 2);
        assert_eq!(memo.call(&[1, 2, 3]), 3);
        assert_eq!(memo.call(&[]), 0);
        for _ in 0..3 {
            memo.call(&[1, 2]);
        }
        assert_eq!(calls.get(), 4);
        memo.cell().check_invariants().unwrap();
    }

    #[test]
    fn undefined_and_null_are_distinct_and_memoized() {
        let (memo, calls) = counted(|k: &[Value]| k.len() as i64);
        memo.call(&[Value::Undefined]);
        memo.call(&[Value::Null]);
        memo.call(&[Value::Undefined]);
        memo.call(&[Value::Null]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn false_zero_and_empty_string_are_memoized_values() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let memo = Memoized::new(move |k: &[Value]| {
            calls.set(calls.get() + 1);
            k[0].clone()
        });
        for key in [Value::from(false), Value::from(0), Value::from("")] {
            assert_eq!(memo.call(&[key.clone()]), key);
            assert_eq!(memo.call(&[key.clone()]), key);
        }
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn string_and_number_with_same_numeric_value_differ() {
        let (memo, calls) = counted(|k: &[Value]| k.len() as i64);
        memo.call(&[Value::from(1)]);
        memo.call(&[Value::from("1")]);
        memo.call(&[Value::from(true)]);
        assert_eq!(calls.get(), 3);
        assert_eq!(memo.entry_count(), 3);
    }

    #[test]
    fn wide_integers_past_float_precision_stay_distinct() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let signed = memoize1(move |n: i64| {
            seen.set(seen.get() + 1);
            n
        });
        let edge = 1i64 << 53;
        assert_eq!(signed(edge), edge);
        assert_eq!(signed(edge + 1), edge + 1);
        assert_eq!(signed(edge + 1), edge + 1);
        assert_eq!(calls.get(), 2);

        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let unsigned = memoize1(move |n: u64| {
            seen.set(seen.get() + 1);
            n
        });
        assert_eq!(unsigned(u64::MAX), u64::MAX);
        assert_eq!(unsigned(u64::MAX - 1), u64::MAX - 1);
        assert_eq!(unsigned(u64::MAX), u64::MAX);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn nan_never_hits() {
        let (memo, calls) = counted(|_: &[f64]| 0);
        memo.call(&[f64::NAN]);
        memo.call(&[f64::NAN]);
        assert_eq!(calls.get(), 2);
    }
}

// ==============================================
// Comparator overrides
// ==============================================

mod comparators {
    use super::*;

    fn parity() -> impl Comparator<i64> {
        comparator(
            |n: &i64| n.rem_euclid(2) as u64,
            |a: &i64, b: &i64| a.rem_euclid(2) == b.rem_euclid(2),
        )
    }

    #[test]
    fn sparse_override_with_gap() {
        let mut set = ComparatorSet::<i64>::new();
        set.set(1, parity());
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let memo = Memoized::with_comparators(
            move |k: &[i64]| {
                calls.set(calls.get() + 1);
                k.iter().sum::<i64>()
            },
            set,
        );

        assert_eq!(memo.call(&[1, 2, 3]), 6);
        assert_eq!(memo.call(&[1, 4, 3]), 6);
        assert_eq!(memo.call(&[1, 8, 4]), 13);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn builder_rejects_conflicting_overrides() {
        let err = MemoBuilder::<i64>::new()
            .comparator_at(0, parity())
            .comparator_at(0, StrictEquality)
            .try_build(|k: &[i64]| k[0])
            .unwrap_err();
        assert!(err.to_string().contains("position 0"));
    }

    #[test]
    fn length_hash_over_strings() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let memo = MemoBuilder::<Value>::new()
            .default_comparator(comparator(
                |v: &Value| v.as_str().map_or(0, |s| s.len() as u64),
                |a: &Value, b: &Value| a == b,
            ))
            .try_build(move |k: &[Value]| {
                calls.set(calls.get() + 1);
                k[0].to_string()
            })
            .unwrap();
        let words = ["ab", "cd", "ab", "ef", "cd"];
        for w in words {
            memo.call(&[Value::from(w)]);
        }
        assert_eq!(seen.get(), 3);
        memo.cell().check_invariants().unwrap();
    }
}

// ==============================================
// Recursion and failure
// ==============================================

mod recursion {
    use super::*;

    fn fib() -> (Memoized<u64, u64>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let fib = Memoized::recursive(move |fib: &Memoized<u64, u64>, k: &[u64]| {
            calls.set(calls.get() + 1);
            if k[0] < 2 { k[0] } else { fib.call(&[k[0] - 1]) + fib.call(&[k[0] - 2]) }
        });
        (fib, seen)
    }

    #[test]
    fn fibonacci_computes_each_index_once() {
        let (fib, calls) = fib();
        assert_eq!(fib.call(&[50]), 12_586_269_025);
        assert_eq!(calls.get(), 51);
        assert_eq!(fib.call(&[51]), 20_365_011_074);
        assert_eq!(calls.get(), 52);
        assert_eq!(fib.call(&[30]), 832_040);
        assert_eq!(calls.get(), 52);
    }

    #[test]
    fn errors_propagate_and_are_retried() {
        let attempts = Rc::new(Cell::new(0));
        let seen = attempts.clone();
        let memo: Memoized<u32, u32, String> = Memoized::fallible(move |k: &[u32]| {
            attempts.set(attempts.get() + 1);
            if attempts.get() < 3 {
                Err(format!("attempt {}", attempts.get()))
            } else {
                Ok(k[0] + 1)
            }
        });
        assert_eq!(memo.try_call(&[1]), Err("attempt 1".to_string()));
        assert_eq!(memo.try_call(&[1]), Err("attempt 2".to_string()));
        assert_eq!(memo.try_call(&[1]), Ok(2));
        assert_eq!(memo.try_call(&[1]), Ok(2));
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn zero_arity_after_failure() {
        let attempts = Rc::new(Cell::new(0));
        let seen = attempts.clone();
        let memo: Memoized<u8, &str, ()> = Memoized::fallible(move |_: &[u8]| {
            attempts.set(attempts.get() + 1);
            if attempts.get() == 1 { Err(()) } else { Ok("ready") }
        });
        assert_eq!(memo.try_call(&[]), Err(()));
        assert_eq!(memo.try_call(&[]), Ok("ready"));
        assert_eq!(memo.try_call(&[]), Ok("ready"));
        assert_eq!(seen.get(), 2);
    }
}

// ==============================================
// Randomized laws
// ==============================================

mod property_tests {
    use std::collections::HashMap;

    use super::*;

    proptest! {
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_calls_equal_distinct_sequences(
            calls in prop::collection::vec(prop::collection::vec(0i32..4, 0..4), 1..64)
        ) {
            let (memo, count) = counted(|k: &[i32]| k.iter().map(|&n| i64::from(n) * 3).sum());
            let mut distinct = HashMap::new();
            for keys in &calls {
                let expected: i64 = keys.iter().map(|&n| i64::from(n) * 3).sum();
                prop_assert_eq!(memo.call(keys), expected);
                distinct.insert(keys.clone(), ());
            }
            prop_assert_eq!(count.get(), distinct.len());
            prop_assert_eq!(memo.computed_count(), distinct.len());
            prop_assert!(memo.cell().check_invariants().is_ok());
        }

        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_fixed_arity_matches_original(pairs in prop::collection::vec((-8i64..8, -8i64..8), 1..64)) {
            let f = memoize2(|a: i64, b: i64| a * 31 + b);
            for (a, b) in pairs {
                prop_assert_eq!(f(a, b), a * 31 + b);
            }
        }
    }
}
