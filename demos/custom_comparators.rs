//! Per-position comparators: case-insensitive names, rounded coordinates.
//!
//! Run with: cargo run --example custom_comparators

use memokit::prelude::*;

fn main() -> Result<(), ConfigError> {
    let lookup = MemoBuilder::<Value>::new()
        .arity(2)
        .comparator_at(
            0,
            comparator(
                |v: &Value| v.as_str().map_or(0, |s| s.len() as u64),
                |a: &Value, b: &Value| match (a.as_str(), b.as_str()) {
                    (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                    _ => a == b,
                },
            ),
        )
        .comparator_at(
            1,
            comparator(
                |v: &Value| v.as_f64().map_or(u64::MAX, |n| n.round() as i64 as u64),
                |a: &Value, b: &Value| match (a.as_f64(), b.as_f64()) {
                    (Some(a), Some(b)) => a.round() == b.round(),
                    _ => a == b,
                },
            ),
        )
        .try_build(|keys: &[Value]| {
            println!("  (computing for {} at {})", keys[0], keys[1]);
            format!("{}@{}", keys[0], keys[1])
        })?;

    for (name, at) in [("Ada", 1.2), ("ADA", 0.9), ("ada", 2.4), ("Grace", 1.0)] {
        println!("{name} {at} -> {}", lookup.call(&[Value::from(name), Value::from(at)]));
    }
    println!("computed: {}", lookup.computed_count());

    match MemoBuilder::<Value>::new()
        .arity(1)
        .comparator_at(2, StrictEquality)
        .try_comparators()
    {
        Ok(_) => println!("unexpectedly accepted"),
        Err(err) => println!("rejected: {err}"),
    }
    Ok(())
}
