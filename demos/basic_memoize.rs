//! Memoizing plain functions with the uniform and fixed-arity adapters.
//!
//! Run with: cargo run --example basic_memoize

use std::cell::Cell;
use std::rc::Rc;

use memokit::prelude::*;

fn main() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let subtract = Memoized::new(move |keys: &[i64]| {
        counter.set(counter.get() + 1);
        keys[0] - keys[1]
    });

    for keys in [[5, 3], [2, 1], [5, 3], [2, 1]] {
        println!("subtract{:?} = {}", keys, subtract.call(&keys));
    }
    println!("underlying calls: {}", calls.get());

    let greet = memoize2(|name: &'static str, excited: bool| {
        println!("  (computing greeting for {name})");
        if excited { format!("Hello, {name}!") } else { format!("Hello, {name}.") }
    });
    println!("{}", greet("Ada", true));
    println!("{}", greet("Ada", true));
    println!("{}", greet("Ada", false));

    let describe = Memoized::new(|keys: &[Value]| {
        keys.iter().map(Value::kind).collect::<Vec<_>>().join(" / ")
    });
    let shared = Value::object(vec![1, 2, 3]);
    println!("{}", describe.call(&[Value::from(1), Value::Null, shared.clone()]));
    println!("{}", describe.call(&[Value::from(1.0), Value::Null, shared]));
    println!("distinct calls computed: {}", describe.computed_count());
}
