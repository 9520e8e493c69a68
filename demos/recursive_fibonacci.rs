//! Recursive memoization: each Fibonacci index is computed once.
//!
//! Run with: cargo run --example recursive_fibonacci

use memokit::prelude::*;

fn main() {
    let fib = Memoized::recursive(|fib: &Memoized<u64, u128>, keys: &[u64]| {
        let n = keys[0];
        if n < 2 {
            u128::from(n)
        } else {
            fib.call(&[n - 1]) + fib.call(&[n - 2])
        }
    });

    for n in [10u64, 50, 100, 150] {
        println!("fib({n}) = {} (computed so far: {})", fib.call(&[n]), fib.computed_count());
    }

    let checked: Memoized<u64, u64, String> = Memoized::recursive_fallible(
        |fib: &Memoized<u64, u64, String>, keys: &[u64]| {
            let n = keys[0];
            if n < 2 {
                return Ok(n);
            }
            fib.try_call(&[n - 1])?
                .checked_add(fib.try_call(&[n - 2])?)
                .ok_or_else(|| format!("fib({n}) overflows u64"))
        },
    );
    match checked.try_call(&[100]) {
        Ok(v) => println!("fib(100) = {v}"),
        Err(err) => println!("error: {err}"),
    }
    println!("fib(90) = {:?}", checked.try_call(&[90]));
}
