use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use memokit::memoize::{Memoized, memoize2};

fn fib() -> Memoized<u64, u64> {
    Memoized::recursive(|fib: &Memoized<u64, u64>, k: &[u64]| {
        if k[0] < 2 { k[0] } else { fib.call(&[k[0] - 1]).wrapping_add(fib.call(&[k[0] - 2])) }
    })
}

fn bench_recursive_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("recursive_fib_cold");
    for n in [32u64, 256, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let fib = fib();
                std::hint::black_box(fib.call(&[n]))
            })
        });
    }
    group.finish();
}

fn bench_recursive_warm(c: &mut Criterion) {
    let fib = fib();
    fib.call(&[512]);
    c.bench_function("recursive_fib_warm", |b| {
        b.iter(|| std::hint::black_box(fib.call(&[std::hint::black_box(512)])))
    });
}

fn bench_fixed_arity(c: &mut Criterion) {
    let grid = memoize2(|row: u32, col: u32| u64::from(row) * 1_000 + u64::from(col));
    c.bench_function("memoize2_grid_64x64", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for row in 0..64 {
                for col in 0..64 {
                    acc = acc.wrapping_add(grid(row, col));
                }
            }
            std::hint::black_box(acc)
        })
    });
}

criterion_group!(benches, bench_recursive_cold, bench_recursive_warm, bench_fixed_arity);
criterion_main!(benches);
