//! Basic benchmarks for the `stack_array` crate, comparing the cost of the management modes.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::time::Instant;

use criterion::{Criterion, criterion_group, criterion_main};
use stack_array::{
    ElementLifetime, ManagedStackArray, RawElementLifetime, SafeStackArray, UnmanagedStackArray,
};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;
const CAPACITY: usize = 64;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("sa_basic");

    group.bench_function("build_empty_managed", |b| {
        b.iter(|| drop(black_box(ManagedStackArray::<TestItem, CAPACITY>::new())));
    });

    group.bench_function("move_to_unmanaged", |b| {
        b.iter_custom(|iters| {
            let mut array = UnmanagedStackArray::<TestItem, CAPACITY>::new();

            let start = Instant::now();

            for _ in 0..iters {
                // SAFETY: The index is in bounds. Overwriting a `usize` leaks nothing.
                unsafe {
                    array.move_to(black_box(7), black_box(TEST_VALUE));
                }
            }

            start.elapsed()
        });
    });

    group.bench_function("move_to_managed", |b| {
        b.iter_custom(|iters| {
            let mut array = ManagedStackArray::<TestItem, CAPACITY>::new();

            let start = Instant::now();

            for _ in 0..iters {
                array.move_to(black_box(7), black_box(TEST_VALUE));
            }

            start.elapsed()
        });
    });

    group.bench_function("move_to_bounds_checked", |b| {
        b.iter_custom(|iters| {
            let mut array = SafeStackArray::<TestItem, CAPACITY>::new();

            let start = Instant::now();

            for _ in 0..iters {
                array.move_to(black_box(7), black_box(TEST_VALUE));
            }

            start.elapsed()
        });
    });

    group.bench_function("read_unmanaged", |b| {
        b.iter_custom(|iters| {
            let mut array = UnmanagedStackArray::<TestItem, CAPACITY>::new();

            // SAFETY: The index is in bounds.
            unsafe {
                array.move_to(7, TEST_VALUE);
            }

            let start = Instant::now();

            for _ in 0..iters {
                // SAFETY: The index is in bounds and the slot holds a live value.
                _ = black_box(unsafe { array.const_ref_from(black_box(7)) });
            }

            start.elapsed()
        });
    });

    group.bench_function("read_managed", |b| {
        b.iter_custom(|iters| {
            let mut array = ManagedStackArray::<TestItem, CAPACITY>::new();
            array.move_to(7, TEST_VALUE);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(array.const_ref_from(black_box(7)));
            }

            start.elapsed()
        });
    });

    group.bench_function("read_bounds_checked", |b| {
        b.iter_custom(|iters| {
            let mut array = SafeStackArray::<TestItem, CAPACITY>::new();
            array.move_to(7, TEST_VALUE);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(array.const_ref_from(black_box(7)));
            }

            start.elapsed()
        });
    });

    group.bench_function("try_get_managed", |b| {
        b.iter_custom(|iters| {
            let mut array = ManagedStackArray::<TestItem, CAPACITY>::new();
            array.move_to(7, TEST_VALUE);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(array.try_get(black_box(7)));
            }

            start.elapsed()
        });
    });

    group.finish();

    let mut group = c.benchmark_group("sa_sweep");

    group.bench_function("fill_and_destroy_all_managed", |b| {
        b.iter(|| {
            let mut array = ManagedStackArray::<String, CAPACITY>::new();

            for index in 0..CAPACITY {
                array.create_at(index, String::new);
            }

            array.destroy_all_elements();

            black_box(array)
        });
    });

    group.bench_function("live_count_half_full", |b| {
        let mut array = ManagedStackArray::<TestItem, CAPACITY>::new();

        for index in (0..CAPACITY).step_by(2) {
            array.move_to(index, TEST_VALUE);
        }

        b.iter(|| black_box(array.live_count()));
    });

    group.finish();
}
