use criterion::{Criterion, criterion_group, criterion_main};
use jobsched::MinHeap;

// Benchmark the heap hot path: insert everything, then drain in order.
fn bench_insert_extract(c: &mut Criterion) {
    for n in [10usize, 100, 1000] {
        c.bench_function(&format!("heap_insert_extract_{n}"), |b| {
            b.iter(|| {
                let mut h = MinHeap::with_capacity(n);
                for i in 0..n {
                    // scrambled but deterministic keys
                    h.insert(std::hint::black_box(i.wrapping_mul(2654435761) % 1000));
                }
                while let Ok(v) = h.extract_min() {
                    std::hint::black_box(v);
                }
            });
        });
    }
}

// Worst case for sift_up: strictly decreasing inserts bubble every new
// root all the way from the bottom row.
fn bench_decreasing_inserts(c: &mut Criterion) {
    c.bench_function("heap_insert_decreasing_1000", |b| {
        b.iter(|| {
            let mut h = MinHeap::with_capacity(1000);
            for i in (0..1000i64).rev() {
                h.insert(std::hint::black_box(i));
            }
            std::hint::black_box(h.len());
        });
    });
}

criterion_group!(benches, bench_insert_extract, bench_decreasing_inserts);
criterion_main!(benches);
