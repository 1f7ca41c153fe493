use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use heapgraph::{ChunkedArray, Residency, Settings};

fn bench_chunked_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunked_array");
    let len = 1_000_000usize;

    for residency in [Residency::Heap, Residency::External] {
        let settings = Settings::new().with_residency(residency);

        group.bench_with_input(BenchmarkId::new("add", format!("{residency:?}")), &settings, |b, s| {
            b.iter(|| {
                let mut a = ChunkedArray::<u32>::new(s);
                for i in 0..len as u32 {
                    a.add(i).unwrap();
                }
                black_box(a.size());
                a.destroy();
            });
        });

        let mut filled = ChunkedArray::<u32>::new(&settings);
        for i in 0..len as u32 {
            filled.add(i).unwrap();
        }
        group.bench_function(BenchmarkId::new("sequential_get", format!("{residency:?}")), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for i in 0..len {
                    sum += u64::from(filled.get(i).unwrap());
                }
                black_box(sum)
            });
        });
        filled.destroy();
    }

    let settings = Settings::new().with_residency(Residency::Heap);
    group.bench_function("scattered_adjust", |b| {
        b.iter(|| {
            let mut counts = ChunkedArray::<i32>::new(&settings);
            for i in 0..100_000usize {
                counts.adjust((i * 7919) % len, 1).unwrap();
            }
            black_box(counts.chunk_count())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_chunked_array);
criterion_main!(benches);
