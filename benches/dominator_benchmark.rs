use criterion::{black_box, criterion_group, criterion_main, Criterion};
use heapgraph::{DominatorTree, EdgeFn, ImmutableGraph, Residency, Result, Settings};

fn bench_dominators(c: &mut Criterion) {
    let settings = Settings::new().with_residency(Residency::Heap);

    // Binary tree with cross links back toward the root.
    let nodes = 200_000u32;
    let tree = EdgeFn(|sink: &mut dyn FnMut(u32, u32) -> Result<()>| {
        for v in 2..=nodes {
            sink(v / 2, v)?;
            if v % 5 == 0 {
                sink(v, v / 3 + 1)?;
            }
        }
        Ok(())
    });
    let g = ImmutableGraph::build(&settings, &tree).unwrap();
    c.bench_function("dominators_tree_with_cross_links", |b| {
        b.iter(|| {
            let doms = DominatorTree::compute(&g, &settings).unwrap();
            black_box(doms.reached());
            doms.destroy();
        });
    });

    // Long chain: exercises the explicit DFS and compression stacks.
    let chain = EdgeFn(|sink: &mut dyn FnMut(u32, u32) -> Result<()>| {
        for v in 1..nodes {
            sink(v, v + 1)?;
        }
        Ok(())
    });
    let g = ImmutableGraph::build(&settings, &chain).unwrap();
    c.bench_function("dominators_chain", |b| {
        b.iter(|| {
            let doms = DominatorTree::compute(&g, &settings).unwrap();
            black_box(doms.reached());
            doms.destroy();
        });
    });
}

criterion_group!(benches, bench_dominators);
criterion_main!(benches);
