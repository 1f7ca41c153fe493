use std::cell::Cell;

use super::*;
use crate::graph::{EdgeFn, MutableGraph};
use crate::settings::Residency;

fn settings() -> Settings {
    Settings::new().with_chunk_size(16).with_residency(Residency::Heap)
}

fn collect(mut cur: Cursor, step: impl Fn(Cursor) -> Result<Cursor>) -> Vec<u32> {
    let mut out = Vec::new();
    while cur.is_some() {
        out.push(cur.value());
        cur = step(cur).unwrap();
    }
    out
}

fn out_edges(g: &ImmutableGraph, v: u32) -> Vec<u32> {
    collect(g.walk_out_edges(v).unwrap(), |c| g.next_out_edge(c))
}

fn in_edges(g: &ImmutableGraph, v: u32) -> Vec<u32> {
    collect(g.walk_in_edges(v).unwrap(), |c| g.next_in_edge(c))
}

const SMALL: [(u32, u32); 6] = [(1, 2), (2, 3), (2, 6), (3, 5), (5, 4), (6, 5)];

#[test]
fn neighbors_come_back_in_reverse_source_order() {
    let g = ImmutableGraph::build(&settings(), &SMALL).unwrap();
    assert_eq!(g.max_node(), 6);
    assert_eq!(g.edge_count(), 6);
    assert_eq!(out_edges(&g, 2), [6, 3]);
    assert_eq!(in_edges(&g, 5), [6, 3]);
    assert_eq!(out_edges(&g, 1), [2]);
    assert!(out_edges(&g, 4).is_empty());
    assert!(in_edges(&g, 1).is_empty());
}

#[test]
fn holds_the_same_edges_as_a_mutable_graph() {
    let edges: Vec<(u32, u32)> = (1..200u32).flat_map(|v| [(v, v * 7 % 199 + 1), (v, v / 2 + 1)]).collect();
    let csr = ImmutableGraph::build(&settings(), &edges).unwrap();
    let lists = MutableGraph::from_edges(&settings(), &edges).unwrap();
    assert_eq!(csr.max_node(), lists.max_node());

    for v in 0..=csr.max_node() + 1 {
        let mut expected = collect(lists.walk_out_edges(v).unwrap(), |c| lists.next_out_edge(c));
        let mut actual = out_edges(&csr, v);
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, expected, "out-edges of {v}");

        let mut expected = collect(lists.walk_in_edges(v).unwrap(), |c| lists.next_in_edge(c));
        let mut actual = in_edges(&csr, v);
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, expected, "in-edges of {v}");
    }
}

#[test]
fn degrees_count_multi_edges_and_self_loops() {
    let g = ImmutableGraph::build(&settings(), &[(3u32, 3u32), (3, 3), (3, 1)]).unwrap();
    assert_eq!(g.out_degree(3).unwrap(), 3);
    assert_eq!(g.in_degree(3).unwrap(), 2);
    assert_eq!(g.in_degree(1).unwrap(), 1);
    assert_eq!(g.out_degree(2).unwrap(), 0);
    assert_eq!(g.out_degree(99).unwrap(), 0);
}

#[test]
fn source_is_replayed_exactly_twice() {
    let calls = Cell::new(0);
    let source = EdgeFn(|sink: &mut dyn FnMut(u32, u32) -> Result<()>| {
        calls.set(calls.get() + 1);
        sink(1, 2)?;
        sink(2, 1)
    });
    let g = ImmutableGraph::build(&settings(), &source).unwrap();
    assert_eq!(calls.get(), 2);
    assert_eq!(g.edge_count(), 2);
}

#[test]
fn diverging_replays_are_reported() {
    let calls = Cell::new(0);
    let growing = EdgeFn(|sink: &mut dyn FnMut(u32, u32) -> Result<()>| {
        calls.set(calls.get() + 1);
        for v in 1..=calls.get() {
            sink(1, v + 1)?;
        }
        Ok(())
    });
    assert!(matches!(
        ImmutableGraph::build(&settings(), &growing),
        Err(Error::InternalConsistency(_))
    ));

    let calls = Cell::new(0);
    let shrinking = EdgeFn(|sink: &mut dyn FnMut(u32, u32) -> Result<()>| {
        calls.set(calls.get() + 1);
        if calls.get() == 1 {
            sink(1, 2)?;
        }
        sink(2, 3)
    });
    assert!(matches!(
        ImmutableGraph::build(&settings(), &shrinking),
        Err(Error::InternalConsistency(_))
    ));
}

#[test]
fn zero_ids_are_rejected() {
    let err = ImmutableGraph::build(&settings(), &[(1u32, 2u32), (0, 2)]).err();
    assert_eq!(err, Some(Error::InvalidArgument("invalid edge: 0->2".into())));
}

#[test]
fn empty_source_builds_an_empty_graph() {
    let empty: Vec<(u32, u32)> = Vec::new();
    let g = ImmutableGraph::build(&settings(), &empty).unwrap();
    assert_eq!(g.max_node(), 0);
    assert_eq!(g.edge_count(), 0);
    assert!(out_edges(&g, 1).is_empty());
    assert!(in_edges(&g, 0).is_empty());
    g.destroy();
}

#[test]
fn histogram_folds_high_degrees_into_last_bucket() {
    let mut degrees = ChunkedArray::<i32>::new(&settings());
    degrees.set(1, 0).unwrap();
    degrees.set(2, 3).unwrap();
    degrees.set(3, 10).unwrap();
    degrees.set(4, 250).unwrap();
    let counts = degree_histogram(&degrees, 5).unwrap();
    assert_eq!(counts[0], 2);
    assert_eq!(counts[3], 1);
    assert_eq!(counts[HISTOGRAM_BUCKETS - 1], 2);
    assert_eq!(counts.iter().sum::<u64>(), 5);
}

#[test]
fn uses_less_memory_than_linked_lists() {
    let settings = Settings::new().with_chunk_size(4096).with_residency(Residency::Heap);
    let edges: Vec<(u32, u32)> = (1..50_000u32).map(|v| (v, v + 1)).collect();
    let csr = ImmutableGraph::build(&settings, &edges).unwrap();
    let lists = MutableGraph::from_edges(&settings, &edges).unwrap();
    assert!(csr.allocated_bytes() < lists.allocated_bytes());
}
