//! Integer-vertex graphs with cursor iteration, and dominator trees over them.
//!
//! Vertices are dense ids `1..=max_node()`; 0 means "none" everywhere.
//! Edges are walked with packed [`Cursor`]s whose low 32 bits are the
//! neighbor id, so iteration never allocates:
//!
//! ```rust
//! use heapgraph::{Graph, MutableGraph, Residency, Settings};
//!
//! let mut g = MutableGraph::new(&Settings::new().with_residency(Residency::Heap))?;
//! g.edge(1, 2)?;
//! g.edge(1, 3)?;
//!
//! let mut targets = Vec::new();
//! let mut cur = g.walk_out_edges(1)?;
//! while cur.is_some() {
//!     targets.push(cur.value());
//!     cur = g.next_out_edge(cur)?;
//! }
//! assert_eq!(targets, [2, 3]);
//! # Ok::<(), heapgraph::Error>(())
//! ```
//!
//! Graph implementations:
//! - [`MutableGraph`]: grows one edge at a time
//! - [`ImmutableGraph`]: compressed sparse rows built from a replayable [`EdgeSource`]

pub mod dominators;
pub mod immutable_graph;
pub mod mutable_graph;

pub use dominators::DominatorTree;
pub use immutable_graph::ImmutableGraph;
pub use mutable_graph::MutableGraph;

use crate::collections::Cursor;
use crate::error::Result;

/// Capability shared by both graph representations.
///
/// Walking a vertex that has no edges in that direction (including 0 and ids
/// above `max_node()`) yields [`Cursor::NONE`]. Stepping only fails when a
/// cursor decodes to an impossible position.
pub trait Graph {
    /// Highest vertex id seen.
    fn max_node(&self) -> u32;

    /// First in-edge of `v`; the cursor's value is the source vertex.
    fn walk_in_edges(&self, v: u32) -> Result<Cursor>;

    /// In-edge after `cursor`.
    fn next_in_edge(&self, cursor: Cursor) -> Result<Cursor>;

    /// First out-edge of `v`; the cursor's value is the target vertex.
    fn walk_out_edges(&self, v: u32) -> Result<Cursor>;

    /// Out-edge after `cursor`.
    fn next_out_edge(&self, cursor: Cursor) -> Result<Cursor>;

    /// Releases all storage.
    fn destroy(self)
    where
        Self: Sized;
}

/// A replayable enumeration of directed edges.
///
/// Builders may call [`for_each_edge`](Self::for_each_edge) more than once and
/// rely on every call producing the same edges in the same order. Errors
/// returned by `sink` must be propagated.
pub trait EdgeSource {
    /// Feeds every `(from, to)` edge to `sink`.
    fn for_each_edge<F>(&self, sink: F) -> Result<()>
    where
        F: FnMut(u32, u32) -> Result<()>;
}

impl EdgeSource for [(u32, u32)] {
    fn for_each_edge<F>(&self, mut sink: F) -> Result<()>
    where
        F: FnMut(u32, u32) -> Result<()>,
    {
        for &(from, to) in self {
            sink(from, to)?;
        }
        Ok(())
    }
}

impl<const N: usize> EdgeSource for [(u32, u32); N] {
    fn for_each_edge<F>(&self, sink: F) -> Result<()>
    where
        F: FnMut(u32, u32) -> Result<()>,
    {
        self.as_slice().for_each_edge(sink)
    }
}

impl EdgeSource for Vec<(u32, u32)> {
    fn for_each_edge<F>(&self, sink: F) -> Result<()>
    where
        F: FnMut(u32, u32) -> Result<()>,
    {
        self.as_slice().for_each_edge(sink)
    }
}

impl<S: EdgeSource + ?Sized> EdgeSource for &S {
    fn for_each_edge<F>(&self, sink: F) -> Result<()>
    where
        F: FnMut(u32, u32) -> Result<()>,
    {
        (**self).for_each_edge(sink)
    }
}

/// Adapts a callback that drives a per-edge sink into an [`EdgeSource`].
///
/// ```rust
/// use heapgraph::{EdgeFn, ImmutableGraph, Residency, Settings};
///
/// let chain = EdgeFn(|sink: &mut dyn FnMut(u32, u32) -> heapgraph::Result<()>| {
///     for v in 1..10 {
///         sink(v, v + 1)?;
///     }
///     Ok(())
/// });
/// let g = ImmutableGraph::build(&Settings::new().with_residency(Residency::Heap), &chain)?;
/// assert_eq!(g.edge_count(), 9);
/// # Ok::<(), heapgraph::Error>(())
/// ```
pub struct EdgeFn<F>(pub F);

impl<F> EdgeSource for EdgeFn<F>
where
    F: Fn(&mut dyn FnMut(u32, u32) -> Result<()>) -> Result<()>,
{
    fn for_each_edge<S>(&self, mut sink: S) -> Result<()>
    where
        S: FnMut(u32, u32) -> Result<()>,
    {
        (self.0)(&mut sink)
    }
}
