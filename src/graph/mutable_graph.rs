//! `MutableGraph` - a graph grown one edge at a time.
//!
//! Both edge directions are kept in [`CellPool`]s indexed by vertex id, so
//! every `edge` call costs two list appends and nothing needs to be known up
//! front. Neighbors come back in insertion order. Uses about twice the memory
//! of an [`ImmutableGraph`](super::ImmutableGraph) over the same edges.

use super::{EdgeSource, Graph};
use crate::collections::{CellPool, Cursor};
use crate::error::{Error, Result};
use crate::settings::Settings;

/// An incrementally built graph over vertex ids `1..=max_node()`.
pub struct MutableGraph {
    ins: CellPool,
    outs: CellPool,
    max: u32,
    edges: u64,
}

impl MutableGraph {
    /// Creates an empty graph.
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            ins: CellPool::new(settings)?,
            outs: CellPool::new(settings)?,
            max: 0,
            edges: 0,
        })
    }

    /// Creates a graph holding every edge of `source` (enumerated once).
    pub fn from_edges<S: EdgeSource + ?Sized>(settings: &Settings, source: &S) -> Result<Self> {
        let mut graph = Self::new(settings)?;
        source.for_each_edge(|from, to| graph.edge(from, to))?;
        Ok(graph)
    }

    /// Adds the directed edge `from -> to`. Multi-edges and self-loops are kept.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if either id is 0.
    pub fn edge(&mut self, from: u32, to: u32) -> Result<()> {
        if from == 0 || to == 0 {
            return Err(Error::InvalidArgument(format!(
                "graph vertex ids must be positive, got {from}->{to}"
            )));
        }
        self.outs.add(from, to)?;
        self.ins.add(to, from)?;
        self.max = self.max.max(from).max(to);
        self.edges += 1;
        Ok(())
    }

    /// Number of edges added.
    #[inline]
    pub fn edge_count(&self) -> u64 {
        self.edges
    }

    /// Bytes held by both adjacency pools.
    pub fn allocated_bytes(&self) -> usize {
        self.ins.allocated_bytes() + self.outs.allocated_bytes()
    }

    #[inline]
    fn walk(pool: &CellPool, v: u32) -> Result<Cursor> {
        if v == 0 || !pool.has_list(v) {
            return Ok(Cursor::NONE);
        }
        pool.walk(v)
    }
}

impl Graph for MutableGraph {
    #[inline]
    fn max_node(&self) -> u32 {
        self.max
    }

    #[inline]
    fn walk_in_edges(&self, v: u32) -> Result<Cursor> {
        Self::walk(&self.ins, v)
    }

    #[inline]
    fn next_in_edge(&self, cursor: Cursor) -> Result<Cursor> {
        self.ins.next(cursor)
    }

    #[inline]
    fn walk_out_edges(&self, v: u32) -> Result<Cursor> {
        Self::walk(&self.outs, v)
    }

    #[inline]
    fn next_out_edge(&self, cursor: Cursor) -> Result<Cursor> {
        self.outs.next(cursor)
    }

    fn destroy(self) {
        self.ins.destroy();
        self.outs.destroy();
    }
}
