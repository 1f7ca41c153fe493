//! A compressed sparse row (CSR) graph built in two passes over an [`EdgeSource`].
//!
//! Each direction stores all neighbor lists back to back in one packed edge
//! array, addressed by a per-vertex offset table, with a [`BitVector`] marking
//! the offsets where a list starts. Forward iteration detects the end of a
//! list from the next offset alone, so no length table is kept.
//!
//! Memory layout, per direction:
//! - `offsets`: `u32` per vertex; 0 means "no edges"
//! - `edges`: `u32` per edge, starting at offset 1
//! - `boundaries`: one bit per edge offset, plus the one-past-the-end offset
//!
//! Construction:
//! 1. Count in/out degrees, the edge total, and the highest vertex id.
//! 2. Lay out offsets from the degrees.
//! 3. Replay the edges, placing each at `offset + remaining_degree` while the
//!    degree counter counts down. Neighbors therefore come back in the
//!    reverse of the order the source produced them.
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `build` | \(O(n + m)\) | Exactly two passes over the source |
//! | `walk_*_edges` | \(O(1)\) | One offset read, one edge read |
//! | `next_*_edge` | \(O(1)\) | One bit read, one edge read |
//! | `*_degree` | \(O(\text{degree})\) | Walks the list |

use super::{EdgeSource, Graph};
use crate::collections::{BitVector, ChunkedArray, Cursor};
use crate::error::{Error, Result};
use crate::settings::Settings;

/// Degree histogram buckets: degrees `0..=9` and one for `10+`.
const HISTOGRAM_BUCKETS: usize = 11;

/// One direction of adjacency in CSR form.
struct Adjacency {
    offsets: ChunkedArray<u32>,
    edges: ChunkedArray<u32>,
    boundaries: BitVector,
}

impl Adjacency {
    fn new(settings: &Settings) -> Self {
        Self {
            offsets: ChunkedArray::new(settings),
            edges: ChunkedArray::new(settings),
            boundaries: BitVector::new(settings),
        }
    }

    /// Assigns every vertex in `1..=max` its list offset.
    fn layout(&mut self, degrees: &ChunkedArray<i32>, max: u32) -> Result<()> {
        let mut next: u32 = 1;
        for id in 1..=max as usize {
            let degree = degrees.get(id)?;
            if degree == 0 {
                self.offsets.set(id, 0)?;
                continue;
            }
            self.offsets.set(id, next)?;
            self.boundaries.set(next as usize)?;
            next = u32::try_from(degree)
                .ok()
                .and_then(|d| next.checked_add(d))
                .ok_or_else(|| Error::InternalConsistency(format!("degree {degree} of vertex {id} overflows offsets")))?;
        }
        self.boundaries.set(next as usize)
    }

    /// Places `from -> to` in the slot reserved by `layout`.
    fn place(&mut self, degrees: &mut ChunkedArray<i32>, from: u32, to: u32) -> Result<()> {
        let offset = self.offsets.get(from as usize)?;
        let remaining = degrees.adjust(from as usize, -1)?;
        if offset == 0 || remaining < 0 {
            return Err(Error::InternalConsistency(format!(
                "edge {from}->{to} was not produced by the counting pass"
            )));
        }
        self.edges.set(offset as usize + remaining as usize, to)
    }

    #[inline]
    fn walk(&self, v: u32) -> Result<Cursor> {
        match self.offsets.get(v as usize)? {
            0 => Ok(Cursor::NONE),
            offset => Ok(Cursor::new(offset, self.edges.get(offset as usize)?)),
        }
    }

    #[inline]
    fn next(&self, cursor: Cursor) -> Result<Cursor> {
        if cursor.is_none() {
            return Ok(Cursor::NONE);
        }
        let offset = cursor
            .offset()
            .checked_add(1)
            .ok_or_else(|| Error::InternalConsistency("edge cursor at the last representable offset".into()))?;
        if self.boundaries.get(offset as usize)? {
            return Ok(Cursor::NONE);
        }
        Ok(Cursor::new(offset, self.edges.get(offset as usize)?))
    }

    fn degree(&self, v: u32) -> Result<u32> {
        let mut count = 0;
        let mut cur = self.walk(v)?;
        while cur.is_some() {
            count += 1;
            cur = self.next(cur)?;
        }
        Ok(count)
    }

    fn allocated_bytes(&self) -> usize {
        self.offsets.allocated_bytes() + self.edges.allocated_bytes() + self.boundaries.allocated_bytes()
    }

    fn destroy(self) {
        self.offsets.destroy();
        self.edges.destroy();
        self.boundaries.destroy();
    }
}

/// An immutable CSR graph over vertex ids `1..=max_node()`.
///
/// Uses roughly half the memory of a [`MutableGraph`](super::MutableGraph)
/// for the same edges, and walks packed, sequential edge arrays.
pub struct ImmutableGraph {
    ins: Adjacency,
    outs: Adjacency,
    max: u32,
    edge_count: u64,
}

impl ImmutableGraph {
    /// Builds the graph, calling `source.for_each_edge` exactly twice.
    ///
    /// Both calls must produce identical edges in identical order. A replay
    /// that diverges in a way the degree counters can see is reported as
    /// [`Error::InternalConsistency`]; other divergences silently misplace
    /// edges, so the contract is on the caller.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for an edge touching vertex 0, or more edges
    ///   than 32-bit offsets can address
    /// - [`Error::InternalConsistency`] for a detectably diverging replay
    pub fn build<S: EdgeSource + ?Sized>(settings: &Settings, source: &S) -> Result<Self> {
        let mut out_degrees = ChunkedArray::<i32>::new(settings);
        let mut in_degrees = ChunkedArray::<i32>::new(settings);
        let mut max = 0u32;
        let mut edge_count = 0u64;

        #[cfg(feature = "tracing")]
        tracing::info!("counting vertex degrees");
        source.for_each_edge(|from, to| {
            if from == 0 || to == 0 {
                return Err(Error::InvalidArgument(format!("invalid edge: {from}->{to}")));
            }
            out_degrees.adjust(from as usize, 1)?;
            in_degrees.adjust(to as usize, 1)?;
            max = max.max(from).max(to);
            edge_count += 1;
            Ok(())
        })?;
        if edge_count >= u64::from(u32::MAX) {
            return Err(Error::InvalidArgument(format!(
                "{edge_count} edges exceed what 32-bit edge offsets can address"
            )));
        }
        out_degrees.reserve(max as usize + 1)?;
        in_degrees.reserve(max as usize + 1)?;

        #[cfg(feature = "tracing")]
        {
            log_histogram("out", max, &degree_histogram(&out_degrees, max)?);
            log_histogram("in", max, &degree_histogram(&in_degrees, max)?);
            tracing::info!(vertices = max, edges = edge_count, "laying out edge offsets");
        }
        let mut outs = Adjacency::new(settings);
        let mut ins = Adjacency::new(settings);
        outs.layout(&out_degrees, max)?;
        ins.layout(&in_degrees, max)?;

        #[cfg(feature = "tracing")]
        tracing::info!("filling edge arrays");
        let mut placed = 0u64;
        source.for_each_edge(|from, to| {
            if placed == edge_count || from == 0 || to == 0 || from > max || to > max {
                return Err(Error::InternalConsistency(format!(
                    "edge {from}->{to} was not produced by the counting pass"
                )));
            }
            outs.place(&mut out_degrees, from, to)?;
            ins.place(&mut in_degrees, to, from)?;
            placed += 1;
            Ok(())
        })?;
        if placed != edge_count {
            return Err(Error::InternalConsistency(format!(
                "edge replay produced {placed} edges, counting pass saw {edge_count}"
            )));
        }

        out_degrees.destroy();
        in_degrees.destroy();
        Ok(Self {
            ins,
            outs,
            max,
            edge_count,
        })
    }

    /// Number of edges, multi-edges included.
    #[inline]
    pub fn edge_count(&self) -> u64 {
        self.edge_count
    }

    /// Number of out-edges of `v`, walking the list.
    pub fn out_degree(&self, v: u32) -> Result<u32> {
        if self.contains(v) {
            self.outs.degree(v)
        } else {
            Ok(0)
        }
    }

    /// Number of in-edges of `v`, walking the list.
    pub fn in_degree(&self, v: u32) -> Result<u32> {
        if self.contains(v) {
            self.ins.degree(v)
        } else {
            Ok(0)
        }
    }

    /// Bytes held by both directions.
    pub fn allocated_bytes(&self) -> usize {
        self.ins.allocated_bytes() + self.outs.allocated_bytes()
    }

    #[inline(always)]
    fn contains(&self, v: u32) -> bool {
        v != 0 && v <= self.max
    }
}

impl Graph for ImmutableGraph {
    #[inline]
    fn max_node(&self) -> u32 {
        self.max
    }

    #[inline]
    fn walk_in_edges(&self, v: u32) -> Result<Cursor> {
        if self.contains(v) {
            self.ins.walk(v)
        } else {
            Ok(Cursor::NONE)
        }
    }

    #[inline]
    fn next_in_edge(&self, cursor: Cursor) -> Result<Cursor> {
        self.ins.next(cursor)
    }

    #[inline]
    fn walk_out_edges(&self, v: u32) -> Result<Cursor> {
        if self.contains(v) {
            self.outs.walk(v)
        } else {
            Ok(Cursor::NONE)
        }
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

/// Counts vertices `1..=max` by degree, folding `10+` into the last bucket.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn degree_histogram(degrees: &ChunkedArray<i32>, max: u32) -> Result<[u64; HISTOGRAM_BUCKETS]> {
    let mut counts = [0u64; HISTOGRAM_BUCKETS];
    for id in 1..=max as usize {
        let degree = usize::try_from(degrees.get(id)?).unwrap_or(0);
        counts[degree.min(HISTOGRAM_BUCKETS - 1)] += 1;
    }
    Ok(counts)
}

#[cfg(feature = "tracing")]
fn log_histogram(direction: &str, max: u32, counts: &[u64; HISTOGRAM_BUCKETS]) {
    tracing::info!("frequency of {direction}-degree across {max} vertices");
    for (degree, count) in counts.iter().enumerate() {
        let plus = if degree == HISTOGRAM_BUCKETS - 1 { "+" } else { " " };
        tracing::info!("{degree:2}{plus}  {count:10}");
    }
}

#[cfg(test)]
mod tests;
