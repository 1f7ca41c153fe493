//! Immediate dominators by Lengauer–Tarjan, over any [`Graph`] rooted at vertex 1.
//!
//! All working state lives in [`ChunkedArray`]s sized `max_node() + 1`,
//! indexed either by vertex id or by DFS preorder number:
//!
//! | Array | Index | Holds |
//! |-------|-------|-------|
//! | `ord` | vertex | DFS number, 0 if unreached |
//! | `rev` | DFS number | vertex |
//! | `parent` | DFS number | DFS number of the spanning-tree parent |
//! | `semi` | DFS number | semidominator (DFS number) |
//! | `idom` | DFS number | immediate dominator (DFS number) |
//! | `ancestor`, `best` | DFS number | path-compression forest |
//!
//! The DFS and the forest compression both run on explicit stacks, so a
//! million-vertex chain costs heap, not call stack.
//!
//! ```rust
//! use heapgraph::{DominatorTree, ImmutableGraph, Residency, Settings};
//!
//! let settings = Settings::new().with_residency(Residency::Heap);
//! let g = ImmutableGraph::build(&settings, &[(1u32, 2u32), (1, 3), (2, 4), (3, 4)])?;
//! let doms = DominatorTree::compute(&g, &settings)?;
//! assert_eq!(doms.get()?, [0, 0, 1, 1, 1]);
//! # Ok::<(), heapgraph::Error>(())
//! ```

use super::Graph;
use crate::collections::{CellPool, ChunkedArray, Cursor};
use crate::error::{Error, Result};
use crate::settings::Settings;

/// Scratch state that only lives for one computation.
struct Workspace {
    ord: ChunkedArray<u32>,
    rev: ChunkedArray<u32>,
    parent: ChunkedArray<u32>,
    semi: ChunkedArray<u32>,
    idom: ChunkedArray<u32>,
    ancestor: ChunkedArray<u32>,
    best: ChunkedArray<u32>,
    bucket: CellPool,
    path: Vec<u32>,
    reached: u32,
}

impl Workspace {
    fn new(settings: &Settings, max: u32) -> Result<Self> {
        let len = max as usize + 1;
        let array = || -> Result<ChunkedArray<u32>> {
            let mut a = ChunkedArray::new(settings);
            a.reserve(len)?;
            Ok(a)
        };
        let mut bucket = CellPool::new(settings)?;
        // Makes every list id in 0..=max walkable.
        bucket.add(max, 0)?;
        bucket.clear(max)?;
        Ok(Self {
            ord: array()?,
            rev: array()?,
            parent: array()?,
            semi: array()?,
            idom: array()?,
            ancestor: array()?,
            best: array()?,
            bucket,
            path: Vec::new(),
            reached: 0,
        })
    }

    fn number(&mut self, v: u32, parent: u32) -> Result<()> {
        self.reached += 1;
        let n = self.reached;
        self.ord.set(v as usize, n)?;
        self.rev.set(n as usize, v)?;
        self.parent.set(n as usize, parent)
    }

    /// Preorder DFS from vertex 1, visiting out-edges in cursor order.
    fn dfs<G: Graph + ?Sized>(&mut self, graph: &G) -> Result<()> {
        self.number(1, 0)?;
        let mut stack: Vec<(u32, Cursor)> = vec![(1, graph.walk_out_edges(1)?)];
        while let Some(top) = stack.last_mut() {
            let cur = top.1;
            if cur.is_none() {
                stack.pop();
                continue;
            }
            top.1 = graph.next_out_edge(cur)?;
            let from = self.ord.get(top.0 as usize)?;
            let to = cur.value();
            if self.ord.get(to as usize)? == 0 {
                self.number(to, from)?;
                stack.push((to, graph.walk_out_edges(to)?));
            }
        }
        Ok(())
    }

    /// Minimum-semidominator vertex on `v`'s compressed ancestor chain.
    fn eval(&mut self, v: u32) -> Result<u32> {
        if self.ancestor.get(v as usize)? != 0 {
            self.compress(v)?;
        }
        self.best.get(v as usize)
    }

    fn compress(&mut self, v: u32) -> Result<()> {
        self.path.clear();
        let mut x = v;
        loop {
            let a = self.ancestor.get(x as usize)?;
            if self.ancestor.get(a as usize)? == 0 {
                break;
            }
            self.path.push(x);
            x = a;
        }
        // Rootmost first, so each vertex sees an already compressed ancestor.
        while let Some(x) = self.path.pop() {
            let a = self.ancestor.get(x as usize)?;
            let best_a = self.best.get(a as usize)?;
            if self.semi.get(self.best.get(x as usize)? as usize)? > self.semi.get(best_a as usize)? {
                self.best.set(x as usize, best_a)?;
            }
            self.ancestor.set(x as usize, self.ancestor.get(a as usize)?)?;
        }
        Ok(())
    }

    fn semidominators<G: Graph + ?Sized>(&mut self, graph: &G) -> Result<()> {
        for n in 1..=self.reached as usize {
            self.semi.set(n, n as u32)?;
            self.best.set(n, n as u32)?;
        }
        for w in (2..=self.reached).rev() {
            let p = self.parent.get(w as usize)?;
            let mut cur = graph.walk_in_edges(self.rev.get(w as usize)?)?;
            while cur.is_some() {
                let v = self.ord.get(cur.value() as usize)?;
                if v != 0 {
                    let u = self.eval(v)?;
                    let semi_u = self.semi.get(u as usize)?;
                    if semi_u < self.semi.get(w as usize)? {
                        self.semi.set(w as usize, semi_u)?;
                    }
                }
                cur = graph.next_in_edge(cur)?;
            }
            self.bucket.add(self.semi.get(w as usize)?, w)?;
            self.ancestor.set(w as usize, p)?;

            let mut cur = self.bucket.walk(p)?;
            while cur.is_some() {
                let v = cur.value();
                let u = self.eval(v)?;
                let dom = if self.semi.get(u as usize)? < self.semi.get(v as usize)? { u } else { p };
                self.idom.set(v as usize, dom)?;
                cur = self.bucket.next(cur)?;
            }
            self.bucket.clear(p)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.idom.set(1, 0)?;
        for w in 2..=self.reached as usize {
            let idom = self.idom.get(w)?;
            if idom != self.semi.get(w)? {
                self.idom.set(w, self.idom.get(idom as usize)?)?;
            }
        }
        Ok(())
    }
}

/// Immediate dominators of every vertex reachable from vertex 1.
///
/// Unreachable vertices, vertex 0, and vertex 1 all report dominator 0; use
/// [`is_reachable`](Self::is_reachable) to tell them apart.
pub struct DominatorTree {
    max: u32,
    reached: u32,
    ord: ChunkedArray<u32>,
    rev: ChunkedArray<u32>,
    idom: ChunkedArray<u32>,
}

impl DominatorTree {
    /// Runs Lengauer–Tarjan over `graph`, treating vertex 1 as the root.
    ///
    /// Scratch arrays are allocated with `settings` and released before
    /// returning; only the vertex/DFS-number maps and the result are kept.
    pub fn compute<G: Graph + ?Sized>(graph: &G, settings: &Settings) -> Result<Self> {
        let max = graph.max_node();
        let mut ws = Workspace::new(settings, max)?;
        if max > 0 {
            ws.dfs(graph)?;
            #[cfg(feature = "tracing")]
            tracing::info!(reached = ws.reached, vertices = max, "numbered vertices depth-first");
            ws.semidominators(graph)?;
            #[cfg(feature = "tracing")]
            tracing::info!("computed semidominators");
            ws.finish()?;
            #[cfg(feature = "tracing")]
            tracing::info!("computed immediate dominators");
        }

        let Workspace {
            ord,
            rev,
            parent,
            semi,
            idom,
            ancestor,
            best,
            bucket,
            reached,
            ..
        } = ws;
        parent.destroy();
        semi.destroy();
        ancestor.destroy();
        best.destroy();
        bucket.destroy();
        Ok(Self {
            max,
            reached,
            ord,
            rev,
            idom,
        })
    }

    /// Immediate dominator per vertex id, indexed `0..=max_node()`.
    ///
    /// `result[0]` and `result[1]` are 0, as is every unreached vertex.
    pub fn get(&self) -> Result<Vec<u32>> {
        let mut result = vec![0; self.max as usize + 1];
        for (v, slot) in result.iter_mut().enumerate().skip(2) {
            *slot = self.lookup(v)?;
        }
        Ok(result)
    }

    /// Immediate dominator of `v`, 0 for the root or an unreached vertex.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `v` is 0 or above the graph's `max_node()`.
    pub fn immediate_dominator(&self, v: u32) -> Result<u32> {
        self.check(v)?;
        if v == 1 {
            return Ok(0);
        }
        self.lookup(v as usize)
    }

    /// `true` if the DFS from vertex 1 reached `v`.
    pub fn is_reachable(&self, v: u32) -> Result<bool> {
        self.check(v)?;
        Ok(self.ord.get(v as usize)? != 0)
    }

    /// Number of vertices reached from vertex 1, the root included.
    #[inline]
    pub fn reached(&self) -> u32 {
        self.reached
    }

    /// Highest vertex id of the graph the tree was computed over.
    #[inline]
    pub fn max_node(&self) -> u32 {
        self.max
    }

    /// Releases the retained arrays.
    pub fn destroy(self) {
        self.ord.destroy();
        self.rev.destroy();
        self.idom.destroy();
    }

    fn check(&self, v: u32) -> Result<()> {
        if v == 0 || v > self.max {
            return Err(Error::InvalidArgument(format!(
                "vertex {v} outside 1..={}",
                self.max
            )));
        }
        Ok(())
    }

    #[inline]
    fn lookup(&self, v: usize) -> Result<u32> {
        let n = self.ord.get(v)?;
        let d = self.idom.get(n as usize)?;
        self.rev.get(d as usize)
    }
}
