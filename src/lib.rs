//! # `heapgraph` - Chunked Storage and Dominators for Heap-Sized Graphs
//!
//! Storage and graph-algorithm primitives for representing the object graph
//! of a memory dump (hundreds of millions of vertices and edges) at close to
//! one machine word per element, and computing immediate dominators over it.
//!
//! ## Key Features
//!
//! - **No per-element objects**: every structure is a handful of chunked
//!   scalar arrays; iteration hands out packed 64-bit [`Cursor`]s
//! - **Lazy, bounded allocations**: storage grows a chunk at a time, unwritten
//!   chunks are never allocated, and no allocation exceeds one chunk
//! - **Optional external residency**: chunks can live in anonymous OS mappings
//!   instead of the process heap ([`Residency::External`])
//! - **Deep-graph safe**: the dominator DFS and path compression use explicit
//!   stacks, so long chains never overflow the call stack
//!
//! ## Architecture
//!
//! 1. **Storage** ([`collections`]):
//!    - [`ChunkedArray`]: sparse growable array of fixed-width scalars
//!    - [`BitVector`]: single-bit flags over chunked 64-bit words
//!    - [`CellPool`]: many append-only `u32` lists sharing one store
//!
//! 2. **Graphs** ([`graph`]):
//!    - [`MutableGraph`]: edge-at-a-time construction over two [`CellPool`]s
//!    - [`ImmutableGraph`]: compressed sparse rows from a replayable [`EdgeSource`]
//!
//! 3. **Algorithms**:
//!    - [`DominatorTree`]: Lengauer–Tarjan over any [`Graph`]
//!
//! ## Example
//!
//! ```rust
//! use heapgraph::{DominatorTree, Graph, MutableGraph, Residency, Settings};
//!
//! let settings = Settings::new().with_residency(Residency::Heap);
//! let mut g = MutableGraph::new(&settings)?;
//! for (from, to) in [(1, 2), (2, 3), (2, 6), (3, 5), (5, 4), (6, 5)] {
//!     g.edge(from, to)?;
//! }
//!
//! let doms = DominatorTree::compute(&g, &settings)?;
//! assert_eq!(doms.get()?, [0, 0, 1, 2, 5, 2, 2]);
//!
//! doms.destroy();
//! g.destroy();
//! # Ok::<(), heapgraph::Error>(())
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::missing_errors_doc)]

mod alloc;
pub mod collections;
pub mod error;
pub mod graph;
pub mod settings;

pub use collections::{BitVector, CellPool, ChunkedArray, Cursor, Scalar};
pub use error::{Error, Result};
pub use graph::{DominatorTree, EdgeFn, EdgeSource, Graph, ImmutableGraph, MutableGraph};
pub use settings::{Release, Residency, Settings, DEFAULT_CHUNK_SIZE};

// Compile-time assertions for memory layout
const _: () = {
    use core::mem;

    // Cursors travel as a single machine word.
    assert!(mem::size_of::<Cursor>() == 8);

    // Settings are copied into every array.
    assert!(mem::size_of::<Settings>() <= mem::size_of::<usize>() * 2);
};
