//! Chunked scalar storage and the structures built directly on it.
//!
//! - [`ChunkedArray`]: sparse, growable array of fixed-width scalars
//! - [`BitVector`]: single-bit flags over 64-bit words
//! - [`CellPool`]: many linked `u32` lists sharing one store
//! - [`Cursor`]: the packed position all of them iterate with

pub mod bit_vector;
pub mod cell_pool;
pub mod chunked_array;
pub mod cursor;
mod scalar;

pub use bit_vector::BitVector;
pub use cell_pool::CellPool;
pub use chunked_array::ChunkedArray;
pub use cursor::Cursor;
pub use scalar::Scalar;
