//! Memory residency primitives.
//!
//! Chunked storage asks for fixed-size, zero-filled blocks either from the
//! global allocator or from anonymous OS mappings that live outside it.

pub(crate) mod chunk;
pub(crate) mod region;

pub(crate) use chunk::Chunk;
