//! Immutable construction settings shared by every chunked structure.
//!
//! ```rust
//! use heapgraph::{Release, Residency, Settings};
//!
//! let settings = Settings::new()
//!     .with_chunk_size(4096)
//!     .with_residency(Residency::Heap)
//!     .with_release(Release::Inline);
//! assert_eq!(settings.chunk_size(), 4096);
//! ```

use serde::{Deserialize, Serialize};

use crate::alloc::Chunk;
use crate::collections::Scalar;
use crate::error::Result;

/// Elements per chunk unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 16_384;

/// Where chunk memory lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Residency {
    /// Chunks are boxed slices from the global allocator.
    Heap,
    /// Chunks are anonymous OS mappings outside the global allocator.
    #[default]
    External,
}

/// How external chunks are handed back to the OS on `destroy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Release {
    /// Unmap on the calling thread.
    #[default]
    Inline,
    /// Unmap on a detached background thread; no completion signal.
    Background,
}

/// Chunk size and memory residency, fixed at construction time.
///
/// `with_*` methods return modified copies; a `Settings` value never changes
/// underneath a structure built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    chunk_size: usize,
    residency: Residency,
    release: Release,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Default settings: 16K elements per chunk, external residency, inline release.
    pub const fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            residency: Residency::External,
            release: Release::Inline,
        }
    }

    /// Returns a copy with `chunk_size` elements per chunk.
    ///
    /// # Panics
    /// Panics if `chunk_size == 0`.
    pub const fn with_chunk_size(self, chunk_size: usize) -> Self {
        assert!(chunk_size != 0, "chunk size must be > 0");
        Self { chunk_size, ..self }
    }

    /// Returns a copy with the given residency.
    pub const fn with_residency(self, residency: Residency) -> Self {
        Self { residency, ..self }
    }

    /// Returns a copy with the given release strategy.
    pub const fn with_release(self, release: Release) -> Self {
        Self { release, ..self }
    }

    /// Elements per chunk (never zero, even for hand-edited serialized settings).
    #[inline]
    pub const fn chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            1
        } else {
            self.chunk_size
        }
    }

    /// Where chunks are allocated.
    #[inline]
    pub const fn residency(&self) -> Residency {
        self.residency
    }

    /// How external chunks are released.
    #[inline]
    pub const fn release(&self) -> Release {
        self.release
    }

    /// Allocates one zero-filled chunk of `len` elements.
    pub(crate) fn allocate_chunk<T: Scalar>(&self, len: usize) -> Result<Chunk<T>> {
        Chunk::allocate(len, self.residency)
    }

    /// Releases a chunk table, on a background thread when configured and
    /// there is external memory to give back.
    pub(crate) fn release_chunks<T: Scalar>(&self, chunks: Vec<Option<Chunk<T>>>) {
        let external = chunks.iter().flatten().any(Chunk::is_external);
        if !external || self.release == Release::Inline {
            drop(chunks);
            return;
        }

        let spawned = std::thread::Builder::new()
            .name("heapgraph-release".into())
            .spawn(move || drop(chunks));
        // A failed spawn drops the closure, and with it the chunks, right here.
        if let Err(_err) = spawned {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "background release unavailable; released inline");
        }
    }
}
