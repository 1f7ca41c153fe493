//! Error type shared by every structure in the crate.

use thiserror::Error;

/// Errors produced by chunked storage, adjacency pools, graphs, and the
/// dominator computation.
///
/// There is no recovery path inside the crate for any of these: callers
/// either fix their input or treat the failure as fatal for the analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An id or edge was rejected (vertex 0, unknown list id, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A read landed in a chunk slot beyond the current chunk table.
    ///
    /// The table only grows on writes (or [`reserve`]), so this means the index
    /// was never written and nothing reserved room for it.
    ///
    /// [`reserve`]: crate::collections::ChunkedArray::reserve
    #[error("index {index} is beyond the chunk table capacity of {capacity} elements")]
    IndexOutOfRange {
        /// The offending element index.
        index: usize,
        /// Number of elements currently addressable without growing the table.
        capacity: usize,
    },

    /// A checked read-modify-write would have overflowed the element width.
    #[error("arithmetic overflow adjusting element {index}")]
    Overflow {
        /// The element whose adjustment overflowed.
        index: usize,
    },

    /// A cursor, offset, or replayed edge decoded to an impossible state.
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),

    /// External memory could not be mapped.
    #[error("failed to map {bytes} bytes of external memory")]
    Allocation {
        /// Size of the rejected mapping.
        bytes: usize,
    },

    /// External memory could not be unmapped.
    ///
    /// Only ever logged; a release is never retried.
    #[error("failed to release {bytes} bytes of external memory")]
    ResourceRelease {
        /// Size of the region that failed to unmap.
        bytes: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
