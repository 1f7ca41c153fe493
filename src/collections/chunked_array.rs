//! `ChunkedArray` - a sparse, growable array of fixed-width scalars.
//!
//! ## Performance Characteristics
//!
//! ### Time Complexity
//! - **get / set / add / adjust**: O(1) amortized; one division and one modulo
//!   locate the chunk and the slot inside it
//! - **Table growth**: amortized O(1); the chunk table grows ×1.5
//!
//! ### Space Complexity
//! - **Per element**: `size_of::<T>()`
//! - **Per chunk**: one table slot; chunks are allocated on first write only
//! - **Holes**: chunks never written are never allocated and read as zero
//!
//! ### Memory Layout
//! - Chunks hold `chunk_size` elements each and live either on the heap or
//!   in anonymous OS mappings (see [`Residency`](crate::Residency))
//! - No single allocation ever exceeds one chunk, so arrays of hundreds of
//!   millions of elements never need a giant contiguous block
//!
//! ## Usage
//! ```rust
//! use heapgraph::{collections::ChunkedArray, Residency, Settings};
//!
//! let settings = Settings::new().with_chunk_size(1024).with_residency(Residency::Heap);
//! let mut counts = ChunkedArray::<i32>::new(&settings);
//! counts.set(5_000, 7)?;
//! assert_eq!(counts.get(5_000)?, 7);
//! assert_eq!(counts.get(10)?, 0); // hole
//! assert_eq!(counts.size(), 5_001);
//! assert_eq!(counts.adjust(5_000, -2)?, 5);
//! # Ok::<(), heapgraph::Error>(())
//! ```

use core::fmt;
use core::mem;

use num_traits::CheckedAdd;

use super::Scalar;
use crate::alloc::Chunk;
use crate::error::{Error, Result};
use crate::settings::Settings;

/// Number of chunk slots a fresh table starts with.
const INITIAL_TABLE_SLOTS: usize = 1024;

/// A growable array of scalars stored in lazily allocated chunks.
///
/// - `size()` is one past the highest index ever written, holes included.
/// - `add` appends at an internal cursor that is independent of `set`.
/// - Reads of unwritten indices return zero, unless the index lies beyond the
///   chunk table, which only writes (or [`reserve`](Self::reserve)) grow.
pub struct ChunkedArray<T> {
    chunks: Vec<Option<Chunk<T>>>,
    chunk_size: usize,
    settings: Settings,
    cursor: usize,
    len: usize,
    allocated: usize,
}

impl<T: Scalar> ChunkedArray<T> {
    /// Creates an empty array using `settings` for chunk size and residency.
    pub fn new(settings: &Settings) -> Self {
        let mut chunks = Vec::new();
        chunks.resize_with(INITIAL_TABLE_SLOTS, || None);
        Self {
            chunks,
            chunk_size: settings.chunk_size(),
            settings: *settings,
            cursor: 0,
            len: 0,
            allocated: 0,
        }
    }

    /// Elements per chunk.
    #[inline(always)]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// One past the highest index ever written (holes count).
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been written yet.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of indices addressable by the current chunk table.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.chunks.len().saturating_mul(self.chunk_size)
    }

    /// Number of chunks actually allocated.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.allocated
    }

    /// Bytes held by allocated chunks.
    pub fn allocated_bytes(&self) -> usize {
        self.chunks.iter().flatten().map(Chunk::bytes).sum()
    }

    #[inline(always)]
    fn split(&self, index: usize) -> (usize, usize) {
        (index / self.chunk_size, index % self.chunk_size)
    }

    /// Returns the element at `index`, or zero if its chunk was never written.
    ///
    /// # Errors
    /// [`Error::IndexOutOfRange`] if `index` lies beyond the chunk table.
    #[inline]
    pub fn get(&self, index: usize) -> Result<T> {
        let (slot, offset) = self.split(index);
        match self.chunks.get(slot) {
            Some(Some(chunk)) => Ok(chunk.as_slice()[offset]),
            Some(None) => Ok(T::default()),
            None => Err(self.out_of_range(index)),
        }
    }

    /// Writes `value` at `index`, allocating its chunk and growing the table
    /// as needed.
    ///
    /// # Errors
    /// [`Error::Allocation`] if an external chunk cannot be mapped.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        self.update(index, |_| value).map(|_| ())
    }

    /// Appends `value` at the internal add cursor and returns its index.
    ///
    /// The add cursor only moves on `add`; `set` past it leaves a gap that
    /// later adds fill in.
    pub fn add(&mut self, value: T) -> Result<usize> {
        let index = self.cursor;
        self.set(index, value)?;
        self.cursor += 1;
        Ok(index)
    }

    /// Read-modify-write of one element; returns the new value.
    ///
    /// Allocates the covering chunk exactly like [`set`](Self::set).
    pub fn update(&mut self, index: usize, f: impl FnOnce(T) -> T) -> Result<T> {
        let end = index.checked_add(1).ok_or_else(|| self.out_of_range(index))?;
        let (slot, offset) = self.split(index);
        let chunk = self.chunk_mut(slot, index)?;
        let cell = &mut chunk.as_mut_slice()[offset];
        *cell = f(*cell);
        let value = *cell;
        if end > self.len {
            self.len = end;
        }
        Ok(value)
    }

    /// Adds `delta` to the element at `index` and returns the new value.
    ///
    /// # Errors
    /// [`Error::Overflow`] if the sum does not fit `T`; the element is left
    /// unchanged in that case.
    pub fn adjust(&mut self, index: usize, delta: T) -> Result<T>
    where
        T: CheckedAdd,
    {
        let mut overflowed = false;
        let value = self.update(index, |old| {
            old.checked_add(&delta).unwrap_or_else(|| {
                overflowed = true;
                old
            })
        })?;
        if overflowed {
            Err(Error::Overflow { index })
        } else {
            Ok(value)
        }
    }

    /// Grows the chunk table so every index below `len` can be read without
    /// [`Error::IndexOutOfRange`]. Allocates no chunks and leaves `size()` alone.
    ///
    /// # Errors
    /// [`Error::IndexOutOfRange`] if `len` exceeds what a chunk table can
    /// address, [`Error::Allocation`] if the table itself cannot grow.
    pub fn reserve(&mut self, len: usize) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        let slot = (len - 1) / self.chunk_size;
        if slot >= self.chunks.len() {
            self.grow_table(slot, len - 1)?;
        }
        Ok(())
    }

    #[inline]
    fn out_of_range(&self, index: usize) -> Error {
        Error::IndexOutOfRange {
            index,
            capacity: self.capacity(),
        }
    }

    /// Grows the table ×1.5 until `slot` fits; `index` is only for the error.
    fn grow_table(&mut self, slot: usize, index: usize) -> Result<()> {
        // `slot * chunk_size` must stay representable and the table a valid `Vec`.
        let max_slots = (usize::MAX / self.chunk_size)
            .min(isize::MAX as usize / mem::size_of::<Option<Chunk<T>>>());
        if slot >= max_slots {
            return Err(self.out_of_range(index));
        }
        let mut slots = self.chunks.len().max(INITIAL_TABLE_SLOTS);
        while slots <= slot {
            slots = slots.saturating_add(slots / 2).min(max_slots);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(from = self.chunks.len(), to = slots, "growing chunk table");
        self.chunks
            .try_reserve_exact(slots - self.chunks.len())
            .map_err(|_| Error::Allocation {
                bytes: slots.saturating_mul(mem::size_of::<Option<Chunk<T>>>()),
            })?;
        self.chunks.resize_with(slots, || None);
        Ok(())
    }

    fn chunk_mut(&mut self, slot: usize, index: usize) -> Result<&mut Chunk<T>> {
        if slot >= self.chunks.len() {
            self.grow_table(slot, index)?;
        }
        let entry = &mut self.chunks[slot];
        if entry.is_none() {
            *entry = Some(self.settings.allocate_chunk::<T>(self.chunk_size)?);
            self.allocated += 1;
        }
        match entry {
            Some(chunk) => Ok(chunk),
            None => Err(Error::InternalConsistency(format!("chunk {slot} vanished after allocation"))),
        }
    }

    /// Releases every chunk.
    ///
    /// External chunks go back to the OS inline or on a detached thread,
    /// depending on [`Release`](crate::Release); heap chunks are simply freed.
    pub fn destroy(self) {
        let Self { chunks, settings, .. } = self;
        settings.release_chunks(chunks);
    }
}

impl<T: Scalar> fmt::Debug for ChunkedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedArray")
            .field("size", &self.len)
            .field("chunk_size", &self.chunk_size)
            .field("chunks", &self.allocated)
            .field("residency", &self.settings.residency())
            .field("element_bytes", &mem::size_of::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Residency;

    fn heap(chunk: usize) -> Settings {
        Settings::new().with_chunk_size(chunk).with_residency(Residency::Heap)
    }

    #[test]
    fn holes_read_as_zero_and_count_toward_size() {
        let mut a = ChunkedArray::<u32>::new(&heap(8));
        a.set(20, 3).unwrap();
        assert_eq!(a.size(), 21);
        assert_eq!(a.get(0).unwrap(), 0);
        assert_eq!(a.get(19).unwrap(), 0);
        assert_eq!(a.get(20).unwrap(), 3);
        // Only the chunk covering index 20 exists.
        assert_eq!(a.chunk_count(), 1);
    }

    #[test]
    fn read_beyond_table_fails_until_a_write_grows_it() {
        let mut a = ChunkedArray::<u8>::new(&heap(4));
        let far = INITIAL_TABLE_SLOTS * 4 + 10;
        assert_eq!(
            a.get(far),
            Err(Error::IndexOutOfRange {
                index: far,
                capacity: INITIAL_TABLE_SLOTS * 4
            })
        );
        a.set(far, 1).unwrap();
        assert_eq!(a.get(far).unwrap(), 1);
        assert_eq!(a.get(far - 1).unwrap(), 0);
    }

    #[test]
    fn table_grows_by_half_until_slot_fits() {
        let mut a = ChunkedArray::<u16>::new(&heap(1));
        a.set(INITIAL_TABLE_SLOTS, 1).unwrap();
        assert_eq!(a.capacity(), INITIAL_TABLE_SLOTS * 3 / 2);
        a.set(INITIAL_TABLE_SLOTS * 2, 1).unwrap();
        assert_eq!(a.capacity(), INITIAL_TABLE_SLOTS * 9 / 4);
    }

    #[test]
    fn reserve_grows_table_without_chunks_or_size() {
        let mut a = ChunkedArray::<i64>::new(&heap(2));
        a.reserve(10_000).unwrap();
        assert!(a.capacity() >= 10_000);
        assert_eq!(a.size(), 0);
        assert_eq!(a.chunk_count(), 0);
        assert_eq!(a.get(9_999).unwrap(), 0);
    }

    #[test]
    fn add_cursor_ignores_sets() {
        let mut a = ChunkedArray::<i32>::new(&heap(4));
        a.set(10, 99).unwrap();
        assert_eq!(a.add(1).unwrap(), 0);
        assert_eq!(a.add(2).unwrap(), 1);
        assert_eq!(a.size(), 11);
        assert_eq!(a.get(1).unwrap(), 2);
    }

    #[test]
    fn adjust_returns_new_value_and_checks_overflow() {
        let mut a = ChunkedArray::<i32>::new(&heap(4));
        assert_eq!(a.adjust(3, 5).unwrap(), 5);
        assert_eq!(a.adjust(3, -7).unwrap(), -2);
        a.set(4, i32::MAX).unwrap();
        assert_eq!(a.adjust(4, 1), Err(Error::Overflow { index: 4 }));
        assert_eq!(a.get(4).unwrap(), i32::MAX);
    }

    #[test]
    fn unrepresentable_indices_are_errors_not_panics() {
        let mut a = ChunkedArray::<u8>::new(&heap(1));
        assert_eq!(
            a.set(usize::MAX, 1),
            Err(Error::IndexOutOfRange {
                index: usize::MAX,
                capacity: INITIAL_TABLE_SLOTS
            })
        );
        assert!(matches!(a.add(1), Ok(0)));
        assert!(matches!(a.adjust(usize::MAX, 1), Err(Error::IndexOutOfRange { .. })));
        assert!(matches!(a.update(usize::MAX - 1, |v| v), Err(Error::IndexOutOfRange { .. })));
        assert!(matches!(a.reserve(usize::MAX), Err(Error::IndexOutOfRange { .. })));

        let mut wide = ChunkedArray::<u64>::new(&heap(1 << 20));
        assert!(wide.set(usize::MAX, 1).is_err());
        assert!(wide.reserve(usize::MAX).is_err());
        assert_eq!(wide.size(), 0);
        assert_eq!(wide.chunk_count(), 0);
    }

    #[cfg(any(unix, windows))]
    #[test]
    fn external_residency_reads_back_writes() {
        let settings = Settings::new().with_chunk_size(1000).with_residency(Residency::External);
        let mut a = ChunkedArray::<u64>::new(&settings);
        for i in 0..5_000u64 {
            a.add(i * 3).unwrap();
        }
        for i in 0..5_000u64 {
            assert_eq!(a.get(i as usize).unwrap(), i * 3);
        }
        assert_eq!(a.chunk_count(), 5);
        // 8000 bytes per chunk, rounded to two pages.
        assert_eq!(a.allocated_bytes(), 5 * 8192);
        a.destroy();
    }
}
