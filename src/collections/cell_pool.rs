//! `CellPool` - many singly linked `u32` lists sharing one chunked store.
//!
//! Each cell is two adjacent slots in the store: the value at `o` and the
//! next-cell offset at `o + 1`. Offset 0 means "no cell", so the first two
//! slots are reserved placeholders. Freed cells are threaded onto a LIFO
//! freelist through the same next slot and reused before the store grows.
//!
//! ```rust
//! use heapgraph::{collections::CellPool, Residency, Settings};
//!
//! let mut pool = CellPool::new(&Settings::new().with_residency(Residency::Heap))?;
//! pool.add(3, 10)?;
//! pool.add(3, 20)?;
//!
//! let mut seen = Vec::new();
//! let mut cur = pool.walk(3)?;
//! while cur.is_some() {
//!     seen.push(cur.value());
//!     cur = pool.next(cur)?;
//! }
//! assert_eq!(seen, [10, 20]);
//! # Ok::<(), heapgraph::Error>(())
//! ```

use core::num::NonZeroU32;

use super::{ChunkedArray, Cursor};
use crate::error::{Error, Result};
use crate::settings::Settings;

/// Offset of a live cell in the shared store.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellIdx(NonZeroU32);

impl CellIdx {
    #[inline(always)]
    fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(CellIdx)
    }

    #[inline(always)]
    fn raw(self) -> u32 {
        self.0.get()
    }

    #[inline(always)]
    fn value_slot(self) -> usize {
        self.0.get() as usize
    }

    #[inline(always)]
    fn next_slot(self) -> usize {
        self.0.get() as usize + 1
    }
}

/// A pool of independent append-only lists addressed by small integer ids.
pub struct CellPool {
    heads: ChunkedArray<u32>,
    tails: ChunkedArray<u32>,
    cells: ChunkedArray<u32>,
    free: Option<CellIdx>,
}

impl CellPool {
    /// Creates an empty pool.
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut cells = ChunkedArray::new(settings);
        // Placeholder cell at offset 0 so that 0 can mean "none".
        cells.add(0)?;
        cells.add(0)?;
        Ok(Self {
            heads: ChunkedArray::new(settings),
            tails: ChunkedArray::new(settings),
            cells,
            free: None,
        })
    }

    /// Appends `value` to list `list`, creating the list on first use.
    pub fn add(&mut self, list: u32, value: u32) -> Result<()> {
        let cell = self.alloc()?;
        self.cells.set(cell.value_slot(), value)?;
        self.cells.set(cell.next_slot(), 0)?;

        let id = list as usize;
        let head = if self.has_list(list) { self.heads.get(id)? } else { 0 };
        if head == 0 {
            self.heads.set(id, cell.raw())?;
        } else {
            let last = self.tail(list)?;
            self.cells.set(last.next_slot(), cell.raw())?;
        }
        self.tails.set(id, cell.raw())
    }

    /// Frees every cell of `list` and leaves it empty.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `list` was never used.
    pub fn clear(&mut self, list: u32) -> Result<()> {
        self.check_list(list)?;
        let id = list as usize;
        let mut cell = CellIdx::from_raw(self.heads.get(id)?);
        while let Some(c) = cell {
            let next = CellIdx::from_raw(self.cells.get(c.next_slot())?);
            self.release(c)?;
            cell = next;
        }
        self.heads.set(id, 0)?;
        self.tails.set(id, 0)
    }

    /// Cursor at the first value of `list`, or [`Cursor::NONE`] if it is empty.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `list` was never used.
    #[inline]
    pub fn walk(&self, list: u32) -> Result<Cursor> {
        self.check_list(list)?;
        self.cursor(self.heads.get(list as usize)?)
    }

    /// Cursor at the value after `cursor`, or [`Cursor::NONE`] at the end.
    #[inline]
    pub fn next(&self, cursor: Cursor) -> Result<Cursor> {
        match CellIdx::from_raw(cursor.offset()) {
            Some(cell) => self.cursor(self.cells.get(cell.next_slot())?),
            None => Ok(Cursor::NONE),
        }
    }

    /// `true` if `list` has ever been used (it may currently be empty).
    #[inline]
    pub fn has_list(&self, list: u32) -> bool {
        (list as usize) < self.heads.size()
    }

    /// Number of slots in the shared store, placeholders and freed cells included.
    #[inline]
    pub fn storage_len(&self) -> usize {
        self.cells.size()
    }

    /// Bytes held by the store and the head/tail tables.
    pub fn allocated_bytes(&self) -> usize {
        self.heads.allocated_bytes() + self.tails.allocated_bytes() + self.cells.allocated_bytes()
    }

    /// Releases all backing storage.
    pub fn destroy(self) {
        self.heads.destroy();
        self.tails.destroy();
        self.cells.destroy();
    }

    fn check_list(&self, list: u32) -> Result<()> {
        if self.has_list(list) {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!("unknown list id {list}")))
        }
    }

    fn tail(&self, list: u32) -> Result<CellIdx> {
        CellIdx::from_raw(self.tails.get(list as usize)?)
            .ok_or_else(|| Error::InternalConsistency(format!("list {list} has a head but no tail")))
    }

    #[inline(always)]
    fn cursor(&self, raw: u32) -> Result<Cursor> {
        match CellIdx::from_raw(raw) {
            Some(cell) => Ok(Cursor::new(cell.raw(), self.cells.get(cell.value_slot())?)),
            None => Ok(Cursor::NONE),
        }
    }

    fn alloc(&mut self) -> Result<CellIdx> {
        if let Some(cell) = self.free {
            self.free = CellIdx::from_raw(self.cells.get(cell.next_slot())?);
            return Ok(cell);
        }
        let offset = self.cells.size();
        let raw = u32::try_from(offset).map_err(|_| Error::Overflow { index: offset })?;
        CellIdx::from_raw(raw).ok_or_else(|| Error::InternalConsistency("cell store lost its placeholder".into()))
    }

    fn release(&mut self, cell: CellIdx) -> Result<()> {
        let next = self.free.map_or(0, CellIdx::raw);
        self.cells.set(cell.next_slot(), next)?;
        self.free = Some(cell);
        Ok(())
    }
}
