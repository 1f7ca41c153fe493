//! Packed traversal positions.
//!
//! A cursor multiplexes a storage offset (high 32 bits) and the value stored
//! there (low 32 bits) into one `u64`, so walking a list or an edge array
//! never allocates and never boxes. The all-zero cursor is the universal
//! "no more" sentinel, which is why offset 0 never holds a live element.
//!
//! ```rust
//! use heapgraph::Cursor;
//!
//! let c = Cursor::new(5, 42);
//! assert_eq!((c.offset(), c.value()), (5, 42));
//! assert!(Cursor::NONE.is_none());
//! ```

/// A position in a list or edge array plus the value found there.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor(u64);

impl Cursor {
    /// End of iteration.
    pub const NONE: Cursor = Cursor(0);

    /// Packs `offset` and `value`.
    ///
    /// `offset` must be non-zero; a zero offset would alias [`Cursor::NONE`]
    /// whenever `value` is also zero.
    #[inline(always)]
    pub const fn new(offset: u32, value: u32) -> Self {
        debug_assert!(offset != 0, "offset 0 is reserved for the end sentinel");
        Cursor(((offset as u64) << 32) | value as u64)
    }

    /// Rebuilds a cursor from its packed form.
    #[inline(always)]
    pub const fn from_raw(raw: u64) -> Self {
        Cursor(raw)
    }

    /// The packed form.
    #[inline(always)]
    pub const fn into_raw(self) -> u64 {
        self.0
    }

    /// `true` at end of iteration.
    #[inline(always)]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// `true` while positioned on an element.
    #[inline(always)]
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }

    /// Storage offset of the element.
    #[inline(always)]
    pub const fn offset(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// The element itself (for graphs, the neighbor id).
    #[inline(always)]
    pub const fn value(self) -> u32 {
        self.0 as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_value_is_still_a_live_cursor() {
        let c = Cursor::new(1, 0);
        assert!(c.is_some());
        assert_eq!(c.value(), 0);
        assert_eq!(c.offset(), 1);
    }

    #[test]
    fn full_width_fields_survive_packing() {
        let c = Cursor::new(u32::MAX, u32::MAX);
        assert_eq!(c.offset(), u32::MAX);
        assert_eq!(c.value(), u32::MAX);
        assert_eq!(Cursor::from_raw(c.into_raw()), c);
    }
}
