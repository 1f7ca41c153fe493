//! `BitVector` - single-bit flags over a [`ChunkedArray`] of 64-bit words.

use super::ChunkedArray;
use crate::error::Result;
use crate::settings::Settings;

const SHIFT: usize = 6;
const MASK: usize = (1 << SHIFT) - 1;

/// A sparse bit vector.
///
/// Words are scaled down to `chunk_size / 8` per chunk so a chunk of bits
/// occupies about as much memory as a chunk of the structures it annotates.
pub struct BitVector {
    words: ChunkedArray<u64>,
}

impl BitVector {
    /// Creates an all-clear bit vector.
    pub fn new(settings: &Settings) -> Self {
        let words_per_chunk = (settings.chunk_size() / 8).max(1);
        Self {
            words: ChunkedArray::new(&settings.with_chunk_size(words_per_chunk)),
        }
    }

    #[inline(always)]
    fn locate(bit: usize) -> (usize, u64) {
        (bit >> SHIFT, 1u64 << (bit & MASK))
    }

    /// Sets `bit`.
    #[inline]
    pub fn set(&mut self, bit: usize) -> Result<()> {
        let (word, mask) = Self::locate(bit);
        self.words.update(word, |w| w | mask).map(|_| ())
    }

    /// Clears `bit`.
    #[inline]
    pub fn clear(&mut self, bit: usize) -> Result<()> {
        let (word, mask) = Self::locate(bit);
        self.words.update(word, |w| w & !mask).map(|_| ())
    }

    /// Returns whether `bit` is set.
    ///
    /// # Errors
    /// [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange) if the bit lies
    /// beyond every word ever written or reserved.
    #[inline]
    pub fn get(&self, bit: usize) -> Result<bool> {
        let (word, mask) = Self::locate(bit);
        Ok((self.words.get(word)? & mask) != 0)
    }

    /// Makes every bit below `bits` readable.
    pub fn reserve(&mut self, bits: usize) -> Result<()> {
        self.words.reserve(bits.div_ceil(64))
    }

    /// Bytes held by allocated words.
    pub fn allocated_bytes(&self) -> usize {
        self.words.allocated_bytes()
    }

    /// Releases the backing words.
    pub fn destroy(self) {
        self.words.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Residency;

    #[test]
    fn set_clear_get_across_words() {
        let mut bits = BitVector::new(&Settings::new().with_chunk_size(64).with_residency(Residency::Heap));
        for bit in [0, 1, 63, 64, 65, 511, 512, 10_000] {
            assert!(!bits.get(bit).unwrap_or(false));
            bits.set(bit).unwrap();
            assert!(bits.get(bit).unwrap());
        }
        bits.clear(64).unwrap();
        assert!(!bits.get(64).unwrap());
        assert!(bits.get(63).unwrap());
        assert!(bits.get(65).unwrap());
    }

    #[test]
    fn reserve_makes_far_bits_readable() {
        let mut bits = BitVector::new(&Settings::new().with_chunk_size(8).with_residency(Residency::Heap));
        assert!(bits.get(1 << 20).is_err());
        bits.reserve((1 << 20) + 1).unwrap();
        assert!(!bits.get(1 << 20).unwrap());
    }

    #[test]
    fn highest_bits_are_errors_not_panics() {
        let mut bits = BitVector::new(&Settings::new().with_chunk_size(8).with_residency(Residency::Heap));
        assert!(bits.set(usize::MAX).is_err());
        assert!(bits.reserve(usize::MAX).is_err());
        assert!(bits.get(usize::MAX).is_err());
    }
}
