use core::marker::PhantomData;
use core::mem;

use super::region::Region;
use crate::collections::Scalar;
use crate::error::{Error, Result};
use crate::settings::Residency;

/// One fixed-size block of scalar storage, either on the heap or in an
/// external mapping.
pub(crate) enum Chunk<T> {
    Heap(Box<[T]>),
    External {
        region: Region,
        len: usize,
        _marker: PhantomData<T>,
    },
}

impl<T: Scalar> Chunk<T> {
    /// Allocates a zero-filled chunk of `len` elements.
    pub(crate) fn allocate(len: usize, residency: Residency) -> Result<Self> {
        let bytes = len
            .checked_mul(mem::size_of::<T>())
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or(Error::Allocation { bytes: usize::MAX })?;
        match residency {
            Residency::Heap => Ok(Chunk::Heap(vec![T::default(); len].into_boxed_slice())),
            Residency::External => {
                let region = Region::map(bytes)?;
                Ok(Chunk::External {
                    region,
                    len,
                    _marker: PhantomData,
                })
            }
        }
    }

    #[inline(always)]
    pub(crate) fn as_slice(&self) -> &[T] {
        match self {
            Chunk::Heap(buf) => buf,
            // SAFETY:
            // - the region spans at least `len * size_of::<T>()` bytes;
            // - it is page-aligned, which satisfies the alignment of every `Scalar`;
            // - it was zero-filled by the OS and `T: FromBytes` accepts any bit pattern.
            Chunk::External { region, len, .. } => unsafe {
                core::slice::from_raw_parts(region.as_ptr().cast::<T>(), *len)
            },
        }
    }

    #[inline(always)]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Chunk::Heap(buf) => buf,
            // SAFETY: as in `as_slice`, and `&mut self` guarantees exclusive access.
            Chunk::External { region, len, .. } => unsafe {
                core::slice::from_raw_parts_mut(region.as_ptr().cast::<T>(), *len)
            },
        }
    }

    /// Bytes held by this chunk.
    pub(crate) fn bytes(&self) -> usize {
        match self {
            Chunk::Heap(buf) => buf.len() * mem::size_of::<T>(),
            Chunk::External { region, .. } => region.len(),
        }
    }

    pub(crate) fn is_external(&self) -> bool {
        matches!(self, Chunk::External { .. })
    }
}
