//! Anonymous memory regions mapped outside the global allocator.
//!
//! Pages come straight from the OS (`mmap` / `VirtualAlloc`) and are
//! zero-filled on first touch, which is exactly the "unwritten reads as zero"
//! contract chunked storage needs.

use core::ptr::{self, NonNull};

use crate::error::{Error, Result};

/// Granularity external mappings are rounded up to.
pub(crate) const PAGE_SIZE: usize = 4096;

/// Rounds `value` up to a multiple of `align` (a power of two), or `None` if
/// the result does not fit `usize`.
#[inline]
pub(crate) const fn align_up(value: usize, align: usize) -> Option<usize> {
    if align == 0 {
        return Some(value);
    }
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// An owned, page-aligned, zero-initialized mapping.
///
/// Unmapped on drop. Failure to unmap is logged and swallowed: nothing can
/// safely retry a release.
pub(crate) struct Region {
    ptr: NonNull<u8>,
    len: usize,
}

// SAFETY: the region is exclusively owned; shared access only ever reads.
unsafe impl Send for Region {}
// SAFETY: `&Region` exposes no interior mutability.
unsafe impl Sync for Region {}

impl Region {
    /// Maps at least `bytes` bytes.
    pub(crate) fn map(bytes: usize) -> Result<Self> {
        if bytes == 0 {
            return Err(Error::Allocation { bytes });
        }
        let len = align_up(bytes, PAGE_SIZE).ok_or(Error::Allocation { bytes })?;
        // SAFETY: `len` is non-zero; the returned mapping is owned by `Region`.
        let raw = unsafe { allocate_region(len) };
        match raw.and_then(NonNull::new) {
            Some(ptr) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(bytes = len, "mapped external region");
                Ok(Self { ptr, len })
            }
            None => Err(Error::Allocation { bytes: len }),
        }
    }

    /// Base address of the mapping.
    #[inline(always)]
    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Mapped length in bytes (page-rounded).
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        // SAFETY: `ptr`/`len` describe a live mapping created by `allocate_region`.
        let released = unsafe { free_region(self.ptr.as_ptr(), self.len) };
        if !released {
            let err = Error::ResourceRelease { bytes: self.len };
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %err, "external region release failed");
            #[cfg(not(feature = "tracing"))]
            let _ = err;
        }
    }
}

#[cfg(unix)]
unsafe fn allocate_region(size: usize) -> Option<*mut u8> {
    let ptr = libc::mmap(
        ptr::null_mut(),
        size,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANON,
        -1,
        0,
    );
    if ptr == libc::MAP_FAILED {
        None
    } else {
        Some(ptr.cast::<u8>())
    }
}

#[cfg(unix)]
unsafe fn free_region(ptr: *mut u8, size: usize) -> bool {
    libc::munmap(ptr.cast::<libc::c_void>(), size) == 0
}

#[cfg(windows)]
unsafe fn allocate_region(size: usize) -> Option<*mut u8> {
    use windows_sys::Win32::System::Memory::{VirtualAlloc, MEM_COMMIT, MEM_RESERVE, PAGE_READWRITE};
    let ptr = VirtualAlloc(ptr::null(), size, MEM_COMMIT | MEM_RESERVE, PAGE_READWRITE);
    if ptr.is_null() {
        None
    } else {
        Some(ptr.cast::<u8>())
    }
}

#[cfg(windows)]
unsafe fn free_region(ptr: *mut u8, _size: usize) -> bool {
    use windows_sys::Win32::System::Memory::{VirtualFree, MEM_RELEASE};
    VirtualFree(ptr.cast::<core::ffi::c_void>(), 0, MEM_RELEASE) != 0
}

#[cfg(not(any(unix, windows)))]
unsafe fn allocate_region(_size: usize) -> Option<*mut u8> {
    None
}

#[cfg(not(any(unix, windows)))]
unsafe fn free_region(_ptr: *mut u8, _size: usize) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_pages() {
        assert_eq!(align_up(1, PAGE_SIZE), Some(PAGE_SIZE));
        assert_eq!(align_up(PAGE_SIZE, PAGE_SIZE), Some(PAGE_SIZE));
        assert_eq!(align_up(PAGE_SIZE + 1, PAGE_SIZE), Some(2 * PAGE_SIZE));
        assert_eq!(align_up(17, 0), Some(17));
        assert_eq!(align_up(usize::MAX, PAGE_SIZE), None);
    }

    #[cfg(any(unix, windows))]
    #[test]
    fn mapped_region_is_zeroed_and_writable() {
        let region = Region::map(10_000).unwrap();
        assert_eq!(region.len(), 3 * PAGE_SIZE);
        // SAFETY: the region spans `len` bytes and is exclusively owned here.
        let bytes = unsafe { core::slice::from_raw_parts_mut(region.as_ptr(), region.len()) };
        assert!(bytes.iter().all(|&b| b == 0));
        bytes[0] = 7;
        bytes[region.len() - 1] = 9;
        assert_eq!(bytes[0] + bytes[region.len() - 1], 16);
    }

    #[test]
    fn zero_sized_mapping_is_rejected() {
        assert_eq!(Region::map(0).err(), Some(Error::Allocation { bytes: 0 }));
    }

    #[test]
    fn mapping_that_cannot_be_page_rounded_is_rejected() {
        let bytes = usize::MAX - 1;
        assert_eq!(Region::map(bytes).err(), Some(Error::Allocation { bytes }));
    }
}
