use zerocopy::{AsBytes, FromBytes};

mod sealed {
    pub trait Sealed {}
}

/// Fixed-width integer types that chunked storage can hold.
///
/// `FromBytes` guarantees every bit pattern (in particular all-zero pages
/// straight from the OS) is a valid value; `AsBytes` guarantees there is no
/// padding to leak. The trait is sealed to the primitive integer widths.
pub trait Scalar:
    sealed::Sealed + Copy + Default + PartialEq + core::fmt::Debug + FromBytes + AsBytes + Send + Sync + 'static
{
}

macro_rules! impl_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}
            impl Scalar for $t {}
        )*
    };
}

impl_scalar!(u8, u16, u32, u64, i8, i16, i32, i64);
