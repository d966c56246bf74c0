//! Descriptor: the immutable type summary attached to every array

use crate::dtype::DType;

/// Element type, element size and element count of an array
///
/// Built once when the array (or view) is created and never modified.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Descriptor {
    dtype: DType,
    elsize: usize,
    numel: usize,
}

impl Descriptor {
    /// Describe `numel` elements of `dtype`
    pub const fn new(dtype: DType, numel: usize) -> Self {
        Self {
            dtype,
            elsize: dtype.size_in_bytes(),
            numel,
        }
    }

    /// Element type
    #[inline]
    pub const fn dtype(&self) -> DType {
        self.dtype
    }

    /// Element size in bytes
    #[inline]
    pub const fn elsize(&self) -> usize {
        self.elsize
    }

    /// Total element count
    #[inline]
    pub const fn numel(&self) -> usize {
        self.numel
    }

    /// Bytes needed for a contiguous buffer of this description
    ///
    /// Saturates at `usize::MAX`, which no runtime can allocate.
    #[inline]
    pub const fn nbytes(&self) -> usize {
        self.numel.saturating_mul(self.elsize)
    }
}
