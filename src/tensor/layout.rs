//! Layout: shape, byte strides and byte offset of an array view

use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::fmt;

/// Stack allocation threshold for dimensions
/// Most arrays have 4 or fewer dimensions, so we stack-allocate up to 4
const STACK_DIMS: usize = 4;

/// Shape type: dimensions of an array
pub type Shape = SmallVec<[usize; STACK_DIMS]>;

/// Strides type: BYTE offsets between consecutive elements along each dimension
///
/// Signed so that views may walk memory backwards; zero for broadcast
/// dimensions.
pub type Strides = SmallVec<[isize; STACK_DIMS]>;

/// Layout describes how a view addresses its buffer
///
/// Byte address of the element at indices `[i0, i1, ..., in]`:
///   `offset + i0 * strides[0] + i1 * strides[1] + ... + in * strides[n]`
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Shape,
    strides: Strides,
    /// Byte offset of the first element in the underlying buffer
    offset: usize,
    /// Element size in bytes
    elsize: usize,
}

impl Layout {
    /// Create a new contiguous (row-major) layout
    ///
    /// # Example
    /// ```
    /// use ndkit::tensor::Layout;
    /// let layout = Layout::contiguous(&[2, 3, 4], 4);
    /// assert_eq!(layout.shape(), &[2, 3, 4]);
    /// assert_eq!(layout.strides(), &[48, 16, 4]);
    /// ```
    pub fn contiguous(shape: &[usize], elsize: usize) -> Self {
        Self {
            shape: shape.iter().copied().collect(),
            strides: canonical_strides(shape, elsize),
            offset: 0,
            elsize,
        }
    }

    /// Create a layout with explicit shape, strides and offset
    pub fn new(shape: Shape, strides: Strides, offset: usize, elsize: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            shape,
            strides,
            offset,
            elsize,
        }
    }

    /// Create a scalar (0-dimensional) layout
    pub fn scalar(elsize: usize) -> Self {
        Self::contiguous(&[], elsize)
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the byte strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Get the byte offset of the first element
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Element size in bytes
    #[inline]
    pub fn elsize(&self) -> usize {
        self.elsize
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Check if this is a scalar (0 dimensions)
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Check if the strides are the canonical row-major strides for the shape
    ///
    /// The offset does not matter: a contiguous view may start anywhere in
    /// its buffer.
    pub fn is_contiguous(&self) -> bool {
        self.strides == canonical_strides(&self.shape, self.elsize)
    }

    /// Normalize a dimension index (negative counts from the end)
    pub fn normalize_dim(&self, d: isize) -> Option<usize> {
        let ndim = self.ndim() as isize;
        let idx = if d < 0 { ndim + d } else { d };
        (idx >= 0 && idx < ndim).then_some(idx as usize)
    }

    fn require_dim(&self, d: isize) -> Result<usize> {
        self.normalize_dim(d).ok_or(Error::InvalidDimension {
            dim: d,
            ndim: self.ndim(),
        })
    }

    /// Byte range `[lo, hi)` touched by this layout, relative to the buffer start
    ///
    /// Empty layouts touch nothing and return `(offset, offset)`. Returns
    /// None when the range does not fit in `isize`.
    pub fn byte_extent(&self) -> Option<(isize, isize)> {
        let start = isize::try_from(self.offset).ok()?;
        if checked_elem_count(&self.shape)? == 0 {
            return Some((start, start));
        }
        let mut lo = start;
        let mut hi = start;
        for (&dim, &stride) in self.shape.iter().zip(self.strides.iter()) {
            let span = stride.checked_mul(isize::try_from(dim - 1).ok()?)?;
            if span < 0 {
                lo = lo.checked_add(span)?;
            } else {
                hi = hi.checked_add(span)?;
            }
        }
        Some((lo, hi.checked_add(isize::try_from(self.elsize).ok()?)?))
    }

    /// Byte offset of the element at `indices`, relative to the buffer start
    pub fn byte_offset(&self, indices: &[usize]) -> Option<isize> {
        if indices.len() != self.ndim() {
            return None;
        }
        let mut pos = self.offset as isize;
        for ((&idx, &dim), &stride) in indices.iter().zip(&self.shape).zip(&self.strides) {
            if idx >= dim {
                return None;
            }
            pos += idx as isize * stride;
        }
        Some(pos)
    }

    /// Swap two dimensions
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Self> {
        let d0 = self.require_dim(dim0)?;
        let d1 = self.require_dim(dim1)?;

        let mut out = self.clone();
        out.shape.swap(d0, d1);
        out.strides.swap(d0, d1);
        Ok(out)
    }

    /// Reorder dimensions; `dims` must be a permutation of `0..ndim`
    pub fn permute(&self, dims: &[usize]) -> Result<Self> {
        if dims.len() != self.ndim() {
            return Err(Error::invalid_argument(
                "dims",
                format!("expected {} dimensions, got {}", self.ndim(), dims.len()),
            ));
        }
        let mut seen: SmallVec<[bool; STACK_DIMS]> = SmallVec::from_elem(false, dims.len());
        for &d in dims {
            if d >= dims.len() || seen[d] {
                return Err(Error::invalid_argument(
                    "dims",
                    format!("{dims:?} is not a permutation"),
                ));
            }
            seen[d] = true;
        }

        let shape = dims.iter().map(|&d| self.shape[d]).collect();
        let strides = dims.iter().map(|&d| self.strides[d]).collect();
        Ok(Self::new(shape, strides, self.offset, self.elsize))
    }

    /// Reinterpret a contiguous layout with a new shape of equal element count
    pub fn reshape(&self, new_shape: &[usize]) -> Result<Self> {
        if !self.is_contiguous() {
            return Err(Error::NotContiguous);
        }
        if checked_byte_size(new_shape, self.elsize).is_none()
            || checked_elem_count(new_shape) != Some(self.elem_count())
        {
            return Err(Error::shape_mismatch(new_shape, self.shape()));
        }

        let mut out = Self::contiguous(new_shape, self.elsize);
        out.offset = self.offset;
        Ok(out)
    }

    /// Restrict dimension `dim` to `start..start + length`
    pub fn narrow(&self, dim: isize, start: usize, length: usize) -> Result<Self> {
        let d = self.require_dim(dim)?;
        let end = start.checked_add(length).filter(|&end| end <= self.shape[d]);
        if end.is_none() {
            return Err(Error::invalid_argument(
                "length",
                format!(
                    "range of {length} starting at {start} exceeds dimension size {}",
                    self.shape[d]
                ),
            ));
        }

        let mut out = self.clone();
        if length > 0 {
            out.offset = (self.offset as isize + start as isize * self.strides[d]) as usize;
        }
        out.shape[d] = length;
        Ok(out)
    }

    /// Insert a dimension of size 1 at `dim`
    pub fn unsqueeze(&self, dim: usize) -> Result<Self> {
        let ndim = self.ndim();
        if dim > ndim {
            return Err(Error::InvalidDimension {
                dim: dim as isize,
                ndim,
            });
        }

        let stride = if dim < ndim {
            self.strides[dim] * self.shape[dim] as isize
        } else {
            self.elsize as isize
        };

        let mut out = self.clone();
        out.shape.insert(dim, 1);
        out.strides.insert(dim, stride);
        Ok(out)
    }

    /// Stretch to `target` using zero strides (trailing-dimension rule)
    ///
    /// Returns None if the shapes are not broadcast-compatible.
    pub fn broadcast_to(&self, target: &[usize]) -> Option<Self> {
        if target.len() < self.ndim() || checked_elem_count(target).is_none() {
            return None;
        }

        let pad = target.len() - self.ndim();
        let mut shape = Shape::with_capacity(target.len());
        let mut strides = Strides::with_capacity(target.len());

        for &t in &target[..pad] {
            shape.push(t);
            strides.push(0);
        }

        for ((&s, &st), &t) in self.shape.iter().zip(&self.strides).zip(&target[pad..]) {
            if s == t {
                shape.push(t);
                strides.push(st);
            } else if s == 1 {
                shape.push(t);
                strides.push(0);
            } else {
                return None;
            }
        }

        Some(Self::new(shape, strides, self.offset, self.elsize))
    }
}

/// Element count of `shape`, or None if it overflows `usize`
pub fn checked_elem_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Bytes needed for a dense `shape` of `elsize`-byte elements
///
/// None when the size, or any row-major stride of `shape`, exceeds
/// `isize::MAX`.
pub fn checked_byte_size(shape: &[usize], elsize: usize) -> Option<usize> {
    // Zero-sized dimensions still leave the other strides in place.
    let span = shape
        .iter()
        .try_fold(elsize, |acc, &d| acc.checked_mul(d.max(1)))?;
    isize::try_from(span).ok()?;
    Some(checked_elem_count(shape)? * elsize)
}

/// Row-major byte strides for `shape` with elements of `elsize` bytes
pub fn canonical_strides(shape: &[usize], elsize: usize) -> Strides {
    let mut strides: Strides = SmallVec::from_elem(0, shape.len());
    let mut stride = elsize as isize;
    for (slot, &dim) in strides.iter_mut().zip(shape.iter()).rev() {
        *slot = stride;
        stride *= dim.max(1) as isize;
    }
    strides
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout {{ shape: {:?}, strides: {:?}, offset: {}, elsize: {} }}",
            self.shape.as_slice(),
            self.strides.as_slice(),
            self.offset,
            self.elsize
        )
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.shape.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_layout() {
        let layout = Layout::contiguous(&[2, 3, 4], 4);
        assert_eq!(layout.shape(), &[2, 3, 4]);
        assert_eq!(layout.strides(), &[48, 16, 4]);
        assert_eq!(layout.elem_count(), 24);
        assert!(layout.is_contiguous());
    }

    #[test]
    fn test_scalar_layout() {
        let layout = Layout::scalar(4);
        assert!(layout.is_scalar());
        assert_eq!(layout.elem_count(), 1);
        assert!(layout.is_contiguous());
        assert_eq!(layout.byte_extent(), Some((0, 4)));
    }

    #[test]
    fn test_transpose() {
        let layout = Layout::contiguous(&[2, 3, 4], 4);
        let transposed = layout.transpose(-1, -2).unwrap();
        assert_eq!(transposed.shape(), &[2, 4, 3]);
        assert_eq!(transposed.strides(), &[48, 4, 16]);
        assert!(!transposed.is_contiguous());
        assert!(layout.transpose(0, 3).is_err());
    }

    #[test]
    fn test_permute() {
        let layout = Layout::contiguous(&[2, 3, 4], 4);
        let p = layout.permute(&[2, 0, 1]).unwrap();
        assert_eq!(p.shape(), &[4, 2, 3]);
        assert_eq!(p.strides(), &[4, 48, 16]);
        assert!(layout.permute(&[0, 0, 1]).is_err());
        assert!(layout.permute(&[0, 1]).is_err());
    }

    #[test]
    fn test_reshape() {
        let layout = Layout::contiguous(&[2, 3, 4], 4);
        let reshaped = layout.reshape(&[6, 4]).unwrap();
        assert_eq!(reshaped.shape(), &[6, 4]);
        assert_eq!(reshaped.strides(), &[16, 4]);
        assert!(layout.reshape(&[5, 5]).is_err());
        assert!(layout.reshape(&[1 << 62, 1 << 62]).is_err());

        let transposed = layout.transpose(0, 1).unwrap();
        assert!(matches!(
            transposed.reshape(&[24]),
            Err(Error::NotContiguous)
        ));
    }

    #[test]
    fn test_narrow_moves_offset() {
        let layout = Layout::contiguous(&[4, 3], 4);
        let rows = layout.narrow(0, 1, 2).unwrap();
        assert_eq!(rows.shape(), &[2, 3]);
        assert_eq!(rows.offset(), 12);
        assert!(rows.is_contiguous());

        let cols = layout.narrow(1, 2, 1).unwrap();
        assert_eq!(cols.shape(), &[4, 1]);
        assert_eq!(cols.offset(), 8);
        assert_eq!(cols.byte_extent(), Some((8, 48)));

        assert!(layout.narrow(1, 2, 2).is_err());
        assert!(layout.narrow(0, usize::MAX, 2).is_err());
        assert!(layout.narrow(0, 2, usize::MAX).is_err());
    }

    #[test]
    fn test_unsqueeze() {
        let layout = Layout::contiguous(&[3], 4);
        let col = layout.unsqueeze(1).unwrap();
        assert_eq!(col.shape(), &[3, 1]);
        assert_eq!(col.strides(), &[4, 4]);
        let row = layout.unsqueeze(0).unwrap();
        assert_eq!(row.shape(), &[1, 3]);
        assert_eq!(row.strides(), &[12, 4]);
        assert!(layout.unsqueeze(3).is_err());
    }

    #[test]
    fn test_broadcast_to() {
        let layout = Layout::contiguous(&[3, 1], 4);
        let b = layout.broadcast_to(&[2, 3, 4]).unwrap();
        assert_eq!(b.shape(), &[2, 3, 4]);
        assert_eq!(b.strides(), &[0, 4, 0]);
        assert!(!b.is_contiguous());
        assert!(layout.broadcast_to(&[2, 4]).is_none());
        assert!(layout.broadcast_to(&[3]).is_none());
    }

    #[test]
    fn test_byte_offset() {
        let layout = Layout::contiguous(&[2, 3], 4);
        assert_eq!(layout.byte_offset(&[1, 2]), Some(20));
        assert_eq!(layout.byte_offset(&[2, 0]), None);
        let t = layout.transpose(0, 1).unwrap();
        assert_eq!(t.byte_offset(&[2, 1]), Some(20));
    }

    #[test]
    fn test_zero_sized_dimension() {
        let layout = Layout::contiguous(&[0, 3], 4);
        assert_eq!(layout.elem_count(), 0);
        assert_eq!(layout.strides(), &[12, 4]);
        assert_eq!(layout.byte_extent(), Some((0, 0)));
    }

    #[test]
    fn test_checked_sizes() {
        assert_eq!(checked_elem_count(&[2, 3, 4]), Some(24));
        assert_eq!(checked_elem_count(&[]), Some(1));
        assert_eq!(checked_elem_count(&[1 << 40, 1 << 40]), None);
        assert_eq!(checked_byte_size(&[6], 4), Some(24));
        assert_eq!(checked_byte_size(&[1 << 62], 4), None);
        assert_eq!(checked_byte_size(&[usize::MAX / 2 + 1], 1), None);
        assert_eq!(checked_byte_size(&[0, 3], 4), Some(0));
        assert_eq!(checked_byte_size(&[1 << 40, 1 << 40, 0], 4), None);
    }

    #[test]
    fn test_byte_extent_overflow() {
        let huge = Layout::new(
            SmallVec::from_slice(&[usize::MAX]),
            SmallVec::from_slice(&[4]),
            0,
            4,
        );
        assert_eq!(huge.byte_extent(), None);
        assert!(Layout::contiguous(&[3], 4).broadcast_to(&[1 << 40, 1 << 40, 3]).is_none());
    }
}
