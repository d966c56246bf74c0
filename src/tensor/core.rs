//! Core Tensor type

use super::layout::{checked_byte_size, checked_elem_count};
use super::{Descriptor, Layout, Storage};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Device;
use std::fmt;

/// N-dimensional array stored on a compute device
///
/// A `Tensor` consists of:
/// - **Storage**: reference-counted device memory
/// - **Layout**: shape, byte strides and byte offset into the storage
/// - **Descriptor**: dtype, element size and element count
///
/// # Zero-Copy Views
///
/// `transpose`, `narrow`, `reshape`, `broadcast_to` and friends return new
/// tensors sharing the same storage. A view keeps its base buffer alive; the
/// buffer is freed when the last tensor referencing it is dropped.
///
/// # Example
///
/// ```
/// use ndkit::prelude::*;
///
/// let device = Device::cpu();
/// let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device)?;
/// let b = a.transpose(0, 1)?; // zero-copy, shares storage with a
/// assert_eq!(a.ref_count(), 2);
/// assert_eq!(b.contiguous()?.to_vec::<f32>()?, vec![1.0, 3.0, 2.0, 4.0]);
/// # Ok::<(), ndkit::error::Error>(())
/// ```
pub struct Tensor {
    storage: Storage,
    layout: Layout,
    descriptor: Descriptor,
    owns_data: bool,
}

impl Tensor {
    /// Assemble a tensor from an existing storage and layout
    ///
    /// The layout must address memory inside the storage.
    pub fn from_parts(storage: Storage, layout: Layout, dtype: DType) -> Result<Self> {
        check_extent(&storage, &layout)?;
        let owns_data = storage.is_owned();
        Ok(Self {
            descriptor: Descriptor::new(dtype, layout.elem_count()),
            storage,
            layout,
            owns_data,
        })
    }

    /// Allocate an uninitialized-by-contract tensor
    ///
    /// Backends hand out zeroed memory, but callers must not rely on it.
    ///
    /// Shapes whose byte size overflows report `OutOfMemory`.
    pub fn empty(shape: &[usize], dtype: DType, device: &Device) -> Result<Self> {
        let nbytes = dense_nbytes(shape, dtype)?;
        let descriptor = Descriptor::new(dtype, nbytes / dtype.size_in_bytes());
        let storage = Storage::new(nbytes, device)?;
        Ok(Self {
            storage,
            layout: Layout::contiguous(shape, descriptor.elsize()),
            descriptor,
            owns_data: true,
        })
    }

    /// Create a tensor from host data
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize], device: &Device) -> Result<Self> {
        dense_nbytes(shape, T::DTYPE)?;
        if checked_elem_count(shape) != Some(data.len()) {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        let storage = Storage::from_bytes(bytemuck::cast_slice(data), device)?;
        Ok(Self {
            storage,
            layout: Layout::contiguous(shape, T::DTYPE.size_in_bytes()),
            descriptor: Descriptor::new(T::DTYPE, data.len()),
            owns_data: true,
        })
    }

    /// Create a rank-0 f32 tensor
    pub fn scalar(value: f32, device: &Device) -> Result<Self> {
        Self::from_slice(&[value], &[], device)
    }

    /// Create a tensor filled with `value` converted to `dtype`
    ///
    /// The host staging buffer is reserved fallibly, so oversized shapes
    /// report `OutOfMemory` instead of aborting.
    pub fn full(shape: &[usize], value: f64, dtype: DType, device: &Device) -> Result<Self> {
        fn repeat_bytes<T: bytemuck::Pod>(v: T, len: usize) -> Result<Vec<u8>> {
            let unit = bytemuck::bytes_of(&v);
            let size = unit.len() * len;
            let mut out = Vec::new();
            out.try_reserve_exact(size)
                .map_err(|_| Error::OutOfMemory { size })?;
            for _ in 0..len {
                out.extend_from_slice(unit);
            }
            Ok(out)
        }

        let len = dense_nbytes(shape, dtype)? / dtype.size_in_bytes();
        if len == 0 {
            return Self::empty(shape, dtype, device);
        }

        let bytes = match dtype {
            DType::F64 => repeat_bytes(value, len)?,
            DType::F32 => repeat_bytes(value as f32, len)?,
            DType::I64 => repeat_bytes(value as i64, len)?,
            DType::I32 => repeat_bytes(value as i32, len)?,
            DType::U8 => repeat_bytes(value as u8, len)?,
            DType::Bool => repeat_bytes(u8::from(value != 0.0), len)?,
        };

        let storage = Storage::from_bytes(&bytes, device)?;
        Ok(Self {
            storage,
            layout: Layout::contiguous(shape, dtype.size_in_bytes()),
            descriptor: Descriptor::new(dtype, len),
            owns_data: true,
        })
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], dtype: DType, device: &Device) -> Result<Self> {
        Self::full(shape, 0.0, dtype, device)
    }

    /// Create a tensor filled with ones
    pub fn ones(shape: &[usize], dtype: DType, device: &Device) -> Result<Self> {
        Self::full(shape, 1.0, dtype, device)
    }

    /// Zeros with this tensor's shape, dtype and device
    pub fn zeros_like(&self) -> Result<Self> {
        Self::zeros(self.shape(), self.dtype(), self.device())
    }

    /// Ones with this tensor's shape, dtype and device
    pub fn ones_like(&self) -> Result<Self> {
        Self::ones(self.shape(), self.dtype(), self.device())
    }

    // ===== Accessors =====

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the descriptor
    #[inline]
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Get the byte strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.descriptor.numel()
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.descriptor.dtype()
    }

    /// Device holding the data
    #[inline]
    pub fn device(&self) -> &Device {
        self.storage.device()
    }

    /// Whether the strides are canonical row-major strides
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Whether this is a rank-0 tensor
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.layout.is_scalar()
    }

    /// Whether this tensor allocated its buffer (false for views)
    #[inline]
    pub fn owns_data(&self) -> bool {
        self.owns_data
    }

    /// Whether this tensor is a view over another tensor's buffer
    #[inline]
    pub fn is_view(&self) -> bool {
        !self.owns_data
    }

    /// Number of tensors sharing this buffer
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.storage.ref_count()
    }

    /// Device address of the first element
    #[inline]
    pub fn data_ptr(&self) -> u64 {
        self.storage.ptr() + self.layout.offset() as u64
    }

    /// Size along dimension `dim` (negative counts from the end)
    pub fn size(&self, dim: isize) -> Option<usize> {
        self.layout
            .normalize_dim(dim)
            .map(|d| self.layout.shape()[d])
    }

    // ===== Views =====

    /// Share this buffer under `layout`, which must stay inside it
    fn derive(&self, layout: Layout) -> Result<Self> {
        check_extent(&self.storage, &layout)?;
        Ok(Self {
            storage: self.storage.clone(),
            descriptor: Descriptor::new(self.dtype(), layout.elem_count()),
            layout,
            owns_data: false,
        })
    }

    /// View this buffer with an explicit shape and byte strides
    ///
    /// Fails if the view would address bytes outside the buffer.
    pub fn view_with(&self, shape: &[usize], strides: &[isize]) -> Result<Self> {
        if shape.len() != strides.len() {
            return Err(Error::invalid_argument(
                "strides",
                format!(
                    "{} strides given for {} dimensions",
                    strides.len(),
                    shape.len()
                ),
            ));
        }
        let layout = Layout::new(
            shape.iter().copied().collect(),
            strides.iter().copied().collect(),
            self.layout.offset(),
            self.descriptor.elsize(),
        );
        self.derive(layout)
    }

    /// Swap two dimensions (zero-copy)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Self> {
        self.derive(self.layout.transpose(dim0, dim1)?)
    }

    /// Transpose the last two dimensions; rank < 2 is returned unchanged
    pub fn t(&self) -> Result<Self> {
        if self.ndim() < 2 {
            return Ok(self.clone());
        }
        self.transpose(-2, -1)
    }

    /// Reorder dimensions (zero-copy)
    pub fn permute(&self, dims: &[usize]) -> Result<Self> {
        self.derive(self.layout.permute(dims)?)
    }

    /// Reinterpret with a new shape; non-contiguous tensors are copied first
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        if checked_elem_count(shape) != Some(self.numel()) {
            return Err(Error::shape_mismatch(shape, self.shape()));
        }
        if self.is_contiguous() {
            return self.derive(self.layout.reshape(shape)?);
        }
        let mut dense = self.copy()?;
        dense.layout = dense.layout.reshape(shape)?;
        Ok(dense)
    }

    /// Reshape to 1-D
    pub fn flatten(&self) -> Result<Self> {
        self.reshape(&[self.numel()])
    }

    /// Restrict a dimension to `start..start + length` (zero-copy)
    pub fn narrow(&self, dim: isize, start: usize, length: usize) -> Result<Self> {
        self.derive(self.layout.narrow(dim, start, length)?)
    }

    /// Insert a size-1 dimension (zero-copy)
    pub fn unsqueeze(&self, dim: usize) -> Result<Self> {
        self.derive(self.layout.unsqueeze(dim)?)
    }

    /// Stretch to `shape` using zero strides (zero-copy)
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self> {
        let layout = self
            .layout
            .broadcast_to(shape)
            .ok_or_else(|| Error::broadcast(self.shape(), shape))?;
        self.derive(layout)
    }

    // ===== Copies =====

    /// Return a contiguous tensor: `self` if already contiguous, else a copy
    pub fn contiguous(&self) -> Result<Self> {
        if self.is_contiguous() {
            return Ok(self.clone());
        }
        self.copy()
    }

    /// Copy into a fresh, owning, contiguous buffer on the same device
    pub fn copy(&self) -> Result<Self> {
        let out = Self::empty(self.shape(), self.dtype(), self.device())?;
        if self.numel() == 0 {
            return Ok(out);
        }
        let runtime = self.device().runtime();
        if self.is_contiguous() {
            runtime.copy_within_device(self.data_ptr(), out.data_ptr(), self.descriptor.nbytes())?;
        } else {
            runtime.copy_strided(self.storage.ptr(), &self.layout, out.data_ptr())?;
        }
        Ok(out)
    }

    /// Copy to another device
    pub fn to_device(&self, device: &Device) -> Result<Self> {
        let dense = self.contiguous()?;
        let mut bytes = vec![0u8; dense.descriptor.nbytes()];
        if !bytes.is_empty() {
            dense
                .device()
                .runtime()
                .copy_from_device(dense.data_ptr(), &mut bytes)?;
        }
        let storage = Storage::from_bytes(&bytes, device)?;
        Ok(Self {
            storage,
            layout: Layout::contiguous(self.shape(), self.descriptor.elsize()),
            descriptor: Descriptor::new(self.dtype(), self.numel()),
            owns_data: true,
        })
    }

    // ===== Data Access =====

    /// Copy the logical contents to a host `Vec` in row-major order
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: self.dtype(),
                rhs: T::DTYPE,
            });
        }
        let dense = self.contiguous()?;
        let mut result = vec![T::zeroed(); dense.numel()];
        if !result.is_empty() {
            let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut result);
            dense
                .device()
                .runtime()
                .copy_from_device(dense.data_ptr(), bytes)?;
        }
        Ok(result)
    }

    /// Extract the value of a single-element tensor
    pub fn item<T: Element>(&self) -> Result<T> {
        if self.numel() != 1 {
            return Err(Error::ShapeMismatch {
                expected: vec![1],
                got: self.shape().to_vec(),
            });
        }
        if T::DTYPE != self.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: self.dtype(),
                rhs: T::DTYPE,
            });
        }
        let mut result = T::zeroed();
        self.device()
            .runtime()
            .copy_from_device(self.data_ptr(), bytemuck::bytes_of_mut(&mut result))?;
        Ok(result)
    }
}

/// Reject layouts that address memory outside `storage`
/// Byte size of a dense `shape` of `dtype`, or `OutOfMemory` on overflow
fn dense_nbytes(shape: &[usize], dtype: DType) -> Result<usize> {
    checked_byte_size(shape, dtype.size_in_bytes()).ok_or(Error::OutOfMemory { size: usize::MAX })
}

fn check_extent(storage: &Storage, layout: &Layout) -> Result<()> {
    let Some((lo, hi)) = layout.byte_extent() else {
        return Err(Error::invalid_argument(
            "layout",
            format!("{layout:?} spans more bytes than can be addressed"),
        ));
    };
    if lo < 0 || (hi > lo && hi as usize > storage.size_in_bytes()) {
        return Err(Error::invalid_argument(
            "layout",
            format!(
                "{layout:?} addresses bytes {lo}..{hi} of a {}-byte buffer",
                storage.size_in_bytes()
            ),
        ));
    }
    Ok(())
}

impl Clone for Tensor {
    /// Clone shares the same storage (zero-copy), incrementing the refcount
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            layout: self.layout.clone(),
            descriptor: self.descriptor,
            owns_data: self.owns_data,
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("dtype", &self.dtype())
            .field("device", self.device())
            .field("contiguous", &self.is_contiguous())
            .field("view", &self.is_view())
            .finish()
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tensor({:?}, dtype={}, device={})",
            self.shape(),
            self.dtype(),
            self.device().name()
        )
    }
}
