//! Storage: device memory management with Arc-based sharing

use crate::error::Result;
use crate::runtime::Device;
use std::fmt;
use std::sync::Arc;

/// Reference-counted device buffer
///
/// Storage wraps a device allocation so that views (transpose, narrow,
/// broadcast, ...) can share it without copying. Every array holding a clone
/// counts as one reference; the buffer is returned to its device exactly
/// once, when the last reference is dropped.
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    /// Device address (host pointer for CPU, device address for GPU)
    ptr: u64,
    size_bytes: usize,
    device: Device,
    /// If true, we own this memory and deallocate on drop
    owned: bool,
}

impl Storage {
    /// Allocate `size_bytes` on `device`
    ///
    /// A zero-sized request allocates nothing and yields a null address.
    pub fn new(size_bytes: usize, device: &Device) -> Result<Self> {
        let ptr = if size_bytes == 0 {
            0
        } else {
            device.runtime().allocate(size_bytes)?
        };
        Ok(Self::wrap(ptr, size_bytes, device, true))
    }

    /// Allocate and fill from host bytes
    pub fn from_bytes(data: &[u8], device: &Device) -> Result<Self> {
        let storage = Self::new(data.len(), device)?;
        if !data.is_empty() {
            device.runtime().copy_to_device(data, storage.ptr())?;
        }
        Ok(storage)
    }

    /// Wrap existing device memory without taking ownership
    ///
    /// # Safety
    /// - `ptr` must address `size_bytes` of valid memory on `device`
    /// - the memory must outlive every array built on this storage
    pub unsafe fn from_ptr(ptr: u64, size_bytes: usize, device: &Device) -> Self {
        Self::wrap(ptr, size_bytes, device, false)
    }

    fn wrap(ptr: u64, size_bytes: usize, device: &Device, owned: bool) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                ptr,
                size_bytes,
                device: device.clone(),
                owned,
            }),
        }
    }

    /// Base device address of the buffer
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.inner.ptr
    }

    /// Buffer size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.inner.size_bytes
    }

    /// Device holding the buffer
    #[inline]
    pub fn device(&self) -> &Device {
        &self.inner.device
    }

    /// Whether this storage frees its buffer on drop
    #[inline]
    pub fn is_owned(&self) -> bool {
        self.inner.owned
    }

    /// Number of live references to the buffer
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether two storages share one buffer
    #[inline]
    pub fn same_buffer(&self, other: &Storage) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Clone for Storage {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for StorageInner {
    fn drop(&mut self) {
        if self.owned && self.ptr != 0 {
            self.device
                .runtime()
                .deallocate(self.ptr, self.size_bytes);
        }
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("ptr", &format_args!("{:#x}", self.inner.ptr))
            .field("size_bytes", &self.inner.size_bytes)
            .field("device", &self.inner.device)
            .field("owned", &self.inner.owned)
            .finish()
    }
}
