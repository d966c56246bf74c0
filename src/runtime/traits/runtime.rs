//! Core trait for compute backends

use super::device::DeviceKind;
use super::kernels::{ElementwiseKernels, LinalgKernels};
use crate::error::Result;
use crate::runtime::MemoryStats;
use crate::tensor::Layout;
use std::fmt;

/// Core trait for compute backends
///
/// A `Runtime` owns one memory domain (host heap, device address space) and
/// exposes the kernels that may run against it. It is object safe: arrays
/// carry their runtime as `Arc<dyn Runtime>` inside a [`Device`], and the
/// dispatcher picks the implementation from the operand at call time.
///
/// Addresses are plain `u64` values. For the CPU runtime they are host
/// pointers; device runtimes are free to use any address space and must
/// reject addresses they did not hand out.
///
/// [`Device`]: super::Device
pub trait Runtime: Send + Sync + fmt::Debug + 'static {
    /// Memory domain of this runtime
    fn kind(&self) -> DeviceKind;

    /// Index among runtimes of the same kind
    fn ordinal(&self) -> usize {
        0
    }

    /// Human-readable name, e.g. `"cpu"` or `"gpu:0"`
    fn name(&self) -> String;

    /// Allocate `size_bytes` and return its address
    ///
    /// Returns `Err(OutOfMemory)` if allocation fails.
    fn allocate(&self, size_bytes: usize) -> Result<u64>;

    /// Free an allocation made by [`Runtime::allocate`]
    fn deallocate(&self, ptr: u64, size_bytes: usize);

    /// Copy host bytes to `dst`
    fn copy_to_device(&self, src: &[u8], dst: u64) -> Result<()>;

    /// Copy bytes at `src` to the host
    fn copy_from_device(&self, src: u64, dst: &mut [u8]) -> Result<()>;

    /// Copy `size_bytes` between two addresses of this runtime
    fn copy_within_device(&self, src: u64, dst: u64, size_bytes: usize) -> Result<()>;

    /// Gather the elements addressed by `layout` (relative to the buffer at
    /// `src`) into the contiguous buffer at `dst`, in row-major order
    fn copy_strided(&self, src: u64, layout: &Layout, dst: u64) -> Result<()>;

    /// Block until all launched work has finished
    fn synchronize(&self) {}

    /// Allocation counters
    fn memory_stats(&self) -> MemoryStats;

    /// Elementwise kernels running on this runtime's memory
    fn elementwise(&self) -> &dyn ElementwiseKernels;

    /// Dense linear algebra kernels running on this runtime's memory
    fn linalg(&self) -> &dyn LinalgKernels;
}
