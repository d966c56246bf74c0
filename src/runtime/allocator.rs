//! Host allocation primitives and allocation bookkeeping
//!
//! Both the CPU runtime and the emulated device back their buffers with
//! 64-byte aligned host memory obtained here. Every runtime keeps an
//! [`AllocationCounters`] so tests can observe that each buffer is freed
//! exactly once.

use crate::error::{Error, Result};
use std::alloc::{Layout as AllocLayout, alloc_zeroed, dealloc};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Alignment of every buffer (AVX-512 register width)
pub(crate) const BUFFER_ALIGN: usize = 64;

/// Allocate `size_bytes` of zeroed, 64-byte aligned host memory
pub(crate) fn host_alloc(size_bytes: usize) -> Result<u64> {
    let layout = AllocLayout::from_size_align(size_bytes, BUFFER_ALIGN)
        .map_err(|_| Error::OutOfMemory { size: size_bytes })?;

    // SAFETY: callers never request zero bytes; layout is non-zero sized.
    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        return Err(Error::OutOfMemory { size: size_bytes });
    }
    Ok(ptr as u64)
}

/// Free memory obtained from [`host_alloc`]
///
/// # Safety
/// `ptr` must come from `host_alloc(size_bytes)` and not be freed before.
pub(crate) unsafe fn host_dealloc(ptr: u64, size_bytes: usize) {
    if ptr == 0 || size_bytes == 0 {
        return;
    }
    if let Ok(layout) = AllocLayout::from_size_align(size_bytes, BUFFER_ALIGN) {
        unsafe { dealloc(ptr as *mut u8, layout) };
    }
}

/// Snapshot of a runtime's allocation activity
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Buffers currently allocated
    pub live_buffers: usize,
    /// Bytes currently allocated
    pub live_bytes: usize,
    /// Highest value `live_bytes` has reached
    pub peak_bytes: usize,
    /// Allocations performed since creation
    pub total_allocations: u64,
    /// Deallocations performed since creation
    pub total_deallocations: u64,
}

/// Lock-free counters behind [`MemoryStats`]
#[derive(Debug, Default)]
pub(crate) struct AllocationCounters {
    live_buffers: AtomicUsize,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
    total_allocations: AtomicU64,
    total_deallocations: AtomicU64,
}

impl AllocationCounters {
    pub(crate) fn record_allocation(&self, size_bytes: usize) {
        self.live_buffers.fetch_add(1, Ordering::Relaxed);
        let live = self.live_bytes.fetch_add(size_bytes, Ordering::Relaxed) + size_bytes;
        self.peak_bytes.fetch_max(live, Ordering::Relaxed);
        self.total_allocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_deallocation(&self, size_bytes: usize) {
        self.live_buffers.fetch_sub(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(size_bytes, Ordering::Relaxed);
        self.total_deallocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MemoryStats {
        MemoryStats {
            live_buffers: self.live_buffers.load(Ordering::Relaxed),
            live_bytes: self.live_bytes.load(Ordering::Relaxed),
            peak_bytes: self.peak_bytes.load(Ordering::Relaxed),
            total_allocations: self.total_allocations.load(Ordering::Relaxed),
            total_deallocations: self.total_deallocations.load(Ordering::Relaxed),
        }
    }
}
