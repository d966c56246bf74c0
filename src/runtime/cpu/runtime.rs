//! CPU runtime implementation

use super::backend::{CpuLinalg, SimdKernels};
use super::kernels;
use crate::error::Result;
use crate::runtime::{
    AllocationCounters, DeviceKind, ElementwiseKernels, LinalgKernels, MemoryStats, Runtime,
    host_alloc, host_dealloc,
};
use crate::tensor::Layout;

/// CPU compute runtime
///
/// Memory is 64-byte aligned host heap; addresses are host pointers. The
/// elementwise kernels exposed through [`Runtime::elementwise`] are the SIMD
/// kernels with the default threshold; the client picks scalar or SIMD
/// explicitly when it dispatches.
#[derive(Debug, Default)]
pub struct CpuRuntime {
    counters: AllocationCounters,
    elementwise: SimdKernels,
    linalg: CpuLinalg,
}

impl CpuRuntime {
    /// Create a CPU runtime with its own allocation counters
    pub fn new() -> Self {
        Self::default()
    }
}

impl Runtime for CpuRuntime {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Cpu
    }

    fn name(&self) -> String {
        "cpu".to_string()
    }

    fn allocate(&self, size_bytes: usize) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }
        let ptr = host_alloc(size_bytes)?;
        self.counters.record_allocation(size_bytes);
        Ok(ptr)
    }

    fn deallocate(&self, ptr: u64, size_bytes: usize) {
        if ptr == 0 || size_bytes == 0 {
            return;
        }
        unsafe { host_dealloc(ptr, size_bytes) };
        self.counters.record_deallocation(size_bytes);
    }

    fn copy_to_device(&self, src: &[u8], dst: u64) -> Result<()> {
        if src.is_empty() || dst == 0 {
            return Ok(());
        }
        unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, src.len()) };
        Ok(())
    }

    fn copy_from_device(&self, src: u64, dst: &mut [u8]) -> Result<()> {
        if dst.is_empty() || src == 0 {
            return Ok(());
        }
        unsafe { std::ptr::copy_nonoverlapping(src as *const u8, dst.as_mut_ptr(), dst.len()) };
        Ok(())
    }

    fn copy_within_device(&self, src: u64, dst: u64, size_bytes: usize) -> Result<()> {
        if size_bytes == 0 || src == 0 || dst == 0 {
            return Ok(());
        }
        unsafe { std::ptr::copy(src as *const u8, dst as *mut u8, size_bytes) };
        Ok(())
    }

    fn copy_strided(&self, src: u64, layout: &Layout, dst: u64) -> Result<()> {
        if layout.elem_count() == 0 {
            return Ok(());
        }
        unsafe { kernels::copy_strided(src as *const u8, layout, dst as *mut u8) };
        Ok(())
    }

    fn memory_stats(&self) -> MemoryStats {
        self.counters.snapshot()
    }

    fn elementwise(&self) -> &dyn ElementwiseKernels {
        &self.elementwise
    }

    fn linalg(&self) -> &dyn LinalgKernels {
        &self.linalg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_is_counted() {
        let runtime = CpuRuntime::new();
        let ptr = runtime.allocate(128).unwrap();
        assert_ne!(ptr, 0);
        assert_eq!(runtime.memory_stats().live_bytes, 128);
        runtime.deallocate(ptr, 128);
        let stats = runtime.memory_stats();
        assert_eq!(stats.live_buffers, 0);
        assert_eq!(stats.total_deallocations, 1);
    }

    #[test]
    fn test_zero_sized_allocation() {
        let runtime = CpuRuntime::new();
        assert_eq!(runtime.allocate(0).unwrap(), 0);
        assert_eq!(runtime.memory_stats().total_allocations, 0);
    }

    #[test]
    fn test_round_trip_copy() {
        let runtime = CpuRuntime::new();
        let ptr = runtime.allocate(16).unwrap();
        let data: Vec<u8> = (0..16).collect();
        runtime.copy_to_device(&data, ptr).unwrap();
        let mut back = vec![0u8; 16];
        runtime.copy_from_device(ptr, &mut back).unwrap();
        assert_eq!(back, data);
        runtime.deallocate(ptr, 16);
    }
}
