//! Emulated GPU runtime

use super::memory::AddressSpace;
use crate::error::{Error, Result};
use crate::ops::{BinaryOp, ReduceOp, UnaryOp};
use crate::runtime::cpu::kernels::copy_strided;
use crate::runtime::cpu::{CpuLinalg, ScalarKernels};
use crate::runtime::{
    AllocationCounters, DeviceKind, ElementwiseKernels, LinalgKernels, MemoryStats, Runtime,
};
use crate::tensor::Layout;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

const F32: usize = std::mem::size_of::<f32>();

/// A device with a private address space
///
/// Buffers live in host memory but are only reachable through addresses this
/// runtime issued; passing any other address (a host pointer, or an address
/// of another device) to a kernel or copy fails with [`Error::Backend`].
/// Kernels run the host implementations while holding the address-space
/// lock, and are counted so tests can observe device dispatch.
#[derive(Debug)]
pub struct EmulatedGpuRuntime {
    ordinal: usize,
    space: Mutex<AddressSpace>,
    counters: AllocationCounters,
    launches: AtomicU64,
    synchronizations: AtomicU64,
}

impl EmulatedGpuRuntime {
    /// Create device `ordinal`
    pub fn new(ordinal: usize) -> Self {
        tracing::info!(ordinal, "created emulated gpu runtime");
        Self {
            ordinal,
            space: Mutex::new(AddressSpace::default()),
            counters: AllocationCounters::default(),
            launches: AtomicU64::new(0),
            synchronizations: AtomicU64::new(0),
        }
    }

    /// Kernels launched since creation
    pub fn kernel_launches(&self) -> u64 {
        self.launches.load(Ordering::Relaxed)
    }

    /// Calls to [`Runtime::synchronize`] since creation
    pub fn synchronizations(&self) -> u64 {
        self.synchronizations.load(Ordering::Relaxed)
    }

    fn launch<T>(&self, kernel: &'static str, body: impl FnOnce(&AddressSpace) -> Result<T>) -> Result<T> {
        let space = self.space.lock();
        self.launches.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(kernel, device = self.ordinal, "launching device kernel");
        body(&space)
    }
}

impl Runtime for EmulatedGpuRuntime {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Gpu
    }

    fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn name(&self) -> String {
        format!("gpu:{}", self.ordinal)
    }

    fn allocate(&self, size_bytes: usize) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }
        let addr = self.space.lock().allocate(size_bytes)?;
        self.counters.record_allocation(size_bytes);
        tracing::trace!(addr, size_bytes, device = self.ordinal, "device allocation");
        Ok(addr)
    }

    fn deallocate(&self, ptr: u64, _size_bytes: usize) {
        if ptr == 0 {
            return;
        }
        match self.space.lock().free(ptr) {
            Some(size) => self.counters.record_deallocation(size),
            None => tracing::warn!(ptr, device = self.ordinal, "free of unmapped device address"),
        }
    }

    fn copy_to_device(&self, src: &[u8], dst: u64) -> Result<()> {
        let space = self.space.lock();
        let dst = space.resolve(dst, src.len())?;
        if dst != 0 {
            unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, src.len()) };
        }
        Ok(())
    }

    fn copy_from_device(&self, src: u64, dst: &mut [u8]) -> Result<()> {
        let space = self.space.lock();
        let src = space.resolve(src, dst.len())?;
        if src != 0 {
            unsafe { std::ptr::copy_nonoverlapping(src as *const u8, dst.as_mut_ptr(), dst.len()) };
        }
        Ok(())
    }

    fn copy_within_device(&self, src: u64, dst: u64, size_bytes: usize) -> Result<()> {
        let space = self.space.lock();
        let src = space.resolve(src, size_bytes)?;
        let dst = space.resolve(dst, size_bytes)?;
        if size_bytes > 0 {
            unsafe { std::ptr::copy(src as *const u8, dst as *mut u8, size_bytes) };
        }
        Ok(())
    }

    fn copy_strided(&self, src: u64, layout: &Layout, dst: u64) -> Result<()> {
        let count = layout.elem_count();
        if count == 0 {
            return Ok(());
        }
        let hi = match layout.byte_extent() {
            Some((lo, hi)) if lo >= 0 => hi,
            _ => {
                return Err(Error::invalid_argument(
                    "layout",
                    format!("{layout:?} addresses bytes outside the buffer"),
                ));
            }
        };
        self.launch("copy_strided", |space| {
            let src = space.resolve(src, hi as usize)?;
            let dst = space.resolve(dst, count * layout.elsize())?;
            unsafe { copy_strided(src as *const u8, layout, dst as *mut u8) };
            Ok(())
        })
    }

    fn synchronize(&self) {
        self.synchronizations.fetch_add(1, Ordering::Relaxed);
    }

    fn memory_stats(&self) -> MemoryStats {
        self.counters.snapshot()
    }

    fn elementwise(&self) -> &dyn ElementwiseKernels {
        self
    }

    fn linalg(&self) -> &dyn LinalgKernels {
        self
    }
}

impl ElementwiseKernels for EmulatedGpuRuntime {
    fn binary_f32(&self, op: BinaryOp, a: u64, b: u64, out: u64, len: usize) -> Result<()> {
        self.launch(op.name(), |space| {
            let bytes = len * F32;
            let (a, b, out) = (
                space.resolve(a, bytes)?,
                space.resolve(b, bytes)?,
                space.resolve(out, bytes)?,
            );
            ScalarKernels.binary_f32(op, a, b, out, len)
        })
    }

    fn unary_f32(&self, op: UnaryOp, a: u64, out: u64, len: usize) -> Result<()> {
        self.launch(op.name(), |space| {
            let bytes = len * F32;
            let (a, out) = (space.resolve(a, bytes)?, space.resolve(out, bytes)?);
            ScalarKernels.unary_f32(op, a, out, len)
        })
    }

    fn fill_f32(&self, out: u64, len: usize, value: f32) -> Result<()> {
        self.launch("fill", |space| {
            let out = space.resolve(out, len * F32)?;
            ScalarKernels.fill_f32(out, len, value)
        })
    }

    fn reduce_f32(&self, op: ReduceOp, a: u64, len: usize) -> Result<f32> {
        self.launch(op.name(), |space| {
            let a = space.resolve(a, len * F32)?;
            ScalarKernels.reduce_f32(op, a, len)
        })
    }
}

impl LinalgKernels for EmulatedGpuRuntime {
    fn gemm_f32(&self, a: u64, b: u64, c: u64, m: usize, n: usize, k: usize) -> Result<()> {
        self.launch("gemm", |space| {
            let (a, b, c) = (
                space.resolve(a, m * k * F32)?,
                space.resolve(b, k * n * F32)?,
                space.resolve(c, m * n * F32)?,
            );
            CpuLinalg.gemm_f32(a, b, c, m, n, k)
        })
    }

    fn gemv_f32(&self, a: u64, x: u64, y: u64, m: usize, n: usize) -> Result<()> {
        self.launch("gemv", |space| {
            let (a, x, y) = (
                space.resolve(a, m * n * F32)?,
                space.resolve(x, n * F32)?,
                space.resolve(y, m * F32)?,
            );
            CpuLinalg.gemv_f32(a, x, y, m, n)
        })
    }

    fn getrf_f32(&self, a: u64, n: usize, ipiv: &mut [i32]) -> Result<()> {
        self.launch("getrf", |space| {
            let a = space.resolve(a, n * n * F32)?;
            CpuLinalg.getrf_f32(a, n, ipiv)
        })
    }

    fn getri_f32(&self, a: u64, n: usize, ipiv: &[i32]) -> Result<()> {
        self.launch("getri", |space| {
            let a = space.resolve(a, n * n * F32)?;
            CpuLinalg.getri_f32(a, n, ipiv)
        })
    }

    fn det_f32(&self, a: u64, n: usize) -> Result<f32> {
        self.launch("det", |space| {
            let a = space.resolve(a, n * n * F32)?;
            CpuLinalg.det_f32(a, n)
        })
    }

    fn lu_f32(&self, a: u64, p: u64, l: u64, u: u64, n: usize) -> Result<()> {
        self.launch("lu", |space| {
            let bytes = n * n * F32;
            let (a, p, l, u) = (
                space.resolve(a, bytes)?,
                space.resolve(p, bytes)?,
                space.resolve(l, bytes)?,
                space.resolve(u, bytes)?,
            );
            CpuLinalg.lu_f32(a, p, l, u, n)
        })
    }

    fn svd_f32(
        &self,
        a: u64,
        u: u64,
        s: u64,
        vt: u64,
        m: usize,
        n: usize,
        max_sweeps: usize,
    ) -> Result<()> {
        self.launch("svd", |space| {
            let (a, u, s, vt) = (
                space.resolve(a, m * n * F32)?,
                space.resolve(u, m * m * F32)?,
                space.resolve(s, m.min(n) * F32)?,
                space.resolve(vt, n * n * F32)?,
            );
            CpuLinalg.svd_f32(a, u, s, vt, m, n, max_sweeps)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(runtime: &EmulatedGpuRuntime, data: &[f32]) -> u64 {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let addr = runtime.allocate(bytes.len()).unwrap();
        runtime.copy_to_device(bytes, addr).unwrap();
        addr
    }

    fn download(runtime: &EmulatedGpuRuntime, addr: u64, len: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; len];
        runtime
            .copy_from_device(addr, bytemuck::cast_slice_mut(&mut out))
            .unwrap();
        out
    }

    #[test]
    fn test_binary_kernel_on_device_memory() {
        let gpu = EmulatedGpuRuntime::new(0);
        let a = upload(&gpu, &[1.0, 2.0, 3.0]);
        let b = upload(&gpu, &[10.0, 20.0, 30.0]);
        let out = gpu.allocate(12).unwrap();
        gpu.binary_f32(BinaryOp::Add, a, b, out, 3).unwrap();
        assert_eq!(download(&gpu, out, 3), vec![11.0, 22.0, 33.0]);
        assert_eq!(gpu.kernel_launches(), 1);
        for addr in [a, b, out] {
            gpu.deallocate(addr, 12);
        }
        assert_eq!(gpu.memory_stats().live_buffers, 0);
    }

    #[test]
    fn test_host_pointer_is_rejected() {
        let gpu = EmulatedGpuRuntime::new(0);
        let host = [1.0f32, 2.0];
        let out = gpu.allocate(8).unwrap();
        let err = gpu
            .binary_f32(BinaryOp::Add, host.as_ptr() as u64, host.as_ptr() as u64, out, 2)
            .unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
        gpu.deallocate(out, 8);
    }

    #[test]
    fn test_addresses_are_private_to_a_device() {
        let g0 = EmulatedGpuRuntime::new(0);
        let g1 = EmulatedGpuRuntime::new(1);
        let a = upload(&g0, &[1.0, 2.0]);
        let mut out = [0u8; 8];
        assert!(g1.copy_from_device(a, &mut out).is_err());
        g0.deallocate(a, 8);
    }

    #[test]
    fn test_synchronize_is_counted() {
        let gpu = EmulatedGpuRuntime::new(2);
        gpu.synchronize();
        gpu.synchronize();
        assert_eq!(gpu.synchronizations(), 2);
        assert_eq!(gpu.name(), "gpu:2");
    }
}
