//! Kernel trait implementations over host memory
//!
//! Addresses handed to these kernels are host pointers. The emulated device
//! resolves its own addresses to host pointers and then calls into the same
//! implementations.

use super::kernels::{self, simd};
use crate::error::{Error, Result};
use crate::ops::{BinaryOp, ReduceOp, UnaryOp};
use crate::runtime::{DEFAULT_SIMD_THRESHOLD, ElementwiseKernels, LinalgKernels};

/// Borrow `len` f32 values at a host address
///
/// # Safety
/// `ptr` must be valid for `len` reads for the returned lifetime.
unsafe fn host_slice<'a>(ptr: u64, len: usize) -> &'a [f32] {
    if len == 0 {
        return &[];
    }
    unsafe { std::slice::from_raw_parts(ptr as *const f32, len) }
}

/// Mutably borrow `len` f32 values at a host address
///
/// # Safety
/// `ptr` must be valid for `len` writes and not aliased for the returned
/// lifetime.
unsafe fn host_slice_mut<'a>(ptr: u64, len: usize) -> &'a mut [f32] {
    if len == 0 {
        return &mut [];
    }
    unsafe { std::slice::from_raw_parts_mut(ptr as *mut f32, len) }
}

/// One element per loop iteration
#[derive(Copy, Clone, Debug, Default)]
pub struct ScalarKernels;

impl ElementwiseKernels for ScalarKernels {
    fn binary_f32(&self, op: BinaryOp, a: u64, b: u64, out: u64, len: usize) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        unsafe {
            kernels::binary_scalar_f32(op, a as *const f32, b as *const f32, out as *mut f32, len)
        };
        Ok(())
    }

    fn unary_f32(&self, op: UnaryOp, a: u64, out: u64, len: usize) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        unsafe { kernels::unary_scalar_f32(op, a as *const f32, out as *mut f32, len) };
        Ok(())
    }

    fn fill_f32(&self, out: u64, len: usize, value: f32) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        unsafe { kernels::fill_f32(out as *mut f32, len, value) };
        Ok(())
    }

    fn reduce_f32(&self, op: ReduceOp, a: u64, len: usize) -> Result<f32> {
        Ok(unsafe { kernels::reduce_f32(op, a as *const f32, len) })
    }
}

/// Vector-register chunks plus a scalar tail
///
/// Inputs shorter than `threshold` fall back to the scalar loop.
#[derive(Copy, Clone, Debug)]
pub struct SimdKernels {
    threshold: usize,
}

impl SimdKernels {
    /// Kernels that vectorise inputs of at least `threshold` elements
    pub const fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// Minimum vectorised length
    pub const fn threshold(&self) -> usize {
        self.threshold
    }
}

impl Default for SimdKernels {
    fn default() -> Self {
        Self::new(DEFAULT_SIMD_THRESHOLD)
    }
}

impl ElementwiseKernels for SimdKernels {
    fn binary_f32(&self, op: BinaryOp, a: u64, b: u64, out: u64, len: usize) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        unsafe {
            simd::binary::binary_f32(
                op,
                a as *const f32,
                b as *const f32,
                out as *mut f32,
                len,
                self.threshold,
            )
        };
        Ok(())
    }

    fn unary_f32(&self, op: UnaryOp, a: u64, out: u64, len: usize) -> Result<()> {
        ScalarKernels.unary_f32(op, a, out, len)
    }

    fn fill_f32(&self, out: u64, len: usize, value: f32) -> Result<()> {
        ScalarKernels.fill_f32(out, len, value)
    }

    fn reduce_f32(&self, op: ReduceOp, a: u64, len: usize) -> Result<f32> {
        ScalarKernels.reduce_f32(op, a, len)
    }
}

/// Dense linear algebra on host memory
#[derive(Copy, Clone, Debug, Default)]
pub struct CpuLinalg;

impl LinalgKernels for CpuLinalg {
    fn gemm_f32(&self, a: u64, b: u64, c: u64, m: usize, n: usize, k: usize) -> Result<()> {
        if m == 0 || n == 0 {
            return Ok(());
        }
        unsafe { kernels::gemm(a as *const f32, b as *const f32, c as *mut f32, m, n, k) };
        Ok(())
    }

    fn gemv_f32(&self, a: u64, x: u64, y: u64, m: usize, n: usize) -> Result<()> {
        if m == 0 {
            return Ok(());
        }
        unsafe { kernels::gemv(a as *const f32, x as *const f32, y as *mut f32, m, n) };
        Ok(())
    }

    fn getrf_f32(&self, a: u64, n: usize, ipiv: &mut [i32]) -> Result<()> {
        check_pivots(ipiv.len(), n)?;
        let a = unsafe { host_slice_mut(a, n * n) };
        match kernels::getrf(a, n, ipiv) {
            0 => Ok(()),
            status => Err(Error::backend_failure("getrf", status)),
        }
    }

    fn getri_f32(&self, a: u64, n: usize, ipiv: &[i32]) -> Result<()> {
        check_pivots(ipiv.len(), n)?;
        let a = unsafe { host_slice_mut(a, n * n) };
        match kernels::getri(a, n, ipiv) {
            0 => Ok(()),
            status => Err(Error::backend_failure("getri", status)),
        }
    }

    fn det_f32(&self, a: u64, n: usize) -> Result<f32> {
        let mut lu = unsafe { host_slice(a, n * n) }.to_vec();
        let mut ipiv = vec![0i32; n];
        kernels::getrf(&mut lu, n, &mut ipiv);
        Ok(kernels::det_from_lu(&lu, n, &ipiv))
    }

    fn lu_f32(&self, a: u64, p: u64, l: u64, u: u64, n: usize) -> Result<()> {
        let len = n * n;
        unsafe {
            kernels::lu_partial_pivot(
                host_slice(a, len),
                n,
                host_slice_mut(p, len),
                host_slice_mut(l, len),
                host_slice_mut(u, len),
            )
        };
        Ok(())
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
        let input = unsafe { host_slice(a, m * n) };
        let svd = kernels::svd_jacobi(input, m, n, max_sweeps);
        if !svd.converged {
            tracing::warn!(
                m,
                n,
                sweeps = svd.sweeps,
                "jacobi svd hit the sweep limit before converging"
            );
        }
        unsafe {
            host_slice_mut(u, m * m).copy_from_slice(&svd.u);
            host_slice_mut(s, m.min(n)).copy_from_slice(&svd.s);
            host_slice_mut(vt, n * n).copy_from_slice(&svd.vt);
        }
        Ok(())
    }
}

fn check_pivots(len: usize, n: usize) -> Result<()> {
    if len < n {
        return Err(Error::invalid_argument(
            "ipiv",
            format!("pivot buffer holds {len} entries, matrix order is {n}"),
        ));
    }
    Ok(())
}
