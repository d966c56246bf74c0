//! Backend kernel contracts
//!
//! Kernels receive raw addresses in their runtime's memory plus dimensions,
//! and report failure through [`Error::BackendFailure`] with a LAPACK-style
//! status. Every matrix is dense, contiguous and row-major.
//!
//! [`Error::BackendFailure`]: crate::error::Error::BackendFailure

use crate::error::Result;
use crate::ops::{BinaryOp, ReduceOp, UnaryOp};

/// Flat elementwise kernels over contiguous f32 buffers
pub trait ElementwiseKernels: Send + Sync {
    /// `out[i] = op(a[i], b[i])` for `i in 0..len`
    fn binary_f32(&self, op: BinaryOp, a: u64, b: u64, out: u64, len: usize) -> Result<()>;

    /// `out[i] = op(a[i])` for `i in 0..len`
    fn unary_f32(&self, op: UnaryOp, a: u64, out: u64, len: usize) -> Result<()>;

    /// `out[i] = value` for `i in 0..len`
    fn fill_f32(&self, out: u64, len: usize, value: f32) -> Result<()>;

    /// Reduce `len` elements to one value
    fn reduce_f32(&self, op: ReduceOp, a: u64, len: usize) -> Result<f32>;
}

/// Dense linear algebra kernels over contiguous f32 buffers
pub trait LinalgKernels: Send + Sync {
    /// `C (m x n) = A (m x k) . B (k x n)`
    fn gemm_f32(&self, a: u64, b: u64, c: u64, m: usize, n: usize, k: usize) -> Result<()>;

    /// `y (m) = A (m x n) . x (n)`
    fn gemv_f32(&self, a: u64, x: u64, y: u64, m: usize, n: usize) -> Result<()>;

    /// In-place LU factorization of the `n x n` matrix at `a`
    ///
    /// On return `a` holds unit-lower L below the diagonal and U on and
    /// above it; `ipiv[i]` is the 1-based row swapped with row `i + 1`.
    /// Status `i > 0` means `U[i-1][i-1]` is exactly zero; the factorization
    /// is still complete.
    fn getrf_f32(&self, a: u64, n: usize, ipiv: &mut [i32]) -> Result<()>;

    /// Replace the output of [`getrf_f32`](Self::getrf_f32) with the inverse
    fn getri_f32(&self, a: u64, n: usize, ipiv: &[i32]) -> Result<()>;

    /// Determinant of the `n x n` matrix at `a` (input left untouched)
    fn det_f32(&self, a: u64, n: usize) -> Result<f32>;

    /// Partial-pivoting LU into separate `p`, `l`, `u` buffers (`n x n` each)
    /// such that `P . A = L . U`
    fn lu_f32(&self, a: u64, p: u64, l: u64, u: u64, n: usize) -> Result<()>;

    /// Full SVD of the `m x n` matrix at `a`: `u` is `m x m`, `s` holds
    /// `min(m, n)` descending singular values, `vt` is `n x n`
    #[allow(clippy::too_many_arguments)]
    fn svd_f32(
        &self,
        a: u64,
        u: u64,
        s: u64,
        vt: u64,
        m: usize,
        n: usize,
        max_sweeps: usize,
    ) -> Result<()>;
}
