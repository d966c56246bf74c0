//! Linear algebra operations trait.

use crate::algorithm::linalg::{LuDecomposition, NormKind, SvdDecomposition};
use crate::error::Result;
use crate::tensor::Tensor;

/// Dense linear algebra on f32 matrices
///
/// Matrices are 2-D row-major tensors; non-contiguous inputs are copied
/// before the kernels run. Every result lives on the input's device.
pub trait LinalgOps {
    /// Matrix product of `[m, k]` and `[k, n]`, giving `[m, n]`
    fn matmul(&self, a: &Tensor, b: &Tensor) -> Result<Tensor>;

    /// Determinant of a square matrix as a rank-0 tensor
    ///
    /// A singular matrix has determinant 0; this is not an error.
    fn det(&self, a: &Tensor) -> Result<Tensor>;

    /// Inverse of a square matrix
    ///
    /// # Errors
    ///
    /// `BackendFailure` when the matrix is singular.
    fn inverse(&self, a: &Tensor) -> Result<Tensor>;

    /// LU factorization with partial pivoting: `P @ A = L @ U`
    fn lu(&self, a: &Tensor) -> Result<LuDecomposition>;

    /// Full singular value decomposition of a 2-D matrix
    fn svd(&self, a: &Tensor) -> Result<SvdDecomposition>;

    /// Matrix norm as a rank-0 tensor
    ///
    /// ```
    /// use ndkit::prelude::*;
    ///
    /// let client = Client::new();
    /// let a = Tensor::from_slice(&[1.0f32, -2.0, 3.0, -4.0], &[2, 2], &Device::cpu())?;
    /// let l1 = client.norm(&a, NormKind::try_from(1)?)?;
    /// assert_eq!(l1.item::<f32>()?, 10.0);
    /// # Ok::<(), ndkit::error::Error>(())
    /// ```
    fn norm(&self, a: &Tensor, kind: NormKind) -> Result<Tensor>;

    /// Number of singular values above `tol`, as a rank-0 I64 tensor
    ///
    /// The default tolerance is `max(S) * max(m, n) * f32::EPSILON`.
    fn matrix_rank(&self, a: &Tensor, tol: Option<f64>) -> Result<Tensor>;

    /// Generalised dot product, dispatched on operand ranks
    ///
    /// | ranks       | result                                   |
    /// |-------------|------------------------------------------|
    /// | `(0, _)`, `(_, 0)` | element-wise product               |
    /// | `(1, 1)`    | [`inner`](Self::inner)                   |
    /// | `(2, 2)`    | [`matmul`](Self::matmul)                 |
    /// | `(≥2, 1)`   | matrix-vector product over the last axis |
    ///
    /// Other combinations fail with `NotImplemented`.
    fn dot(&self, a: &Tensor, b: &Tensor) -> Result<Tensor>;

    /// Sum of the element-wise product over the last axis
    ///
    /// Both operands must have rank ≤ 2 and equal last dimensions. The sum
    /// is rank-0, reshaped to `[1; ndim(a)]` when `a` has more than one
    /// dimension.
    fn inner(&self, a: &Tensor, b: &Tensor) -> Result<Tensor>;
}
