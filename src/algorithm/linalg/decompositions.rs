//! Decomposition result types for linear algebra operations

use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// LU decomposition result: P @ A = L @ U
///
/// All three factors are dense `n × n` matrices on the input's device.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    /// Row permutation matrix P
    pub p: Tensor,

    /// Lower triangular factor L with unit diagonal
    pub l: Tensor,

    /// Upper triangular factor U
    pub u: Tensor,
}

/// Singular Value Decomposition result: A = U @ diag(S) @ V^T
///
/// The factors are full: with `k = min(m, n)`, only the first `k` columns of
/// U and the first `k` rows of V^T take part in the reconstruction; the rest
/// complete orthonormal bases.
#[derive(Debug, Clone)]
pub struct SvdDecomposition {
    /// Left singular vectors U [m, m]
    pub u: Tensor,

    /// Singular values S [k] (sorted in descending order)
    pub s: Tensor,

    /// Right singular vectors as rows, V^T [n, n]
    pub vt: Tensor,
}

/// Norm selected by [`LinalgOps::norm`](crate::ops::LinalgOps::norm)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormKind {
    /// Sum of absolute values of every element
    L1,

    /// Spectral norm (2-norm): largest singular value
    Spectral,
}

impl TryFrom<i32> for NormKind {
    type Error = Error;

    /// `1` selects [`NormKind::L1`], `2` selects [`NormKind::Spectral`]
    fn try_from(order: i32) -> Result<Self> {
        match order {
            1 => Ok(Self::L1),
            2 => Ok(Self::Spectral),
            other => Err(Error::invalid_argument(
                "order",
                format!("unsupported norm order {other} (expected 1 or 2)"),
            )),
        }
    }
}
