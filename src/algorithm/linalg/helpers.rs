//! Helper functions for linear algebra operations

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Validate matrix is 2D
pub fn validate_matrix_2d(shape: &[usize], op: &'static str) -> Result<(usize, usize)> {
    if shape.len() != 2 {
        return Err(Error::invalid_argument(
            "a",
            format!(
                "{op} expects a 2-D matrix, got {}-D with shape {shape:?}",
                shape.len()
            ),
        ));
    }
    Ok((shape[0], shape[1]))
}

/// Validate matrix is square
pub fn validate_square_matrix(shape: &[usize], op: &'static str) -> Result<usize> {
    let (rows, cols) = validate_matrix_2d(shape, op)?;
    if rows != cols {
        return Err(Error::NotSquare { op, rows, cols });
    }
    Ok(rows)
}

/// Validate the operand is f32
pub fn validate_f32(a: &Tensor, op: &'static str) -> Result<()> {
    if a.dtype() == DType::F32 {
        Ok(())
    } else {
        Err(Error::unsupported_dtype(a.dtype(), op))
    }
}

/// Validate both operands are f32 and live on the same device
pub fn validate_same_device(a: &Tensor, b: &Tensor, op: &'static str) -> Result<()> {
    if a.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            lhs: a.dtype(),
            rhs: b.dtype(),
        });
    }
    validate_f32(a, op)?;
    a.device().ensure_same(b.device())
}

/// Default singular-value cut-off for [`matrix_rank`]
///
/// `max(S) * max(m, n) * f32::EPSILON`
///
/// [`matrix_rank`]: crate::ops::LinalgOps::matrix_rank
pub fn default_rank_tolerance(s_max: f32, m: usize, n: usize) -> f64 {
    s_max as f64 * m.max(n) as f64 * f32::EPSILON as f64
}
