//! Broadcasting
//!
//! Shapes are compared from the trailing dimension backward; two sizes are
//! compatible when they are equal or one of them is 1, and a missing leading
//! dimension counts as 1. Stretched dimensions get a zero stride, so a
//! broadcast operand is a view and never copies.

use crate::error::{Error, Result};
use crate::tensor::{Shape, Tensor};

/// Output shape of a broadcast between `a` and `b`
///
/// ```
/// # use ndkit::ops::broadcast_shapes;
/// assert_eq!(broadcast_shapes(&[2, 1, 3], &[4, 1]).unwrap().as_slice(), &[2, 4, 3]);
/// assert!(broadcast_shapes(&[2, 3], &[4]).is_err());
/// ```
pub fn broadcast_shapes(a: &[usize], b: &[usize]) -> Result<Shape> {
    let ndim = a.len().max(b.len());
    let mut out = Shape::from_elem(0, ndim);

    for i in 0..ndim {
        let da = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let db = if i < b.len() { b[b.len() - 1 - i] } else { 1 };
        out[ndim - 1 - i] = if da == db || db == 1 {
            da
        } else if da == 1 {
            db
        } else {
            return Err(Error::broadcast(a, b));
        };
    }

    Ok(out)
}

/// View `small` stretched against `large`
///
/// The result has the broadcast shape of both operands and shares `small`'s
/// buffer. Fails if the shapes are incompatible.
pub fn broadcast(small: &Tensor, large: &Tensor) -> Result<Tensor> {
    let target = broadcast_shapes(small.shape(), large.shape())?;
    small.broadcast_to(&target)
}

/// Shape of the result of combining `a` with `b`
///
/// Operands with equal element counts pair up flat in row-major order and
/// the result takes `a`'s shape. Otherwise the trailing-dimension rule
/// applies.
pub fn reconciled_shape(a: &[usize], b: &[usize]) -> Result<Shape> {
    let count = |s: &[usize]| s.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d));
    match (count(a), count(b)) {
        (Some(na), Some(nb)) if na == nb => Ok(a.iter().copied().collect()),
        _ => broadcast_shapes(a, b),
    }
}

/// Bring two operands to a common shape
///
/// - equal element counts: both are used as they are; when the shapes
///   differ, `b` is read in row-major order under `a`'s shape (a copy only
///   if `b` is not contiguous)
/// - different element counts: the operand with fewer elements is
///   broadcast; if the larger one also has to grow, both are
pub fn reconcile(a: &Tensor, b: &Tensor) -> Result<(Tensor, Tensor)> {
    if a.shape() == b.shape() {
        return Ok((a.clone(), b.clone()));
    }
    if a.numel() == b.numel() {
        return Ok((a.clone(), b.reshape(a.shape())?));
    }

    let target = broadcast_shapes(a.shape(), b.shape())?;
    let stretch = |t: &Tensor| -> Result<Tensor> {
        if t.shape() == target.as_slice() {
            Ok(t.clone())
        } else {
            t.broadcast_to(&target)
        }
    };
    Ok((stretch(a)?, stretch(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Device;

    #[test]
    fn test_broadcast_shapes() {
        assert_eq!(broadcast_shapes(&[3], &[2, 3]).unwrap().as_slice(), &[2, 3]);
        assert_eq!(broadcast_shapes(&[2, 1], &[1, 4]).unwrap().as_slice(), &[2, 4]);
        assert_eq!(broadcast_shapes(&[], &[5]).unwrap().as_slice(), &[5]);
        assert_eq!(broadcast_shapes(&[0], &[1]).unwrap().as_slice(), &[0]);
        let err = broadcast_shapes(&[3], &[4]).unwrap_err();
        assert!(matches!(err, Error::BroadcastError { .. }));
    }

    #[test]
    fn test_broadcast_is_a_zero_stride_view() {
        let device = Device::cpu();
        let small = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3], &device).unwrap();
        let large = Tensor::zeros(&[2, 3], crate::dtype::DType::F32, &device).unwrap();
        let view = broadcast(&small, &large).unwrap();
        assert_eq!(view.shape(), &[2, 3]);
        assert_eq!(view.strides(), &[0, 4]);
        assert!(view.storage().same_buffer(small.storage()));
        assert_eq!(
            view.to_vec::<f32>().unwrap(),
            vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn test_reconcile_equal_counts_pair_flat() {
        let device = Device::cpu();
        let col = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3, 1], &device).unwrap();
        let row = Tensor::from_slice(&[10.0f32, 20.0, 30.0], &[1, 3], &device).unwrap();
        let (a, b) = reconcile(&col, &row).unwrap();
        assert_eq!(a.shape(), &[3, 1]);
        assert_eq!(b.shape(), &[3, 1]);
        assert!(b.storage().same_buffer(row.storage()));
        assert_eq!(b.to_vec::<f32>().unwrap(), vec![10.0, 20.0, 30.0]);

        assert_eq!(reconciled_shape(&[2, 3], &[3, 2]).unwrap().as_slice(), &[2, 3]);
        assert_eq!(reconciled_shape(&[3, 1], &[1, 4]).unwrap().as_slice(), &[3, 4]);
        assert!(reconciled_shape(&[3], &[4]).is_err());
    }

    #[test]
    fn test_reconcile_incompatible() {
        let device = Device::cpu();
        let a = Tensor::zeros(&[2, 3], crate::dtype::DType::F32, &device).unwrap();
        let b = Tensor::zeros(&[4], crate::dtype::DType::F32, &device).unwrap();
        assert!(reconcile(&a, &b).is_err());
    }
}
