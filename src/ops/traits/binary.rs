//! Binary operations trait.

use crate::error::Result;
use crate::ops::BinaryOp;
use crate::tensor::Tensor;

/// Element-wise binary operations on tensors.
///
/// # Broadcasting
///
/// - Dimensions are compared from the trailing dimension backward
/// - Two dimensions are compatible when they are equal, or when one is 1
/// - A rank-0 operand is filled out to the other operand's shape, on the
///   other operand's device
///
/// # Errors
///
/// - `DTypeMismatch` / `UnsupportedDType` unless both operands are f32;
///   checked before anything is allocated
/// - `DeviceMismatch` when two operands of rank ≥ 1 live on different devices
/// - `BroadcastError` when the shapes are incompatible
///
/// # Example
///
/// ```
/// use ndkit::prelude::*;
///
/// let client = Client::new();
/// let device = Device::cpu();
/// let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device)?;
/// let b = Tensor::from_slice(&[5.0f32, 6.0, 7.0, 8.0], &[2, 2], &device)?;
///
/// let c = client.add(&a, &b)?;
/// assert_eq!(c.to_vec::<f32>()?, vec![6.0, 8.0, 10.0, 12.0]);
/// # Ok::<(), ndkit::error::Error>(())
/// ```
pub trait BinaryOps {
    /// Apply `op` element-wise
    fn binary(&self, op: BinaryOp, a: &Tensor, b: &Tensor) -> Result<Tensor>;

    /// Element-wise addition: a + b
    fn add(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        self.binary(BinaryOp::Add, a, b)
    }

    /// Element-wise subtraction: a - b
    fn sub(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        self.binary(BinaryOp::Sub, a, b)
    }

    /// Element-wise multiplication: a * b
    ///
    /// A zero product is always `+0.0`, whatever the signs of the operands.
    fn mul(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        self.binary(BinaryOp::Mul, a, b)
    }

    /// Element-wise division: a / b (IEEE semantics, x / 0 is ±inf or NaN)
    fn div(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        self.binary(BinaryOp::Div, a, b)
    }

    /// Element-wise truncated remainder (`fmodf`): the result has the sign of `a`
    fn rem(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        self.binary(BinaryOp::Mod, a, b)
    }

    /// Element-wise power: a ^ b
    fn pow(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        self.binary(BinaryOp::Pow, a, b)
    }

    /// Element-wise maximum
    fn maximum(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        self.binary(BinaryOp::Max, a, b)
    }

    /// Element-wise minimum
    fn minimum(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        self.binary(BinaryOp::Min, a, b)
    }
}
