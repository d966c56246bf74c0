//! Unary operations trait.

use crate::error::Result;
use crate::ops::UnaryOp;
use crate::tensor::Tensor;

/// Element-wise unary operations on tensors.
///
/// Results are fresh, contiguous tensors with the input's shape and device.
pub trait UnaryOps {
    /// Apply a kernel-backed unary operation
    fn unary(&self, op: UnaryOp, a: &Tensor) -> Result<Tensor>;

    /// Negation: -a
    fn neg(&self, a: &Tensor) -> Result<Tensor> {
        self.unary(UnaryOp::Neg, a)
    }

    /// Absolute value: |a|
    fn abs(&self, a: &Tensor) -> Result<Tensor> {
        self.unary(UnaryOp::Abs, a)
    }

    /// Square root
    fn sqrt(&self, a: &Tensor) -> Result<Tensor> {
        self.unary(UnaryOp::Sqrt, a)
    }

    /// Square: a * a
    fn square(&self, a: &Tensor) -> Result<Tensor> {
        self.unary(UnaryOp::Square, a)
    }

    /// Apply a host closure to every element
    ///
    /// Elements are visited in row-major logical order through the strided
    /// iterator, so views are handled without a prior copy. Device tensors
    /// make a round trip through host memory.
    fn map<F>(&self, a: &Tensor, f: F) -> Result<Tensor>
    where
        F: Fn(f32) -> f32;
}
