//! Reduction operations trait.

use crate::error::Result;
use crate::tensor::Tensor;

/// Full reductions to a rank-0 tensor on the input's device
///
/// Accumulation happens in f64. Empty inputs reduce to the identity for
/// `sum` (0) and `prod` (1); `mean`, `max` and `min` reject them.
pub trait ReduceOps {
    /// Sum of all elements
    fn sum(&self, a: &Tensor) -> Result<Tensor>;

    /// Product of all elements
    fn prod(&self, a: &Tensor) -> Result<Tensor>;

    /// Arithmetic mean of all elements
    fn mean(&self, a: &Tensor) -> Result<Tensor>;

    /// Largest element
    fn max(&self, a: &Tensor) -> Result<Tensor>;

    /// Smallest element
    fn min(&self, a: &Tensor) -> Result<Tensor>;
}
