//! Cumulative operations trait.

use crate::error::Result;
use crate::tensor::Tensor;

/// Running sums and products
///
/// With `axis = None` the input is flattened and the result is 1-D. Axes 0
/// and 1 are supported for 2-D inputs; any other axis fails with
/// `InvalidDimension`.
pub trait CumulativeOps {
    /// Cumulative sum
    ///
    /// ```
    /// use ndkit::prelude::*;
    ///
    /// let client = Client::new();
    /// let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &Device::cpu())?;
    /// assert_eq!(client.cumsum(&a, None)?.to_vec::<f32>()?, vec![1.0, 3.0, 6.0, 10.0]);
    /// assert_eq!(client.cumsum(&a, Some(0))?.to_vec::<f32>()?, vec![1.0, 2.0, 4.0, 6.0]);
    /// assert_eq!(client.cumsum(&a, Some(1))?.to_vec::<f32>()?, vec![1.0, 3.0, 3.0, 7.0]);
    /// # Ok::<(), ndkit::error::Error>(())
    /// ```
    fn cumsum(&self, a: &Tensor, axis: Option<usize>) -> Result<Tensor>;

    /// Cumulative product
    fn cumprod(&self, a: &Tensor, axis: Option<usize>) -> Result<Tensor>;
}
