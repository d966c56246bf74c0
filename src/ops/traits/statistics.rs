//! Statistical operations trait.

use crate::error::Result;
use crate::tensor::Tensor;

/// Descriptive statistics over all elements
pub trait StatisticalOps {
    /// Median, i.e. `quantile(a, 0.5)`
    fn median(&self, a: &Tensor) -> Result<Tensor> {
        self.quantile(a, 0.5)
    }

    /// Quantile with linear interpolation between order statistics
    ///
    /// The position is `(n - 1) * q` in the sorted data. `q` must lie in
    /// `[0, 1]` and the input must not be empty.
    ///
    /// ```
    /// use ndkit::prelude::*;
    ///
    /// let client = Client::new();
    /// let a = Tensor::from_slice(&[4.0f32, 1.0, 3.0, 2.0], &[4], &Device::cpu())?;
    /// assert_eq!(client.median(&a)?.item::<f32>()?, 2.5);
    /// assert_eq!(client.quantile(&a, 0.25)?.item::<f32>()?, 1.75);
    /// # Ok::<(), ndkit::error::Error>(())
    /// ```
    fn quantile(&self, a: &Tensor, q: f64) -> Result<Tensor>;

    /// Population variance: `mean(|a - mean(a)|^2)`
    fn var(&self, a: &Tensor) -> Result<Tensor>;

    /// Population standard deviation: `sqrt(var(a))`
    fn std(&self, a: &Tensor) -> Result<Tensor>;

    /// Weighted mean `sum(a * w) / sum(w)`; `None` is the plain mean
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the weights sum to zero.
    fn average(&self, a: &Tensor, weights: Option<&Tensor>) -> Result<Tensor>;

    /// Covariance matrix
    ///
    /// With `rowvar` each row is a variable and each column an observation;
    /// otherwise the roles are swapped. Normalised by `N - 1`.
    fn cov(&self, a: &Tensor, rowvar: bool) -> Result<Tensor>;
}
