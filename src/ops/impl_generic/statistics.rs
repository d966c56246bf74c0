//! Statistics composed from reductions and elementwise ops

use crate::algorithm::linalg::{validate_f32, validate_matrix_2d, validate_same_device};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::{BinaryOps, LinalgOps, ReduceOps, StatisticalOps, UnaryOps};
use crate::runtime::Client;
use crate::tensor::Tensor;

/// Linear interpolation between the order statistics around `(n - 1) * q`
fn interpolate_sorted(sorted: &[f32], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = pos - lo as f64;
    let (lo, hi) = (sorted[lo] as f64, sorted[hi] as f64);
    lo + (hi - lo) * frac
}

fn quantile_impl(a: &Tensor, q: f64) -> Result<Tensor> {
    validate_f32(a, "quantile")?;
    if !(0.0..=1.0).contains(&q) {
        return Err(Error::invalid_argument(
            "q",
            format!("quantile must lie in [0, 1], got {q}"),
        ));
    }
    if a.numel() == 0 {
        return Err(Error::invalid_argument("a", "quantile of an empty array"));
    }

    let mut values = a.to_vec::<f32>()?;
    values.sort_unstable_by(f32::total_cmp);
    let value = interpolate_sorted(&values, q);
    Tensor::full(&[], value, DType::F32, a.device())
}

fn var_impl(client: &Client, a: &Tensor) -> Result<Tensor> {
    let mean = client.mean(a)?;
    let deviations = client.sub(a, &mean)?;
    client.mean(&client.square(&deviations)?)
}

fn average_impl(client: &Client, a: &Tensor, weights: Option<&Tensor>) -> Result<Tensor> {
    let Some(w) = weights else {
        return client.mean(a);
    };
    validate_same_device(a, w, "average")?;
    if a.shape() != w.shape() {
        return Err(Error::shape_mismatch(a.shape(), w.shape()));
    }

    let total_weight = client.sum(w)?;
    if total_weight.item::<f32>()? == 0.0 {
        return Err(Error::invalid_argument("weights", "weights sum to zero"));
    }
    let weighted = client.sum(&client.mul(a, w)?)?;
    client.div(&weighted, &total_weight)
}

fn cov_impl(client: &Client, a: &Tensor, rowvar: bool) -> Result<Tensor> {
    validate_f32(a, "cov")?;
    validate_matrix_2d(a.shape(), "cov")?;
    let x = if rowvar { a.clone() } else { a.t()? };
    let observations = x.shape()[1];
    if observations < 2 {
        return Err(Error::invalid_argument(
            "a",
            format!("covariance needs at least 2 observations, got {observations}"),
        ));
    }

    let device = x.device();
    let ones = Tensor::ones(&[observations, 1], DType::F32, device)?;
    let n = Tensor::scalar(observations as f32, device)?;
    let means = client.div(&client.matmul(&x, &ones)?, &n)?;
    let centered = client.sub(&x, &means)?;
    let scatter = client.matmul(&centered, &centered.t()?)?;
    let dof = Tensor::scalar((observations - 1) as f32, device)?;
    client.div(&scatter, &dof)
}

impl StatisticalOps for Client {
    fn quantile(&self, a: &Tensor, q: f64) -> Result<Tensor> {
        quantile_impl(a, q)
    }

    fn var(&self, a: &Tensor) -> Result<Tensor> {
        var_impl(self, a)
    }

    fn std(&self, a: &Tensor) -> Result<Tensor> {
        self.sqrt(&self.var(a)?)
    }

    fn average(&self, a: &Tensor, weights: Option<&Tensor>) -> Result<Tensor> {
        average_impl(self, a, weights)
    }

    fn cov(&self, a: &Tensor, rowvar: bool) -> Result<Tensor> {
        cov_impl(self, a, rowvar)
    }
}
