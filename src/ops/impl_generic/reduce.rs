//! Full reductions

use super::finish;
use crate::algorithm::linalg::validate_f32;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::{ReduceOp, ReduceOps};
use crate::runtime::Client;
use crate::tensor::Tensor;

/// Reduce every element of `a` to a rank-0 tensor on `a`'s device
pub(crate) fn reduce_impl(op: ReduceOp, a: &Tensor) -> Result<Tensor> {
    validate_f32(a, op.name())?;
    if a.numel() == 0 && matches!(op, ReduceOp::Max | ReduceOp::Min) {
        return Err(Error::invalid_argument(
            "a",
            format!("{} of an empty array", op.name()),
        ));
    }

    let a = a.contiguous()?;
    let device = a.device();
    let value = device
        .runtime()
        .elementwise()
        .reduce_f32(op, a.data_ptr(), a.numel())?;
    finish(device);
    tracing::trace!(op = op.name(), len = a.numel(), value, "reduced");

    Tensor::full(&[], value as f64, DType::F32, device)
}

fn mean_impl(a: &Tensor) -> Result<Tensor> {
    validate_f32(a, "mean")?;
    if a.numel() == 0 {
        return Err(Error::invalid_argument("a", "mean of an empty array"));
    }
    let a = a.contiguous()?;
    let device = a.device();
    let total = device
        .runtime()
        .elementwise()
        .reduce_f32(ReduceOp::Sum, a.data_ptr(), a.numel())?;
    finish(device);
    let mean = total as f64 / a.numel() as f64;
    Tensor::full(&[], mean, DType::F32, device)
}

impl ReduceOps for Client {
    fn sum(&self, a: &Tensor) -> Result<Tensor> {
        reduce_impl(ReduceOp::Sum, a)
    }

    fn prod(&self, a: &Tensor) -> Result<Tensor> {
        reduce_impl(ReduceOp::Prod, a)
    }

    fn mean(&self, a: &Tensor) -> Result<Tensor> {
        mean_impl(a)
    }

    fn max(&self, a: &Tensor) -> Result<Tensor> {
        reduce_impl(ReduceOp::Max, a)
    }

    fn min(&self, a: &Tensor) -> Result<Tensor> {
        reduce_impl(ReduceOp::Min, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Device;

    #[test]
    fn test_full_reductions() {
        let client = Client::new();
        let a = Tensor::from_slice(&[3.0f32, -1.0, 4.0, 2.0], &[2, 2], &Device::cpu()).unwrap();
        assert_eq!(client.sum(&a).unwrap().item::<f32>().unwrap(), 8.0);
        assert_eq!(client.prod(&a).unwrap().item::<f32>().unwrap(), -24.0);
        assert_eq!(client.mean(&a).unwrap().item::<f32>().unwrap(), 2.0);
        assert_eq!(client.max(&a).unwrap().item::<f32>().unwrap(), 4.0);
        assert_eq!(client.min(&a).unwrap().item::<f32>().unwrap(), -1.0);
        assert!(client.sum(&a).unwrap().is_scalar());
    }

    #[test]
    fn test_reduce_strided_view() {
        let client = Client::new();
        let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &Device::cpu())
            .unwrap();
        let col = a.narrow(1, 1, 1).unwrap();
        assert_eq!(client.sum(&col).unwrap().item::<f32>().unwrap(), 7.0);
    }

    #[test]
    fn test_empty_inputs() {
        let client = Client::new();
        let empty = Tensor::empty(&[0], DType::F32, &Device::cpu()).unwrap();
        assert_eq!(client.sum(&empty).unwrap().item::<f32>().unwrap(), 0.0);
        assert_eq!(client.prod(&empty).unwrap().item::<f32>().unwrap(), 1.0);
        assert!(client.mean(&empty).is_err());
        assert!(client.max(&empty).is_err());
        assert!(client.min(&empty).is_err());
    }

    #[test]
    fn test_max_and_min_propagate_nan() {
        let client = Client::new();
        let a = Tensor::from_slice(&[f32::NAN, 1.0, 5.0], &[3], &Device::cpu()).unwrap();
        assert!(client.max(&a).unwrap().item::<f32>().unwrap().is_nan());
        assert!(client.min(&a).unwrap().item::<f32>().unwrap().is_nan());
        assert!(client.mean(&a).unwrap().item::<f32>().unwrap().is_nan());
    }
}
