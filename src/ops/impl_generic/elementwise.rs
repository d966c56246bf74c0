//! Elementwise dispatcher
//!
//! A binary call goes through these steps:
//!
//! 1. device check, skipped when either operand is rank-0
//! 2. dtype check (both f32) before anything is allocated
//! 3. rank-0 promotion: the scalar is filled out to the other operand's
//!    shape on the other operand's device
//! 4. shape reconciliation (broadcast views)
//! 5. strided operands are gathered into contiguous buffers
//! 6. a fresh contiguous result is allocated and one strategy runs the kernel
//!
//! Temporaries are ordinary tensors and are freed on every return path.

use super::{finish, for_each_host_f32};
use crate::algorithm::linalg::validate_f32;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::broadcast::{reconcile, reconciled_shape};
use crate::ops::{BinaryOp, BinaryOps, UnaryOp, UnaryOps};
use crate::runtime::cpu::{ScalarKernels, SimdKernels};
use crate::runtime::{Client, Device, ElementwiseKernels, ExecStrategy};
use crate::tensor::Tensor;

fn check_binary_dtypes(op: BinaryOp, a: &Tensor, b: &Tensor) -> Result<()> {
    if a.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            lhs: a.dtype(),
            rhs: b.dtype(),
        });
    }
    if a.dtype() != DType::F32 {
        return Err(Error::unsupported_dtype(a.dtype(), op.name()));
    }
    Ok(())
}

/// Fill a rank-0 value out to `shape` on `device`
fn promote_scalar(scalar: &Tensor, shape: &[usize], device: &Device) -> Result<Tensor> {
    let value = scalar.item::<f32>()?;
    let out = Tensor::empty(shape, DType::F32, device)?;
    let kernels = device.runtime().elementwise();
    kernels.fill_f32(out.data_ptr(), out.numel(), value)?;
    finish(device);
    Ok(out)
}

/// The kernels that run `strategy` on `device`
fn kernels_for<'a>(
    strategy: ExecStrategy,
    device: &'a Device,
    simd: &'a SimdKernels,
) -> &'a dyn ElementwiseKernels {
    match strategy {
        ExecStrategy::Device => device.runtime().elementwise(),
        ExecStrategy::Simd => simd,
        ExecStrategy::Scalar => &ScalarKernels,
    }
}

/// Element-wise binary operation with broadcasting
///
/// Operands with equal element counts combine flat in row-major order and
/// the result has `a`'s shape.
pub(crate) fn binary_impl(client: &Client, op: BinaryOp, a: &Tensor, b: &Tensor) -> Result<Tensor> {
    if !a.is_scalar() && !b.is_scalar() {
        a.device().ensure_same(b.device())?;
    }
    check_binary_dtypes(op, a, b)?;
    reconciled_shape(a.shape(), b.shape())?;

    let (a, b) = match (a.is_scalar(), b.is_scalar()) {
        (true, false) => (promote_scalar(a, b.shape(), b.device())?, b.clone()),
        (false, true) => (a.clone(), promote_scalar(b, a.shape(), a.device())?),
        (true, true) if !a.device().same_device(b.device()) => {
            (a.clone(), b.to_device(a.device())?)
        }
        _ => (a.clone(), b.clone()),
    };

    let (a, b) = reconcile(&a, &b)?;
    let a = a.contiguous()?;
    let b = b.contiguous()?;

    let device = a.device().clone();
    let out = Tensor::empty(a.shape(), DType::F32, &device)?;
    let len = out.numel();

    let strategy = client.select_strategy(&device, len)?;
    tracing::debug!(op = op.name(), len, %strategy, "binary dispatch");

    // The strategy already accounts for the threshold.
    let simd = SimdKernels::new(0);
    kernels_for(strategy, &device, &simd).binary_f32(
        op,
        a.data_ptr(),
        b.data_ptr(),
        out.data_ptr(),
        len,
    )?;
    if strategy == ExecStrategy::Device {
        device.runtime().synchronize();
    }

    Ok(out)
}

/// Kernel-backed element-wise unary operation
pub(crate) fn unary_impl(client: &Client, op: UnaryOp, a: &Tensor) -> Result<Tensor> {
    validate_f32(a, op.name())?;
    let a = a.contiguous()?;
    let device = a.device().clone();
    let out = Tensor::empty(a.shape(), DType::F32, &device)?;
    let len = out.numel();

    let strategy = client.select_strategy(&device, len)?;
    tracing::debug!(op = op.name(), len, %strategy, "unary dispatch");

    let simd = SimdKernels::new(0);
    kernels_for(strategy, &device, &simd).unary_f32(op, a.data_ptr(), out.data_ptr(), len)?;
    if strategy == ExecStrategy::Device {
        device.runtime().synchronize();
    }

    Ok(out)
}

/// Apply a host closure per element
pub(crate) fn map_impl<F>(a: &Tensor, f: F) -> Result<Tensor>
where
    F: Fn(f32) -> f32,
{
    validate_f32(a, "map")?;
    if !a.device().is_cpu() {
        let host = a.to_device(&Device::cpu())?;
        return map_impl(&host, f)?.to_device(a.device());
    }

    let mut values = Vec::with_capacity(a.numel());
    for_each_host_f32(a, |x| values.push(f(x)))?;
    Tensor::from_slice(&values, a.shape(), a.device())
}

impl BinaryOps for Client {
    fn binary(&self, op: BinaryOp, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        binary_impl(self, op, a, b)
    }
}

impl UnaryOps for Client {
    fn unary(&self, op: UnaryOp, a: &Tensor) -> Result<Tensor> {
        unary_impl(self, op, a)
    }

    fn map<F>(&self, a: &Tensor, f: F) -> Result<Tensor>
    where
        F: Fn(f32) -> f32,
    {
        map_impl(a, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ClientConfig;

    fn cpu(data: &[f32], shape: &[usize]) -> Tensor {
        Tensor::from_slice(data, shape, &Device::cpu()).unwrap()
    }

    #[test]
    fn test_broadcast_row_against_matrix() {
        let client = Client::new();
        let a = cpu(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let b = cpu(&[10.0, 20.0, 30.0], &[3]);
        let c = client.add(&a, &b).unwrap();
        assert_eq!(c.shape(), &[2, 3]);
        assert_eq!(
            c.to_vec::<f32>().unwrap(),
            vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]
        );
        assert!(c.owns_data());
        assert!(c.is_contiguous());
    }

    #[test]
    fn test_scalar_promotion_either_side() {
        let client = Client::new();
        let a = cpu(&[1.0, 2.0, 3.0], &[3]);
        let two = Tensor::scalar(2.0, &Device::cpu()).unwrap();
        assert_eq!(
            client.sub(&two, &a).unwrap().to_vec::<f32>().unwrap(),
            vec![1.0, 0.0, -1.0]
        );
        assert_eq!(
            client.pow(&a, &two).unwrap().to_vec::<f32>().unwrap(),
            vec![1.0, 4.0, 9.0]
        );
        let both = client.mul(&two, &two).unwrap();
        assert!(both.is_scalar());
        assert_eq!(both.item::<f32>().unwrap(), 4.0);
    }

    #[test]
    fn test_transposed_operand_is_gathered() {
        let client = Client::new();
        let a = cpu(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let at = a.t().unwrap();
        let sum = client.add(&a, &at).unwrap();
        assert_eq!(sum.to_vec::<f32>().unwrap(), vec![2.0, 5.0, 5.0, 8.0]);
    }

    #[test]
    fn test_dtype_errors() {
        let client = Client::new();
        let a = cpu(&[1.0], &[1]);
        let b = Tensor::from_slice(&[1i32], &[1], &Device::cpu()).unwrap();
        assert!(matches!(
            client.add(&a, &b).unwrap_err(),
            Error::DTypeMismatch { .. }
        ));
        assert!(matches!(
            client.add(&b, &b).unwrap_err(),
            Error::UnsupportedDType { .. }
        ));
    }

    #[test]
    fn test_forced_strategies_agree() {
        let a: Vec<f32> = (0..50).map(|i| i as f32 * 0.5 - 7.0).collect();
        let b: Vec<f32> = (0..50).map(|i| (i % 4) as f32 + 1.0).collect();
        let (ta, tb) = (cpu(&a, &[5, 10]), cpu(&b, &[5, 10]));
        for op in [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div] {
            let scalar = Client::with_config(ClientConfig::default().with_strategy(ExecStrategy::Scalar))
                .binary(op, &ta, &tb)
                .unwrap()
                .to_vec::<f32>()
                .unwrap();
            let simd = Client::with_config(ClientConfig::default().with_strategy(ExecStrategy::Simd))
                .binary(op, &ta, &tb)
                .unwrap()
                .to_vec::<f32>()
                .unwrap();
            assert_eq!(scalar, simd, "{op:?}");
        }
    }

    #[test]
    fn test_map_follows_view_order() {
        let client = Client::new();
        let a = cpu(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let mapped = client.map(&a.t().unwrap(), |x| x * 10.0).unwrap();
        assert_eq!(mapped.shape(), &[3, 2]);
        assert_eq!(
            mapped.to_vec::<f32>().unwrap(),
            vec![10.0, 40.0, 20.0, 50.0, 30.0, 60.0]
        );
    }

    #[test]
    fn test_abs() {
        let client = Client::new();
        let a = cpu(&[-1.5, 0.0, 2.0], &[3]);
        assert_eq!(
            client.abs(&a).unwrap().to_vec::<f32>().unwrap(),
            vec![1.5, 0.0, 2.0]
        );
    }
}
