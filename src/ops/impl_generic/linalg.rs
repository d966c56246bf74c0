//! Linear algebra composed from backend kernels and elementwise ops

use super::{finish, for_each_host_f32};
use crate::algorithm::linalg::{
    LuDecomposition, NormKind, SvdDecomposition, default_rank_tolerance, validate_f32,
    validate_matrix_2d, validate_same_device, validate_square_matrix,
};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::{BinaryOps, LinalgOps, ReduceOps, UnaryOps};
use crate::runtime::Client;
use crate::runtime::cpu::kernels::det_from_lu;
use crate::tensor::Tensor;

fn rank0(value: f64, like: &Tensor) -> Result<Tensor> {
    Tensor::full(&[], value, DType::F32, like.device())
}

fn matmul_impl(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    validate_same_device(a, b, "matmul")?;
    let (m, k) = validate_matrix_2d(a.shape(), "matmul")?;
    let (k2, n) = validate_matrix_2d(b.shape(), "matmul")?;
    if k != k2 {
        return Err(Error::shape_mismatch(&[k, n], b.shape()));
    }

    let a = a.contiguous()?;
    let b = b.contiguous()?;
    let device = a.device();
    let out = Tensor::empty(&[m, n], DType::F32, device)?;
    device
        .runtime()
        .linalg()
        .gemm_f32(a.data_ptr(), b.data_ptr(), out.data_ptr(), m, n, k)?;
    finish(device);
    Ok(out)
}

fn det_impl(a: &Tensor) -> Result<Tensor> {
    validate_f32(a, "det")?;
    let n = validate_square_matrix(a.shape(), "det")?;
    if n == 0 {
        return rank0(1.0, a);
    }

    let device = a.device();
    let linalg = device.runtime().linalg();
    if device.is_gpu() {
        let a = a.contiguous()?;
        let det = linalg.det_f32(a.data_ptr(), n)?;
        finish(device);
        return rank0(det as f64, &a);
    }

    let lu = a.copy()?;
    let mut ipiv = vec![0i32; n];
    match linalg.getrf_f32(lu.data_ptr(), n, &mut ipiv) {
        Ok(()) => {}
        Err(Error::BackendFailure { status, .. }) => {
            tracing::warn!(n, status, "det: matrix is singular");
            return rank0(0.0, a);
        }
        Err(e) => return Err(e),
    }
    let factors = lu.to_vec::<f32>()?;
    rank0(det_from_lu(&factors, n, &ipiv) as f64, a)
}

fn inverse_impl(a: &Tensor) -> Result<Tensor> {
    validate_f32(a, "inverse")?;
    let n = validate_square_matrix(a.shape(), "inverse")?;
    let inv = a.copy()?;
    if n == 0 {
        return Ok(inv);
    }

    let device = a.device();
    let linalg = device.runtime().linalg();
    let mut ipiv = vec![0i32; n];
    linalg.getrf_f32(inv.data_ptr(), n, &mut ipiv)?;
    linalg.getri_f32(inv.data_ptr(), n, &ipiv)?;
    finish(device);
    Ok(inv)
}

fn lu_impl(a: &Tensor) -> Result<LuDecomposition> {
    validate_f32(a, "lu")?;
    let n = validate_square_matrix(a.shape(), "lu")?;
    let a = a.contiguous()?;
    let device = a.device();
    let p = Tensor::empty(&[n, n], DType::F32, device)?;
    let l = Tensor::empty(&[n, n], DType::F32, device)?;
    let u = Tensor::empty(&[n, n], DType::F32, device)?;
    if n > 0 {
        device.runtime().linalg().lu_f32(
            a.data_ptr(),
            p.data_ptr(),
            l.data_ptr(),
            u.data_ptr(),
            n,
        )?;
        finish(device);
    }
    Ok(LuDecomposition { p, l, u })
}

fn svd_impl(client: &Client, a: &Tensor) -> Result<SvdDecomposition> {
    validate_f32(a, "svd")?;
    let (m, n) = validate_matrix_2d(a.shape(), "svd")?;
    let a = a.contiguous()?;
    let device = a.device();
    let u = Tensor::empty(&[m, m], DType::F32, device)?;
    let s = Tensor::empty(&[m.min(n)], DType::F32, device)?;
    let vt = Tensor::empty(&[n, n], DType::F32, device)?;
    device.runtime().linalg().svd_f32(
        a.data_ptr(),
        u.data_ptr(),
        s.data_ptr(),
        vt.data_ptr(),
        m,
        n,
        client.config().svd_max_sweeps,
    )?;
    finish(device);
    Ok(SvdDecomposition { u, s, vt })
}

fn norm_impl(client: &Client, a: &Tensor, kind: NormKind) -> Result<Tensor> {
    validate_f32(a, "norm")?;
    match kind {
        NormKind::L1 if a.device().is_cpu() => {
            let mut total = 0.0f64;
            for_each_host_f32(a, |x| total += x.abs() as f64)?;
            rank0(total, a)
        }
        NormKind::L1 => client.sum(&client.abs(a)?),
        NormKind::Spectral => {
            let s = client.svd(a)?.s.to_vec::<f32>()?;
            rank0(s.first().copied().unwrap_or(0.0) as f64, a)
        }
    }
}

fn matrix_rank_impl(client: &Client, a: &Tensor, tol: Option<f64>) -> Result<Tensor> {
    let (m, n) = validate_matrix_2d(a.shape(), "matrix_rank")?;
    let s = client.svd(a)?.s.to_vec::<f32>()?;
    let tol = match tol {
        Some(t) if t.is_nan() || t < 0.0 => {
            return Err(Error::invalid_argument(
                "tol",
                format!("tolerance must be non-negative, got {t}"),
            ));
        }
        Some(t) => t,
        None => default_rank_tolerance(s.first().copied().unwrap_or(0.0), m, n),
    };
    let rank = s.iter().filter(|&&v| v as f64 > tol).count();
    Tensor::from_slice(&[rank as i64], &[], a.device())
}

/// `[.., k] · [k]` over the last axis of `a`
fn gemv_impl(a: &Tensor, x: &Tensor) -> Result<Tensor> {
    validate_same_device(a, x, "dot")?;
    let (lead, last) = a.shape().split_at(a.ndim() - 1);
    let n = last[0];
    if x.shape()[0] != n {
        return Err(Error::shape_mismatch(&[n], x.shape()));
    }
    let m: usize = lead.iter().product();

    let a = a.contiguous()?.reshape(&[m, n])?;
    let x = x.contiguous()?;
    let device = a.device();
    let out = Tensor::empty(lead, DType::F32, device)?;
    device
        .runtime()
        .linalg()
        .gemv_f32(a.data_ptr(), x.data_ptr(), out.data_ptr(), m, n)?;
    finish(device);
    Ok(out)
}

fn inner_impl(client: &Client, a: &Tensor, b: &Tensor) -> Result<Tensor> {
    if a.is_scalar() || b.is_scalar() {
        return client.mul(a, b);
    }
    if a.ndim() > 2 || b.ndim() > 2 {
        return Err(Error::NotImplemented {
            feature: "inner for operands of rank above 2",
        });
    }
    let (ka, kb) = (a.shape()[a.ndim() - 1], b.shape()[b.ndim() - 1]);
    if ka != kb {
        return Err(Error::shape_mismatch(&[ka], &[kb]));
    }

    let total = client.sum(&client.mul(a, b)?)?;
    if a.ndim() > 1 {
        total.reshape(&vec![1; a.ndim()])
    } else {
        Ok(total)
    }
}

impl LinalgOps for Client {
    fn matmul(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        matmul_impl(a, b)
    }

    fn det(&self, a: &Tensor) -> Result<Tensor> {
        det_impl(a)
    }

    fn inverse(&self, a: &Tensor) -> Result<Tensor> {
        inverse_impl(a)
    }

    fn lu(&self, a: &Tensor) -> Result<LuDecomposition> {
        lu_impl(a)
    }

    fn svd(&self, a: &Tensor) -> Result<SvdDecomposition> {
        svd_impl(self, a)
    }

    fn norm(&self, a: &Tensor, kind: NormKind) -> Result<Tensor> {
        norm_impl(self, a, kind)
    }

    fn matrix_rank(&self, a: &Tensor, tol: Option<f64>) -> Result<Tensor> {
        matrix_rank_impl(self, a, tol)
    }

    fn dot(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        match (a.ndim(), b.ndim()) {
            (0, _) | (_, 0) => self.mul(a, b),
            (1, 1) => self.inner(a, b),
            (2, 2) => self.matmul(a, b),
            (r, 1) if r >= 2 => gemv_impl(a, b),
            _ => Err(Error::NotImplemented {
                feature: "dot for this rank combination",
            }),
        }
    }

    fn inner(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        inner_impl(self, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Device;

    fn mat(data: &[f32], shape: &[usize]) -> Tensor {
        Tensor::from_slice(data, shape, &Device::cpu()).unwrap()
    }

    fn assert_close(got: &[f32], want: &[f32], tol: f32) {
        assert_eq!(got.len(), want.len());
        for (i, (g, w)) in got.iter().zip(want).enumerate() {
            assert!((g - w).abs() <= tol, "index {i}: {g} vs {w}");
        }
    }

    #[test]
    fn test_matmul() {
        let client = Client::new();
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let b = mat(&[7.0, 8.0, 9.0, 10.0, 11.0, 12.0], &[3, 2]);
        let c = client.matmul(&a, &b).unwrap();
        assert_eq!(c.shape(), &[2, 2]);
        assert_eq!(c.to_vec::<f32>().unwrap(), vec![58.0, 64.0, 139.0, 154.0]);
        assert!(matches!(
            client.matmul(&a, &a).unwrap_err(),
            Error::ShapeMismatch { .. }
        ));
    }

    #[test]
    fn test_det() {
        let client = Client::new();
        let a = mat(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let det = client.det(&a).unwrap().item::<f32>().unwrap();
        assert!((det + 2.0).abs() < 1e-5);

        let singular = mat(&[1.0, 2.0, 2.0, 4.0], &[2, 2]);
        assert_eq!(client.det(&singular).unwrap().item::<f32>().unwrap(), 0.0);

        let empty = Tensor::empty(&[0, 0], DType::F32, &Device::cpu()).unwrap();
        assert_eq!(client.det(&empty).unwrap().item::<f32>().unwrap(), 1.0);

        assert!(matches!(
            client.det(&mat(&[1.0; 6], &[2, 3])).unwrap_err(),
            Error::NotSquare { .. }
        ));
    }

    #[test]
    fn test_inverse() {
        let client = Client::new();
        let a = mat(&[4.0, 7.0, 2.0, 6.0], &[2, 2]);
        let inv = client.inverse(&a).unwrap();
        assert_close(&inv.to_vec::<f32>().unwrap(), &[0.6, -0.7, -0.2, 0.4], 1e-5);
        let back = client.inverse(&inv).unwrap();
        assert_close(&back.to_vec::<f32>().unwrap(), &[4.0, 7.0, 2.0, 6.0], 1e-4);
        // The input is untouched.
        assert_eq!(a.to_vec::<f32>().unwrap(), vec![4.0, 7.0, 2.0, 6.0]);

        let singular = mat(&[1.0, 2.0, 2.0, 4.0], &[2, 2]);
        let err = client.inverse(&singular).unwrap_err();
        assert!(matches!(err, Error::BackendFailure { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_lu_reconstructs() {
        let client = Client::new();
        let a = mat(&[2.0, 1.0, 1.0, 4.0, 3.0, 3.0, 8.0, 7.0, 9.0], &[3, 3]);
        let LuDecomposition { p, l, u } = client.lu(&a).unwrap();
        let pa = client.matmul(&p, &a).unwrap().to_vec::<f32>().unwrap();
        let lu = client.matmul(&l, &u).unwrap().to_vec::<f32>().unwrap();
        assert_close(&pa, &lu, 1e-5);
        // First pivot is the row with the largest leading entry.
        assert_eq!(&p.to_vec::<f32>().unwrap()[..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_svd_and_norms() {
        let client = Client::new();
        let a = mat(&[3.0, 0.0, 0.0, -4.0], &[2, 2]);
        let svd = client.svd(&a).unwrap();
        assert_close(&svd.s.to_vec::<f32>().unwrap(), &[4.0, 3.0], 1e-5);

        let spectral = client.norm(&a, NormKind::Spectral).unwrap();
        assert!((spectral.item::<f32>().unwrap() - 4.0).abs() < 1e-5);
        let l1 = client.norm(&a, NormKind::L1).unwrap();
        assert_eq!(l1.item::<f32>().unwrap(), 7.0);
        let l1_view = client.norm(&a.t().unwrap(), NormKind::L1).unwrap();
        assert_eq!(l1_view.item::<f32>().unwrap(), 7.0);
    }

    #[test]
    fn test_matrix_rank() {
        let client = Client::new();
        let rank1 = mat(&[1.0, 2.0, 3.0, 2.0, 4.0, 6.0], &[2, 3]);
        let r = client.matrix_rank(&rank1, None).unwrap();
        assert_eq!(r.dtype(), DType::I64);
        assert_eq!(r.item::<i64>().unwrap(), 1);

        let full = mat(&[1.0, 0.0, 0.0, 1.0], &[2, 2]);
        assert_eq!(client.matrix_rank(&full, None).unwrap().item::<i64>().unwrap(), 2);
        assert_eq!(
            client.matrix_rank(&full, Some(2.0)).unwrap().item::<i64>().unwrap(),
            0
        );
        assert!(client.matrix_rank(&full, Some(-1.0)).is_err());
    }

    #[test]
    fn test_dot_dispatch() {
        let client = Client::new();
        let v = mat(&[1.0, 2.0, 3.0], &[3]);
        assert_eq!(client.dot(&v, &v).unwrap().item::<f32>().unwrap(), 14.0);

        let m = mat(&[1.0, 0.0, 0.0, 0.0, 1.0, 1.0], &[2, 3]);
        let mv = client.dot(&m, &v).unwrap();
        assert_eq!(mv.shape(), &[2]);
        assert_eq!(mv.to_vec::<f32>().unwrap(), vec![1.0, 5.0]);

        let batched = mat(&[1.0; 12], &[2, 2, 3]);
        let bv = client.dot(&batched, &v).unwrap();
        assert_eq!(bv.shape(), &[2, 2]);
        assert_eq!(bv.to_vec::<f32>().unwrap(), vec![6.0; 4]);

        let two = Tensor::scalar(2.0, &Device::cpu()).unwrap();
        assert_eq!(
            client.dot(&two, &v).unwrap().to_vec::<f32>().unwrap(),
            vec![2.0, 4.0, 6.0]
        );

        assert!(matches!(
            client.dot(&v, &m).unwrap_err(),
            Error::NotImplemented { .. }
        ));
    }

    #[test]
    fn test_inner() {
        let client = Client::new();
        let a = mat(&[1.0, 2.0, 3.0], &[1, 3]);
        let b = mat(&[4.0, 5.0, 6.0], &[3]);
        let r = client.inner(&a, &b).unwrap();
        assert_eq!(r.shape(), &[1, 1]);
        assert_eq!(r.to_vec::<f32>().unwrap(), vec![32.0]);

        assert!(matches!(
            client.inner(&b, &mat(&[1.0, 2.0], &[2])).unwrap_err(),
            Error::ShapeMismatch { .. }
        ));
        assert!(matches!(
            client.inner(&mat(&[1.0; 8], &[2, 2, 2]), &mat(&[1.0; 2], &[2])).unwrap_err(),
            Error::NotImplemented { .. }
        ));
    }
}
