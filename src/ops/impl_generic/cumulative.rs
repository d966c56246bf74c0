//! Cumulative sums and products

use super::finish;
use crate::algorithm::linalg::validate_f32;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::{BinaryOp, BinaryOps, CumulativeOps};
use crate::runtime::Client;
use crate::tensor::Tensor;

/// Copy equally shaped contiguous rows into one `[rows.len(), C]` array
fn concat_rows(rows: &[Tensor], cols: usize, like: &Tensor) -> Result<Tensor> {
    let device = like.device();
    let out = Tensor::empty(&[rows.len(), cols], DType::F32, device)?;
    let row_bytes = cols * DType::F32.size_in_bytes();
    if row_bytes == 0 {
        return Ok(out);
    }
    let runtime = device.runtime();
    for (r, row) in rows.iter().enumerate() {
        let dst = out.data_ptr() + (r * row_bytes) as u64;
        runtime.copy_within_device(row.data_ptr(), dst, row_bytes)?;
    }
    finish(device);
    Ok(out)
}

/// Fold rows of a 2-D array: `out[r] = op(out[r - 1], a[r])`
fn fold_rows(client: &Client, op: BinaryOp, a: &Tensor) -> Result<Tensor> {
    let (nrows, ncols) = (a.shape()[0], a.shape()[1]);
    let mut rows: Vec<Tensor> = Vec::with_capacity(nrows);
    for r in 0..nrows {
        let row = a.narrow(0, r, 1)?;
        let acc = match rows.last() {
            Some(prev) => client.binary(op, prev, &row)?,
            None => row.contiguous()?,
        };
        rows.push(acc);
    }
    concat_rows(&rows, ncols, a)
}

fn fold_flat(op: BinaryOp, a: &Tensor) -> Result<Tensor> {
    let mut values = a.to_vec::<f32>()?;
    for i in 1..values.len() {
        values[i] = op.apply_f32(values[i], values[i - 1]);
    }
    let len = values.len();
    Tensor::from_slice(&values, &[len], a.device())
}

fn cumulative_impl(
    client: &Client,
    op: BinaryOp,
    a: &Tensor,
    axis: Option<usize>,
) -> Result<Tensor> {
    validate_f32(a, op.name())?;
    let Some(axis) = axis else {
        return fold_flat(op, a);
    };
    if a.ndim() != 2 || axis > 1 {
        return Err(Error::InvalidDimension {
            dim: axis as isize,
            ndim: a.ndim(),
        });
    }

    if axis == 0 {
        fold_rows(client, op, a)
    } else {
        fold_rows(client, op, &a.t()?)?.t()?.contiguous()
    }
}

impl CumulativeOps for Client {
    fn cumsum(&self, a: &Tensor, axis: Option<usize>) -> Result<Tensor> {
        cumulative_impl(self, BinaryOp::Add, a, axis)
    }

    fn cumprod(&self, a: &Tensor, axis: Option<usize>) -> Result<Tensor> {
        cumulative_impl(self, BinaryOp::Mul, a, axis)
    }
}
