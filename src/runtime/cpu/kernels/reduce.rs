//! Full reductions
//!
//! Sums and products accumulate in f64 and round once at the end, so the
//! result does not depend on how the caller chunks the input.

use crate::ops::ReduceOp;

/// Reduce `len` contiguous elements to a single value
///
/// Empty input yields the identity of the operation: `0` for sum, `1` for
/// product, `-inf` for max and `+inf` for min. A NaN anywhere in the input
/// makes every reduction NaN.
///
/// # Safety
/// - `a` must be valid for `len` reads
pub unsafe fn reduce_f32(op: ReduceOp, a: *const f32, len: usize) -> f32 {
    let data: &[f32] = if len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(a, len) }
    };

    match op {
        ReduceOp::Sum => data.iter().map(|&x| x as f64).sum::<f64>() as f32,
        ReduceOp::Prod => data.iter().map(|&x| x as f64).product::<f64>() as f32,
        ReduceOp::Max => extremum(data, f32::NEG_INFINITY, f32::max),
        ReduceOp::Min => extremum(data, f32::INFINITY, f32::min),
    }
}

/// `f32::max`/`f32::min` drop NaN operands; stop at the first one instead
fn extremum(data: &[f32], init: f32, pick: fn(f32, f32) -> f32) -> f32 {
    data.iter()
        .try_fold(init, |acc, &x| if x.is_nan() { None } else { Some(pick(acc, x)) })
        .unwrap_or(f32::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce(op: ReduceOp, data: &[f32]) -> f32 {
        unsafe { reduce_f32(op, data.as_ptr(), data.len()) }
    }

    #[test]
    fn test_reductions() {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        assert_eq!(reduce(ReduceOp::Sum, &data), 10.0);
        assert_eq!(reduce(ReduceOp::Prod, &data), 24.0);
        assert_eq!(reduce(ReduceOp::Max, &data), 4.0);
        assert_eq!(reduce(ReduceOp::Min, &data), 1.0);
    }

    #[test]
    fn test_empty_identities() {
        assert_eq!(reduce(ReduceOp::Sum, &[]), 0.0);
        assert_eq!(reduce(ReduceOp::Prod, &[]), 1.0);
        assert_eq!(reduce(ReduceOp::Max, &[]), f32::NEG_INFINITY);
    }

    #[test]
    fn test_nan_propagates() {
        for op in [ReduceOp::Sum, ReduceOp::Prod, ReduceOp::Max, ReduceOp::Min] {
            assert!(reduce(op, &[f32::NAN, 1.0]).is_nan(), "{op:?}");
            assert!(reduce(op, &[1.0, 2.0, f32::NAN]).is_nan(), "{op:?}");
        }
        assert_eq!(reduce(ReduceOp::Max, &[f32::NEG_INFINITY, -1.0]), -1.0);
    }

    #[test]
    fn test_sum_accumulates_in_f64() {
        let data = vec![0.1f32; 1_000_000];
        let total = reduce(ReduceOp::Sum, &data);
        assert!((total - 100_000.0).abs() < 1.0, "total = {total}");
    }
}
