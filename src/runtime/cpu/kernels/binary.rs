//! Binary operations kernels

use crate::ops::BinaryOp;

/// Execute a binary operation element-wise, one element per iteration
///
/// # Safety
/// - `a`, `b`, and `out` must be valid pointers to `len` elements
/// - `out` may alias `a` or `b` only if it is the same pointer
#[inline]
pub unsafe fn binary_scalar_f32(
    op: BinaryOp,
    a: *const f32,
    b: *const f32,
    out: *mut f32,
    len: usize,
) {
    for i in 0..len {
        unsafe {
            let x = *a.add(i);
            let y = *b.add(i);
            *out.add(i) = op.apply_f32(x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(op: BinaryOp, a: &[f32], b: &[f32]) -> Vec<f32> {
        let mut out = vec![0.0f32; a.len()];
        unsafe { binary_scalar_f32(op, a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), a.len()) };
        out
    }

    #[test]
    fn test_arithmetic() {
        let a = [1.0f32, 2.0, 3.0, 4.0];
        let b = [4.0f32, 3.0, 2.0, 1.0];
        assert_eq!(run(BinaryOp::Add, &a, &b), vec![5.0, 5.0, 5.0, 5.0]);
        assert_eq!(run(BinaryOp::Sub, &a, &b), vec![-3.0, -1.0, 1.0, 3.0]);
        assert_eq!(run(BinaryOp::Div, &a, &b), vec![0.25, 2.0 / 3.0, 1.5, 4.0]);
        assert_eq!(run(BinaryOp::Pow, &a, &b), vec![1.0, 8.0, 9.0, 4.0]);
        assert_eq!(run(BinaryOp::Mod, &[7.0], &[3.0]), vec![1.0]);
    }

    #[test]
    fn test_mul_never_yields_negative_zero() {
        let out = run(BinaryOp::Mul, &[-0.0, 0.0, -1.0], &[1.0, -5.0, 0.0]);
        for v in out {
            assert_eq!(v, 0.0);
            assert!(v.is_sign_positive());
        }
    }

    #[test]
    fn test_in_place() {
        let mut a = vec![1.0f32, 2.0, 3.0];
        let b = [1.0f32, 1.0, 1.0];
        let p = a.as_mut_ptr();
        unsafe { binary_scalar_f32(BinaryOp::Add, p, b.as_ptr(), p, 3) };
        assert_eq!(a, vec![2.0, 3.0, 4.0]);
    }
}
