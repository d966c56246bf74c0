//! SIMD-accelerated binary operations
//!
//! Add, sub, mul and div are vectorised; the remaining operations (and the
//! tail that does not fill a whole register) run through the scalar kernel,
//! so results match [`binary_scalar_f32`] bit for bit.

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "aarch64")]
mod neon;

use super::{SimdLevel, detect_simd};
use crate::ops::BinaryOp;

pub use crate::runtime::cpu::kernels::binary::binary_scalar_f32;

/// Whether `op` has a vector implementation
#[inline]
pub const fn is_vectorized(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
    )
}

/// SIMD binary operation for f32
///
/// Inputs shorter than `threshold` take the scalar path.
///
/// # Safety
/// - `a`, `b`, and `out` must be valid pointers to `len` elements
#[inline]
pub unsafe fn binary_f32(
    op: BinaryOp,
    a: *const f32,
    b: *const f32,
    out: *mut f32,
    len: usize,
    threshold: usize,
) {
    let level = detect_simd();

    if len < threshold || level == SimdLevel::Scalar || !is_vectorized(op) {
        unsafe { binary_scalar_f32(op, a, b, out, len) };
        return;
    }

    match level {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe { avx2::binary_f32(op, a, b, out, len) },
        #[cfg(target_arch = "aarch64")]
        SimdLevel::Neon => unsafe { neon::binary_f32(op, a, b, out, len) },
        _ => unsafe { binary_scalar_f32(op, a, b, out, len) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both(op: BinaryOp, a: &[f32], b: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let mut simd = vec![0.0f32; a.len()];
        let mut scalar = vec![0.0f32; a.len()];
        unsafe {
            binary_f32(op, a.as_ptr(), b.as_ptr(), simd.as_mut_ptr(), a.len(), 0);
            binary_scalar_f32(op, a.as_ptr(), b.as_ptr(), scalar.as_mut_ptr(), a.len());
        }
        (simd, scalar)
    }

    #[test]
    fn test_matches_scalar_for_every_op() {
        let a: Vec<f32> = (0..67).map(|x| x as f32 * 0.37 - 9.0).collect();
        let b: Vec<f32> = (0..67).map(|x| (x % 7) as f32 + 0.5).collect();
        for op in [
            BinaryOp::Add,
            BinaryOp::Sub,
            BinaryOp::Mul,
            BinaryOp::Div,
            BinaryOp::Mod,
            BinaryOp::Pow,
            BinaryOp::Max,
            BinaryOp::Min,
        ] {
            let (simd, scalar) = both(op, &a, &b);
            for (i, (x, y)) in simd.iter().zip(&scalar).enumerate() {
                assert_eq!(x.to_bits(), y.to_bits(), "{op:?} mismatch at index {i}");
            }
        }
    }

    #[test]
    fn test_mul_negative_zero_in_vector_body_and_tail() {
        let a = vec![-0.0f32; 19];
        let b = vec![3.0f32; 19];
        let (simd, _) = both(BinaryOp::Mul, &a, &b);
        assert!(simd.iter().all(|v| v.to_bits() == 0));

        let a = vec![-2.0f32; 19];
        let b = vec![0.0f32; 19];
        let (simd, _) = both(BinaryOp::Mul, &a, &b);
        assert!(simd.iter().all(|v| v.to_bits() == 0));
    }

    #[test]
    fn test_small_array_uses_scalar() {
        let a = [1.0f32, 2.0, 3.0, 4.0];
        let b = [5.0f32, 6.0, 7.0, 8.0];
        let mut out = [0.0f32; 4];
        unsafe { binary_f32(BinaryOp::Add, a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), 4, 32) };
        assert_eq!(out, [6.0, 8.0, 10.0, 12.0]);
    }
}
