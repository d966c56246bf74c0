//! AVX2 binary operation kernels
//!
//! Processes 8 f32s per iteration using 256-bit vectors.

use std::arch::x86_64::*;

use super::binary_scalar_f32;
use crate::ops::BinaryOp;

const F32_LANES: usize = 8;

macro_rules! impl_binary_f32_avx2 {
    ($name:ident, $vec_op:ident) => {
        #[target_feature(enable = "avx2")]
        unsafe fn $name(a: *const f32, b: *const f32, out: *mut f32, chunks: usize) {
            for i in 0..chunks {
                let offset = i * F32_LANES;
                unsafe {
                    let va = _mm256_loadu_ps(a.add(offset));
                    let vb = _mm256_loadu_ps(b.add(offset));
                    _mm256_storeu_ps(out.add(offset), $vec_op(va, vb));
                }
            }
        }
    };
}

impl_binary_f32_avx2!(binary_add_f32, _mm256_add_ps);
impl_binary_f32_avx2!(binary_sub_f32, _mm256_sub_ps);
impl_binary_f32_avx2!(binary_div_f32, _mm256_div_ps);

/// Multiply, then add +0.0 so that a -0.0 product becomes +0.0
#[target_feature(enable = "avx2")]
unsafe fn binary_mul_f32(a: *const f32, b: *const f32, out: *mut f32, chunks: usize) {
    let zero = _mm256_setzero_ps();
    for i in 0..chunks {
        let offset = i * F32_LANES;
        unsafe {
            let va = _mm256_loadu_ps(a.add(offset));
            let vb = _mm256_loadu_ps(b.add(offset));
            let prod = _mm256_mul_ps(va, vb);
            _mm256_storeu_ps(out.add(offset), _mm256_add_ps(prod, zero));
        }
    }
}

/// AVX2 binary operation for f32
///
/// # Safety
/// - CPU must support AVX2
/// - All pointers must be valid for `len` elements
#[target_feature(enable = "avx2")]
pub unsafe fn binary_f32(op: BinaryOp, a: *const f32, b: *const f32, out: *mut f32, len: usize) {
    let chunks = len / F32_LANES;
    let remainder = len % F32_LANES;

    unsafe {
        match op {
            BinaryOp::Add => binary_add_f32(a, b, out, chunks),
            BinaryOp::Sub => binary_sub_f32(a, b, out, chunks),
            BinaryOp::Mul => binary_mul_f32(a, b, out, chunks),
            BinaryOp::Div => binary_div_f32(a, b, out, chunks),
            BinaryOp::Mod | BinaryOp::Pow | BinaryOp::Max | BinaryOp::Min => {
                binary_scalar_f32(op, a, b, out, len);
                return;
            }
        }

        if remainder > 0 {
            let offset = chunks * F32_LANES;
            binary_scalar_f32(op, a.add(offset), b.add(offset), out.add(offset), remainder);
        }
    }
}
