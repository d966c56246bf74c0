//! NEON binary operation kernels for ARM64
//!
//! Processes 4 f32s per iteration using 128-bit vectors.

use std::arch::aarch64::*;

use super::binary_scalar_f32;
use crate::ops::BinaryOp;

const F32_LANES: usize = 4;

macro_rules! impl_binary_f32_neon {
    ($name:ident, $vec_op:ident) => {
        #[target_feature(enable = "neon")]
        unsafe fn $name(a: *const f32, b: *const f32, out: *mut f32, chunks: usize) {
            for i in 0..chunks {
                let offset = i * F32_LANES;
                unsafe {
                    let va = vld1q_f32(a.add(offset));
                    let vb = vld1q_f32(b.add(offset));
                    vst1q_f32(out.add(offset), $vec_op(va, vb));
                }
            }
        }
    };
}

impl_binary_f32_neon!(binary_add_f32, vaddq_f32);
impl_binary_f32_neon!(binary_sub_f32, vsubq_f32);
impl_binary_f32_neon!(binary_div_f32, vdivq_f32);

/// Multiply, then add +0.0 so that a -0.0 product becomes +0.0
#[target_feature(enable = "neon")]
unsafe fn binary_mul_f32(a: *const f32, b: *const f32, out: *mut f32, chunks: usize) {
    let zero = unsafe { vdupq_n_f32(0.0) };
    for i in 0..chunks {
        let offset = i * F32_LANES;
        unsafe {
            let va = vld1q_f32(a.add(offset));
            let vb = vld1q_f32(b.add(offset));
            vst1q_f32(out.add(offset), vaddq_f32(vmulq_f32(va, vb), zero));
        }
    }
}

/// NEON binary operation for f32
///
/// # Safety
/// - All pointers must be valid for `len` elements
#[target_feature(enable = "neon")]
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
