//! Unary operation and fill kernels

use crate::ops::UnaryOp;

/// Execute a unary operation element-wise
///
/// # Safety
/// - `a` and `out` must be valid pointers to `len` elements
#[inline]
pub unsafe fn unary_scalar_f32(op: UnaryOp, a: *const f32, out: *mut f32, len: usize) {
    for i in 0..len {
        unsafe { *out.add(i) = op.apply_f32(*a.add(i)) };
    }
}

/// Fill `len` elements with `value`
///
/// # Safety
/// - `out` must be valid for `len` writes
#[inline]
pub unsafe fn fill_f32(out: *mut f32, len: usize, value: f32) {
    let out = unsafe { std::slice::from_raw_parts_mut(out, len) };
    out.fill(value);
}
