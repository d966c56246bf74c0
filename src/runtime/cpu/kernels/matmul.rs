//! Matrix multiplication kernels

/// Matrix multiplication: C = A @ B
///
/// Loop order is i-k-j so the innermost loop streams contiguous rows of B
/// and C.
///
/// # Arguments
/// * `a` - Pointer to matrix A (m × k), row-major
/// * `b` - Pointer to matrix B (k × n), row-major
/// * `out` - Pointer to output matrix C (m × n), row-major
///
/// # Safety
/// - All pointers must be valid for the specified dimensions
/// - `out` must not alias with `a` or `b`
pub unsafe fn gemm(a: *const f32, b: *const f32, out: *mut f32, m: usize, n: usize, k: usize) {
    if m == 0 || n == 0 {
        return;
    }
    let c = unsafe { std::slice::from_raw_parts_mut(out, m * n) };
    c.fill(0.0);
    if k == 0 {
        return;
    }
    let a = unsafe { std::slice::from_raw_parts(a, m * k) };
    let b = unsafe { std::slice::from_raw_parts(b, k * n) };

    for i in 0..m {
        let c_row = &mut c[i * n..(i + 1) * n];
        for kk in 0..k {
            let a_val = a[i * k + kk];
            let b_row = &b[kk * n..(kk + 1) * n];
            for (c_val, &b_val) in c_row.iter_mut().zip(b_row) {
                *c_val += a_val * b_val;
            }
        }
    }
}

/// Matrix-vector product: y = A @ x
///
/// # Safety
/// - `a` must be valid for `m * n` reads, `x` for `n`, `y` for `m` writes
pub unsafe fn gemv(a: *const f32, x: *const f32, y: *mut f32, m: usize, n: usize) {
    if m == 0 {
        return;
    }
    let y = unsafe { std::slice::from_raw_parts_mut(y, m) };
    if n == 0 {
        y.fill(0.0);
        return;
    }
    let a = unsafe { std::slice::from_raw_parts(a, m * n) };
    let x = unsafe { std::slice::from_raw_parts(x, n) };

    for (row, out) in a.chunks_exact(n).zip(y.iter_mut()) {
        *out = row.iter().zip(x).map(|(&p, &q)| p * q).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemm_2x3_3x2() {
        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0f32, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut c = [0.0f32; 4];
        unsafe { gemm(a.as_ptr(), b.as_ptr(), c.as_mut_ptr(), 2, 2, 3) };
        assert_eq!(c, [58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_gemm_overwrites_output() {
        let a = [1.0f32, 0.0, 0.0, 1.0];
        let b = [2.0f32, 3.0, 4.0, 5.0];
        let mut c = [99.0f32; 4];
        unsafe { gemm(a.as_ptr(), b.as_ptr(), c.as_mut_ptr(), 2, 2, 2) };
        assert_eq!(c, b);
    }

    #[test]
    fn test_gemv() {
        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x = [1.0f32, 0.0, -1.0];
        let mut y = [0.0f32; 2];
        unsafe { gemv(a.as_ptr(), x.as_ptr(), y.as_mut_ptr(), 2, 3) };
        assert_eq!(y, [-2.0, -2.0]);
    }
}
