//! LU factorization, inversion and determinant kernels
//!
//! All matrices are `n × n`, row-major. Pivot indices follow the LAPACK
//! convention: `ipiv[k]` is the 1-based row that was swapped with row
//! `k + 1` at step `k`.

/// In-place LU factorization with partial pivoting (`sgetrf`)
///
/// Returns `0` on success, or `k + 1` where `U[k][k]` is the first exactly
/// zero pivot. A zero pivot does not stop the factorization; elimination of
/// that column is simply skipped.
pub fn getrf(a: &mut [f32], n: usize, ipiv: &mut [i32]) -> i32 {
    let mut info = 0;

    for k in 0..n {
        let mut pivot_row = k;
        let mut pivot_val = a[k * n + k].abs();
        for i in (k + 1)..n {
            let val = a[i * n + k].abs();
            if val > pivot_val {
                pivot_row = i;
                pivot_val = val;
            }
        }
        ipiv[k] = (pivot_row + 1) as i32;

        if pivot_row != k {
            for j in 0..n {
                a.swap(k * n + j, pivot_row * n + j);
            }
        }

        let pivot = a[k * n + k];
        if pivot == 0.0 {
            if info == 0 {
                info = (k + 1) as i32;
            }
            continue;
        }

        for i in (k + 1)..n {
            let factor = a[i * n + k] / pivot;
            a[i * n + k] = factor;
            for j in (k + 1)..n {
                a[i * n + j] -= factor * a[k * n + j];
            }
        }
    }

    info
}

/// Overwrite a factorization produced by [`getrf`] with the inverse (`sgetri`)
///
/// Returns `k + 1` if `U[k][k]` is zero, leaving `a` untouched.
pub fn getri(a: &mut [f32], n: usize, ipiv: &[i32]) -> i32 {
    if let Some(k) = (0..n).find(|&k| a[k * n + k] == 0.0) {
        return (k + 1) as i32;
    }

    let mut inv = vec![0.0f64; n * n];
    let mut col = vec![0.0f64; n];

    for j in 0..n {
        col.iter_mut().for_each(|v| *v = 0.0);
        col[j] = 1.0;

        // Apply P to e_j in the order the swaps were performed.
        for k in 0..n {
            let p = (ipiv[k] - 1) as usize;
            if p != k {
                col.swap(k, p);
            }
        }

        // L y = P e_j (unit diagonal)
        for i in 0..n {
            let mut sum = col[i];
            for kk in 0..i {
                sum -= a[i * n + kk] as f64 * col[kk];
            }
            col[i] = sum;
        }

        // U x = y
        for i in (0..n).rev() {
            let mut sum = col[i];
            for kk in (i + 1)..n {
                sum -= a[i * n + kk] as f64 * col[kk];
            }
            col[i] = sum / a[i * n + i] as f64;
        }

        for i in 0..n {
            inv[i * n + j] = col[i];
        }
    }

    for (dst, src) in a.iter_mut().zip(inv) {
        *dst = src as f32;
    }
    0
}

/// Determinant from a factorization produced by [`getrf`]
pub fn det_from_lu(lu: &[f32], n: usize, ipiv: &[i32]) -> f32 {
    let mut det = 1.0f64;
    for k in 0..n {
        det *= lu[k * n + k] as f64;
        if ipiv[k] as usize != k + 1 {
            det = -det;
        }
    }
    det as f32
}

/// Partial-pivoting LU into separate factors such that `P·A = L·U`
///
/// `p`, `l` and `u` must each hold `n * n` elements. At step `k` the row with
/// the largest magnitude in column `k` (at or below the diagonal) is swapped
/// into place in `U`, `P` and the already-computed columns of `L`. A zero
/// pivot column is left as is.
pub fn lu_partial_pivot(a: &[f32], n: usize, p: &mut [f32], l: &mut [f32], u: &mut [f32]) {
    u[..n * n].copy_from_slice(&a[..n * n]);
    p[..n * n].fill(0.0);
    l[..n * n].fill(0.0);
    for i in 0..n {
        p[i * n + i] = 1.0;
        l[i * n + i] = 1.0;
    }

    for k in 0..n {
        let mut pivot_row = k;
        let mut pivot_val = u[k * n + k].abs();
        for i in (k + 1)..n {
            let val = u[i * n + k].abs();
            if val > pivot_val {
                pivot_row = i;
                pivot_val = val;
            }
        }

        if pivot_row != k {
            for j in 0..n {
                u.swap(k * n + j, pivot_row * n + j);
                p.swap(k * n + j, pivot_row * n + j);
            }
            for j in 0..k {
                l.swap(k * n + j, pivot_row * n + j);
            }
        }

        let pivot = u[k * n + k];
        if pivot == 0.0 {
            continue;
        }

        for i in (k + 1)..n {
            let factor = u[i * n + k] / pivot;
            l[i * n + k] = factor;
            u[i * n + k] = 0.0;
            for j in (k + 1)..n {
                u[i * n + j] -= factor * u[k * n + j];
            }
        }
    }
}
