//! One-sided Jacobi SVD
//!
//! # Algorithm
//!
//! For a tall matrix `B` (rows ≥ cols), repeatedly orthogonalise every
//! column pair `(p, q)` with a Givens rotation, accumulating the rotations
//! in `V`:
//!
//! ```text
//! for sweep in 0..max_sweeps:
//!     for p < q:
//!         (a_pp, a_qq, a_pq) = Gram entries of columns p, q
//!         skip if |a_pq| <= tol * sqrt(a_pp * a_qq)
//!         rotate columns p, q of B and V
//!     stop when no pair was rotated
//! ```
//!
//! Afterwards the column norms of `B` are the singular values and the
//! normalised columns are the left singular vectors. Wide inputs are handled
//! by factoring the transpose and swapping the roles of `U` and `V`.
//!
//! The factors are full: `U` is completed to an `m × m` orthonormal basis and
//! `Vᵀ` is `n × n`, so `A = U[:, :k] · diag(S) · Vᵀ[:k, :]` with
//! `k = min(m, n)`.

use super::super::jacobi::{
    JacobiRotation, apply_rotation_to_columns, argsort_desc, column_norm, compute_gram_elements,
    identity_matrix,
};

/// Result of [`svd_jacobi`]
#[derive(Debug, Clone)]
pub struct JacobiSvd {
    /// `m × m` left singular vectors, row-major
    pub u: Vec<f32>,
    /// `min(m, n)` singular values, descending
    pub s: Vec<f32>,
    /// `n × n` transposed right singular vectors, row-major
    pub vt: Vec<f32>,
    /// Sweeps performed
    pub sweeps: usize,
    /// Whether a sweep finished without rotating any pair
    pub converged: bool,
}

struct TallSvd {
    u: Vec<f64>,
    s: Vec<f64>,
    v: Vec<f64>,
    sweeps: usize,
    converged: bool,
}

/// Full SVD of the row-major `m × n` matrix `a`
pub fn svd_jacobi(a: &[f32], m: usize, n: usize, max_sweeps: usize) -> JacobiSvd {
    if m >= n {
        let work: Vec<f64> = a[..m * n].iter().map(|&x| x as f64).collect();
        let tall = svd_tall(work, m, n, max_sweeps);
        JacobiSvd {
            u: to_f32(&tall.u),
            s: to_f32(&tall.s),
            vt: to_f32(&transpose(&tall.v, n, n)),
            sweeps: tall.sweeps,
            converged: tall.converged,
        }
    } else {
        // Aᵀ = U' S V'ᵀ  =>  A = V' S U'ᵀ
        let work = transpose(&a[..m * n].iter().map(|&x| x as f64).collect::<Vec<_>>(), m, n);
        let tall = svd_tall(work, n, m, max_sweeps);
        JacobiSvd {
            u: to_f32(&tall.v),
            s: to_f32(&tall.s),
            vt: to_f32(&transpose(&tall.u, n, n)),
            sweeps: tall.sweeps,
            converged: tall.converged,
        }
    }
}

fn svd_tall(mut b: Vec<f64>, rows: usize, cols: usize, max_sweeps: usize) -> TallSvd {
    let mut v = identity_matrix(cols);
    let tol = (rows.max(1) as f64).sqrt() * f64::EPSILON;

    let mut sweeps = 0;
    let mut converged = cols < 2;
    while !converged && sweeps < max_sweeps {
        sweeps += 1;
        let mut rotated = false;

        for p in 0..cols - 1 {
            for q in (p + 1)..cols {
                let (a_pp, a_qq, a_pq) = compute_gram_elements(&b, rows, cols, p, q);
                if a_pq == 0.0 || a_pq.abs() <= tol * (a_pp * a_qq).sqrt() {
                    continue;
                }
                let rot = JacobiRotation::compute(a_pp, a_qq, a_pq);
                apply_rotation_to_columns(&mut b, rows, cols, p, q, &rot);
                apply_rotation_to_columns(&mut v, cols, cols, p, q, &rot);
                rotated = true;
            }
        }

        converged = !rotated;
    }

    let norms: Vec<f64> = (0..cols).map(|j| column_norm(&b, rows, cols, j)).collect();
    let order = argsort_desc(&norms);
    let s: Vec<f64> = order.iter().map(|&j| norms[j]).collect();

    // Columns with negligible norm carry no direction; they are replaced when
    // the basis is completed.
    let s_max = s.first().copied().unwrap_or(0.0);
    let rank_tol = s_max * rows as f64 * f32::EPSILON as f64;

    let mut u = vec![0.0f64; rows * rows];
    let mut filled = vec![false; rows];
    for (k, &j) in order.iter().enumerate() {
        if s[k] > rank_tol && s[k] > 0.0 {
            for i in 0..rows {
                u[i * rows + k] = b[i * cols + j] / s[k];
            }
            filled[k] = true;
        }
    }
    complete_basis(&mut u, rows, &mut filled);

    let mut v_sorted = vec![0.0f64; cols * cols];
    for (k, &j) in order.iter().enumerate() {
        for i in 0..cols {
            v_sorted[i * cols + k] = v[i * cols + j];
        }
    }

    TallSvd {
        u,
        s,
        v: v_sorted,
        sweeps,
        converged,
    }
}

/// Fill the unset columns of the `n × n` matrix `q` so that all columns form
/// an orthonormal basis
///
/// Each empty slot takes the standard basis vector with the largest component
/// orthogonal to the columns filled so far (Gram-Schmidt, applied twice).
fn complete_basis(q: &mut [f64], n: usize, filled: &mut [bool]) {
    for slot in 0..n {
        if filled[slot] {
            continue;
        }

        let mut best: Option<(f64, Vec<f64>)> = None;
        for e in 0..n {
            let mut w = vec![0.0f64; n];
            w[e] = 1.0;
            for _ in 0..2 {
                for j in (0..n).filter(|&j| filled[j]) {
                    let dot: f64 = (0..n).map(|i| q[i * n + j] * w[i]).sum();
                    for (i, wi) in w.iter_mut().enumerate() {
                        *wi -= dot * q[i * n + j];
                    }
                }
            }
            let norm = w.iter().map(|x| x * x).sum::<f64>().sqrt();
            if best.as_ref().is_none_or(|(best_norm, _)| norm > *best_norm) {
                best = Some((norm, w));
            }
        }

        let Some((norm, w)) = best else { continue };
        if norm > 0.0 {
            for i in 0..n {
                q[i * n + slot] = w[i] / norm;
            }
            filled[slot] = true;
        }
    }
}

fn transpose(data: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    let mut out = vec![0.0; rows * cols];
    for i in 0..rows {
        for j in 0..cols {
            out[j * rows + i] = data[i * cols + j];
        }
    }
    out
}

fn to_f32(data: &[f64]) -> Vec<f32> {
    data.iter().map(|&x| x as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(svd: &JacobiSvd, m: usize, n: usize) -> Vec<f32> {
        let k = m.min(n);
        let mut out = vec![0.0f32; m * n];
        for i in 0..m {
            for j in 0..n {
                out[i * n + j] = (0..k)
                    .map(|l| svd.u[i * m + l] * svd.s[l] * svd.vt[l * n + j])
                    .sum();
            }
        }
        out
    }

    fn assert_orthonormal(q: &[f32], n: usize) {
        for i in 0..n {
            for j in 0..n {
                let dot: f32 = (0..n).map(|r| q[r * n + i] * q[r * n + j]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-4, "columns {i},{j}: {dot}");
            }
        }
    }

    #[test]
    fn test_tall_reconstruction() {
        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let svd = svd_jacobi(&a, 3, 2, 30);
        assert!(svd.converged);
        assert_eq!(svd.s.len(), 2);
        assert!(svd.s[0] >= svd.s[1]);
        assert_orthonormal(&svd.u, 3);
        assert_orthonormal(&svd.vt, 2);
        for (x, y) in a.iter().zip(reconstruct(&svd, 3, 2)) {
            assert!((x - y).abs() < 1e-4);
        }
    }

    #[test]
    fn test_wide_reconstruction() {
        let a = [1.0f32, 0.0, 2.0, 0.0, 3.0, 1.0];
        let svd = svd_jacobi(&a, 2, 3, 30);
        assert_eq!(svd.u.len(), 4);
        assert_eq!(svd.vt.len(), 9);
        assert_orthonormal(&svd.u, 2);
        assert_orthonormal(&svd.vt, 3);
        for (x, y) in a.iter().zip(reconstruct(&svd, 2, 3)) {
            assert!((x - y).abs() < 1e-4);
        }
    }

    #[test]
    fn test_rank_deficient_basis_is_completed() {
        let a = [1.0f32, 2.0, 2.0, 4.0];
        let svd = svd_jacobi(&a, 2, 2, 30);
        assert!(svd.s[1].abs() < 1e-5);
        assert!((svd.s[0] - 5.0).abs() < 1e-4);
        assert_orthonormal(&svd.u, 2);
    }

    #[test]
    fn test_diagonal_singular_values() {
        let a = [3.0f32, 0.0, 0.0, 0.0, 5.0, 0.0];
        let svd = svd_jacobi(&a, 2, 3, 30);
        assert!((svd.s[0] - 5.0).abs() < 1e-6);
        assert!((svd.s[1] - 3.0).abs() < 1e-6);
    }
}
