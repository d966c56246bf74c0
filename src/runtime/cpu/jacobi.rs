//! Jacobi rotation utilities for the one-sided SVD
//!
//! Work matrices are f64 and row-major. The rotation parameters use the
//! LAPACK formula, which avoids catastrophic cancellation when the two
//! diagonal entries are close.

/// Givens rotation parameters
///
/// ```text
/// J = [ c  -s ]
///     [ s   c ]
/// ```
#[derive(Debug, Clone, Copy)]
pub(crate) struct JacobiRotation {
    pub c: f64,
    pub s: f64,
}

impl JacobiRotation {
    /// Rotation that zeroes the off-diagonal entry of the 2×2 Gram block
    ///
    /// ```text
    /// τ = (a_qq - a_pp) / (2 * a_pq)
    /// t = sign(τ) / (|τ| + sqrt(1 + τ²))
    /// c = 1 / sqrt(1 + t²)
    /// s = t * c
    /// ```
    #[inline]
    pub fn compute(a_pp: f64, a_qq: f64, a_pq: f64) -> Self {
        let tau_den = 2.0 * a_pq;
        if tau_den.abs() < 1e-300 {
            return Self { c: 1.0, s: 0.0 };
        }

        let tau = (a_qq - a_pp) / tau_den;
        let t = if tau >= 0.0 {
            1.0 / (tau + (1.0 + tau * tau).sqrt())
        } else {
            -1.0 / (-tau + (1.0 + tau * tau).sqrt())
        };

        let c = 1.0 / (1.0 + t * t).sqrt();
        Self { c, s: t * c }
    }
}

/// `[col_p, col_q] <- [col_p, col_q] @ [[c, s], [-s, c]]`
#[inline]
pub(crate) fn apply_rotation_to_columns(
    data: &mut [f64],
    rows: usize,
    cols: usize,
    p: usize,
    q: usize,
    rot: &JacobiRotation,
) {
    let JacobiRotation { c, s } = *rot;
    for i in 0..rows {
        let idx_p = i * cols + p;
        let idx_q = i * cols + q;
        let val_p = data[idx_p];
        let val_q = data[idx_q];
        data[idx_p] = c * val_p - s * val_q;
        data[idx_q] = s * val_p + c * val_q;
    }
}

/// Gram entries `(a_pp, a_qq, a_pq)` of columns `p` and `q`
#[inline]
pub(crate) fn compute_gram_elements(
    data: &[f64],
    rows: usize,
    cols: usize,
    p: usize,
    q: usize,
) -> (f64, f64, f64) {
    let mut a_pp = 0.0;
    let mut a_qq = 0.0;
    let mut a_pq = 0.0;
    for i in 0..rows {
        let val_p = data[i * cols + p];
        let val_q = data[i * cols + q];
        a_pp += val_p * val_p;
        a_qq += val_q * val_q;
        a_pq += val_p * val_q;
    }
    (a_pp, a_qq, a_pq)
}

/// Euclidean norm of column `j`
#[inline]
pub(crate) fn column_norm(data: &[f64], rows: usize, cols: usize, j: usize) -> f64 {
    (0..rows)
        .map(|i| data[i * cols + j] * data[i * cols + j])
        .sum::<f64>()
        .sqrt()
}

/// Indices that sort `values` in descending order
pub(crate) fn argsort_desc(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&i, &j| values[j].total_cmp(&values[i]));
    indices
}

/// Row-major `n × n` identity
pub(crate) fn identity_matrix(n: usize) -> Vec<f64> {
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        out[i * n + i] = 1.0;
    }
    out
}
