//! Cox-de Boor basis functions and their derivatives.
//!
//! All functions take the degree `p`, the raw knot slice, a span index found
//! with [`crate::knot_vector::find_span`], and the parameter `u`. Only the
//! `p + 1` basis functions which are nonzero on the span are computed; entry
//! `i` of a returned row pairs with control point `span - p + i`.
use smallvec::smallvec;

use crate::VecF;

/// Computes the `p + 1` nonzero basis functions at `u`.
///
/// Algorithm A2.2
pub fn basis_funs(p: usize, U: &[f64], span: usize, u: f64) -> VecF {
    let mut N: VecF = smallvec![0.0; p + 1];
    let mut left: VecF = smallvec![0.0; p + 1];
    let mut right: VecF = smallvec![0.0; p + 1];
    N[0] = 1.0;
    for j in 1..=p {
        left[j] = u - U[span + 1 - j];
        right[j] = U[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = N[r] / (right[r + 1] + left[j - r]);
            N[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        N[j] = saved;
    }
    N
}

/// Computes the nonzero basis functions and their derivatives up to and
/// including order `n`. Row `k` holds the `k`-th derivatives; rows above
/// `p` are zero, since a degree `p` polynomial has no such derivatives.
///
/// Algorithm A2.3
pub fn basis_funs_derivs(p: usize, U: &[f64], span: usize, u: f64, n: usize) -> Vec<VecF> {
    // ndu stores the basis functions in its upper triangle and the knot
    // differences in its lower triangle
    let mut ndu: Vec<VecF> = vec![smallvec![0.0; p + 1]; p + 1];
    let mut left: VecF = smallvec![0.0; p + 1];
    let mut right: VecF = smallvec![0.0; p + 1];
    ndu[0][0] = 1.0;
    for j in 1..=p {
        left[j] = u - U[span + 1 - j];
        right[j] = U[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            ndu[j][r] = right[r + 1] + left[j - r];
            let temp = ndu[r][j - 1] / ndu[j][r];
            ndu[r][j] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[j][j] = saved;
    }

    let mut ders: Vec<VecF> = vec![smallvec![0.0; p + 1]; n + 1];
    for j in 0..=p {
        ders[0][j] = ndu[j][p];
    }

    let nd = n.min(p);
    let mut a: [VecF; 2] = [smallvec![0.0; p + 1], smallvec![0.0; p + 1]];
    for r in 0..=p {
        let (mut s1, mut s2) = (0, 1);
        a[0][0] = 1.0;
        for k in 1..=nd {
            let mut d = 0.0;
            let rk = r as isize - k as isize;
            let pk = p - k;
            if r >= k {
                a[s2][0] = a[s1][0] / ndu[pk + 1][r - k];
                d = a[s2][0] * ndu[r - k][pk];
            }
            let j1 = if rk >= -1 { 1 } else { (-rk) as usize };
            let j2 = if r as isize - 1 <= pk as isize {
                k - 1
            } else {
                p - r
            };
            for j in j1..=j2 {
                let c = (rk + j as isize) as usize;
                a[s2][j] = (a[s1][j] - a[s1][j - 1]) / ndu[pk + 1][c];
                d += a[s2][j] * ndu[c][pk];
            }
            if r <= pk {
                a[s2][k] = -a[s1][k - 1] / ndu[pk + 1][r];
                d += a[s2][k] * ndu[r][pk];
            }
            ders[k][r] = d;
            std::mem::swap(&mut s1, &mut s2);
        }
    }

    let mut scale = p as f64;
    for k in 1..=nd {
        for d in ders[k].iter_mut() {
            *d *= scale;
        }
        scale *= (p - k) as f64;
    }
    ders
}

/// Computes the nonzero basis functions of every degree from 0 to `p`.
///
/// `N[j][i]` is the `j`-th nonzero function of degree `i` (zero for `j > i`),
/// so column `p` matches [`basis_funs`]. The lower-degree columns are what
/// the derivative curves built from derivative control points are
/// evaluated against.
pub fn all_basis_funs(p: usize, U: &[f64], span: usize, u: f64) -> Vec<VecF> {
    let mut N: Vec<VecF> = vec![smallvec![0.0; p + 1]; p + 1];
    for i in 0..=p {
        for (j, b) in basis_funs(i, U, span, u).into_iter().enumerate() {
            N[j][i] = b;
        }
    }
    N
}
