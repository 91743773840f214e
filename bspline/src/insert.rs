//! Boehm's knot insertion, shared by curves and by both directions of a
//! surface.
use nalgebra_glm as glm;

use crate::{
    error::Direction,
    knot_vector::{KnotVector, KNOT_TOLERANCE},
};

/// Outcome of a knot insertion request.
///
/// A rejected request leaves the curve or surface untouched.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Insertion {
    Inserted {
        direction: Direction,
        knot: f64,
        count: usize,
    },
    /// `requested` copies of `knot` don't fit: only `available` more are
    /// allowed before the knot's multiplicity would exceed the degree (or
    /// the knot lies outside the evaluation domain `[U[p], U[n]]`, in which
    /// case `available` is 0)
    Rejected {
        direction: Direction,
        knot: f64,
        requested: usize,
        available: usize,
    },
}

impl Insertion {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Insertion::Inserted { .. })
    }

    pub fn is_rejected(&self) -> bool {
        !self.is_inserted()
    }
}

/// Everything needed to insert `u` into one parametric direction `r` times.
///
/// The blending factors depend only on the knot vector, so they're computed
/// once and reused for every row or column of a surface (Algorithm A5.3).
#[derive(Clone, Debug)]
pub(crate) struct KnotInsertion {
    p: usize,
    /// Span containing `u` before insertion
    k: usize,
    /// Multiplicity of `u` before insertion
    s: usize,
    r: usize,
    /// `alpha[j - 1][i]` is used on pass `j` for auxiliary point `i`
    alpha: Vec<Vec<f64>>,
    /// The knot value actually inserted
    pub knot: f64,
    /// Knot vector after insertion
    pub knots: KnotVector,
}

impl KnotInsertion {
    /// Plans the insertion of `r` copies of `u` into a direction of degree
    /// `p` with `n` control points, or returns the number of copies that
    /// could have been inserted.
    ///
    /// A `u` within [`KNOT_TOLERANCE`] of an existing knot is moved onto that
    /// knot, so the span and the multiplicity always describe the same value.
    pub fn plan(
        p: usize,
        knots: &KnotVector,
        n: usize,
        u: f64,
        r: usize,
    ) -> std::result::Result<Self, usize> {
        let U = knots.as_slice();
        let (u, k, s) = match U.iter().rposition(|t| (t - u).abs() <= KNOT_TOLERANCE) {
            Some(k) => {
                let u = U[k];
                (u, k, U.iter().filter(|t| **t == u).count())
            }
            None => (u, knots.find_span(p, n, u), 0),
        };
        if u < U[p] || u > U[n] {
            return Err(0);
        }
        let available = p.saturating_sub(s);
        if r > available {
            return Err(available);
        }

        // U[k] == u whenever s > 0, with the s copies ending at index k
        let alpha = (1..=r)
            .map(|j| {
                let L = k - p + j;
                (0..=(p - j - s))
                    .map(|i| (u - U[L + i]) / (U[i + k + 1] - U[L + i]))
                    .collect()
            })
            .collect();
        Ok(Self {
            p,
            k,
            s,
            r,
            alpha,
            knot: u,
            knots: knots.spliced(k, u, r),
        })
    }

    /// Refines a single control polygon, returning `polygon.len() + r` points.
    ///
    /// Algorithm A5.1
    pub fn apply<const D: usize>(&self, polygon: &[glm::TVec<f64, D>]) -> Vec<glm::TVec<f64, D>> {
        let (p, k, s, r) = (self.p, self.k, self.s, self.r);
        let n = polygon.len();
        let mut Q = vec![glm::TVec::<f64, D>::zeros(); n + r];

        // Unaltered points before and after the affected window
        Q[..=(k - p)].copy_from_slice(&polygon[..=(k - p)]);
        Q[(k - s + r)..].copy_from_slice(&polygon[(k - s)..]);

        // Auxiliary buffer holding the window being blended; it's never
        // aliased with either the source polygon or the output
        let mut R: Vec<_> = polygon[(k - p)..=(k - s)].to_vec();
        let mut L = k - p;
        for j in 1..=r {
            L = k - p + j;
            for i in 0..=(p - j - s) {
                let a = self.alpha[j - 1][i];
                R[i] = R[i + 1] * a + R[i] * (1.0 - a);
            }
            Q[L] = R[0];
            Q[k + r - j - s] = R[p - j - s];
        }
        for i in (L + 1)..(k - s) {
            Q[i] = R[i - L];
        }
        Q
    }
}
