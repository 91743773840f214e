use crate::{
    basis,
    error::{Direction, Error, KnotVectorError, Result},
    VecF,
};

/// Two knots closer than this are treated as the same parameter value
pub const KNOT_TOLERANCE: f64 = 1e-10;

/// Rescales `values` so that the smallest knot maps to 0 and the largest to 1
pub fn normalize(values: &[f64]) -> std::result::Result<Vec<f64>, KnotVectorError> {
    if values.is_empty() {
        return Err(KnotVectorError::Empty);
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(KnotVectorError::NonFinite { index });
    }
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = hi - lo;
    if range <= 0.0 {
        return Err(KnotVectorError::ZeroRange);
    }
    Ok(values.iter().map(|v| (v - lo) / range).collect())
}

fn check(degree: usize, values: &[f64], n: usize) -> std::result::Result<(), KnotVectorError> {
    let expected = n + degree + 1;
    if values.len() != expected {
        return Err(KnotVectorError::WrongLength {
            expected,
            found: values.len(),
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(KnotVectorError::NonFinite { index });
    }
    if let Some(i) = values.windows(2).position(|w| w[1] < w[0]) {
        return Err(KnotVectorError::Decreasing { index: i + 1 });
    }
    // At least one span of the evaluation domain must have non-zero length,
    // otherwise every basis function evaluation divides by zero.
    if n <= degree || values[degree] >= values[n] {
        return Err(KnotVectorError::EmptyDomain {
            first: degree,
            last: n,
        });
    }
    Ok(())
}

/// Checks whether `values` is a usable knot vector for a curve of the given
/// degree with `n` control points.
pub fn is_valid(degree: usize, values: &[f64], n: usize) -> bool {
    check(degree, values, n).is_ok()
}

/// Counts the knots equal to `u`, within [`KNOT_TOLERANCE`]
pub fn find_multiplicity(u: f64, values: &[f64]) -> usize {
    values
        .iter()
        .filter(|k| (*k - u).abs() <= KNOT_TOLERANCE)
        .count()
}

/// Returns the index `k` of the knot span containing `u`, such that
/// `values[k] <= u < values[k + 1]`, for a curve with `n` control points.
///
/// Parameters at (or past) the end of the domain land in the last span of
/// non-zero length, and parameters before its start are clamped to it.
///
/// Algorithm A2.1
pub fn find_span(degree: usize, values: &[f64], n: usize, u: f64) -> usize {
    let end = values[n];
    if u >= end {
        let mut span = n - 1;
        while span > degree && values[span] >= end {
            span -= 1;
        }
        return span;
    }
    let u = u.max(values[degree]);

    // Invariant: values[low] <= u < values[high]
    let mut low = degree;
    let mut high = n;
    let mut mid = (low + high) / 2;
    while u < values[mid] || u >= values[mid + 1] {
        if u < values[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// A validated, normalized knot vector
#[derive(Clone, Debug, PartialEq)]
pub struct KnotVector(Vec<f64>);

impl KnotVector {
    /// Normalizes `values` to [0, 1] then checks them against the given
    /// degree and control point count.
    pub fn new(
        degree: usize,
        values: &[f64],
        n: usize,
    ) -> std::result::Result<Self, KnotVectorError> {
        let values = normalize(values)?;
        check(degree, &values, n)?;
        Ok(Self(values))
    }

    /// Builds a clamped knot vector with evenly spaced interior knots:
    /// `degree + 1` zeros, `n - degree - 1` interior values, `degree + 1` ones.
    pub fn clamped_uniform(degree: usize, n: usize) -> Result<Self> {
        if n < degree + 1 {
            return Err(Error::TooFewControlPoints {
                direction: Direction::U,
                degree,
                required: degree + 1,
                found: n,
            });
        }
        let interior = n - degree - 1;
        let mut values = vec![0.0; degree + 1];
        values.extend((1..=interior).map(|i| i as f64 / (interior + 1) as f64));
        values.extend(std::iter::repeat(1.0).take(degree + 1));
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn multiplicity(&self, u: f64) -> usize {
        find_multiplicity(u, &self.0)
    }

    /// See [`find_span`]
    pub fn find_span(&self, degree: usize, n: usize, u: f64) -> usize {
        find_span(degree, &self.0, n, u)
    }

    /// Finds the span containing `u` and the `degree + 1` nonzero basis
    /// functions there.
    pub fn basis_funs(&self, degree: usize, n: usize, u: f64) -> (usize, VecF) {
        let span = self.find_span(degree, n, u);
        (span, basis::basis_funs(degree, &self.0, span, u))
    }

    /// Returns a copy with `r` copies of `u` spliced in after `span`
    pub(crate) fn spliced(&self, span: usize, u: f64, r: usize) -> Self {
        let mut out = Vec::with_capacity(self.0.len() + r);
        out.extend_from_slice(&self.0[..=span]);
        out.extend(std::iter::repeat(u).take(r));
        out.extend_from_slice(&self.0[span + 1..]);
        Self(out)
    }
}

impl std::ops::Index<usize> for KnotVector {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl AsRef<[f64]> for KnotVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}
