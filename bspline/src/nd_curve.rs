use log::{debug, trace, warn};
use nalgebra_glm as glm;
use nalgebra_glm::DVec3;

use crate::{
    basis::{all_basis_funs, basis_funs, basis_funs_derivs},
    control_points::{check_dimension, ControlPointGrid},
    error::{check_param, Direction, Error, Result},
    insert::{Insertion, KnotInsertion},
    knot_vector::KnotVector,
    sampling::{self, check_delta, Parameters, SampleCache, DEFAULT_DELTA},
    vector,
    visualize::Visualizer,
};

/// Control points of the derivative curves of a control polygon.
///
/// `P` is a window of consecutive control points and `offset` is the index
/// of `P[0]` in the full polygon, which is also how far into `U` the knots
/// for the window start. `PK[k][i]` is the `i`-th control point of the
/// `k`-th derivative curve, for `k <= min(d, p)`.
///
/// Where `U[i + p + 1] == U[i + k]` the entry is the zero vector. Its basis
/// function vanishes everywhere, so it never contributes to a point. This
/// can't happen for the `p + 1` points of a non-empty span.
///
/// Algorithm A3.3
pub(crate) fn curve_deriv_cpts<const D: usize>(
    p: usize,
    U: &[f64],
    P: &[glm::TVec<f64, D>],
    d: usize,
    offset: usize,
) -> Vec<Vec<glm::TVec<f64, D>>> {
    let d = d.min(p);
    let mut PK = Vec::with_capacity(d + 1);
    PK.push(P.to_vec());
    for k in 1..=d {
        let scale = (p - k + 1) as f64;
        let prev: &Vec<glm::TVec<f64, D>> = &PK[k - 1];
        let row = (0..P.len().saturating_sub(k))
            .map(|i| {
                let denom = U[offset + i + p + 1] - U[offset + i + k];
                if denom == 0.0 {
                    glm::TVec::<f64, D>::zeros()
                } else {
                    (prev[i + 1] - prev[i]) * (scale / denom)
                }
            })
            .collect();
        PK.push(row);
    }
    PK
}

/// A non-rational B-spline curve with `D`-dimensional control points.
///
/// Every constructor and mutator checks the full configuration before
/// changing anything, so an instance is always evaluable: the knot vector
/// has `n + p + 1` normalized, non-decreasing entries and there are at
/// least `p + 1` control points.
#[derive(Clone, Debug)]
pub struct NdBsplineCurve<const D: usize> {
    p: usize,
    knots: KnotVector,
    control_points: ControlPointGrid<D>,
    delta: f64,
    /// Bumped on every mutation, invalidating `samples`
    revision: u64,
    samples: SampleCache<glm::TVec<f64, D>>,
}

fn validate<const D: usize>(
    p: usize,
    points: &[glm::TVec<f64, D>],
    knots: &[f64],
) -> Result<KnotVector> {
    check_dimension::<D>()?;
    if points.len() < p + 1 {
        return Err(Error::TooFewControlPoints {
            direction: Direction::U,
            degree: p,
            required: p + 1,
            found: points.len(),
        });
    }
    KnotVector::new(p, knots, points.len()).map_err(|source| Error::InvalidKnotVector {
        direction: Direction::U,
        source,
    })
}

impl<const D: usize> NdBsplineCurve<D> {
    /// Builds a curve of degree `p`. The knot vector is normalized to [0, 1]
    /// and must have `control_points.len() + p + 1` entries.
    pub fn new(p: usize, control_points: Vec<glm::TVec<f64, D>>, knots: &[f64]) -> Result<Self> {
        let knots = validate(p, &control_points, knots)?;
        Ok(Self {
            p,
            knots,
            control_points: ControlPointGrid::from_polygon(control_points)?,
            delta: DEFAULT_DELTA,
            revision: 0,
            samples: SampleCache::new(),
        })
    }

    /// Builds a curve from raw coordinate lists, each of which must have
    /// exactly `D` entries
    pub fn from_coordinates<C: AsRef<[f64]>>(p: usize, coords: &[C], knots: &[f64]) -> Result<Self> {
        let grid = ControlPointGrid::<D>::from_coordinates(coords, coords.len(), 1)?;
        Self::new(p, grid.as_slice().to_vec(), knots)
    }

    /// Builds a curve with a clamped, uniformly spaced knot vector, which
    /// interpolates its first and last control points
    pub fn clamped(p: usize, control_points: Vec<glm::TVec<f64, D>>) -> Result<Self> {
        let knots = KnotVector::clamped_uniform(p, control_points.len())?;
        Self::new(p, control_points, knots.as_slice())
    }

    pub fn with_delta(mut self, delta: f64) -> Result<Self> {
        self.set_delta(delta)?;
        Ok(self)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn n(&self) -> usize {
        self.control_points.len()
    }

    pub fn degree(&self) -> usize {
        self.p
    }

    pub fn order(&self) -> usize {
        self.p + 1
    }

    pub fn dimension(&self) -> usize {
        D
    }

    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }

    pub fn control_points(&self) -> &[glm::TVec<f64, D>] {
        self.control_points.as_slice()
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Counter bumped by every mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_delta(&mut self, delta: f64) -> Result<()> {
        check_delta(delta)?;
        self.delta = delta;
        self.touch();
        Ok(())
    }

    /// Replaces the control points, keeping degree and knot vector; the
    /// number of points must stay the same.
    pub fn set_control_points(&mut self, points: Vec<glm::TVec<f64, D>>) -> Result<()> {
        if points.len() != self.n() {
            return Err(Error::ControlPointCount {
                expected: self.n(),
                found: points.len(),
            });
        }
        self.control_points = ControlPointGrid::from_polygon(points)?;
        self.touch();
        Ok(())
    }

    pub fn set_knot_vector(&mut self, knots: &[f64]) -> Result<()> {
        self.knots = validate(self.p, self.control_points.as_slice(), knots)?;
        self.touch();
        Ok(())
    }

    /// Changes the degree, which always requires a matching knot vector
    pub fn set_degree(&mut self, p: usize, knots: &[f64]) -> Result<()> {
        self.knots = validate(p, self.control_points.as_slice(), knots)?;
        self.p = p;
        self.touch();
        Ok(())
    }

    /// Replaces degree, control points and knot vector at once
    pub fn reconfigure(
        &mut self,
        p: usize,
        control_points: Vec<glm::TVec<f64, D>>,
        knots: &[f64],
    ) -> Result<()> {
        let knots = validate(p, &control_points, knots)?;
        self.control_points = ControlPointGrid::from_polygon(control_points)?;
        self.knots = knots;
        self.p = p;
        self.touch();
        Ok(())
    }

    /// Algorithm A3.1, without checking `u`
    fn point_unchecked(&self, u: f64) -> glm::TVec<f64, D> {
        let p = self.p;
        let span = self.knots.find_span(p, self.n(), u);
        let N = basis_funs(p, self.knots.as_slice(), span, u);
        let P = self.control_points.as_slice();
        let mut C = glm::TVec::<f64, D>::zeros();
        for i in 0..=p {
            C += P[span - p + i] * N[i];
        }
        C
    }

    /// Evaluates the curve at `u ∈ [0, 1]`
    pub fn point(&self, u: f64) -> Result<glm::TVec<f64, D>> {
        check_param(Direction::U, u)?;
        Ok(self.point_unchecked(u))
    }

    /// Evaluates the curve at `u`, also returning the `p + 1` control points
    /// which influence that point
    pub fn point_with_control_points(
        &self,
        u: f64,
    ) -> Result<(glm::TVec<f64, D>, Vec<glm::TVec<f64, D>>)> {
        check_param(Direction::U, u)?;
        let span = self.knots.find_span(self.p, self.n(), u);
        let window = self.control_points.as_slice()[span - self.p..=span].to_vec();
        Ok((self.point_unchecked(u), window))
    }

    pub fn points(&self, us: &[f64]) -> Result<Vec<glm::TVec<f64, D>>> {
        if us.is_empty() {
            return Err(Error::EmptyParameterList);
        }
        us.iter().map(|u| self.point(*u)).collect()
    }

    /// Lazily evaluates the curve at `0, delta, 2·delta, …, 1`.
    ///
    /// Each call starts a fresh pass; nothing is cached.
    pub fn samples(&self) -> CurveSamples<'_, D> {
        CurveSamples {
            curve: self,
            params: Parameters::new(self.delta),
        }
    }

    /// Returns the sampled points, evaluating them first if the curve has
    /// changed since they were last computed
    pub fn ensure_sampled(&mut self) -> &[glm::TVec<f64, D>] {
        if self.samples.get(self.revision).is_none() {
            let params: Vec<f64> = Parameters::new(self.delta).collect();
            trace!("sampling curve at {} parameters", params.len());
            let points = sampling::map_params(params, |u| self.point_unchecked(u));
            self.samples.store(self.revision, points);
        }
        self.samples.points()
    }

    /// Returns the sampled points if they are up to date, without
    /// evaluating anything
    pub fn sampled_points(&self) -> Option<&[glm::TVec<f64, D>]> {
        self.samples.get(self.revision)
    }

    fn derivatives_unchecked(&self, u: f64, d: usize) -> Vec<glm::TVec<f64, D>> {
        let p = self.p;
        let du = d.min(p);
        let mut CK = vec![glm::TVec::<f64, D>::zeros(); d + 1];

        let span = self.knots.find_span(p, self.n(), u);
        let nders = basis_funs_derivs(p, self.knots.as_slice(), span, u, du);
        let P = self.control_points.as_slice();
        for k in 0..=du {
            for j in 0..=p {
                CK[k] += P[span - p + j] * nders[k][j];
            }
        }
        CK
    }

    /// Computes the curve point and its derivatives up to and including
    /// order `d` at `u`. Entry `k` is the `k`-th derivative; entries above
    /// the degree are zero.
    ///
    /// Algorithm A3.2
    pub fn derivatives(&self, u: f64, d: usize) -> Result<Vec<glm::TVec<f64, D>>> {
        check_param(Direction::U, u)?;
        Ok(self.derivatives_unchecked(u, d))
    }

    /// Computes the control points of the derivative curves of order up to
    /// `min(d, degree)`, restricted to control points `r1..=r2`.
    ///
    /// `PK[k][i]` is control point `r1 + i` of the `k`-th derivative curve.
    /// `r2` is clamped to the last control point.
    ///
    /// A window wider than the `p + 1` points of one span may cover a knot
    /// of multiplicity above `p - k`. The `k`-th derivative control points
    /// across it belong to a zero-length span and are returned as zero
    /// vectors; they carry no geometry and must not be read as the
    /// derivative there.
    pub fn derivative_control_points(
        &self,
        d: usize,
        r1: usize,
        r2: usize,
    ) -> Vec<Vec<glm::TVec<f64, D>>> {
        let r2 = r2.min(self.n() - 1);
        let window: &[glm::TVec<f64, D>] = if r1 <= r2 {
            &self.control_points.as_slice()[r1..=r2]
        } else {
            &[]
        };
        curve_deriv_cpts(self.p, self.knots.as_slice(), window, d, r1)
    }

    /// Same as [`derivatives`](Self::derivatives), computed by evaluating the
    /// derivative curves built from derivative control points.
    ///
    /// Algorithm A3.4
    pub fn derivatives_from_control_points(
        &self,
        u: f64,
        d: usize,
    ) -> Result<Vec<glm::TVec<f64, D>>> {
        check_param(Direction::U, u)?;
        let p = self.p;
        let du = d.min(p);
        let mut CK = vec![glm::TVec::<f64, D>::zeros(); d + 1];

        let span = self.knots.find_span(p, self.n(), u);
        let N = all_basis_funs(p, self.knots.as_slice(), span, u);
        let PK = self.derivative_control_points(du, span - p, span);
        for k in 0..=du {
            for j in 0..=(p - k) {
                CK[k] += PK[k][j] * N[j][p - k];
            }
        }
        Ok(CK)
    }

    /// Returns the curve point and first derivative at `u`
    pub fn tangent(
        &self,
        u: f64,
        normalize: bool,
    ) -> Result<(glm::TVec<f64, D>, glm::TVec<f64, D>)> {
        let ders = self.derivatives(u, 1)?;
        let t = if normalize {
            vector::normalize(&ders[1])?
        } else {
            ders[1]
        };
        Ok((ders[0], t))
    }

    /// Returns the curve point and second derivative at `u`
    pub fn normal(
        &self,
        u: f64,
        normalize: bool,
    ) -> Result<(glm::TVec<f64, D>, glm::TVec<f64, D>)> {
        let ders = self.derivatives(u, 2)?;
        let n = if normalize {
            vector::normalize(&ders[2])?
        } else {
            ders[2]
        };
        Ok((ders[0], n))
    }

    /// Returns the curve point and `tangent × normal` at `u`. Planar curves
    /// are embedded at z = 0, so their binormal lies along the z axis.
    pub fn binormal(&self, u: f64, normalize: bool) -> Result<(glm::TVec<f64, D>, DVec3)> {
        let (point, t) = self.tangent(u, normalize)?;
        let (_, n) = self.normal(u, normalize)?;
        let b = vector::cross(&t, &n);
        let b = if normalize {
            vector::normalize(&b)?
        } else {
            b
        };
        Ok((point, b))
    }

    pub fn tangents(
        &self,
        us: &[f64],
        normalize: bool,
    ) -> Result<Vec<(glm::TVec<f64, D>, glm::TVec<f64, D>)>> {
        if us.is_empty() {
            return Err(Error::EmptyParameterList);
        }
        us.iter().map(|u| self.tangent(*u, normalize)).collect()
    }

    pub fn normals(
        &self,
        us: &[f64],
        normalize: bool,
    ) -> Result<Vec<(glm::TVec<f64, D>, glm::TVec<f64, D>)>> {
        if us.is_empty() {
            return Err(Error::EmptyParameterList);
        }
        us.iter().map(|u| self.normal(*u, normalize)).collect()
    }

    pub fn binormals(&self, us: &[f64], normalize: bool) -> Result<Vec<(glm::TVec<f64, D>, DVec3)>> {
        if us.is_empty() {
            return Err(Error::EmptyParameterList);
        }
        us.iter().map(|u| self.binormal(*u, normalize)).collect()
    }

    /// Inserts the knot `u` `r` times without changing the curve's shape,
    /// adding `r` control points.
    ///
    /// A `u` within [`KNOT_TOLERANCE`](crate::knot_vector::KNOT_TOLERANCE)
    /// of an existing knot adds copies of that knot. If the knot's
    /// multiplicity would exceed the degree, or `u` lies outside
    /// `[U[p], U[n]]`, nothing changes and [`Insertion::Rejected`] is returned.
    pub fn insert_knot(&mut self, u: f64, r: usize) -> Result<Insertion> {
        check_param(Direction::U, u)?;
        let direction = Direction::U;
        if r == 0 {
            return Ok(Insertion::Inserted {
                direction,
                knot: u,
                count: 0,
            });
        }
        let plan = match KnotInsertion::plan(self.p, &self.knots, self.n(), u, r) {
            Ok(plan) => plan,
            Err(available) => {
                warn!("cannot insert knot {u} {r} times, at most {available} more fit");
                return Ok(Insertion::Rejected {
                    direction,
                    knot: u,
                    requested: r,
                    available,
                });
            }
        };
        let grid = ControlPointGrid::from_polygon(plan.apply(self.control_points.as_slice()))?;
        let knot = plan.knot;
        self.control_points = grid;
        self.knots = plan.knots;
        self.touch();
        debug!("inserted knot {knot} {r} times, now {} control points", self.n());
        Ok(Insertion::Inserted {
            direction,
            knot,
            count: r,
        })
    }

    /// Draws the control polygon and the sampled curve
    pub fn render<V: Visualizer<D>>(&mut self, vis: &mut V, control_color: &str, curve_color: &str) {
        self.ensure_sampled();
        vis.clear();
        vis.add(self.control_points.as_slice(), "Control Points", control_color);
        vis.add(self.samples.points(), "Curve", curve_color);
        vis.render();
    }
}

/// Iterator over the points of a curve at regular parameter steps
#[derive(Clone, Debug)]
pub struct CurveSamples<'a, const D: usize> {
    curve: &'a NdBsplineCurve<D>,
    params: Parameters,
}

impl<'a, const D: usize> Iterator for CurveSamples<'a, D> {
    type Item = glm::TVec<f64, D>;
    fn next(&mut self) -> Option<Self::Item> {
        self.params.next().map(|u| self.curve.point_unchecked(u))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.params.size_hint()
    }
}

impl<'a, const D: usize> ExactSizeIterator for CurveSamples<'a, D> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualize::testing::Recorder;
    use approx::assert_abs_diff_eq;
    use glm::DVec3;

    fn close<const D: usize>(a: &glm::TVec<f64, D>, b: &glm::TVec<f64, D>) {
        assert_abs_diff_eq!(glm::distance(a, b), 0.0, epsilon = 1e-9);
    }

    /// Cubic 3D curve with a double interior knot
    fn cubic() -> NdBsplineCurve<3> {
        let P = vec![
            DVec3::new(5.0, 5.0, 0.0),
            DVec3::new(10.0, 10.0, 1.0),
            DVec3::new(20.0, 15.0, 2.0),
            DVec3::new(35.0, 15.0, 1.0),
            DVec3::new(45.0, 10.0, 0.0),
            DVec3::new(50.0, 5.0, -1.0),
            DVec3::new(60.0, 0.0, 0.0),
        ];
        NdBsplineCurve::new(
            3,
            P,
            &[0.0, 0.0, 0.0, 0.0, 0.3, 0.6, 0.6, 1.0, 1.0, 1.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn construction_order() {
        let P = vec![DVec3::zeros(); 3];
        let e = NdBsplineCurve::new(3, P.clone(), &[0.0; 7]).unwrap_err();
        assert!(matches!(
            e,
            Error::TooFewControlPoints {
                required: 4,
                found: 3,
                ..
            }
        ));
        let e = NdBsplineCurve::new(2, P, &[0.0, 0.0, 0.0, 1.0, 1.0]).unwrap_err();
        assert!(matches!(e, Error::InvalidKnotVector { .. }));
    }

    #[test]
    fn from_coordinates_checks_dimension() {
        let coords = vec![vec![0.0, 0.0, 0.0], vec![1.0, 1.0]];
        let e = NdBsplineCurve::<3>::from_coordinates(1, &coords, &[0.0, 0.0, 1.0, 1.0])
            .unwrap_err();
        assert!(matches!(e, Error::PointDimension { index: 1, .. }));
    }

    #[test]
    fn knots_are_normalized() {
        let c = NdBsplineCurve::new(
            1,
            vec![DVec3::zeros(), DVec3::new(1.0, 0.0, 0.0), DVec3::new(1.0, 1.0, 0.0)],
            &[0.0, 0.0, 2.0, 4.0, 4.0],
        )
        .unwrap();
        assert_eq!(c.knots().as_slice(), &[0.0, 0.0, 0.5, 1.0, 1.0]);
        close(&c.point(0.5).unwrap(), &DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn endpoints() {
        let c = cubic();
        close(&c.point(0.0).unwrap(), &c.control_points()[0]);
        close(&c.point(1.0).unwrap(), &c.control_points()[6]);
    }

    #[test]
    fn domain_errors() {
        let c = cubic();
        assert!(c.point(-0.1).unwrap_err().is_domain());
        assert!(c.derivatives(1.5, 1).unwrap_err().is_domain());
        assert_eq!(c.points(&[]).unwrap_err(), Error::EmptyParameterList);
        assert!(c.points(&[0.2, 1.2]).is_err());
    }

    #[test]
    fn contributing_points() {
        let c = cubic();
        let (pt, window) = c.point_with_control_points(0.45).unwrap();
        assert_eq!(window.len(), 4);
        assert_eq!(window[0], c.control_points()[1]);
        close(&pt, &c.point(0.45).unwrap());
    }

    #[test]
    fn derivative_algorithms_agree() {
        let c = cubic();
        for i in 0..=50 {
            let u = i as f64 / 50.0;
            let a = c.derivatives(u, 5).unwrap();
            let b = c.derivatives_from_control_points(u, 5).unwrap();
            assert_eq!(a.len(), 6);
            for k in 0..=5 {
                assert_abs_diff_eq!(glm::distance(&a[k], &b[k]), 0.0, epsilon = 1e-7);
            }
            assert_eq!(a[4], DVec3::zeros());
            assert_eq!(a[5], DVec3::zeros());
            close(&a[0], &c.point(u).unwrap());
        }
    }

    #[test]
    fn first_derivative_at_clamped_start() {
        // C'(0) = p / (U[p+1] - U[1]) * (P1 - P0)
        let c = cubic();
        let d = c.derivatives(0.0, 1).unwrap();
        let expected = (c.control_points()[1] - c.control_points()[0]) * (3.0 / 0.3);
        close(&d[1], &expected);
    }

    #[test]
    fn derivative_control_points_of_line() {
        let c = NdBsplineCurve::new(
            1,
            vec![DVec3::zeros(), DVec3::new(2.0, 0.0, 0.0)],
            &[0.0, 0.0, 1.0, 1.0],
        )
        .unwrap();
        let PK = c.derivative_control_points(3, 0, 1);
        assert_eq!(PK.len(), 2);
        assert_eq!(PK[1], vec![DVec3::new(2.0, 0.0, 0.0)]);
    }

    #[test]
    fn derivative_control_points_across_a_double_knot() {
        let c = cubic();
        let PK = c.derivative_control_points(3, 0, 6);
        assert_eq!(PK[3].len(), 4);
        // U[6] == U[5] == 0.6
        assert_eq!(PK[3][2], DVec3::zeros());
        let expected = (PK[2][4] - PK[2][3]) * (1.0 / 0.4);
        close(&PK[3][3], &expected);
    }

    #[test]
    fn frame_vectors() {
        let c = cubic();
        let (p, t) = c.tangent(0.4, true).unwrap();
        close(&p, &c.point(0.4).unwrap());
        assert_abs_diff_eq!(glm::length(&t), 1.0, epsilon = 1e-12);
        let (_, b) = c.binormal(0.4, true).unwrap();
        assert_abs_diff_eq!(glm::length(&b), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(glm::dot(&b, &t), 0.0, epsilon = 1e-9);

        let raw = c.tangents(&[0.1, 0.9], false).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1].1, c.derivatives(0.9, 1).unwrap()[1]);
        assert_eq!(c.normals(&[0.5], false).unwrap().len(), 1);
        assert_eq!(c.binormals(&[], true).unwrap_err(), Error::EmptyParameterList);
    }

    #[test]
    fn degenerate_normal() {
        // A straight line has no curvature, so its normal can't be normalized
        let c = NdBsplineCurve::new(
            1,
            vec![DVec3::zeros(), DVec3::new(1.0, 1.0, 1.0)],
            &[0.0, 0.0, 1.0, 1.0],
        )
        .unwrap();
        let e = c.normal(0.5, true).unwrap_err();
        assert!(e.is_degenerate());
        assert!(!e.is_domain());
        assert!(c.normal(0.5, false).is_ok());
    }

    #[test]
    fn sample_cache() {
        let mut c = cubic().with_delta(0.25).unwrap();
        assert!(c.sampled_points().is_none());
        assert_eq!(c.samples().len(), 5);
        let pts = c.ensure_sampled().to_vec();
        assert_eq!(pts.len(), 5);
        assert_eq!(pts, c.samples().collect::<Vec<_>>());
        assert!(c.sampled_points().is_some());

        c.set_delta(0.1).unwrap();
        assert!(c.sampled_points().is_none());
        assert_eq!(c.ensure_sampled().len(), 11);

        assert!(c.set_delta(1.0).is_err());
        assert_eq!(c.delta(), 0.1);
        assert!(c.sampled_points().is_some());
    }

    #[test]
    fn failed_mutation_leaves_curve_alone() {
        let mut c = cubic();
        let before = c.clone();
        assert!(c.set_knot_vector(&[0.0, 1.0]).is_err());
        assert!(c.set_control_points(vec![DVec3::zeros(); 3]).is_err());
        assert!(c.set_degree(4, &[0.0; 12]).is_err());
        assert_eq!(c.knots(), before.knots());
        assert_eq!(c.control_points(), before.control_points());
        assert_eq!(c.degree(), 3);
        assert_eq!(c.revision(), before.revision());
    }

    #[test]
    fn set_degree_with_knots() {
        let mut c = cubic();
        c.set_degree(2, &[0.0, 0.0, 0.0, 0.2, 0.4, 0.6, 0.8, 1.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(c.order(), 3);
        close(&c.point(1.0).unwrap(), &c.control_points()[6]);

        c.reconfigure(1, vec![DVec3::zeros(), DVec3::new(0.0, 4.0, 0.0)], &[0.0, 0.0, 1.0, 1.0])
            .unwrap();
        close(&c.point(0.25).unwrap(), &DVec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn insertion_keeps_shape() {
        let mut c = cubic();
        let before = c.clone();
        let res = c.insert_knot(0.6, 1).unwrap();
        assert_eq!(
            res,
            Insertion::Inserted {
                direction: Direction::U,
                knot: 0.6,
                count: 1
            }
        );
        assert_eq!(c.control_points().len(), 8);
        assert_eq!(c.knots().multiplicity(0.6), 3);
        assert!(c.insert_knot(0.15, 2).unwrap().is_inserted());
        assert_eq!(c.control_points().len(), 10);
        for i in 0..=40 {
            let u = i as f64 / 40.0;
            close(&c.point(u).unwrap(), &before.point(u).unwrap());
        }
    }

    #[test]
    fn insertion_next_to_a_knot_keeps_shape() {
        let mut c = cubic();
        let before = c.clone();
        let res = c.insert_knot(0.3 + 1e-12, 1).unwrap();
        assert_eq!(
            res,
            Insertion::Inserted {
                direction: Direction::U,
                knot: 0.3,
                count: 1
            }
        );
        assert_eq!(c.knots().multiplicity(0.3), 2);
        assert!(c.insert_knot(0.6 - 1e-12, 1).unwrap().is_inserted());
        assert_eq!(c.knots().multiplicity(0.6), 3);
        assert!(c.insert_knot(0.6 + 1e-12, 1).unwrap().is_rejected());
        for i in 0..=40 {
            let u = i as f64 / 40.0;
            close(&c.point(u).unwrap(), &before.point(u).unwrap());
        }
    }

    #[test]
    fn rejected_insertion_is_noop() {
        let mut c = cubic();
        c.ensure_sampled();
        let before = c.clone();
        let res = c.insert_knot(0.6, 2).unwrap();
        assert_eq!(
            res,
            Insertion::Rejected {
                direction: Direction::U,
                knot: 0.6,
                requested: 2,
                available: 1
            }
        );
        assert!(c.insert_knot(1.0, 1).unwrap().is_rejected());
        assert_eq!(c.knots(), before.knots());
        assert_eq!(c.control_points(), before.control_points());
        assert!(c.sampled_points().is_some());
        assert!(c.insert_knot(2.0, 1).is_err());
    }

    #[test]
    fn insertion_invalidates_samples() {
        let mut c = cubic();
        c.ensure_sampled();
        assert!(c.insert_knot(0.5, 1).unwrap().is_inserted());
        assert!(c.sampled_points().is_none());
    }

    #[test]
    fn renders_layers() {
        let mut c = cubic();
        let mut vis = Recorder::default();
        c.render(&mut vis, "blue", "black");
        assert_eq!(vis.renders, 1);
        assert_eq!(
            vis.layers,
            vec![
                ("Control Points".to_owned(), "blue".to_owned(), 7),
                ("Curve".to_owned(), "black".to_owned(), 11),
            ]
        );
    }
}
