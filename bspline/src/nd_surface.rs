use log::{debug, trace, warn};
use nalgebra_glm as glm;
use nalgebra_glm::DVec3;

use crate::{
    basis::{all_basis_funs, basis_funs, basis_funs_derivs},
    control_points::{check_dimension, ControlPointGrid},
    error::{check_param, Direction, Error, Result},
    insert::{Insertion, KnotInsertion},
    knot_vector::KnotVector,
    nd_curve::curve_deriv_cpts,
    sampling::{self, check_delta, sample_count, SampleCache, DEFAULT_DELTA},
    vector,
    visualize::Visualizer,
};

/// Derivative control points of a surface, indexed `[k][l][i][j]`
pub type SurfaceDerivCpts<const D: usize> = Vec<Vec<Vec<Vec<glm::TVec<f64, D>>>>>;

/// A non-rational tensor-product B-spline surface with `D`-dimensional
/// control points, of degree `p` along `u` and `q` along `v`.
///
/// As with curves, the configuration is checked in full before any change
/// is made, so the knot vectors always match the control grid.
#[derive(Clone, Debug)]
pub struct NdBsplineSurface<const D: usize> {
    p: usize,
    q: usize,
    knots_u: KnotVector,
    knots_v: KnotVector,
    control_points: ControlPointGrid<D>,
    delta: f64,
    revision: u64,
    samples: SampleCache<glm::TVec<f64, D>>,
}

/// Outcome of a two-direction knot insertion
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SurfaceInsertion {
    pub u: Option<Insertion>,
    pub v: Option<Insertion>,
}

impl SurfaceInsertion {
    /// True if every requested direction was refined
    pub fn all_inserted(&self) -> bool {
        self.u.iter().chain(self.v.iter()).all(|i| i.is_inserted())
    }
}

fn check_size(direction: Direction, degree: usize, found: usize) -> Result<()> {
    if found < degree + 1 {
        Err(Error::TooFewControlPoints {
            direction,
            degree,
            required: degree + 1,
            found,
        })
    } else {
        Ok(())
    }
}

fn knot_vector(direction: Direction, degree: usize, knots: &[f64], n: usize) -> Result<KnotVector> {
    KnotVector::new(degree, knots, n)
        .map_err(|source| Error::InvalidKnotVector { direction, source })
}

fn validate<const D: usize>(
    p: usize,
    q: usize,
    grid: &ControlPointGrid<D>,
    knots_u: &[f64],
    knots_v: &[f64],
) -> Result<(KnotVector, KnotVector)> {
    check_dimension::<D>()?;
    check_size(Direction::U, p, grid.size_u())?;
    check_size(Direction::V, q, grid.size_v())?;
    Ok((
        knot_vector(Direction::U, p, knots_u, grid.size_u())?,
        knot_vector(Direction::V, q, knots_v, grid.size_v())?,
    ))
}

impl<const D: usize> NdBsplineSurface<D> {
    pub fn new(
        p: usize,
        q: usize,
        control_points: ControlPointGrid<D>,
        knots_u: &[f64],
        knots_v: &[f64],
    ) -> Result<Self> {
        let (knots_u, knots_v) = validate(p, q, &control_points, knots_u, knots_v)?;
        Ok(Self {
            p,
            q,
            knots_u,
            knots_v,
            control_points,
            delta: DEFAULT_DELTA,
            revision: 0,
            samples: SampleCache::new(),
        })
    }

    /// Builds a surface from raw coordinate lists, flattened with the `v`
    /// index varying fastest
    pub fn from_coordinates<C: AsRef<[f64]>>(
        p: usize,
        q: usize,
        coords: &[C],
        size_u: usize,
        size_v: usize,
        knots_u: &[f64],
        knots_v: &[f64],
    ) -> Result<Self> {
        let grid = ControlPointGrid::from_coordinates(coords, size_u, size_v)?;
        Self::new(p, q, grid, knots_u, knots_v)
    }

    /// Builds a surface with clamped, uniformly spaced knot vectors in both
    /// directions
    pub fn clamped(p: usize, q: usize, control_points: ControlPointGrid<D>) -> Result<Self> {
        check_size(Direction::U, p, control_points.size_u())?;
        check_size(Direction::V, q, control_points.size_v())?;
        let knots_u = KnotVector::clamped_uniform(p, control_points.size_u())?;
        let knots_v = KnotVector::clamped_uniform(q, control_points.size_v())?;
        Self::new(
            p,
            q,
            control_points,
            knots_u.as_slice(),
            knots_v.as_slice(),
        )
    }

    pub fn with_delta(mut self, delta: f64) -> Result<Self> {
        self.set_delta(delta)?;
        Ok(self)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn degree_u(&self) -> usize {
        self.p
    }

    pub fn degree_v(&self) -> usize {
        self.q
    }

    pub fn order_u(&self) -> usize {
        self.p + 1
    }

    pub fn order_v(&self) -> usize {
        self.q + 1
    }

    pub fn dimension(&self) -> usize {
        D
    }

    pub fn knots_u(&self) -> &KnotVector {
        &self.knots_u
    }

    pub fn knots_v(&self) -> &KnotVector {
        &self.knots_v
    }

    /// Flattened control points, `v` index varying fastest
    pub fn control_points(&self) -> &[glm::TVec<f64, D>] {
        self.control_points.as_slice()
    }

    pub fn control_point_grid(&self) -> &ControlPointGrid<D> {
        &self.control_points
    }

    /// Control points in `[u][v]` form
    pub fn control_points_2d(&self) -> Vec<Vec<glm::TVec<f64, D>>> {
        self.control_points.to_2d()
    }

    pub fn size_u(&self) -> usize {
        self.control_points.size_u()
    }

    pub fn size_v(&self) -> usize {
        self.control_points.size_v()
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_delta(&mut self, delta: f64) -> Result<()> {
        check_delta(delta)?;
        self.delta = delta;
        self.touch();
        Ok(())
    }

    /// Replaces the control grid, which must keep its dimensions
    pub fn set_control_points(&mut self, grid: ControlPointGrid<D>) -> Result<()> {
        if (grid.size_u(), grid.size_v()) != (self.size_u(), self.size_v()) {
            return Err(Error::GridSize {
                size_u: self.size_u(),
                size_v: self.size_v(),
                expected: self.size_u() * self.size_v(),
                found: grid.len(),
            });
        }
        self.control_points = grid;
        self.touch();
        Ok(())
    }

    pub fn set_knot_vector_u(&mut self, knots: &[f64]) -> Result<()> {
        self.knots_u = knot_vector(Direction::U, self.p, knots, self.size_u())?;
        self.touch();
        Ok(())
    }

    pub fn set_knot_vector_v(&mut self, knots: &[f64]) -> Result<()> {
        self.knots_v = knot_vector(Direction::V, self.q, knots, self.size_v())?;
        self.touch();
        Ok(())
    }

    /// Changes the `u` degree along with its knot vector
    pub fn set_degree_u(&mut self, p: usize, knots: &[f64]) -> Result<()> {
        check_size(Direction::U, p, self.size_u())?;
        self.knots_u = knot_vector(Direction::U, p, knots, self.size_u())?;
        self.p = p;
        self.touch();
        Ok(())
    }

    /// Changes the `v` degree along with its knot vector
    pub fn set_degree_v(&mut self, q: usize, knots: &[f64]) -> Result<()> {
        check_size(Direction::V, q, self.size_v())?;
        self.knots_v = knot_vector(Direction::V, q, knots, self.size_v())?;
        self.q = q;
        self.touch();
        Ok(())
    }

    /// Replaces degrees, control grid and both knot vectors at once
    pub fn reconfigure(
        &mut self,
        p: usize,
        q: usize,
        control_points: ControlPointGrid<D>,
        knots_u: &[f64],
        knots_v: &[f64],
    ) -> Result<()> {
        let (knots_u, knots_v) = validate(p, q, &control_points, knots_u, knots_v)?;
        self.p = p;
        self.q = q;
        self.knots_u = knots_u;
        self.knots_v = knots_v;
        self.control_points = control_points;
        self.touch();
        Ok(())
    }

    fn spans(&self, u: f64, v: f64) -> (usize, usize) {
        (
            self.knots_u.find_span(self.p, self.size_u(), u),
            self.knots_v.find_span(self.q, self.size_v(), v),
        )
    }

    /// Algorithm A3.5, without checking `(u, v)`
    fn point_unchecked(&self, u: f64, v: f64) -> glm::TVec<f64, D> {
        let (p, q) = (self.p, self.q);
        let (uspan, vspan) = self.spans(u, v);
        let Nu = basis_funs(p, self.knots_u.as_slice(), uspan, u);
        let Nv = basis_funs(q, self.knots_v.as_slice(), vspan, v);
        let P = &self.control_points;

        let mut S = glm::TVec::<f64, D>::zeros();
        for l in 0..=q {
            let mut temp = glm::TVec::<f64, D>::zeros();
            let j = vspan - q + l;
            for k in 0..=p {
                temp += P[(uspan - p + k, j)] * Nu[k];
            }
            S += temp * Nv[l];
        }
        S
    }

    fn check_uv(u: f64, v: f64) -> Result<()> {
        check_param(Direction::U, u)?;
        check_param(Direction::V, v)
    }

    pub fn point(&self, u: f64, v: f64) -> Result<glm::TVec<f64, D>> {
        Self::check_uv(u, v)?;
        Ok(self.point_unchecked(u, v))
    }

    /// Evaluates the surface at `(u, v)`, also returning the
    /// `(p + 1) × (q + 1)` control points which influence it, `u` index
    /// varying fastest
    pub fn point_with_control_points(
        &self,
        u: f64,
        v: f64,
    ) -> Result<(glm::TVec<f64, D>, Vec<glm::TVec<f64, D>>)> {
        Self::check_uv(u, v)?;
        let (uspan, vspan) = self.spans(u, v);
        let window = ((vspan - self.q)..=vspan)
            .flat_map(|j| ((uspan - self.p)..=uspan).map(move |i| (i, j)))
            .map(|ij| self.control_points[ij])
            .collect();
        Ok((self.point_unchecked(u, v), window))
    }

    pub fn points(&self, uvs: &[(f64, f64)]) -> Result<Vec<glm::TVec<f64, D>>> {
        if uvs.is_empty() {
            return Err(Error::EmptyParameterList);
        }
        uvs.iter().map(|&(u, v)| self.point(u, v)).collect()
    }

    /// Lazily evaluates the surface on a regular grid, `u` in the outer loop
    pub fn samples(&self) -> SurfaceSamples<'_, D> {
        SurfaceSamples {
            surface: self,
            count: sample_count(self.delta),
            next: 0,
        }
    }

    /// Returns the sampled grid, evaluating it first if the surface has
    /// changed since it was last computed
    pub fn ensure_sampled(&mut self) -> &[glm::TVec<f64, D>] {
        if self.samples.get(self.revision).is_none() {
            let params: Vec<(f64, f64)> = self.samples().params().collect();
            trace!("sampling surface at {} parameters", params.len());
            let points = sampling::map_params(params, |(u, v)| self.point_unchecked(u, v));
            self.samples.store(self.revision, points);
        }
        self.samples.points()
    }

    pub fn sampled_points(&self) -> Option<&[glm::TVec<f64, D>]> {
        self.samples.get(self.revision)
    }

    /// Computes the surface point and its partial derivatives at `(u, v)`.
    ///
    /// `SKL[k][l]` is the derivative taken `k` times along `u` and `l` times
    /// along `v`, for `k + l <= d`; the table is `(d + 1) × (d + 1)` and
    /// entries with `k > p`, `l > q` or `k + l > d` are zero.
    ///
    /// Algorithm A3.6
    pub fn derivatives(&self, u: f64, v: f64, d: usize) -> Result<Vec<Vec<glm::TVec<f64, D>>>> {
        Self::check_uv(u, v)?;
        let (p, q) = (self.p, self.q);
        let du = d.min(p);
        let dv = d.min(q);
        let mut SKL = vec![vec![glm::TVec::<f64, D>::zeros(); d + 1]; d + 1];

        let (uspan, vspan) = self.spans(u, v);
        let Nu = basis_funs_derivs(p, self.knots_u.as_slice(), uspan, u, du);
        let Nv = basis_funs_derivs(q, self.knots_v.as_slice(), vspan, v, dv);
        let P = &self.control_points;

        let mut temp = vec![glm::TVec::<f64, D>::zeros(); q + 1];
        for k in 0..=du {
            for s in 0..=q {
                temp[s] = glm::TVec::<f64, D>::zeros();
                for r in 0..=p {
                    temp[s] += P[(uspan - p + r, vspan - q + s)] * Nu[k][r];
                }
            }
            let dd = (d - k).min(dv);
            for l in 0..=dd {
                for s in 0..=q {
                    SKL[k][l] += temp[s] * Nv[l][s];
                }
            }
        }
        Ok(SKL)
    }

    /// Computes the control points of the derivative surfaces over the
    /// control points `[r1..=r2] × [s1..=s2]`.
    ///
    /// `PKL[k][l][i][j]` is control point `(r1 + i, s1 + j)` of the surface
    /// differentiated `k` times along `u` and `l` times along `v`, for
    /// `k <= min(d, p)` and `l <= min(d - k, q)`. The upper bounds are
    /// clamped to the grid.
    ///
    /// As with curves, entries whose knot difference vanishes are zero
    /// vectors. That only happens for windows spanning more than one knot
    /// span in a direction, and those entries carry no geometry.
    ///
    /// Algorithm A3.7
    pub fn derivative_control_points(
        &self,
        d: usize,
        r1: usize,
        r2: usize,
        s1: usize,
        s2: usize,
    ) -> SurfaceDerivCpts<D> {
        let (p, q) = (self.p, self.q);
        let du = d.min(p);
        let dv = d.min(q);
        let r2 = r2.min(self.size_u() - 1);
        let s2 = s2.min(self.size_v() - 1);
        let mut PKL: SurfaceDerivCpts<D> = vec![vec![vec![]; dv + 1]; du + 1];
        if r1 > r2 || s1 > s2 {
            return PKL;
        }
        let (r, s) = (r2 - r1, s2 - s1);

        // Differentiate each column along u
        for k in 0..=du {
            PKL[k][0] = vec![vec![glm::TVec::<f64, D>::zeros(); s + 1]; (r + 1).saturating_sub(k)];
        }
        for j in s1..=s2 {
            let column: Vec<_> = (r1..=r2).map(|i| self.control_points[(i, j)]).collect();
            let temp = curve_deriv_cpts(p, self.knots_u.as_slice(), &column, du, r1);
            for k in 0..=du {
                for (i, pt) in temp[k].iter().enumerate() {
                    PKL[k][0][i][j - s1] = *pt;
                }
            }
        }

        // Then each resulting row along v
        for k in 0..=du {
            let dd = (d - k).min(dv);
            for i in 0..(r + 1).saturating_sub(k) {
                let temp = curve_deriv_cpts(q, self.knots_v.as_slice(), &PKL[k][0][i], dd, s1);
                for (l, row) in temp.into_iter().enumerate().skip(1) {
                    PKL[k][l].push(row);
                }
            }
        }
        PKL
    }

    /// Same as [`derivatives`](Self::derivatives), computed from the
    /// derivative control points.
    ///
    /// Algorithm A3.8
    pub fn derivatives_from_control_points(
        &self,
        u: f64,
        v: f64,
        d: usize,
    ) -> Result<Vec<Vec<glm::TVec<f64, D>>>> {
        Self::check_uv(u, v)?;
        let (p, q) = (self.p, self.q);
        let du = d.min(p);
        let dv = d.min(q);
        let mut SKL = vec![vec![glm::TVec::<f64, D>::zeros(); d + 1]; d + 1];

        let (uspan, vspan) = self.spans(u, v);
        let Nu = all_basis_funs(p, self.knots_u.as_slice(), uspan, u);
        let Nv = all_basis_funs(q, self.knots_v.as_slice(), vspan, v);
        let PKL = self.derivative_control_points(d, uspan - p, uspan, vspan - q, vspan);

        for k in 0..=du {
            let dd = (d - k).min(dv);
            for l in 0..=dd {
                for i in 0..=(q - l) {
                    let mut tmp = glm::TVec::<f64, D>::zeros();
                    for j in 0..=(p - k) {
                        tmp += PKL[k][l][j][i] * Nu[j][p - k];
                    }
                    SKL[k][l] += tmp * Nv[i][q - l];
                }
            }
        }
        Ok(SKL)
    }

    /// Returns the surface point and the first partial derivatives along `u`
    /// and `v`
    #[allow(clippy::type_complexity)]
    pub fn tangent(
        &self,
        u: f64,
        v: f64,
        normalize: bool,
    ) -> Result<(glm::TVec<f64, D>, glm::TVec<f64, D>, glm::TVec<f64, D>)> {
        let SKL = self.derivatives(u, v, 1)?;
        let (su, sv) = (SKL[1][0], SKL[0][1]);
        if normalize {
            Ok((SKL[0][0], vector::normalize(&su)?, vector::normalize(&sv)?))
        } else {
            Ok((SKL[0][0], su, sv))
        }
    }

    /// Returns the surface point and `Su × Sv`. Planar surfaces are embedded
    /// at z = 0.
    pub fn normal(&self, u: f64, v: f64, normalize: bool) -> Result<(glm::TVec<f64, D>, DVec3)> {
        let (point, su, sv) = self.tangent(u, v, normalize)?;
        let n = vector::cross(&su, &sv);
        let n = if normalize { vector::normalize(&n)? } else { n };
        Ok((point, n))
    }

    #[allow(clippy::type_complexity)]
    pub fn tangents(
        &self,
        uvs: &[(f64, f64)],
        normalize: bool,
    ) -> Result<Vec<(glm::TVec<f64, D>, glm::TVec<f64, D>, glm::TVec<f64, D>)>> {
        if uvs.is_empty() {
            return Err(Error::EmptyParameterList);
        }
        uvs.iter()
            .map(|&(u, v)| self.tangent(u, v, normalize))
            .collect()
    }

    pub fn normals(
        &self,
        uvs: &[(f64, f64)],
        normalize: bool,
    ) -> Result<Vec<(glm::TVec<f64, D>, DVec3)>> {
        if uvs.is_empty() {
            return Err(Error::EmptyParameterList);
        }
        uvs.iter()
            .map(|&(u, v)| self.normal(u, v, normalize))
            .collect()
    }

    /// Swaps the `u` and `v` directions, so that the new `point(u, v)` is the
    /// old `point(v, u)`
    pub fn transpose(&mut self) {
        std::mem::swap(&mut self.p, &mut self.q);
        std::mem::swap(&mut self.knots_u, &mut self.knots_v);
        self.control_points = self.control_points.transposed();
        self.touch();
    }

    /// Inserts the knot `t` `r` times along one direction without changing
    /// the surface's shape. Every column (for `u`) or row (for `v`) of the
    /// control grid gains `r` points.
    ///
    /// A `t` within [`KNOT_TOLERANCE`](crate::knot_vector::KNOT_TOLERANCE)
    /// of an existing knot adds copies of that knot. If the knot's
    /// multiplicity would exceed that direction's degree, or `t` lies outside
    /// that direction's domain, nothing changes and [`Insertion::Rejected`]
    /// is returned.
    pub fn insert_knot(&mut self, direction: Direction, t: f64, r: usize) -> Result<Insertion> {
        check_param(direction, t)?;
        if r == 0 {
            return Ok(Insertion::Inserted {
                direction,
                knot: t,
                count: 0,
            });
        }
        let (degree, knots, n) = match direction {
            Direction::U => (self.p, &self.knots_u, self.size_u()),
            Direction::V => (self.q, &self.knots_v, self.size_v()),
        };
        let plan = match KnotInsertion::plan(degree, knots, n, t, r) {
            Ok(plan) => plan,
            Err(available) => {
                warn!(
                    "cannot insert knot {t} {r} times in the {direction} direction, \
                     at most {available} more fit"
                );
                return Ok(Insertion::Rejected {
                    direction,
                    knot: t,
                    requested: r,
                    available,
                });
            }
        };

        let grid = &self.control_points;
        let refined = match direction {
            Direction::U => {
                let columns: Vec<_> = (0..grid.size_v())
                    .map(|j| plan.apply(&grid.column(j)))
                    .collect();
                ControlPointGrid::from_columns(&columns)
            }
            Direction::V => {
                let rows: Vec<_> = grid.rows().map(|row| plan.apply(row)).collect();
                ControlPointGrid::from_rows(rows)?
            }
        };
        let knot = plan.knot;
        match direction {
            Direction::U => self.knots_u = plan.knots,
            Direction::V => self.knots_v = plan.knots,
        }
        self.control_points = refined;
        self.touch();
        debug!(
            "inserted knot {knot} {r} times in the {direction} direction, grid is now {}x{}",
            self.size_u(),
            self.size_v()
        );
        Ok(Insertion::Inserted {
            direction,
            knot,
            count: r,
        })
    }

    pub fn insert_knot_u(&mut self, u: f64, r: usize) -> Result<Insertion> {
        self.insert_knot(Direction::U, u, r)
    }

    pub fn insert_knot_v(&mut self, v: f64, r: usize) -> Result<Insertion> {
        self.insert_knot(Direction::V, v, r)
    }

    /// Inserts `u` and/or `v` `r` times each. Both parameters are checked
    /// before anything changes; the directions are then refined one after
    /// the other, and each may be rejected independently.
    pub fn insert_knots(
        &mut self,
        u: Option<f64>,
        v: Option<f64>,
        r: usize,
    ) -> Result<SurfaceInsertion> {
        if let Some(u) = u {
            check_param(Direction::U, u)?;
        }
        if let Some(v) = v {
            check_param(Direction::V, v)?;
        }
        let u = u.map(|u| self.insert_knot_u(u, r)).transpose()?;
        let v = v.map(|v| self.insert_knot_v(v, r)).transpose()?;
        Ok(SurfaceInsertion { u, v })
    }

    /// Draws the control grid and the sampled surface
    pub fn render<V: Visualizer<D>>(&mut self, vis: &mut V, control_color: &str, surface_color: &str) {
        self.ensure_sampled();
        vis.clear();
        vis.add(self.control_points.as_slice(), "Control Points", control_color);
        vis.add(self.samples.points(), "Surface", surface_color);
        vis.render();
    }
}

/// Iterator over the points of a surface on a regular parameter grid,
/// `v` varying fastest
#[derive(Clone, Debug)]
pub struct SurfaceSamples<'a, const D: usize> {
    surface: &'a NdBsplineSurface<D>,
    count: usize,
    next: usize,
}

impl<'a, const D: usize> SurfaceSamples<'a, D> {
    /// Number of samples along each direction
    pub fn count_per_direction(&self) -> usize {
        self.count
    }

    /// The remaining `(u, v)` parameters, without evaluating anything
    pub fn params(&self) -> impl Iterator<Item = (f64, f64)> {
        let (count, delta) = (self.count, self.surface.delta);
        (self.next..count * count).map(move |i| grid_uv(i, count, delta))
    }
}

/// Parameters of sample `index` on a `count × count` grid, `v` fastest
fn grid_uv(index: usize, count: usize, delta: f64) -> (f64, f64) {
    let i = index / count;
    let j = index % count;
    ((i as f64 * delta).min(1.0), (j as f64 * delta).min(1.0))
}

impl<'a, const D: usize> Iterator for SurfaceSamples<'a, D> {
    type Item = glm::TVec<f64, D>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.next < self.count * self.count {
            let (u, v) = grid_uv(self.next, self.count, self.surface.delta);
            self.next += 1;
            Some(self.surface.point_unchecked(u, v))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.count * self.count - self.next;
        (n, Some(n))
    }
}

impl<'a, const D: usize> ExactSizeIterator for SurfaceSamples<'a, D> {}
