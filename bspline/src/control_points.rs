use nalgebra_glm as glm;

use crate::error::{Error, Result};

/// Rejects point types other than 2D and 3D
pub(crate) fn check_dimension<const D: usize>() -> Result<()> {
    if D == 2 || D == 3 {
        Ok(())
    } else {
        Err(Error::UnsupportedDimension(D))
    }
}

/// A `size_u × size_v` grid of control points.
///
/// Points are stored flattened with the `v` index varying fastest, so row
/// `i` (fixed `u` index, every `v`) is a contiguous slice. The `[u][v]` view
/// is derived from the same storage on request and so can't fall out of sync
/// with it. Curves use a single column (`size_v == 1`).
#[derive(Clone, Debug, PartialEq)]
pub struct ControlPointGrid<const D: usize> {
    points: Vec<glm::TVec<f64, D>>,
    size_u: usize,
    size_v: usize,
}

impl<const D: usize> ControlPointGrid<D> {
    pub fn new(points: Vec<glm::TVec<f64, D>>, size_u: usize, size_v: usize) -> Result<Self> {
        check_dimension::<D>()?;
        let expected = size_u * size_v;
        if points.len() != expected {
            return Err(Error::GridSize {
                size_u,
                size_v,
                expected,
                found: points.len(),
            });
        }
        Ok(Self {
            points,
            size_u,
            size_v,
        })
    }

    /// Builds the single-column grid used by curves
    pub fn from_polygon(points: Vec<glm::TVec<f64, D>>) -> Result<Self> {
        let n = points.len();
        Self::new(points, n, 1)
    }

    /// Builds a grid from raw coordinate lists (flattened, `v` fastest),
    /// checking that every point has exactly `D` coordinates.
    pub fn from_coordinates<C: AsRef<[f64]>>(
        coords: &[C],
        size_u: usize,
        size_v: usize,
    ) -> Result<Self> {
        check_dimension::<D>()?;
        let points = coords
            .iter()
            .enumerate()
            .map(|(index, c)| {
                let c = c.as_ref();
                if c.len() == D {
                    Ok(glm::TVec::<f64, D>::from_column_slice(c))
                } else {
                    Err(Error::PointDimension {
                        index,
                        found: c.len(),
                        expected: D,
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(points, size_u, size_v)
    }

    /// Builds a grid from points in `[u][v]` order
    pub fn from_rows(rows: Vec<Vec<glm::TVec<f64, D>>>) -> Result<Self> {
        let size_u = rows.len();
        let size_v = rows.first().map(|r| r.len()).unwrap_or(0);
        let found = rows.iter().map(|r| r.len()).sum();
        if rows.iter().any(|r| r.len() != size_v) {
            return Err(Error::GridSize {
                size_u,
                size_v,
                expected: size_u * size_v,
                found,
            });
        }
        Self::new(rows.into_iter().flatten().collect(), size_u, size_v)
    }

    /// Reassembles a grid from its columns (each column runs along `u`)
    pub(crate) fn from_columns(columns: &[Vec<glm::TVec<f64, D>>]) -> Self {
        let size_v = columns.len();
        let size_u = columns.first().map(|c| c.len()).unwrap_or(0);
        let mut points = Vec::with_capacity(size_u * size_v);
        for i in 0..size_u {
            points.extend(columns.iter().map(|c| c[i]));
        }
        Self {
            points,
            size_u,
            size_v,
        }
    }

    pub fn dimension(&self) -> usize {
        D
    }

    pub fn size_u(&self) -> usize {
        self.size_u
    }

    pub fn size_v(&self) -> usize {
        self.size_v
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Flattened view, `v` index varying fastest
    pub fn as_slice(&self) -> &[glm::TVec<f64, D>] {
        &self.points
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&glm::TVec<f64, D>> {
        if i < self.size_u && j < self.size_v {
            self.points.get(i * self.size_v + j)
        } else {
            None
        }
    }

    /// Points with `u` index `i`, ordered by `v` index
    pub fn row(&self, i: usize) -> &[glm::TVec<f64, D>] {
        &self.points[i * self.size_v..(i + 1) * self.size_v]
    }

    /// Points with `v` index `j`, ordered by `u` index
    pub fn column(&self, j: usize) -> Vec<glm::TVec<f64, D>> {
        (0..self.size_u).map(|i| self[(i, j)]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[glm::TVec<f64, D>]> {
        self.points.chunks(self.size_v.max(1))
    }

    /// Copies the points into `[u][v]` form
    pub fn to_2d(&self) -> Vec<Vec<glm::TVec<f64, D>>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// Swaps the roles of the `u` and `v` indices
    pub fn transposed(&self) -> Self {
        let columns: Vec<_> = (0..self.size_v).map(|j| self.column(j)).collect();
        let mut points = Vec::with_capacity(self.points.len());
        for c in columns {
            points.extend(c);
        }
        Self {
            points,
            size_u: self.size_v,
            size_v: self.size_u,
        }
    }
}

impl<const D: usize> std::ops::Index<(usize, usize)> for ControlPointGrid<D> {
    type Output = glm::TVec<f64, D>;
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.points[i * self.size_v + j]
    }
}
