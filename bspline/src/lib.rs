#![allow(clippy::needless_range_loop)]
// This crate is translations of algorithms from the 70s, which use awkward
// single-character names everywhere, so we're matching their convention.
#![allow(non_snake_case)]

pub mod basis;
mod bspline_curve;
mod bspline_surface;
mod control_points;
mod error;
mod insert;
pub mod knot_vector;
mod nd_curve;
mod nd_surface;
pub mod sampling;
pub mod vector;
mod visualize;

use smallvec::SmallVec;
pub type VecF = SmallVec<[f64; 8]>;

pub use crate::bspline_curve::{BsplineCurve, BsplineCurve2D};
pub use crate::bspline_surface::{BsplineSurface, BsplineSurface2D};
pub use crate::control_points::ControlPointGrid;
pub use crate::error::{Direction, Error, KnotVectorError, Result};
pub use crate::insert::Insertion;
pub use crate::knot_vector::KnotVector;
pub use crate::nd_curve::{CurveSamples, NdBsplineCurve};
pub use crate::nd_surface::{NdBsplineSurface, SurfaceDerivCpts, SurfaceInsertion, SurfaceSamples};
pub use crate::sampling::DEFAULT_DELTA;
pub use crate::visualize::Visualizer;
