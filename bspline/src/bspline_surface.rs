use crate::nd_surface::NdBsplineSurface;

pub type BsplineSurface = NdBsplineSurface<3>;
pub type BsplineSurface2D = NdBsplineSurface<2>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControlPointGrid;
    use approx::assert_abs_diff_eq;
    use nalgebra_glm::{DVec2, DVec3};

    #[test]
    fn bilinear_patch() {
        let s = BsplineSurface::from_coordinates(
            1,
            1,
            &[
                [0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 1.0],
            ],
            2,
            2,
            &[0.0, 0.0, 1.0, 1.0],
            &[0.0, 0.0, 1.0, 1.0],
        )
        .unwrap();
        assert_eq!(s.point(0.5, 0.5).unwrap(), DVec3::new(0.5, 0.5, 0.25));
        // z = u·v, so Su = (1, 0, v) and Sv = (0, 1, u)
        let (_, su, sv) = s.tangent(0.25, 0.75, false).unwrap();
        assert_eq!(su, DVec3::new(1.0, 0.0, 0.75));
        assert_eq!(sv, DVec3::new(0.0, 1.0, 0.25));
    }

    #[test]
    fn planar_surface_normal() {
        let grid = ControlPointGrid::from_rows(vec![
            vec![DVec2::new(0.0, 0.0), DVec2::new(0.0, 2.0)],
            vec![DVec2::new(3.0, 0.0), DVec2::new(3.0, 2.0)],
        ])
        .unwrap();
        let s = BsplineSurface2D::clamped(1, 1, grid).unwrap();
        let (pt, n) = s.normal(0.5, 0.5, false).unwrap();
        assert_eq!(pt, DVec2::new(1.5, 1.0));
        assert_abs_diff_eq!(n.z, 6.0, epsilon = 1e-12);
        let (_, n) = s.normal(0.5, 0.5, true).unwrap();
        assert_eq!(n, DVec3::new(0.0, 0.0, 1.0));
    }
}
