use crate::nd_curve::NdBsplineCurve;

pub type BsplineCurve = NdBsplineCurve<3>;
pub type BsplineCurve2D = NdBsplineCurve<2>;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra_glm::{DVec2, DVec3};

    #[test]
    fn planar_frame() {
        // Quadratic arc bulging upwards
        let c = BsplineCurve2D::clamped(
            2,
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 2.0),
                DVec2::new(2.0, 0.0),
            ],
        )
        .unwrap();
        assert_eq!(c.dimension(), 2);
        let (pt, t) = c.tangent(0.5, true).unwrap();
        assert_abs_diff_eq!(pt.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pt.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.y, 0.0, epsilon = 1e-12);

        // Turning clockwise, so the binormal points down the z axis
        let (_, b) = c.binormal(0.5, true).unwrap();
        assert_abs_diff_eq!(b.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn spatial_binormal() {
        // Helix-like cubic
        let c = BsplineCurve::clamped(
            3,
            vec![
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 1.0, 0.3),
                DVec3::new(-1.0, 1.0, 0.6),
                DVec3::new(-1.0, 0.0, 0.9),
            ],
        )
        .unwrap();
        for u in [0.1, 0.5, 0.9] {
            let (_, t) = c.tangent(u, true).unwrap();
            let (_, n) = c.normal(u, true).unwrap();
            let (_, b) = c.binormal(u, true).unwrap();
            assert_abs_diff_eq!(b.norm(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(b.dot(&t), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(b.dot(&n), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn coordinate_lists() {
        let c = BsplineCurve::from_coordinates(
            1,
            &[[0.0, 0.0, 0.0], [2.0, 2.0, 2.0]],
            &[0.0, 0.0, 1.0, 1.0],
        )
        .unwrap();
        assert_eq!(c.point(0.25).unwrap(), DVec3::new(0.5, 0.5, 0.5));
        assert!(BsplineCurve2D::from_coordinates(1, &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]], &[0.0, 0.0, 1.0, 1.0])
            .unwrap_err()
            .is_configuration());
    }
}
