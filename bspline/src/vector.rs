use nalgebra_glm as glm;
use nalgebra_glm::DVec3;

use crate::error::{Error, Result};

/// Vectors shorter than this can't be normalized
pub const ZERO_LENGTH: f64 = 1e-12;

/// Scales `v` to unit length, failing on (near) zero-length vectors
pub fn normalize<const D: usize>(v: &glm::TVec<f64, D>) -> Result<glm::TVec<f64, D>> {
    let len = glm::length(v);
    if len.is_finite() && len > ZERO_LENGTH {
        Ok(v / len)
    } else {
        Err(Error::DegenerateVector)
    }
}

/// Embeds a 2D or 3D vector into 3D space, padding with zeros
pub fn to_3d<const D: usize>(v: &glm::TVec<f64, D>) -> DVec3 {
    let mut out = DVec3::zeros();
    for i in 0..D.min(3) {
        out[i] = v[i];
    }
    out
}

/// Cross product of two vectors, computed in 3D
pub fn cross<const D: usize>(a: &glm::TVec<f64, D>, b: &glm::TVec<f64, D>) -> DVec3 {
    glm::cross(&to_3d(a), &to_3d(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glm::DVec2;

    #[test]
    fn normalizes() {
        let v = normalize(&DVec2::new(3.0, 4.0)).unwrap();
        assert_eq!(v, DVec2::new(0.6, 0.8));
        assert_eq!(normalize(&DVec3::zeros()), Err(Error::DegenerateVector));
    }

    #[test]
    fn planar_cross() {
        let c = cross(&DVec2::new(1.0, 0.0), &DVec2::new(0.0, 2.0));
        assert_eq!(c, DVec3::new(0.0, 0.0, 2.0));
        assert_eq!(to_3d(&DVec2::new(1.0, 2.0)), DVec3::new(1.0, 2.0, 0.0));
    }
}
