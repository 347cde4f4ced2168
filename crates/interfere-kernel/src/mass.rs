//! Mass properties of closed triangle surfaces.
//!
//! Volume integrals are accumulated over signed tetrahedra spanned by the
//! origin and each triangle (divergence theorem), so the surface must be
//! closed and consistently wound outward.

use interfere_math::{Point3, Vec3};
use nalgebra::Matrix3;

use crate::tessellate::FaceTess;

/// Volume, area, centroid and inertia tensor about the centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    /// Enclosed volume.
    pub volume: f64,
    /// Surface area.
    pub area: f64,
    /// Center of gravity.
    pub center: Point3,
    /// Inertia tensor about `center` (`ixx = ∫(y²+z²)`, `ixy = -∫xy`, ...).
    pub inertia: Matrix3<f64>,
}

impl MassProperties {
    /// Number of doubles in the flattened form.
    pub const LEN: usize = 14;

    /// Integrate over the triangles of every face.
    pub fn from_faces(faces: &[FaceTess]) -> Self {
        let mut volume = 0.0;
        let mut area = 0.0;
        let mut first = Vec3::zeros();
        let mut second = Matrix3::<f64>::zeros();

        for face in faces {
            for tri in &face.triangles {
                let p0 = face.points[tri[0] as usize].coords;
                let p1 = face.points[tri[1] as usize].coords;
                let p2 = face.points[tri[2] as usize].coords;

                area += 0.5 * (p1 - p0).cross(&(p2 - p0)).norm();

                let det = p0.dot(&p1.cross(&p2));
                volume += det / 6.0;
                let sum = p0 + p1 + p2;
                first += sum * (det / 24.0);
                let outer = p0 * p0.transpose() + p1 * p1.transpose() + p2 * p2.transpose();
                second += (outer + sum * sum.transpose()) * (det / 120.0);
            }
        }

        let center = if volume.abs() > f64::EPSILON {
            Point3::from(first / volume)
        } else {
            Point3::origin()
        };
        let c = center.coords;
        let covariance = second - c * c.transpose() * volume;
        let inertia = Matrix3::identity() * covariance.trace() - covariance;

        Self {
            volume,
            area,
            center,
            inertia,
        }
    }

    /// Flatten to `[volume, area, cgx, cgy, cgz, ixx, ixy, ixz, iyx, iyy,
    /// iyz, izx, izy, izz]`.
    pub fn to_array(&self) -> [f64; Self::LEN] {
        let mut out = [0.0; Self::LEN];
        out[0] = self.volume;
        out[1] = self.area;
        out[2] = self.center.x;
        out[3] = self.center.y;
        out[4] = self.center.z;
        for r in 0..3 {
            for c in 0..3 {
                out[5 + r * 3 + c] = self.inertia[(r, c)];
            }
        }
        out
    }

    /// Inverse of [`MassProperties::to_array`].
    pub fn from_array(v: &[f64; Self::LEN]) -> Self {
        Self {
            volume: v[0],
            area: v[1],
            center: Point3::new(v[2], v[3], v[4]),
            inertia: Matrix3::from_row_slice(&v[5..]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{make_box, make_cylinder, make_sphere};
    use crate::tessellate::{tessellate, TessParams};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_box_mass_properties() {
        let body = make_box(Point3::new(1.0, -2.0, 0.5), Vec3::new(2.0, 1.0, 3.0)).unwrap();
        let tess = tessellate(&body, &TessParams::new(0.4, 0.01, 15.0)).unwrap();
        let mp = tess.mass_properties();
        assert_relative_eq!(mp.volume, 6.0, epsilon = 1e-9);
        assert_relative_eq!(mp.area, 2.0 * (2.0 + 6.0 + 3.0), epsilon = 1e-9);
        assert_relative_eq!(mp.center.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(mp.center.y, -2.0, epsilon = 1e-9);
        assert_relative_eq!(mp.center.z, 0.5, epsilon = 1e-9);
        // solid box: ixx = m (b² + c²) / 12
        assert_relative_eq!(mp.inertia[(0, 0)], 6.0 * (1.0 + 9.0) / 12.0, epsilon = 1e-9);
        assert_relative_eq!(mp.inertia[(1, 1)], 6.0 * (4.0 + 9.0) / 12.0, epsilon = 1e-9);
        assert_relative_eq!(mp.inertia[(2, 2)], 6.0 * (4.0 + 1.0) / 12.0, epsilon = 1e-9);
        assert_relative_eq!(mp.inertia[(0, 1)], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sphere_and_cylinder_converge() {
        let params = TessParams::new(0.05, 0.001, 5.0);
        let sphere = tessellate(&make_sphere(Point3::origin(), 1.0).unwrap(), &params)
            .unwrap()
            .mass_properties();
        let v = 4.0 / 3.0 * PI;
        assert_relative_eq!(sphere.volume, v, max_relative = 0.01);
        assert_relative_eq!(sphere.area, 4.0 * PI, max_relative = 0.01);
        assert_relative_eq!(sphere.inertia[(2, 2)], 0.4 * v, max_relative = 0.02);

        let cyl = tessellate(
            &make_cylinder(Point3::origin(), Vec3::z(), 1.0, 2.0).unwrap(),
            &params,
        )
        .unwrap()
        .mass_properties();
        assert_relative_eq!(cyl.volume, 2.0 * PI, max_relative = 0.01);
        assert_relative_eq!(cyl.center.z, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_flatten_layout() {
        let mp = MassProperties {
            volume: 1.0,
            area: 2.0,
            center: Point3::new(3.0, 4.0, 5.0),
            inertia: Matrix3::new(6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0),
        };
        let flat = mp.to_array();
        let expected: Vec<f64> = (1..=14).map(f64::from).collect();
        assert_eq!(flat.to_vec(), expected);
        assert_eq!(MassProperties::from_array(&flat), mp);
    }
}
