#![warn(missing_docs)]

//! Math types for interference checking.
//!
//! Thin wrappers around nalgebra: points, vectors, rigid transforms
//! (with the 3×4 row-major form used at the kernel boundary), axis-aligned
//! bounding boxes and tolerance constants.

use nalgebra::{Matrix4, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A 4x4 affine transformation matrix.
///
/// Only the upper 3×4 block is ever populated; the last row stays
/// `[0, 0, 0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Build from a row-major 3×4 affine matrix
    /// `[r00, r01, r02, tx, r10, r11, r12, ty, r20, r21, r22, tz]`.
    pub fn from_rows_3x4(rows: &[f64; 12]) -> Self {
        let mut m = Matrix4::identity();
        for r in 0..3 {
            for c in 0..4 {
                m[(r, c)] = rows[r * 4 + c];
            }
        }
        Self { matrix: m }
    }

    /// Export as a row-major 3×4 affine matrix.
    pub fn to_rows_3x4(&self) -> [f64; 12] {
        let mut rows = [0.0; 12];
        for r in 0..3 {
            for c in 0..4 {
                rows[r * 4 + c] = self.matrix[(r, c)];
            }
        }
        rows
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// The result applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned bounding box.
///
/// The flat form `[xmin, ymin, zmin, xmax, ymax, zmax]` is what the kernel
/// boundary and the interference report exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl BoundingBox {
    /// Create a box from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) box suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box holding every point; empty for an empty slice.
    pub fn from_points(points: &[Point3]) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.include_point(p);
        }
        bbox
    }

    /// Build from `[xmin, ymin, zmin, xmax, ymax, zmax]`.
    pub fn from_array(b: [f64; 6]) -> Self {
        Self {
            min: Point3::new(b[0], b[1], b[2]),
            max: Point3::new(b[3], b[4], b[5]),
        }
    }

    /// Flatten to `[xmin, ymin, zmin, xmax, ymax, zmax]`.
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
    }

    /// True until a point has been included.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this box to include another box.
    pub fn include_box(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Test if two boxes overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// True when `other` lies entirely inside `self`.
    ///
    /// Six independent inequalities; coincident bounds count as contained.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.min.z >= self.min.z
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
            && other.max.z <= self.max.z
    }

    /// Edge lengths along x, y and z.
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest edge length.
    pub fn max_extent(&self) -> f64 {
        let e = self.extents();
        e.x.max(e.y).max(e.z)
    }

    /// Box volume (zero for degenerate boxes).
    pub fn volume(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let e = self.extents();
        e.x * e.y * e.z
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Geometric tolerance used by kernel point classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Points closer than this to a boundary count as on it.
    pub linear: f64,
}

impl Tolerance {
    /// 1e-7 model units.
    pub const DEFAULT: Self = Self { linear: 1e-7 };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rows_3x4_roundtrip() {
        let rows = [0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 1.0, 3.0];
        let t = Transform::from_rows_3x4(&rows);
        assert_eq!(t.to_rows_3x4(), rows);
        let p = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 3.0);
        assert_relative_eq!(p.z, 3.0);
    }

    #[test]
    fn test_inverse_and_vec() {
        let swap = Transform::from_rows_3x4(&[0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
        let t = Transform::translation(1.0, 2.0, 3.0).then(&swap);
        let inv = t.inverse().unwrap();
        let p = Point3::new(5.0, 6.0, 7.0);
        let back = inv.apply_point(&t.apply_point(&p));
        assert!((back - p).norm() < 1e-12);
        let v = Transform::translation(4.0, 4.0, 4.0).apply_vec(&Vec3::x());
        assert_eq!(v, Vec3::x());
        assert_eq!(Transform::default(), Transform::identity());
    }

    #[test]
    fn test_bbox_containment_counts_equality() {
        let outer = BoundingBox::from_array([0.0, 0.0, 0.0, 2.0, 2.0, 2.0]);
        let inner = BoundingBox::from_array([0.0, 0.5, 0.5, 2.0, 1.0, 1.0]);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&outer));
        let shifted = BoundingBox::from_array([1.0, 0.0, 0.0, 3.0, 2.0, 2.0]);
        assert!(!outer.contains(&shifted));
        assert!(outer.overlaps(&shifted));
    }

    #[test]
    fn test_bbox_from_points() {
        let pts = [
            Point3::new(1.0, -2.0, 0.5),
            Point3::new(-1.0, 4.0, 0.0),
            Point3::new(0.0, 0.0, 3.0),
        ];
        let b = BoundingBox::from_points(&pts);
        assert_eq!(b.to_array(), [-1.0, -2.0, 0.0, 1.0, 4.0, 3.0]);
        assert_relative_eq!(b.max_extent(), 6.0);
        assert_relative_eq!(b.volume(), 2.0 * 6.0 * 3.0);
        assert!(BoundingBox::from_points(&[]).is_empty());
        assert_eq!(BoundingBox::empty().volume(), 0.0);
    }
}
