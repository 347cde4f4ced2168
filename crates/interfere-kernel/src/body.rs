//! Bodies, faces and exact point-membership solids.

use interfere_math::{BoundingBox, Point3, Transform, Vec3};

use crate::attrs::{AttrValue, Attributes};
use crate::surface::Surface;
use crate::{KernelError, Result};

/// Analytic solid shape in its own frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned box.
    Box {
        /// Minimum corner.
        min: Point3,
        /// Maximum corner.
        max: Point3,
    },
    /// Ball.
    Sphere {
        /// Center.
        center: Point3,
        /// Radius.
        radius: f64,
    },
    /// Finite cylinder.
    Cylinder {
        /// Center of the bottom cap.
        base: Point3,
        /// Unit axis.
        axis: Vec3,
        /// Radius.
        radius: f64,
        /// Height along `axis`.
        height: f64,
    },
}

impl Shape {
    /// Signed distance: negative inside, positive outside.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        match self {
            Shape::Box { min, max } => {
                let c = nalgebra::center(min, max);
                let h = (max - min) * 0.5;
                let q = (p - c).abs() - h;
                let outside = q.map(|v| v.max(0.0)).norm();
                outside + q.max().min(0.0)
            }
            Shape::Sphere { center, radius } => (p - center).norm() - radius,
            Shape::Cylinder {
                base,
                axis,
                radius,
                height,
            } => {
                let v = p - base;
                let t = v.dot(axis);
                let radial = (v - axis * t).norm();
                let dr = radial - radius;
                let dh = (t - height * 0.5).abs() - height * 0.5;
                let outside = (dr.max(0.0).powi(2) + dh.max(0.0).powi(2)).sqrt();
                outside + dr.max(dh).min(0.0)
            }
        }
    }
}

/// A shape placed in the world by a rigid transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    shape: Shape,
    placement: Transform,
    inverse: Transform,
}

impl Solid {
    /// Shape at the identity placement.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            placement: Transform::identity(),
            inverse: Transform::identity(),
        }
    }

    /// The underlying shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Current placement.
    pub fn placement(&self) -> &Transform {
        &self.placement
    }

    /// Signed distance of a world point.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.shape.signed_distance(&self.inverse.apply_point(p))
    }

    /// Same solid moved by `t` (applied after the current placement).
    pub fn transformed(&self, t: &Transform) -> Result<Solid> {
        let placement = t.then(&self.placement);
        let inverse = placement
            .inverse()
            .ok_or_else(|| KernelError::Degenerate("singular placement".into()))?;
        Ok(Solid {
            shape: self.shape.clone(),
            placement,
            inverse,
        })
    }
}

/// Which side of a trimming solid a face keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Keep the part inside (or on) the solid.
    Inside,
    /// Keep the part outside (or on) the solid.
    Outside,
}

/// Restriction of a face to one side of another solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Trim {
    /// Trimming solid.
    pub solid: Solid,
    /// Side kept.
    pub keep: Side,
}

impl Trim {
    /// Whether `p` lies on the kept side.
    pub fn accepts(&self, p: &Point3) -> bool {
        let d = self.solid.signed_distance(p);
        match self.keep {
            Side::Inside => d <= 0.0,
            Side::Outside => d >= 0.0,
        }
    }
}

/// A face: carrier surface, optional trims and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Carrier surface in world coordinates.
    pub surface: Surface,
    /// Trims applied at tessellation time.
    pub trims: Vec<Trim>,
    /// Face attributes.
    pub attributes: Attributes,
}

impl Face {
    /// Untrimmed face on `surface`.
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            trims: Vec::new(),
            attributes: Attributes::new(),
        }
    }
}

/// A body: a set of faces, optionally bounding an exact solid.
///
/// Primitive bodies carry their solid; boolean results are face sets only.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    solid: Option<Solid>,
    faces: Vec<Face>,
    attributes: Attributes,
}

impl Body {
    /// Body bounding `solid` with the given faces.
    pub fn from_solid(solid: Solid, faces: Vec<Face>) -> Self {
        Self {
            solid: Some(solid),
            faces,
            attributes: Attributes::new(),
        }
    }

    /// Face set without a membership solid.
    pub fn from_faces(faces: Vec<Face>) -> Self {
        Self {
            solid: None,
            faces,
            attributes: Attributes::new(),
        }
    }

    /// Membership solid, if any.
    pub fn solid(&self) -> Option<&Solid> {
        self.solid.as_ref()
    }

    /// Faces in ID order (face ID = position + 1).
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Number of faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Face `face_id` (1-based).
    pub fn face(&self, face_id: usize) -> Result<&Face> {
        self.check_face(face_id)?;
        Ok(&self.faces[face_id - 1])
    }

    /// Set an attribute on face `face_id` (1-based).
    pub fn set_face_attr(&mut self, face_id: usize, key: &str, value: AttrValue) -> Result<()> {
        self.check_face(face_id)?;
        self.faces[face_id - 1].attributes.set(key, value);
        Ok(())
    }

    /// Read an attribute of face `face_id` (1-based).
    pub fn face_attr(&self, face_id: usize, key: &str) -> Result<Option<&AttrValue>> {
        Ok(self.face(face_id)?.attributes.get(key))
    }

    /// Set a body attribute.
    pub fn set_attr(&mut self, key: &str, value: AttrValue) {
        self.attributes.set(key, value);
    }

    /// Read a body attribute.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Body attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Bounds of the untrimmed face surfaces.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for face in &self.faces {
            bbox.include_box(&face.surface.bounding_box());
        }
        bbox
    }

    /// Copy of this body moved by `t`, attributes included.
    pub fn duplicate(&self, t: &Transform) -> Result<Body> {
        let solid = self.solid.as_ref().map(|s| s.transformed(t)).transpose()?;
        let faces = self
            .faces
            .iter()
            .map(|face| {
                let trims = face
                    .trims
                    .iter()
                    .map(|trim| {
                        Ok(Trim {
                            solid: trim.solid.transformed(t)?,
                            keep: trim.keep,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Face {
                    surface: face.surface.transformed(t),
                    trims,
                    attributes: face.attributes.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Body {
            solid,
            faces,
            attributes: self.attributes.clone(),
        })
    }

    fn check_face(&self, face_id: usize) -> Result<()> {
        if face_id == 0 || face_id > self.faces.len() {
            return Err(KernelError::FaceIndex {
                face: face_id,
                count: self.faces.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{make_box, make_cylinder, make_sphere};
    use approx::assert_relative_eq;

    #[test]
    fn test_box_signed_distance() {
        let shape = Shape::Box {
            min: Point3::new(-1.0, -1.0, -1.0),
            max: Point3::new(1.0, 1.0, 1.0),
        };
        assert_relative_eq!(shape.signed_distance(&Point3::origin()), -1.0);
        assert_relative_eq!(shape.signed_distance(&Point3::new(3.0, 0.0, 0.0)), 2.0);
        assert_relative_eq!(shape.signed_distance(&Point3::new(2.0, 2.0, 1.0)), 2f64.sqrt());
        assert_relative_eq!(shape.signed_distance(&Point3::new(1.0, 0.5, 0.0)), 0.0);
    }

    #[test]
    fn test_cylinder_signed_distance() {
        let shape = Shape::Cylinder {
            base: Point3::origin(),
            axis: Vec3::z(),
            radius: 1.0,
            height: 4.0,
        };
        assert_relative_eq!(shape.signed_distance(&Point3::new(0.0, 0.0, 2.0)), -1.0);
        assert_relative_eq!(shape.signed_distance(&Point3::new(0.0, 0.0, 0.5)), -0.5);
        assert_relative_eq!(shape.signed_distance(&Point3::new(3.0, 0.0, 2.0)), 2.0);
        assert_relative_eq!(shape.signed_distance(&Point3::new(0.0, 0.0, 6.0)), 2.0);
    }

    #[test]
    fn test_duplicate_moves_everything() {
        let mut body = make_sphere(Point3::origin(), 1.0).unwrap();
        body.set_attr("_name", AttrValue::Str("ball".into()));
        body.set_face_attr(1, ".source", AttrValue::Int(vec![1])).unwrap();

        let moved = body.duplicate(&Transform::translation(10.0, 0.0, 0.0)).unwrap();
        assert_eq!(
            moved.bounding_box().to_array(),
            [9.0, -1.0, -1.0, 11.0, 1.0, 1.0]
        );
        let solid = moved.solid().unwrap();
        assert_relative_eq!(solid.signed_distance(&Point3::new(10.0, 0.0, 0.0)), -1.0);
        assert_eq!(moved.attr("_name"), body.attr("_name"));
        assert_eq!(
            moved.face_attr(1, ".source").unwrap(),
            Some(&AttrValue::Int(vec![1]))
        );
        // the original is untouched
        assert_eq!(body.bounding_box().to_array(), [-1.0, -1.0, -1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_face_ids_are_checked() {
        let mut body = make_box(Point3::origin(), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(body.num_faces(), 6);
        assert_eq!(
            body.set_face_attr(0, ".target", AttrValue::Int(vec![0])),
            Err(KernelError::FaceIndex { face: 0, count: 6 })
        );
        assert!(body.face_attr(7, ".target").is_err());
        assert_eq!(body.face_attr(6, ".target").unwrap(), None);
    }

    #[test]
    fn test_trim_sides() {
        let cyl = make_cylinder(Point3::origin(), Vec3::z(), 1.0, 1.0).unwrap();
        let solid = cyl.solid().unwrap().clone();
        let inside = Trim {
            solid: solid.clone(),
            keep: Side::Inside,
        };
        let outside = Trim {
            solid,
            keep: Side::Outside,
        };
        let p = Point3::new(0.0, 0.0, 0.5);
        let q = Point3::new(5.0, 0.0, 0.5);
        assert!(inside.accepts(&p) && !inside.accepts(&q));
        assert!(outside.accepts(&q) && !outside.accepts(&p));
    }
}
