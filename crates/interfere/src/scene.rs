//! JSON scene descriptions.
//!
//! ```json
//! {
//!   "bodies": [
//!     { "name": "shell", "shape": { "sphere": { "center": [0, 0, 0], "radius": 5 } } },
//!     { "name": "box", "shape": { "box": { "center": [0, 0, 0], "size": [1, 1, 1] } },
//!       "transform": [1, 0, 0, 2,  0, 1, 0, 0,  0, 0, 1, 0] }
//!   ]
//! }
//! ```

use std::path::Path;

use interfere_kernel::{make_box, make_cylinder, make_sphere, AttrValue, Body};
use interfere_math::{Point3, Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::{InterferenceError, Result};

/// Primitive shape of a scene body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeSpec {
    /// Axis-aligned box.
    Box {
        /// Box center.
        center: [f64; 3],
        /// Edge lengths along x, y, z.
        size: [f64; 3],
    },
    /// Sphere.
    Sphere {
        /// Sphere center.
        center: [f64; 3],
        /// Radius.
        radius: f64,
    },
    /// Capped cylinder.
    Cylinder {
        /// Center of the bottom cap.
        base: [f64; 3],
        /// Direction from the bottom cap to the top cap.
        axis: [f64; 3],
        /// Radius.
        radius: f64,
        /// Distance between the caps.
        height: f64,
    },
}

/// One body of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    /// Body name; unnamed bodies take no part in a run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Shape.
    pub shape: ShapeSpec,
    /// Rigid placement as a row-major 3×4 matrix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<[f64; 12]>,
}

impl BodySpec {
    fn build(&self, attr_name: &str) -> interfere_kernel::Result<Body> {
        let mut body = match &self.shape {
            ShapeSpec::Box { center, size } => make_box(point(center), vector(size))?,
            ShapeSpec::Sphere { center, radius } => make_sphere(point(center), *radius)?,
            ShapeSpec::Cylinder {
                base,
                axis,
                radius,
                height,
            } => make_cylinder(point(base), vector(axis), *radius, *height)?,
        };
        if let Some(rows) = &self.transform {
            body = body.duplicate(&Transform::from_rows_3x4(rows))?;
        }
        if let Some(name) = &self.name {
            body.set_attr(attr_name, AttrValue::Str(name.clone()));
        }
        Ok(body)
    }
}

/// A list of bodies to check against each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Bodies in input order.
    pub bodies: Vec<BodySpec>,
}

impl Scene {
    /// Parse a JSON scene.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| InterferenceError::Scene(e.to_string()))
    }

    /// Read and parse a JSON scene file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| InterferenceError::Scene(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Create the kernel bodies, storing each name under `attr_name`.
    pub fn build(&self, attr_name: &str) -> Result<Vec<Body>> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                spec.build(attr_name).map_err(|e| {
                    let label = spec.name.as_deref().unwrap_or("<unnamed>");
                    InterferenceError::Scene(format!("body {} ({label}): {e}", i + 1))
                })
            })
            .collect()
    }
}

fn point(p: &[f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

fn vector(v: &[f64; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SCENE: &str = r#"{
        "bodies": [
            { "name": "shell", "shape": { "sphere": { "center": [0, 0, 0], "radius": 5 } } },
            { "name": "box", "shape": { "box": { "center": [0, 0, 0], "size": [1, 2, 3] } },
              "transform": [1, 0, 0, 2, 0, 1, 0, 0, 0, 0, 1, 0] },
            { "shape": { "cylinder": { "base": [0, 0, 0], "axis": [0, 0, 1], "radius": 0.5, "height": 2 } } }
        ]
    }"#;

    #[test]
    fn test_parse() {
        let scene = Scene::from_json(SCENE).unwrap();
        assert_eq!(scene.bodies.len(), 3);
        assert_eq!(scene.bodies[0].name.as_deref(), Some("shell"));
        assert!(matches!(scene.bodies[0].shape, ShapeSpec::Sphere { radius, .. } if radius == 5.0));
        assert!(scene.bodies[1].transform.is_some());
        assert!(scene.bodies[2].name.is_none());
    }

    #[test]
    fn test_build_names_and_placement() {
        let bodies = Scene::from_json(SCENE).unwrap().build("_name").unwrap();
        assert_eq!(bodies.len(), 3);
        assert_eq!(bodies[0].attr("_name").and_then(AttrValue::as_str), Some("shell"));
        assert_eq!(bodies[1].attr("_name").and_then(AttrValue::as_str), Some("box"));
        assert!(bodies[2].attr("_name").is_none());

        let bbox = bodies[1].bounding_box();
        assert_relative_eq!(bbox.min.x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(bbox.max.x, 2.5, epsilon = 1e-12);
        assert_relative_eq!(bbox.max.z, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_custom_attribute() {
        let bodies = Scene::from_json(SCENE).unwrap().build("label").unwrap();
        assert!(bodies[0].attr("_name").is_none());
        assert!(bodies[0].attr("label").is_some());
    }

    #[test]
    fn test_invalid_scenes() {
        assert!(matches!(
            Scene::from_json("{ \"bodies\": [ { \"shape\": { \"cone\": {} } } ] }"),
            Err(InterferenceError::Scene(_))
        ));
        let degenerate = Scene::from_json(
            r#"{ "bodies": [ { "name": "flat", "shape": { "box": { "center": [0, 0, 0], "size": [1, 0, 1] } } } ] }"#,
        )
        .unwrap();
        let err = degenerate.build("_name").unwrap_err();
        assert!(err.to_string().contains("flat"));
    }
}
