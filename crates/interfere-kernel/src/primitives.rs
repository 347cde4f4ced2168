//! Primitive solid construction: box, sphere and cylinder.
//!
//! Each primitive carries its exact membership solid plus one face per
//! boundary patch, with outward-facing carrier surfaces.

use interfere_math::{Point3, Vec3};

use crate::body::{Body, Face, Shape, Solid};
use crate::surface::Surface;
use crate::{KernelError, Result};

/// Build a box centered at `center` with edge lengths `size`.
///
/// Face order: x-, x+, y-, y+, z-, z+.
pub fn make_box(center: Point3, size: Vec3) -> Result<Body> {
    if size.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
        return Err(KernelError::Degenerate(format!(
            "box size must be positive, got {size:?}"
        )));
    }
    let min = center - size * 0.5;
    let max = center + size * 0.5;
    let (x, y, z) = (Vec3::x(), Vec3::y(), Vec3::z());

    // (origin, u_dir, v_dir, u_len, v_len) with u × v pointing outward
    let defs = [
        (min, z, y, size.z, size.y),
        (Point3::new(max.x, min.y, min.z), y, z, size.y, size.z),
        (min, x, z, size.x, size.z),
        (Point3::new(min.x, max.y, min.z), z, x, size.z, size.x),
        (min, y, x, size.y, size.x),
        (Point3::new(min.x, min.y, max.z), x, y, size.x, size.y),
    ];
    let faces = defs
        .into_iter()
        .map(|(origin, u_dir, v_dir, u_len, v_len)| {
            Face::new(Surface::Rect {
                origin,
                u_dir,
                v_dir,
                u_len,
                v_len,
            })
        })
        .collect();

    Ok(Body::from_solid(Solid::new(Shape::Box { min, max }), faces))
}

/// Build a sphere.
pub fn make_sphere(center: Point3, radius: f64) -> Result<Body> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(KernelError::Degenerate(format!(
            "sphere radius must be positive, got {radius}"
        )));
    }
    let face = Face::new(Surface::Sphere {
        center,
        radius,
        x_dir: Vec3::x(),
        z_dir: Vec3::z(),
    });
    Ok(Body::from_solid(
        Solid::new(Shape::Sphere { center, radius }),
        vec![face],
    ))
}

/// Build a cylinder from the center of its bottom cap along `axis`.
///
/// Face order: side, bottom cap, top cap.
pub fn make_cylinder(base: Point3, axis: Vec3, radius: f64, height: f64) -> Result<Body> {
    if !(radius.is_finite() && radius > 0.0 && height.is_finite() && height > 0.0) {
        return Err(KernelError::Degenerate(format!(
            "cylinder needs positive radius and height, got {radius} x {height}"
        )));
    }
    let axis = axis
        .try_normalize(1e-12)
        .ok_or_else(|| KernelError::Degenerate("cylinder axis has zero length".into()))?;
    // any direction perpendicular to the axis
    let helper = if axis.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    let x_dir = (helper - axis * helper.dot(&axis)).normalize();

    let faces = vec![
        Face::new(Surface::CylinderSide {
            base,
            x_dir,
            axis,
            radius,
            height,
        }),
        Face::new(Surface::Disk {
            center: base,
            x_dir,
            normal: -axis,
            radius,
        }),
        Face::new(Surface::Disk {
            center: base + axis * height,
            x_dir,
            normal: axis,
            radius,
        }),
    ];
    Ok(Body::from_solid(
        Solid::new(Shape::Cylinder {
            base,
            axis,
            radius,
            height,
        }),
        faces,
    ))
}
