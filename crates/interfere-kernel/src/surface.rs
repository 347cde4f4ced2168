//! Face carrier surfaces and their structured sampling.
//!
//! Every surface is stored in world coordinates. Sampling produces a grid
//! whose triangles wind counter-clockwise seen from outside the solid, so
//! the signed-volume sum over a closed body is positive.

use std::f64::consts::PI;

use interfere_math::{BoundingBox, Point3, Transform, Vec3};

use crate::tessellate::{FaceTess, TessParams};

/// Upper bound on grid divisions along one parameter direction.
pub const MAX_SEGMENTS: usize = 256;

/// Geometric carrier of a face.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// Rectangle `origin + s·u_len·u_dir + t·v_len·v_dir`, `s, t ∈ [0, 1]`.
    /// Outward normal is `u_dir × v_dir`.
    Rect {
        /// Corner at `(s, t) = (0, 0)`.
        origin: Point3,
        /// Unit direction of the first edge.
        u_dir: Vec3,
        /// Unit direction of the second edge.
        v_dir: Vec3,
        /// First edge length.
        u_len: f64,
        /// Second edge length.
        v_len: f64,
    },
    /// Full sphere, parameterised by polar angle from `z_dir` and azimuth
    /// from `x_dir`.
    Sphere {
        /// Center.
        center: Point3,
        /// Radius.
        radius: f64,
        /// Azimuth reference direction.
        x_dir: Vec3,
        /// Pole direction.
        z_dir: Vec3,
    },
    /// Lateral side of a finite cylinder.
    CylinderSide {
        /// Center of the bottom circle.
        base: Point3,
        /// Azimuth reference direction, perpendicular to `axis`.
        x_dir: Vec3,
        /// Unit axis.
        axis: Vec3,
        /// Radius.
        radius: f64,
        /// Height along `axis`.
        height: f64,
    },
    /// Flat circular disk with outward normal `normal`.
    Disk {
        /// Center.
        center: Point3,
        /// Azimuth reference direction, perpendicular to `normal`.
        x_dir: Vec3,
        /// Unit outward normal.
        normal: Vec3,
        /// Radius.
        radius: f64,
    },
}

impl Surface {
    /// Apply a rigid transform.
    pub fn transformed(&self, t: &Transform) -> Surface {
        match self {
            Surface::Rect {
                origin,
                u_dir,
                v_dir,
                u_len,
                v_len,
            } => Surface::Rect {
                origin: t.apply_point(origin),
                u_dir: t.apply_vec(u_dir),
                v_dir: t.apply_vec(v_dir),
                u_len: *u_len,
                v_len: *v_len,
            },
            Surface::Sphere {
                center,
                radius,
                x_dir,
                z_dir,
            } => Surface::Sphere {
                center: t.apply_point(center),
                radius: *radius,
                x_dir: t.apply_vec(x_dir),
                z_dir: t.apply_vec(z_dir),
            },
            Surface::CylinderSide {
                base,
                x_dir,
                axis,
                radius,
                height,
            } => Surface::CylinderSide {
                base: t.apply_point(base),
                x_dir: t.apply_vec(x_dir),
                axis: t.apply_vec(axis),
                radius: *radius,
                height: *height,
            },
            Surface::Disk {
                center,
                x_dir,
                normal,
                radius,
            } => Surface::Disk {
                center: t.apply_point(center),
                x_dir: t.apply_vec(x_dir),
                normal: t.apply_vec(normal),
                radius: *radius,
            },
        }
    }

    /// Exact axis-aligned bounds of the untrimmed surface.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        match self {
            Surface::Rect {
                origin,
                u_dir,
                v_dir,
                u_len,
                v_len,
            } => {
                let du = u_dir * *u_len;
                let dv = v_dir * *v_len;
                for corner in [*origin, origin + du, origin + dv, origin + du + dv] {
                    bbox.include_point(&corner);
                }
            }
            Surface::Sphere { center, radius, .. } => {
                let r = Vec3::repeat(*radius);
                bbox.include_point(&(center - r));
                bbox.include_point(&(center + r));
            }
            Surface::CylinderSide {
                base,
                axis,
                radius,
                height,
                ..
            } => {
                bbox.include_box(&circle_bounds(base, axis, *radius));
                bbox.include_box(&circle_bounds(&(base + axis * *height), axis, *radius));
            }
            Surface::Disk {
                center,
                normal,
                radius,
                ..
            } => bbox.include_box(&circle_bounds(center, normal, *radius)),
        }
        bbox
    }

    /// Sample the surface on a structured grid honouring `params`.
    pub fn sample(&self, params: &TessParams) -> FaceTess {
        match self {
            Surface::Rect {
                origin,
                u_dir,
                v_dir,
                u_len,
                v_len,
            } => {
                let nu = length_segments(*u_len, params);
                let nv = length_segments(*v_len, params);
                let mut tess = FaceTess::default();
                for j in 0..=nv {
                    let t = j as f64 / nv as f64;
                    for i in 0..=nu {
                        let s = i as f64 / nu as f64;
                        tess.points
                            .push(origin + u_dir * (s * u_len) + v_dir * (t * v_len));
                        tess.uvs.push([s * u_len, t * v_len]);
                    }
                }
                let row = nu + 1;
                for j in 0..nv {
                    for i in 0..nu {
                        let a = j * row + i;
                        push_quad(&mut tess, a, a + 1, a + 1 + row, a + row);
                    }
                }
                tess
            }
            Surface::Sphere {
                center,
                radius,
                x_dir,
                z_dir,
            } => {
                let y_dir = z_dir.cross(x_dir);
                let nlat = arc_segments(*radius, PI, params, 4);
                let nlon = arc_segments(*radius, 2.0 * PI, params, 6);
                let mut tess = FaceTess::default();
                tess.points.push(center + z_dir * *radius);
                tess.uvs.push([0.0, 0.0]);
                for k in 1..nlat {
                    let theta = PI * k as f64 / nlat as f64;
                    let (st, ct) = theta.sin_cos();
                    for i in 0..nlon {
                        let phi = 2.0 * PI * i as f64 / nlon as f64;
                        let (sp, cp) = phi.sin_cos();
                        let dir = x_dir * (st * cp) + y_dir * (st * sp) + z_dir * ct;
                        tess.points.push(center + dir * *radius);
                        tess.uvs.push([phi, theta]);
                    }
                }
                tess.points.push(center - z_dir * *radius);
                tess.uvs.push([0.0, PI]);

                let south = tess.points.len() - 1;
                let ring = |k: usize, i: usize| 1 + (k - 1) * nlon + (i % nlon);
                for i in 0..nlon {
                    push_tri(&mut tess, 0, ring(1, i), ring(1, i + 1));
                }
                for k in 1..nlat - 1 {
                    for i in 0..nlon {
                        push_quad(
                            &mut tess,
                            ring(k, i),
                            ring(k + 1, i),
                            ring(k + 1, i + 1),
                            ring(k, i + 1),
                        );
                    }
                }
                for i in 0..nlon {
                    push_tri(&mut tess, ring(nlat - 1, i), south, ring(nlat - 1, i + 1));
                }
                tess
            }
            Surface::CylinderSide {
                base,
                x_dir,
                axis,
                radius,
                height,
            } => {
                let y_dir = axis.cross(x_dir);
                let ntheta = arc_segments(*radius, 2.0 * PI, params, 6);
                let nh = length_segments(*height, params);
                let mut tess = FaceTess::default();
                for j in 0..=nh {
                    let h = height * j as f64 / nh as f64;
                    for i in 0..ntheta {
                        let phi = 2.0 * PI * i as f64 / ntheta as f64;
                        let (sp, cp) = phi.sin_cos();
                        tess.points
                            .push(base + (x_dir * cp + y_dir * sp) * *radius + axis * h);
                        tess.uvs.push([phi, h]);
                    }
                }
                let at = |i: usize, j: usize| j * ntheta + (i % ntheta);
                for j in 0..nh {
                    for i in 0..ntheta {
                        push_quad(&mut tess, at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1));
                    }
                }
                tess
            }
            Surface::Disk {
                center,
                x_dir,
                normal,
                radius,
            } => {
                let y_dir = normal.cross(x_dir);
                let ntheta = arc_segments(*radius, 2.0 * PI, params, 6);
                let nr = length_segments(*radius, params);
                let mut tess = FaceTess::default();
                tess.points.push(*center);
                tess.uvs.push([0.0, 0.0]);
                for k in 1..=nr {
                    let r = radius * k as f64 / nr as f64;
                    for i in 0..ntheta {
                        let phi = 2.0 * PI * i as f64 / ntheta as f64;
                        let (sp, cp) = phi.sin_cos();
                        tess.points.push(center + (x_dir * cp + y_dir * sp) * r);
                        tess.uvs.push([r * cp, r * sp]);
                    }
                }
                let ring = |k: usize, i: usize| 1 + (k - 1) * ntheta + (i % ntheta);
                for i in 0..ntheta {
                    push_tri(&mut tess, 0, ring(1, i), ring(1, i + 1));
                }
                for k in 1..nr {
                    for i in 0..ntheta {
                        push_quad(
                            &mut tess,
                            ring(k, i),
                            ring(k + 1, i),
                            ring(k + 1, i + 1),
                            ring(k, i + 1),
                        );
                    }
                }
                tess
            }
        }
    }
}

/// Bounds of a circle with the given center, unit normal and radius.
fn circle_bounds(center: &Point3, normal: &Vec3, radius: f64) -> BoundingBox {
    let ext = Vec3::new(
        radius * (1.0 - normal.x * normal.x).max(0.0).sqrt(),
        radius * (1.0 - normal.y * normal.y).max(0.0).sqrt(),
        radius * (1.0 - normal.z * normal.z).max(0.0).sqrt(),
    );
    BoundingBox::new(center - ext, center + ext)
}

/// Divisions needed so that no edge exceeds `params.max_len`.
fn length_segments(len: f64, params: &TessParams) -> usize {
    let n = (len / params.max_len).ceil();
    if n.is_finite() {
        (n as usize).clamp(1, MAX_SEGMENTS)
    } else {
        1
    }
}

/// Divisions of an arc of `sweep` radians on a circle of `radius`,
/// limited by the angular step, the chord deviation and the edge length.
fn arc_segments(radius: f64, sweep: f64, params: &TessParams, min: usize) -> usize {
    let mut step = params.angle_deg.to_radians();
    if params.chord < radius {
        step = step.min(2.0 * (1.0 - params.chord / radius).acos());
    }
    step = step.min(params.max_len / radius);
    let n = (sweep / step).ceil();
    if n.is_finite() {
        (n as usize).clamp(min, MAX_SEGMENTS)
    } else {
        min
    }
}

fn push_tri(tess: &mut FaceTess, a: usize, b: usize, c: usize) {
    tess.triangles.push([a as u32, b as u32, c as u32]);
}

// Quad a-b-c-d in counter-clockwise order.
fn push_quad(tess: &mut FaceTess, a: usize, b: usize, c: usize, d: usize) {
    push_tri(tess, a, b, c);
    push_tri(tess, a, c, d);
}
