//! Boolean intersection and subtraction of solid bodies.
//!
//! Pipeline:
//! 1. **AABB filter**: bodies whose boxes do not touch cannot cross
//! 2. **Probe**: sample every face of each body and classify the samples
//!    against the other solid (inside / outside / on)
//! 3. **Select**: the operation fails with [`KernelError::EmptyResult`]
//!    unless one surface has samples on both sides of the other solid
//! 4. **Trim**: surviving faces keep their attributes and gain a trim
//!    against the other solid; they are clipped when tessellated
//!
//! Nested solids therefore fail just like disjoint ones. Callers that need
//! to tell them apart compare bounding boxes.

use std::sync::Arc;

use tracing::warn;

use crate::body::{Body, Face, Side, Solid, Trim};
use crate::context::Context;
use crate::tessellate::{tessellate_face, TessParams};
use crate::{KernelError, Result};

/// Divisions of the smaller body's extent used by the probe sampling.
const PROBE_DIVISIONS: f64 = 16.0;

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Keep the region common to both solids.
    Intersection,
    /// Remove the tool from the target.
    Subtraction,
}

/// Result of a boolean operation: one or more bodies.
#[derive(Debug, Clone)]
pub struct Model {
    bodies: Vec<Arc<Body>>,
}

impl Model {
    /// Bodies of the result.
    pub fn bodies(&self) -> &[Arc<Body>] {
        &self.bodies
    }

    /// Number of bodies.
    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }
}

impl Context {
    /// Apply `op` to `target` and `tool`.
    ///
    /// Failures are reported through `tracing` unless the context
    /// verbosity is 0.
    pub fn boolean(&self, target: &Body, tool: &Body, op: BooleanOp) -> Result<Model> {
        let result = boolean_op(target, tool, op, self.tolerance().linear);
        if let Err(err) = &result {
            if self.verbosity() > 0 {
                warn!(?op, error = %err, "boolean operation failed");
            }
        }
        result
    }
}

/// Probe counts for one face.
#[derive(Debug, Clone, Copy, Default)]
struct Census {
    inside: usize,
    outside: usize,
}

impl Census {
    fn count(&self, side: Side) -> usize {
        match side {
            Side::Inside => self.inside,
            Side::Outside => self.outside,
        }
    }
}

fn census(face: &Face, other: &Solid, probe: &TessParams, tol: f64) -> Census {
    let mut c = Census::default();
    for p in &tessellate_face(face, probe).points {
        let d = other.signed_distance(p);
        if d < -tol {
            c.inside += 1;
        } else if d > tol {
            c.outside += 1;
        }
    }
    c
}

fn crosses(census: &[Census]) -> bool {
    census.iter().any(|c| c.inside > 0) && census.iter().any(|c| c.outside > 0)
}

fn trimmed(face: &Face, other: &Solid, keep: Side) -> Face {
    let mut face = face.clone();
    face.trims.push(Trim {
        solid: other.clone(),
        keep,
    });
    face
}

fn boolean_op(target: &Body, tool: &Body, op: BooleanOp, tol: f64) -> Result<Model> {
    let solid_a = target.solid().ok_or(KernelError::NotSolid)?;
    let solid_b = tool.solid().ok_or(KernelError::NotSolid)?;

    let box_a = target.bounding_box();
    let box_b = tool.bounding_box();
    if !box_a.overlaps(&box_b) {
        return Err(KernelError::EmptyResult);
    }

    let size = box_a.max_extent().min(box_b.max_extent());
    let probe = TessParams::new(
        size / PROBE_DIVISIONS,
        size / (PROBE_DIVISIONS * 50.0),
        10.0,
    );
    probe.validate()?;

    let census_a: Vec<Census> = target
        .faces()
        .iter()
        .map(|f| census(f, solid_b, &probe, tol))
        .collect();
    let census_b: Vec<Census> = tool
        .faces()
        .iter()
        .map(|f| census(f, solid_a, &probe, tol))
        .collect();

    if !crosses(&census_a) && !crosses(&census_b) {
        return Err(KernelError::EmptyResult);
    }

    let keep_a = match op {
        BooleanOp::Intersection => Side::Inside,
        BooleanOp::Subtraction => Side::Outside,
    };
    let mut faces = Vec::new();
    for (face, c) in target.faces().iter().zip(&census_a) {
        if c.count(keep_a) > 0 {
            faces.push(trimmed(face, solid_b, keep_a));
        }
    }
    // Tool faces inside the target bound the result for both operations.
    for (face, c) in tool.faces().iter().zip(&census_b) {
        if c.inside > 0 {
            faces.push(trimmed(face, solid_a, Side::Inside));
        }
    }
    if faces.is_empty() {
        return Err(KernelError::EmptyResult);
    }

    Ok(Model {
        bodies: vec![Arc::new(Body::from_faces(faces))],
    })
}
