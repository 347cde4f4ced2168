#![warn(missing_docs)]

//! Geometry kernel service for interference checking.
//!
//! Provides exactly what the interference core consumes:
//! - primitive solids with per-face attributes ([`make_box`], [`make_sphere`],
//!   [`make_cylinder`]) and body duplication under a rigid transform
//! - tessellation with global-vertex and per-face access ([`tessellate`])
//! - boolean intersection / subtraction that fails with
//!   [`KernelError::EmptyResult`] when the surfaces never cross
//! - mass properties of a tessellated body
//! - a [`Context`] holding the tolerance and a scoped message level
//!
//! # Example
//!
//! ```
//! use interfere_kernel::{make_box, tessellate, TessParams};
//! use interfere_math::{Point3, Vec3};
//!
//! let cube = make_box(Point3::origin(), Vec3::new(1.0, 1.0, 1.0)).unwrap();
//! let tess = tessellate(&cube, &TessParams::new(0.25, 0.01, 15.0)).unwrap();
//! assert_eq!(tess.num_faces(), 6);
//! assert!((tess.mass_properties().volume - 1.0).abs() < 1e-9);
//! ```

mod attrs;
mod body;
mod boolean;
mod context;
mod error;
mod mass;
mod primitives;
mod surface;
mod tessellate;

pub use attrs::{AttrValue, Attributes};
pub use body::{Body, Face, Shape, Side, Solid, Trim};
pub use boolean::{BooleanOp, Model};
pub use context::{Context, VerbosityGuard, DEFAULT_VERBOSITY};
pub use error::{KernelError, Result};
pub use mass::MassProperties;
pub use primitives::{make_box, make_cylinder, make_sphere};
pub use surface::{Surface, MAX_SEGMENTS};
pub use tessellate::{tessellate, FaceTess, GlobalVertex, TessParams, Tessellation};
