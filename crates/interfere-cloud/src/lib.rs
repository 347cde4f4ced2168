#![warn(missing_docs)]

//! Point clouds and pairwise clearance for interference checking.
//!
//! A [`PointCloud`] samples a body's tessellation. A [`CloudPair`] relates
//! two clouds: [`CloudPair::classify`] decides whether the bodies are
//! disjoint, overlapping or nested, [`CloudPair::minimize`] runs the
//! parallel nearest-neighbour search, and [`CloudPair::witness`] reports the
//! signed clearance.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use interfere_cloud::{CloudPair, NearestSolver, PairKind, PointCloud};
//! use interfere_kernel::{make_box, Context, TessParams};
//! use interfere_math::{Point3, Vec3};
//!
//! let params = TessParams::new(0.25, 0.01, 15.0);
//! let cube = |x: f64| {
//!     let body = make_box(Point3::new(x, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)).unwrap();
//!     PointCloud::from_body(Arc::new(body), params, false).unwrap()
//! };
//! let (a, b) = (cube(0.0), cube(3.0));
//!
//! let ctx = Context::new();
//! let mut pair = CloudPair::classify(&ctx, &a, &b).unwrap();
//! assert_eq!(pair.kind(), Some(PairKind::Disjoint));
//! pair.minimize(&NearestSolver::new(2)).unwrap();
//! assert!((pair.witness().unwrap().distance - 2.0).abs() < 1e-9);
//! ```

mod classify;
mod cloud;
mod error;
mod nearest;
mod pair;

pub use classify::{SOURCE_TAG, TARGET_TAG};
pub use cloud::{FaceSubset, PointCloud};
pub use error::{CloudError, Result};
pub use nearest::{Nearest, NearestSolver, UNSET_DISTANCE};
pub use pair::{CloudPair, OverlapPart, PairKind, PairState, Witness};
