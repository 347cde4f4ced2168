#![warn(missing_docs)]

//! Interference and minimum-distance analysis between solid bodies.
//!
//! [`InterferenceEngine`] tessellates every named body, measures the signed
//! clearance of every pair (positive gap, negative penetration) and
//! collects the results with per-body mass properties in an
//! [`InterferenceReport`]. Reports persist to a binary scratch file and are
//! read back through [`InterferenceOutputs`].
//!
//! # Example
//!
//! ```
//! use interfere::{InterferenceConfig, InterferenceEngine, Scene};
//!
//! let scene = Scene::from_json(r#"{ "bodies": [
//!     { "name": "a", "shape": { "box": { "center": [0, 0, 0], "size": [1, 1, 1] } } },
//!     { "name": "b", "shape": { "box": { "center": [3, 0, 0], "size": [1, 1, 1] } } }
//! ] }"#).unwrap();
//!
//! let config = InterferenceConfig {
//!     oml: false,
//!     tess_params: [0.1, 0.01, 15.0],
//!     ..Default::default()
//! };
//! let bodies = scene.build(&config.attr_name).unwrap();
//! let report = InterferenceEngine::new(config).unwrap().execute(&bodies).unwrap();
//! assert!((report.distance(0, 1) - 2.0).abs() < 1e-9);
//! ```

mod config;
mod engine;
mod error;
mod outputs;
mod scene;
mod scratch;

pub use config::InterferenceConfig;
pub use engine::{InterferenceEngine, CONTAINER_MARK};
pub use error::{InterferenceError, Result};
pub use outputs::{InterferenceOutputs, OutputKind, OutputValue};
pub use scene::{BodySpec, Scene, ShapeSpec};
pub use scratch::InterferenceReport;

pub use interfere_cloud::{PairKind, Witness};
pub use interfere_kernel::MassProperties;
