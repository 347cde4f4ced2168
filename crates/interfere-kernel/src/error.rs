//! Error types for the geometry kernel.

use thiserror::Error;

/// Errors reported by kernel operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Boolean operation produced nothing (the surfaces never cross).
    #[error("boolean operation produced an empty result")]
    EmptyResult,

    /// Face ID outside `1..=count`.
    #[error("face {face} out of range (body has {count} faces)")]
    FaceIndex {
        /// Requested 1-based face ID.
        face: usize,
        /// Number of faces available.
        count: usize,
    },

    /// Global vertex index outside `1..=count`.
    #[error("vertex {index} out of range (tessellation has {count} vertices)")]
    VertexIndex {
        /// Requested 1-based vertex index.
        index: usize,
        /// Number of vertices available.
        count: usize,
    },

    /// Operation needs a body with a point-membership solid.
    #[error("body is not a solid")]
    NotSolid,

    /// Degenerate primitive or parameters.
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
