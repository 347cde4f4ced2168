//! Error types for point clouds and cloud pairs.

use interfere_kernel::KernelError;
use thiserror::Error;

/// Errors that can occur while building, classifying or minimizing clouds.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CloudError {
    /// Malformed face subset.
    #[error("face index error: {0}")]
    Index(String),

    /// Tessellation produced no vertices.
    #[error("point cloud has no vertices")]
    NoData,

    /// Topological misuse or degenerate boolean result.
    #[error("topology error: {0}")]
    Topology(String),

    /// Pair used before classification.
    #[error("cloud pair has not been classified")]
    NotClassified,

    /// Pair minimized a second time.
    #[error("cloud pair has already been minimized")]
    AlreadyMinimized,

    /// Witness requested before minimization.
    #[error("cloud pair has not been minimized")]
    NotMinimized,

    /// Internal state does not match the requested operation.
    #[error("inconsistent cloud pair: {0}")]
    Consistency(String),

    /// Geometry kernel failure.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Result type for cloud operations.
pub type Result<T> = std::result::Result<T, CloudError>;
