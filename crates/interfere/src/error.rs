//! Error types for interference runs.

use std::io;

use interfere_cloud::CloudError;
use interfere_kernel::KernelError;
use thiserror::Error;

/// Errors that can occur while running or reading an interference analysis.
#[derive(Error, Debug)]
pub enum InterferenceError {
    /// Not enough usable input bodies.
    #[error("source error: {0}")]
    Source(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Scratch-file I/O failed.
    #[error("scratch file {op} failed: {source}")]
    Scratch {
        /// Operation that failed.
        op: &'static str,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Malformed scratch-file contents.
    #[error("malformed scratch file: {0}")]
    Format(String),

    /// Invalid scene description.
    #[error("invalid scene: {0}")]
    Scene(String),

    /// Point-cloud or pair failure.
    #[error(transparent)]
    Cloud(#[from] CloudError),

    /// Geometry kernel failure.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Result type for interference operations.
pub type Result<T> = std::result::Result<T, InterferenceError>;
