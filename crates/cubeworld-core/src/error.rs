//! Error types for the engine.
//!
//! Voxel queries never fail; only configuration and world edits return these.

use thiserror::Error;

/// Engine-wide error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Out of bounds access
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// Chunk or other resource not loaded
    #[error("Resource not found: {0}")]
    NotFound(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
