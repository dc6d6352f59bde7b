//! Core types, math, and traits for the Cubeworld engine.
//!
//! This crate provides the foundational types used throughout the engine:
//! - Chunk dimensions and the coordinate systems (world, chunk, local)
//! - Face directions shared by meshing and raycasting
//! - Ray and bounding box helpers
//! - Common error types

pub mod coords;
pub mod error;
pub mod math;
pub mod types;

pub use coords::{ChunkDims, ChunkPos, LocalPos, WorldPos};
pub use error::{Error, Result};
pub use types::{Face, TextureLayer};

/// Engine-wide constants
pub mod constants {
    /// Default horizontal chunk extent in voxels (x and z)
    pub const CHUNK_SIZE: u32 = 16;
    /// Default vertical chunk extent in voxels
    pub const CHUNK_HEIGHT: u32 = 20;
    /// Shrink applied to the upper edge of a box before it is discretized,
    /// so a box ending exactly on a cell boundary does not touch the next cell
    pub const COLLISION_EPSILON: f32 = 1e-4;
}
