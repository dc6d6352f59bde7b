//! Voxel presence storage for the Cubeworld engine.
//!
//! A chunk only needs one bit per cell, so storage is a flat, bit-packed
//! grid sized to the chunk extent instead of a hash map of coordinates.

pub mod grid;

pub use grid::VoxelGrid;
