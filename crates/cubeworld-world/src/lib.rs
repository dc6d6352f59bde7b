//! Terrain generation, chunk meshing and the chunk registry for the
//! Cubeworld engine.

pub mod chunk;
pub mod generation;
pub mod mesh;
pub mod noise;
pub mod terrain;

pub use chunk::Chunk;
pub use generation::{NoiseKind, TerrainConfig, TerrainGenerator};
pub use mesh::{build_chunk_mesh, ChunkMesh, Vertex};
pub use noise::{ConstantHeight, FractalNoise, GradientNoise, HeightSource};
pub use terrain::Terrain;

/// World seed for procedural generation.
pub type WorldSeed = u64;
