//! Procedural terrain generation.

use std::sync::Arc;

use cubeworld_core::coords::{ChunkDims, ChunkPos};
use cubeworld_core::error::{Error, Result};
use cubeworld_voxel::VoxelGrid;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::noise::{FractalNoise, GradientNoise, HeightSource};
use crate::WorldSeed;

/// Which height field drives generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum NoiseKind {
    /// Single-octave gradient noise.
    #[default]
    Gradient,
    /// Octave fractal Perlin noise.
    Fractal {
        /// Number of noise octaves for detail.
        octaves: usize,
        /// Frequency multiplier between octaves.
        lacunarity: f64,
        /// Amplitude multiplier between octaves.
        persistence: f64,
    },
}

/// Terrain generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Seed for noise and per-chunk jitter.
    pub seed: WorldSeed,
    /// Extent of every chunk.
    pub dims: ChunkDims,
    /// Scale from world units to noise space.
    pub frequency: f64,
    /// Upper bound of the random per-column offset, in voxels.
    pub jitter: f64,
    /// Height field.
    pub noise: NoiseKind,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            dims: ChunkDims::default(),
            frequency: 0.08,
            jitter: 1.0,
            noise: NoiseKind::Gradient,
        }
    }
}

impl TerrainConfig {
    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<()> {
        self.dims.validate()?;
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "frequency must be positive, got {}",
                self.frequency
            )));
        }
        if !(self.jitter.is_finite() && self.jitter >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "jitter must be non-negative, got {}",
                self.jitter
            )));
        }
        if let NoiseKind::Fractal { octaves, .. } = self.noise {
            if octaves == 0 {
                return Err(Error::InvalidConfig("fractal noise needs at least one octave".into()));
            }
        }
        Ok(())
    }

    fn height_source(&self) -> Arc<dyn HeightSource> {
        // noise crates take 32-bit seeds; fold the high half in
        let seed = (self.seed ^ (self.seed >> 32)) as u32;
        match self.noise {
            NoiseKind::Gradient => Arc::new(GradientNoise::new(seed)),
            NoiseKind::Fractal {
                octaves,
                lacunarity,
                persistence,
            } => Arc::new(FractalNoise::new(seed, octaves, lacunarity, persistence)),
        }
    }
}

/// Procedural terrain generator.
///
/// Each column is filled bottom-up: `y ∈ [0, round(h * height))` is solid,
/// where `h` is the height source sampled at the (jittered) column.
#[derive(Clone)]
pub struct TerrainGenerator {
    config: TerrainConfig,
    source: Arc<dyn HeightSource>,
}

impl std::fmt::Debug for TerrainGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainGenerator")
            .field("config", &self.config)
            .field("source", &"<dyn HeightSource>")
            .finish()
    }
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given configuration.
    pub fn new(config: TerrainConfig) -> Result<Self> {
        config.validate()?;
        let source = config.height_source();
        Ok(Self { config, source })
    }

    /// Create a terrain generator with a custom height source.
    pub fn with_source(config: TerrainConfig, source: Arc<dyn HeightSource>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, source })
    }

    /// Create a terrain generator with default configuration.
    pub fn with_seed(seed: WorldSeed) -> Self {
        let config = TerrainConfig {
            seed,
            ..Default::default()
        };
        let source = config.height_source();
        Self { config, source }
    }

    /// Get the terrain configuration.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Chunk extent.
    pub fn dims(&self) -> ChunkDims {
        self.config.dims
    }

    /// Seed of the jitter generator for one chunk.
    ///
    /// A splitmix64 finalizer over the world seed and chunk position, so
    /// neighbouring chunks get unrelated streams.
    pub fn chunk_seed(&self, pos: ChunkPos) -> u64 {
        let mut h = self.config.seed
            ^ u64::from(pos.x as u32).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ u64::from(pos.z as u32).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        h ^ (h >> 31)
    }

    /// Column height in voxels for a sampled height value.
    pub fn column_height(&self, value: f64) -> u32 {
        let height = f64::from(self.config.dims.height);
        (value.clamp(0.0, 1.0) * height).round() as u32
    }

    /// Height value in `[0, 1]` at a world-space point.
    pub fn sample(&self, world_x: f64, world_z: f64) -> f64 {
        let f = self.config.frequency;
        self.source.height(world_x * f, world_z * f)
    }

    /// Generate a chunk's voxels at the given position and mesh it.
    pub fn generate_chunk(&self, pos: ChunkPos) -> Chunk {
        let dims = self.config.dims;
        let origin = dims.origin(pos);
        let mut rng = fastrand::Rng::with_seed(self.chunk_seed(pos));
        let mut voxels = VoxelGrid::new(dims);

        for x in 0..dims.size {
            for z in 0..dims.size {
                let jx = rng.f64() * self.config.jitter;
                let jz = rng.f64() * self.config.jitter;
                let world_x = f64::from(origin.x) + f64::from(x) + jx;
                let world_z = f64::from(origin.z) + f64::from(z) + jz;
                let height = self.column_height(self.sample(world_x, world_z));
                voxels.fill_column(x, z, height);
            }
        }

        Chunk::from_grid(pos, voxels)
    }

    /// Generate multiple chunks in parallel.
    ///
    /// Output order matches `positions`.
    #[tracing::instrument(level = "trace", skip_all, fields(count = positions.len()))]
    pub fn generate_chunks_parallel(&self, positions: &[ChunkPos]) -> Vec<Chunk> {
        positions
            .par_iter()
            .map(|&pos| self.generate_chunk(pos))
            .collect()
    }
}
