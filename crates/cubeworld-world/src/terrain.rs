//! Chunk registry and world-space voxel queries.

use cubeworld_core::constants::COLLISION_EPSILON;
use cubeworld_core::coords::{ChunkDims, ChunkPos, WorldPos};
use cubeworld_core::error::{Error, Result};
use cubeworld_core::math::Aabb;
use glam::{IVec3, Vec3};
use hashbrown::HashMap;
use tracing::debug;

use crate::chunk::Chunk;
use crate::generation::{TerrainConfig, TerrainGenerator};

/// All loaded chunks of a world, keyed by chunk position.
///
/// Queries never generate: a voxel in a chunk that has not been created yet
/// reads as empty. Call [`Terrain::ensure_chunks_around`] before querying
/// near a moving focus point.
#[derive(Debug)]
pub struct Terrain {
    generator: TerrainGenerator,
    chunks: HashMap<ChunkPos, Chunk>,
    /// Current frame number for access stamping.
    current_frame: u64,
}

impl Terrain {
    /// Create an empty terrain backed by a generator.
    pub fn new(generator: TerrainGenerator) -> Self {
        Self {
            generator,
            chunks: HashMap::new(),
            current_frame: 0,
        }
    }

    /// Create an empty terrain from a generator configuration.
    pub fn from_config(config: TerrainConfig) -> Result<Self> {
        Ok(Self::new(TerrainGenerator::new(config)?))
    }

    /// The generator used for missing chunks.
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Chunk extent.
    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.generator.dims()
    }

    /// Chunk containing the world-space column `(x, z)`.
    #[inline]
    pub fn chunk_coord_for(&self, x: f32, z: f32) -> ChunkPos {
        self.dims().chunk_pos(x.floor() as i32, z.floor() as i32)
    }

    /// Column of `(x, z)` inside its chunk.
    #[inline]
    pub fn local_coord_for(&self, x: f32, z: f32) -> (u32, u32) {
        self.dims().local_xz(x.floor() as i32, z.floor() as i32)
    }

    /// Make sure every chunk within `radius` chunks of the one containing
    /// `(x, z)` exists.
    ///
    /// Missing chunks are generated in parallel. Existing chunks are left
    /// untouched and nothing is ever removed. Returns how many chunks were
    /// created.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn ensure_chunks_around(&mut self, x: f32, z: f32, radius: u32) -> usize {
        let center = self.chunk_coord_for(x, z);
        let r = i32::try_from(radius).unwrap_or(i32::MAX);

        let mut missing = Vec::new();
        for dx in -r..=r {
            for dz in -r..=r {
                let pos = center.offset(dx, dz);
                if !self.chunks.contains_key(&pos) {
                    missing.push(pos);
                }
            }
        }
        if missing.is_empty() {
            return 0;
        }

        let generated = self.generator.generate_chunks_parallel(&missing);
        let created = generated.len();
        for mut chunk in generated {
            chunk.touch(self.current_frame);
            self.chunks.insert(chunk.pos(), chunk);
        }

        debug!(
            center = ?center,
            radius,
            created,
            loaded = self.chunks.len(),
            "generated chunks"
        );
        created
    }

    /// Whether the voxel at `pos` is solid.
    ///
    /// `false` for absent chunks and for `y` outside the column.
    pub fn voxel_exists(&self, pos: WorldPos) -> bool {
        self.dims()
            .locate(pos)
            .and_then(|(chunk, local)| {
                self.chunks
                    .get(&chunk)
                    .map(|c| c.is_voxel_present(local))
            })
            .unwrap_or(false)
    }

    /// Height of the highest solid voxel in the column containing `(x, z)`.
    ///
    /// `None` when the chunk is absent or the column is empty.
    pub fn surface_y(&self, x: f32, z: f32) -> Option<f32> {
        let chunk = self.chunks.get(&self.chunk_coord_for(x, z))?;
        let (lx, lz) = self.local_coord_for(x, z);
        chunk.surface_y(lx, lz).map(|y| y as f32)
    }

    /// Whether a box with minimum corner `position` and extents `size`
    /// touches any solid voxel.
    ///
    /// The first `ground_offset` layers of cells at the bottom of the box
    /// are skipped, so a box resting on the ground does not collide with it.
    pub fn collides(&self, position: Vec3, size: Vec3, ground_offset: i32) -> bool {
        let (min, max) = Aabb::from_min_size(position, size).cell_range(COLLISION_EPSILON);
        let min = IVec3::new(min.x, min.y.saturating_add(ground_offset), min.z);

        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    if self.voxel_exists(WorldPos::new(x, y, z)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Set a single voxel, rebuilding the owning chunk's mesh on change.
    ///
    /// Returns whether the voxel changed.
    pub fn set_voxel(&mut self, pos: WorldPos, solid: bool) -> Result<bool> {
        let dims = self.dims();
        let (chunk_pos, local) = dims.locate(pos).ok_or_else(|| {
            Error::OutOfBounds(format!(
                "y = {} outside column height {}",
                pos.y, dims.height
            ))
        })?;
        let chunk = self
            .chunks
            .get_mut(&chunk_pos)
            .ok_or_else(|| Error::NotFound(format!("chunk {chunk_pos:?} is not loaded")))?;

        let changed = chunk.set_voxel(local, solid)?;
        if changed {
            debug!(?pos, solid, "voxel edited");
        }
        Ok(changed)
    }

    /// Remove chunks farther than `radius` chunks (Chebyshev) from the one
    /// containing `(x, z)`.
    ///
    /// Returns the positions of removed chunks.
    pub fn unload_distant(&mut self, x: f32, z: f32, radius: u32) -> Vec<ChunkPos> {
        let center = self.chunk_coord_for(x, z);
        let far: Vec<ChunkPos> = self
            .chunks
            .keys()
            .filter(|pos| pos.chebyshev_distance(center) > radius)
            .copied()
            .collect();

        for pos in &far {
            self.chunks.remove(pos);
        }
        if !far.is_empty() {
            debug!(center = ?center, radius, unloaded = far.len(), "unloaded chunks");
        }
        far
    }

    /// Get a chunk by position.
    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Iterate over all loaded chunks.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Get mutable access to a chunk.
    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    /// Get dirty chunks that need GPU upload.
    pub fn dirty_chunks(&self) -> Vec<ChunkPos> {
        self.chunks
            .iter()
            .filter(|(_, chunk)| chunk.is_dirty())
            .map(|(pos, _)| *pos)
            .collect()
    }

    /// Insert or replace a chunk.
    ///
    /// Fails if the chunk's extent differs from this terrain's.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> Result<Option<Chunk>> {
        if chunk.dims() != self.dims() {
            return Err(Error::InvalidConfig(format!(
                "chunk dims {:?} do not match terrain dims {:?}",
                chunk.dims(),
                self.dims()
            )));
        }
        Ok(self.chunks.insert(chunk.pos(), chunk))
    }

    /// Get the number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if no chunks are loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Get the current frame number.
    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    /// Advance the frame counter and return the new frame number.
    pub fn advance_frame(&mut self) -> u64 {
        self.current_frame += 1;
        self.current_frame
    }

    /// Stamp every loaded chunk within `radius` of `(x, z)` with the
    /// current frame.
    pub fn touch_around(&mut self, x: f32, z: f32, radius: u32) {
        let center = self.chunk_coord_for(x, z);
        let frame = self.current_frame;
        for chunk in self.chunks.values_mut() {
            if chunk.pos().chebyshev_distance(center) <= radius {
                chunk.touch(frame);
            }
        }
    }

    /// Get total memory usage of all chunks.
    pub fn memory_usage(&self) -> usize {
        self.chunks.values().map(Chunk::memory_usage).sum()
    }
}
