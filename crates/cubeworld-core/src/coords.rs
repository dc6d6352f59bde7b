//! Coordinate systems for the voxel world.
//!
//! Chunks are full-height columns: a [`ChunkPos`] only has x and z, and every
//! chunk spans `y ∈ [0, height)`. All world → chunk conversions use floor
//! division so negative coordinates map without gaps.

use crate::constants::{CHUNK_HEIGHT, CHUNK_SIZE};
use crate::error::{Error, Result};
use crate::types::Face;
use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Extent of every chunk in a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDims {
    /// Voxels per chunk along x and z.
    pub size: u32,
    /// Voxels per chunk along y.
    pub height: u32,
}

impl Default for ChunkDims {
    fn default() -> Self {
        Self {
            size: CHUNK_SIZE,
            height: CHUNK_HEIGHT,
        }
    }
}

impl ChunkDims {
    /// Create chunk dimensions.
    #[inline]
    pub const fn new(size: u32, height: u32) -> Self {
        Self { size, height }
    }

    /// Reject degenerate extents.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "chunk dimensions must be non-zero, got {}x{}x{}",
                self.size, self.height, self.size
            )));
        }
        if i32::try_from(self.size).is_err() || i32::try_from(self.height).is_err() {
            return Err(Error::InvalidConfig(format!(
                "chunk dimensions {}x{} exceed the signed coordinate range",
                self.size, self.height
            )));
        }
        Ok(())
    }

    /// Number of voxel cells in one chunk.
    #[inline]
    pub const fn volume(self) -> usize {
        self.size as usize * self.size as usize * self.height as usize
    }

    /// Flat storage index, `(x * H + y) * D + z`.
    #[inline]
    pub const fn index(self, local: LocalPos) -> usize {
        (local.x as usize * self.height as usize + local.y as usize) * self.size as usize
            + local.z as usize
    }

    /// Inverse of [`ChunkDims::index`].
    #[inline]
    pub const fn from_index(self, index: usize) -> LocalPos {
        let size = self.size as usize;
        let height = self.height as usize;
        let z = index % size;
        let y = (index / size) % height;
        let x = index / (size * height);
        LocalPos::new(x as u32, y as u32, z as u32)
    }

    /// Whether a local position lies inside the chunk extent.
    #[inline]
    pub const fn contains(self, local: LocalPos) -> bool {
        local.x < self.size && local.y < self.height && local.z < self.size
    }

    /// Bounds-checked conversion from signed chunk-local coordinates.
    #[inline]
    pub fn local(self, x: i32, y: i32, z: i32) -> Option<LocalPos> {
        let local = LocalPos::new(
            u32::try_from(x).ok()?,
            u32::try_from(y).ok()?,
            u32::try_from(z).ok()?,
        );
        self.contains(local).then_some(local)
    }

    /// Neighbouring cell across `face`, if it is still inside this chunk.
    #[inline]
    pub fn neighbor(self, local: LocalPos, face: Face) -> Option<LocalPos> {
        let n = local.to_ivec3() + face.normal();
        self.local(n.x, n.y, n.z)
    }

    /// Chunk containing the world column `(world_x, world_z)`.
    #[inline]
    pub const fn chunk_pos(self, world_x: i32, world_z: i32) -> ChunkPos {
        let size = self.size as i32;
        ChunkPos::new(world_x.div_euclid(size), world_z.div_euclid(size))
    }

    /// Column position inside its chunk; never negative.
    #[inline]
    pub const fn local_xz(self, world_x: i32, world_z: i32) -> (u32, u32) {
        let size = self.size as i32;
        (
            world_x.rem_euclid(size) as u32,
            world_z.rem_euclid(size) as u32,
        )
    }

    /// Split a world position into chunk and local position.
    ///
    /// Returns `None` when `y` is outside `[0, height)`, since no chunk
    /// stores voxels there.
    #[inline]
    pub fn locate(self, world: WorldPos) -> Option<(ChunkPos, LocalPos)> {
        let y = u32::try_from(world.y).ok().filter(|&y| y < self.height)?;
        let (lx, lz) = self.local_xz(world.x, world.z);
        Some((self.chunk_pos(world.x, world.z), LocalPos::new(lx, y, lz)))
    }

    /// World position of a chunk's minimum corner.
    ///
    /// Wraps instead of overflowing for chunks at the edge of the `i32` range.
    #[inline]
    pub const fn origin(self, chunk: ChunkPos) -> WorldPos {
        let size = self.size as i32;
        WorldPos::new(chunk.x.wrapping_mul(size), 0, chunk.z.wrapping_mul(size))
    }

    /// Recombine chunk and local position.
    #[inline]
    pub const fn world_pos(self, chunk: ChunkPos, local: LocalPos) -> WorldPos {
        let origin = self.origin(chunk);
        WorldPos::new(
            origin.x.wrapping_add(local.x as i32),
            local.y as i32,
            origin.z.wrapping_add(local.z as i32),
        )
    }
}

/// Position within a chunk (0 to size-1 on x/z, 0 to height-1 on y).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalPos {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl LocalPos {
    /// Create a new local position
    #[inline]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x as i32, self.y as i32, self.z as i32)
    }
}

/// Chunk position in chunk coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    /// Create a new chunk position
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Translate by a number of chunks, wrapping at the `i32` range.
    #[inline]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x.wrapping_add(dx), self.z.wrapping_add(dz))
    }

    /// Chebyshev distance in chunks (the "radius" of a square ring).
    #[inline]
    pub const fn chebyshev_distance(self, other: ChunkPos) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dz = self.z.abs_diff(other.z);
        if dx > dz {
            dx
        } else {
            dz
        }
    }
}

/// World position in voxel coordinates.
///
/// The voxel at `(x, y, z)` occupies the cell `[x, x+1) × [y, y+1) × [z, z+1)`
/// for collision and raycasting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WorldPos {
    /// Create a new world position
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Translate by an integer offset.
    #[inline]
    pub const fn offset(self, delta: IVec3) -> Self {
        Self::new(
            self.x.wrapping_add(delta.x),
            self.y.wrapping_add(delta.y),
            self.z.wrapping_add(delta.z),
        )
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for WorldPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for WorldPos {
    fn from(v: Vec3) -> Self {
        Self::new(v.x.floor() as i32, v.y.floor() as i32, v.z.floor() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip() {
        let dims = ChunkDims::new(4, 6);
        let mut seen = vec![false; dims.volume()];
        for x in 0..4 {
            for y in 0..6 {
                for z in 0..4 {
                    let pos = LocalPos::new(x, y, z);
                    let index = dims.index(pos);
                    assert!(!seen[index], "index {index} reused");
                    seen[index] = true;
                    assert_eq!(dims.from_index(index), pos);
                }
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn negative_world_column_uses_floor() {
        let dims = ChunkDims::new(16, 20);
        assert_eq!(dims.chunk_pos(-1, -1), ChunkPos::new(-1, -1));
        assert_eq!(dims.local_xz(-1, -1), (15, 15));

        assert_eq!(dims.chunk_pos(-16, -17), ChunkPos::new(-1, -2));
        assert_eq!(dims.local_xz(-16, -17), (0, 15));

        assert_eq!(dims.chunk_pos(15, 16), ChunkPos::new(0, 1));
        assert_eq!(dims.local_xz(15, 16), (15, 0));
    }

    #[test]
    fn world_pos_chunk_local_roundtrip() {
        let dims = ChunkDims::new(16, 20);
        for x in -40..40 {
            for z in [-33, -1, 0, 7, 31] {
                let world = WorldPos::new(x, 5, z);
                let (chunk, local) = dims.locate(world).unwrap();
                assert!(dims.contains(local));
                assert_eq!(dims.world_pos(chunk, local), world);
            }
        }
    }

    #[test]
    fn locate_rejects_out_of_column_heights() {
        let dims = ChunkDims::new(16, 20);
        assert!(dims.locate(WorldPos::new(0, -1, 0)).is_none());
        assert!(dims.locate(WorldPos::new(0, 20, 0)).is_none());
        assert!(dims.locate(WorldPos::new(0, 19, 0)).is_some());
    }

    #[test]
    fn neighbor_stays_inside_chunk() {
        let dims = ChunkDims::new(2, 2);
        let corner = LocalPos::new(0, 0, 0);
        assert_eq!(dims.neighbor(corner, Face::NegX), None);
        assert_eq!(dims.neighbor(corner, Face::PosX), Some(LocalPos::new(1, 0, 0)));
        assert_eq!(dims.neighbor(LocalPos::new(1, 1, 1), Face::PosY), None);
    }

    #[test]
    fn world_pos_from_vec3_floors() {
        let pos = WorldPos::from(Vec3::new(-0.5, 2.999, -3.0));
        assert_eq!(pos, WorldPos::new(-1, 2, -3));
    }

    #[test]
    fn zero_dims_are_rejected() {
        assert!(ChunkDims::new(0, 4).validate().is_err());
        assert!(ChunkDims::new(4, 0).validate().is_err());
        assert!(ChunkDims::default().validate().is_ok());
    }

    #[test]
    fn chunk_distances() {
        let a = ChunkPos::new(0, 0);
        assert_eq!(a.chebyshev_distance(ChunkPos::new(-3, 2)), 3);
        assert_eq!(a.chebyshev_distance(a.offset(1, -1)), 1);
    }

    #[test]
    fn extreme_chunk_coordinates_do_not_overflow() {
        let dims = ChunkDims::new(16, 20);
        let far = ChunkPos::new(i32::MAX, i32::MIN);

        let origin = dims.origin(far);
        assert_eq!(origin.x, i32::MAX.wrapping_mul(16));
        assert_eq!(origin.z, i32::MIN.wrapping_mul(16));
        let corner = dims.world_pos(far, LocalPos::new(15, 0, 15));
        assert_eq!(corner.x, origin.x.wrapping_add(15));

        assert_eq!(far.offset(1, -1), ChunkPos::new(i32::MIN, i32::MAX));
        assert_eq!(far.chebyshev_distance(ChunkPos::new(i32::MIN, i32::MIN)), u32::MAX);
        assert_eq!(
            WorldPos::new(i32::MAX, 0, 0).offset(IVec3::X),
            WorldPos::new(i32::MIN, 0, 0)
        );
    }
}
