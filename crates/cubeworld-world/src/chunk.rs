//! Chunk data structure for voxel world storage.

use cubeworld_core::coords::{ChunkDims, ChunkPos, LocalPos, WorldPos};
use cubeworld_core::error::{Error, Result};
use cubeworld_voxel::VoxelGrid;

use crate::mesh::{build_chunk_mesh, ChunkMesh};

/// A full-height column of voxels plus its derived mesh.
///
/// The mesh is rebuilt whenever the voxels change, so it is always a pure
/// function of the voxel data.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// Position in chunk coordinates.
    pos: ChunkPos,
    voxels: VoxelGrid,
    mesh: ChunkMesh,
    /// Whether chunk needs GPU re-upload.
    dirty: bool,
    /// Frame number when last accessed (for distance/LRU eviction).
    pub last_access_frame: u64,
}

impl Chunk {
    /// Create a chunk from existing voxel data and build its mesh.
    pub fn from_grid(pos: ChunkPos, voxels: VoxelGrid) -> Self {
        let mut chunk = Self {
            pos,
            voxels,
            mesh: ChunkMesh::default(),
            dirty: true,
            last_access_frame: 0,
        };
        chunk.compute_mesh();
        chunk
    }

    /// Create a chunk with no solid voxels.
    pub fn empty(pos: ChunkPos, dims: ChunkDims) -> Self {
        Self::from_grid(pos, VoxelGrid::new(dims))
    }

    /// Create a chunk whose cells are solid where `solid` returns true.
    pub fn from_fn(pos: ChunkPos, dims: ChunkDims, mut solid: impl FnMut(LocalPos) -> bool) -> Self {
        let mut voxels = VoxelGrid::new(dims);
        for index in 0..dims.volume() {
            let local = dims.from_index(index);
            if solid(local) {
                voxels.set(local, true);
            }
        }
        Self::from_grid(pos, voxels)
    }

    /// Position in chunk coordinates.
    #[inline]
    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    /// Chunk extent.
    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.voxels.dims()
    }

    /// World position of the minimum corner.
    #[inline]
    pub fn origin(&self) -> WorldPos {
        self.dims().origin(self.pos)
    }

    /// Raw voxel storage.
    #[inline]
    pub fn voxels(&self) -> &VoxelGrid {
        &self.voxels
    }

    /// Whether the cell is solid; positions outside the chunk are empty.
    #[inline]
    pub fn is_voxel_present(&self, local: LocalPos) -> bool {
        self.voxels.get(local)
    }

    /// Highest solid `y` in column `(x, z)`.
    ///
    /// `None` means the column is empty (or `x`/`z` is outside the chunk).
    pub fn surface_y(&self, x: u32, z: u32) -> Option<u32> {
        let dims = self.dims();
        if x >= dims.size || z >= dims.size {
            return None;
        }
        self.voxels.column_top(x, z)
    }

    /// Set a single voxel and rebuild the mesh if anything changed.
    ///
    /// Returns whether the voxel changed.
    pub fn set_voxel(&mut self, local: LocalPos, solid: bool) -> Result<bool> {
        if !self.dims().contains(local) {
            return Err(Error::OutOfBounds(format!(
                "local position {local:?} outside chunk {:?}",
                self.dims()
            )));
        }
        let changed = self.voxels.set(local, solid);
        if changed {
            self.compute_mesh();
        }
        Ok(changed)
    }

    /// Rebuild the face-culled mesh from the current voxels.
    pub fn compute_mesh(&mut self) {
        self.mesh = build_chunk_mesh(&self.voxels, self.origin());
        self.dirty = true;
    }

    /// Current mesh.
    #[inline]
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// Whether the mesh changed since the last upload.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark chunk as uploaded to GPU.
    pub fn mark_uploaded(&mut self) {
        self.dirty = false;
    }

    /// Update the last access frame for LRU tracking.
    pub fn touch(&mut self, frame: u64) {
        self.last_access_frame = frame;
    }

    /// Number of solid voxels.
    #[inline]
    pub fn solid_count(&self) -> usize {
        self.voxels.count()
    }

    /// Check if this chunk is empty (all air).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Get memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.voxels.memory_usage()
            + self.mesh.vertex_bytes().len()
            + self.mesh.index_bytes().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_dirty_and_empty() {
        let chunk = Chunk::empty(ChunkPos::new(0, 0), ChunkDims::new(4, 4));
        assert!(chunk.is_empty());
        assert!(chunk.is_dirty());
        assert!(chunk.mesh().is_empty());
    }

    #[test]
    fn surface_y_returns_top_of_column() {
        let dims = ChunkDims::new(4, 8);
        let chunk = Chunk::from_fn(ChunkPos::new(0, 0), dims, |p| p.x == 1 && p.z == 2 && p.y <= 2);

        assert_eq!(chunk.surface_y(1, 2), Some(2));
        assert_eq!(chunk.surface_y(0, 0), None);
        assert_eq!(chunk.surface_y(9, 0), None);
    }

    #[test]
    fn absent_voxel_is_not_an_error() {
        let chunk = Chunk::empty(ChunkPos::new(3, -2), ChunkDims::new(4, 4));
        assert!(!chunk.is_voxel_present(LocalPos::new(1, 1, 1)));
        assert!(!chunk.is_voxel_present(LocalPos::new(40, 1, 1)));
    }

    #[test]
    fn origin_scales_by_chunk_size() {
        let chunk = Chunk::empty(ChunkPos::new(-2, 3), ChunkDims::new(16, 20));
        assert_eq!(chunk.origin(), WorldPos::new(-32, 0, 48));
    }

    #[test]
    fn set_voxel_rebuilds_mesh() {
        let mut chunk = Chunk::empty(ChunkPos::new(0, 0), ChunkDims::new(4, 4));
        chunk.mark_uploaded();

        assert_eq!(chunk.set_voxel(LocalPos::new(1, 1, 1), true), Ok(true));
        assert_eq!(chunk.mesh().quad_count(), 6);
        assert!(chunk.is_dirty());

        chunk.mark_uploaded();
        assert_eq!(chunk.set_voxel(LocalPos::new(1, 1, 1), true), Ok(false));
        assert!(!chunk.is_dirty(), "no-op edit keeps the uploaded mesh");

        assert_eq!(chunk.set_voxel(LocalPos::new(1, 1, 1), false), Ok(true));
        assert!(chunk.mesh().is_empty());
    }

    #[test]
    fn set_voxel_out_of_range_fails() {
        let mut chunk = Chunk::empty(ChunkPos::new(0, 0), ChunkDims::new(4, 4));
        assert!(matches!(
            chunk.set_voxel(LocalPos::new(0, 4, 0), true),
            Err(Error::OutOfBounds(_))
        ));
    }

    #[test]
    fn chunk_mark_uploaded() {
        let mut chunk = Chunk::empty(ChunkPos::new(0, 0), ChunkDims::new(2, 2));
        chunk.mark_uploaded();
        assert!(!chunk.is_dirty());
        chunk.compute_mesh();
        assert!(chunk.is_dirty());
    }
}
