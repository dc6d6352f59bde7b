//! Face-culled chunk meshing.
//!
//! Every solid voxel contributes one quad per face whose neighbouring cell in
//! the same chunk is empty, so the output grows with surface area rather
//! than volume. Cells outside the chunk count as empty.

use bytemuck::{Pod, Zeroable};
use cubeworld_core::coords::{LocalPos, WorldPos};
use cubeworld_core::types::{Face, TextureLayer};
use cubeworld_voxel::VoxelGrid;

/// Mesh vertex, uploaded as six interleaved floats: `x, y, z, u, v, layer`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub layer: f32,
}

impl Vertex {
    /// Floats per vertex in the interleaved layout.
    pub const FLOATS: usize = 6;
}

/// Index pattern of one quad (two triangles).
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Corners of a unit cube face centred on the origin, with texture
/// coordinates.
fn face_template(face: Face) -> [([f32; 3], [f32; 2]); 4] {
    match face {
        Face::PosX => [
            ([0.5, -0.5, -0.5], [1.0, 0.0]),
            ([0.5, 0.5, -0.5], [1.0, 1.0]),
            ([0.5, 0.5, 0.5], [0.0, 1.0]),
            ([0.5, -0.5, 0.5], [0.0, 0.0]),
        ],
        Face::NegX => [
            ([-0.5, -0.5, -0.5], [0.0, 0.0]),
            ([-0.5, -0.5, 0.5], [1.0, 0.0]),
            ([-0.5, 0.5, 0.5], [1.0, 1.0]),
            ([-0.5, 0.5, -0.5], [0.0, 1.0]),
        ],
        Face::PosY => [
            ([-0.5, 0.5, -0.5], [0.0, 1.0]),
            ([-0.5, 0.5, 0.5], [0.0, 0.0]),
            ([0.5, 0.5, 0.5], [1.0, 0.0]),
            ([0.5, 0.5, -0.5], [1.0, 1.0]),
        ],
        Face::NegY => [
            ([-0.5, -0.5, -0.5], [0.0, 0.0]),
            ([0.5, -0.5, -0.5], [1.0, 0.0]),
            ([0.5, -0.5, 0.5], [1.0, 1.0]),
            ([-0.5, -0.5, 0.5], [0.0, 1.0]),
        ],
        Face::PosZ => [
            ([-0.5, -0.5, 0.5], [0.0, 0.0]),
            ([0.5, -0.5, 0.5], [1.0, 0.0]),
            ([0.5, 0.5, 0.5], [1.0, 1.0]),
            ([-0.5, 0.5, 0.5], [0.0, 1.0]),
        ],
        Face::NegZ => [
            ([-0.5, -0.5, -0.5], [1.0, 0.0]),
            ([-0.5, 0.5, -0.5], [1.0, 1.0]),
            ([0.5, 0.5, -0.5], [0.0, 1.0]),
            ([0.5, -0.5, -0.5], [0.0, 0.0]),
        ],
    }
}

/// Texture layer for one face of a voxel.
///
/// Sides of a voxel with something on top of it show dirt; exposed sides
/// show the grass edge.
fn face_layer(voxels: &VoxelGrid, local: LocalPos, face: Face) -> TextureLayer {
    match face {
        Face::PosY => TextureLayer::GRASS_TOP,
        Face::NegY => TextureLayer::DIRT,
        _ => {
            let covered = voxels
                .dims()
                .neighbor(local, Face::PosY)
                .is_some_and(|above| voxels.get(above));
            if covered {
                TextureLayer::DIRT
            } else {
                TextureLayer::GRASS_SIDE
            }
        }
    }
}

/// Triangle mesh for one chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    /// Number of emitted quads.
    pub fn quad_count(&self) -> usize {
        self.indices.len() / QUAD_INDICES.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex data as bytes for a GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as bytes for a GPU upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    fn push_quad(&mut self, face: Face, layer: TextureLayer, translation: [f32; 3]) {
        let base = u32::try_from(self.vertices.len()).unwrap_or(u32::MAX);
        for (corner, uv) in face_template(face) {
            self.vertices.push(Vertex {
                position: [
                    corner[0] + translation[0],
                    corner[1] + translation[1],
                    corner[2] + translation[2],
                ],
                uv,
                layer: layer.as_f32(),
            });
        }
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }
}

/// Build the face-culled mesh of a chunk whose minimum corner is `origin`.
pub fn build_chunk_mesh(voxels: &VoxelGrid, origin: WorldPos) -> ChunkMesh {
    let dims = voxels.dims();
    let mut mesh = ChunkMesh::default();

    for local in voxels.iter_solid() {
        let translation = [
            (origin.x + local.x as i32) as f32,
            (origin.y + local.y as i32) as f32,
            (origin.z + local.z as i32) as f32,
        ];
        for face in Face::ALL {
            let occluded = dims
                .neighbor(local, face)
                .is_some_and(|neighbor| voxels.get(neighbor));
            if !occluded {
                mesh.push_quad(face, face_layer(voxels, local, face), translation);
            }
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeworld_core::coords::ChunkDims;

    #[test]
    fn vertex_is_six_floats() {
        assert_eq!(
            std::mem::size_of::<Vertex>(),
            Vertex::FLOATS * std::mem::size_of::<f32>()
        );
    }

    #[test]
    fn isolated_voxel_has_six_quads() {
        let mut voxels = VoxelGrid::new(ChunkDims::new(5, 5));
        voxels.set(LocalPos::new(2, 2, 2), true);

        let mesh = build_chunk_mesh(&voxels, WorldPos::default());
        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn solid_cube_emits_only_boundary_faces() {
        for n in 1..=5u32 {
            let voxels = VoxelGrid::filled(ChunkDims::new(n, n));
            let mesh = build_chunk_mesh(&voxels, WorldPos::default());
            let n = n as usize;
            assert_eq!(mesh.quad_count(), 6 * n * n, "n = {n}");
        }
    }

    #[test]
    fn adjacent_voxels_share_no_faces() {
        let mut voxels = VoxelGrid::new(ChunkDims::new(4, 4));
        voxels.set(LocalPos::new(1, 1, 1), true);
        voxels.set(LocalPos::new(2, 1, 1), true);

        let mesh = build_chunk_mesh(&voxels, WorldPos::default());
        assert_eq!(mesh.quad_count(), 10);
    }

    #[test]
    fn vertices_are_translated_by_origin_and_local() {
        let mut voxels = VoxelGrid::new(ChunkDims::new(4, 4));
        voxels.set(LocalPos::new(3, 0, 1), true);

        let mesh = build_chunk_mesh(&voxels, WorldPos::new(-4, 0, 8));
        for vertex in &mesh.vertices {
            let [x, y, z] = vertex.position;
            assert!((-1.5..=-0.5).contains(&x), "x = {x}");
            assert!((-0.5..=0.5).contains(&y), "y = {y}");
            assert!((8.5..=9.5).contains(&z), "z = {z}");
        }
    }

    #[test]
    fn texture_layers_depend_on_face() {
        let mut voxels = VoxelGrid::new(ChunkDims::new(3, 3));
        voxels.fill_column(1, 1, 2);

        let mesh = build_chunk_mesh(&voxels, WorldPos::default());
        let layer_at = |y: f32, layer: TextureLayer| {
            mesh.vertices
                .iter()
                .filter(|v| (v.position[1] - y).abs() < 1e-6 && v.layer == layer.as_f32())
                .count()
        };

        // top quad of the column
        assert_eq!(layer_at(1.5, TextureLayer::GRASS_TOP), 4);
        // bottom quad plus the lower edge of the four buried side quads
        assert_eq!(layer_at(-0.5, TextureLayer::DIRT), 4 + 4 * 2);
        // lower voxel is covered: its four side quads are dirt
        let lower_sides_dirt = mesh
            .vertices
            .iter()
            .filter(|v| v.layer == TextureLayer::DIRT.as_f32())
            .count();
        assert_eq!(lower_sides_dirt, 4 * 4 + 4);
        let grass_sides = mesh
            .vertices
            .iter()
            .filter(|v| v.layer == TextureLayer::GRASS_SIDE.as_f32())
            .count();
        assert_eq!(grass_sides, 4 * 4);
    }

    #[test]
    fn byte_views_match_lengths() {
        let voxels = VoxelGrid::filled(ChunkDims::new(1, 1));
        let mesh = build_chunk_mesh(&voxels, WorldPos::default());
        assert_eq!(mesh.vertex_bytes().len(), 24 * 24);
        assert_eq!(mesh.index_bytes().len(), 36 * 4);
    }
}
