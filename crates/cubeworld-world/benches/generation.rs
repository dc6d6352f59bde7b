use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cubeworld_core::coords::{ChunkDims, ChunkPos, WorldPos};
use cubeworld_voxel::VoxelGrid;
use cubeworld_world::{build_chunk_mesh, TerrainGenerator};

fn bench_generate_chunk(c: &mut Criterion) {
    let generator = TerrainGenerator::with_seed(42);
    c.bench_function("generate_chunk", |b| {
        b.iter(|| generator.generate_chunk(black_box(ChunkPos::new(3, -2))));
    });

    let positions: Vec<ChunkPos> = (-4..4)
        .flat_map(|x| (-4..4).map(move |z| ChunkPos::new(x, z)))
        .collect();
    c.bench_function("generate_chunks_parallel_64", |b| {
        b.iter(|| generator.generate_chunks_parallel(black_box(&positions)));
    });
}

fn bench_mesh(c: &mut Criterion) {
    let generator = TerrainGenerator::with_seed(7);
    let chunk = generator.generate_chunk(ChunkPos::new(0, 0));
    c.bench_function("mesh_generated_chunk", |b| {
        b.iter(|| build_chunk_mesh(black_box(chunk.voxels()), chunk.origin()));
    });

    let solid = VoxelGrid::filled(ChunkDims::default());
    c.bench_function("mesh_solid_chunk", |b| {
        b.iter(|| build_chunk_mesh(black_box(&solid), WorldPos::default()));
    });
}

criterion_group!(benches, bench_generate_chunk, bench_mesh);
criterion_main!(benches);
