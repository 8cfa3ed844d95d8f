use std::sync::Arc;

use cgmath::Point3;
use voxel_worldgen::error::WorldGenError;
use voxel_worldgen::meshing::{MeshBufferTemplate, MeshData};
use voxel_worldgen::voxels::block::{Block, Color};
use voxel_worldgen::voxels::chunk::{Chunk, ChunkData};
use voxel_worldgen::voxels::heightfield::Heightfield;
use voxel_worldgen::world::{
    assemble_regions, ChunkManager, GenerationState, WorldConfig, WorldGrid,
};

fn test_config(thread_count: usize) -> WorldConfig {
    WorldConfig {
        world_dimensions: [64, 32, 64],
        chunk_size: 16,
        region_size: 2,
        seed: 1234,
        thread_count,
        max_height: Some(32.0),
        noise_frequency: 0.02,
        ..WorldConfig::default()
    }
}

/// Generates every chunk of a config on the calling thread.
fn generate_records(config: &WorldConfig) -> Vec<ChunkData> {
    let grid = WorldGrid::new(config.world_dimensions, config.chunk_size);
    let heightfield = Heightfield::new(config.heightfield_settings());

    grid.coordinates()
        .into_iter()
        .filter_map(|coord| {
            let mut chunk = Chunk::new(grid.chunk_size(), grid.origin_of(coord));
            let min_height = chunk.generate_data(&heightfield, &config.palette);
            (!chunk.is_empty()).then(|| chunk.to_chunk_data(coord, min_height))
        })
        .collect()
}

fn region_meshes(config: WorldConfig) -> Vec<MeshData> {
    let mut manager = ChunkManager::new(config, Some(Arc::new(MeshBufferTemplate::new())));
    manager
        .generate_blocking()
        .expect("generation")
        .iter()
        .map(|region| region.mesh().clone())
        .collect()
}

fn single_block(coord: Point3<i32>, chunk_size: i32, local: Point3<i32>) -> ChunkData {
    ChunkData {
        coord,
        origin: Point3::new(coord.x * chunk_size, coord.y * chunk_size, coord.z * chunk_size),
        blocks: vec![Block::pack(local.x, local.y, local.z, Color::DEFAULT)],
        min_height: Some(1),
    }
}

#[test]
fn same_seed_produces_identical_meshes_for_any_thread_count() {
    let single = region_meshes(test_config(1));
    let parallel = region_meshes(test_config(4));
    let again = region_meshes(test_config(4));

    assert!(!single.is_empty());
    assert_eq!(single, parallel);
    assert_eq!(parallel, again);
}

#[test]
fn region_build_ignores_record_arrival_order() {
    let config = test_config(1);
    let records = generate_records(&config);
    assert!(records.len() > 1);

    let template = MeshBufferTemplate::new();
    let (expected, _) = assemble_regions(records.clone(), 16, 2, false, &template);

    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..3 {
        let mut shuffled = records.clone();
        rng.shuffle(&mut shuffled);
        let (regions, _) = assemble_regions(shuffled, 16, 2, false, &template);

        assert_eq!(regions.len(), expected.len());
        for (a, b) in regions.iter().zip(&expected) {
            assert_eq!(a.key(), b.key());
            assert_eq!(a.mesh(), b.mesh());
        }
    }
}

#[test]
fn faces_between_chunks_of_one_region_are_culled() {
    let template = MeshBufferTemplate::new();
    let left = single_block(Point3::new(0, 0, 0), 4, Point3::new(3, 0, 0));
    let right = single_block(Point3::new(1, 0, 0), 4, Point3::new(0, 0, 0));

    let (shared, _) = assemble_regions(vec![left.clone(), right.clone()], 4, 2, false, &template);
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].mesh().face_count(), 10);

    // Neighbours in different regions do not see each other.
    let (split, _) = assemble_regions(vec![left, right], 4, 1, false, &template);
    assert_eq!(split.len(), 2);
    let faces: usize = split.iter().map(|region| region.mesh().face_count()).sum();
    assert_eq!(faces, 12);
}

#[test]
fn region_geometry_reaches_its_surface_and_collision_shape() {
    let template = Arc::new(MeshBufferTemplate::new());
    let mut manager = ChunkManager::new(test_config(2), Some(template.clone()));
    manager.generate_blocking().expect("generation");

    let surfaces = template.surfaces();
    assert_eq!(surfaces.len(), manager.regions().len());

    for region in manager.regions() {
        let mesh = region.mesh();
        assert_eq!(mesh.vertex_count() % 6, 0);
        assert_eq!(mesh.normals.len(), mesh.vertex_count());
        assert_eq!(mesh.colors.len(), mesh.vertex_count());

        let shape = region.collision_shape().expect("collision shape");
        assert_eq!(shape.triangle_count(), mesh.triangle_count());

        let (_, surface) = surfaces
            .iter()
            .find(|(key, _)| *key == region.key())
            .expect("surface for region");
        let state = surface.state();
        assert_eq!(state.mesh.as_ref(), Some(mesh));
        assert_eq!(state.replacements, 1);
    }
}

#[test]
fn region_triangles_sum_chunk_contributions() {
    let config = test_config(1);
    let records = generate_records(&config);
    let template = MeshBufferTemplate::new();

    // One region holding everything culls at least as much as per-chunk regions.
    let (whole, _) = assemble_regions(records.clone(), 16, 64, false, &template);
    let (per_chunk, _) = assemble_regions(records, 16, 1, false, &template);

    let whole_triangles = whole[0].mesh().triangle_count();
    let split_triangles: usize = per_chunk
        .iter()
        .map(|region| region.mesh().triangle_count())
        .sum();
    assert!(whole_triangles > 0);
    assert!(whole_triangles <= split_triangles);
}

#[test]
fn generated_voxels_stay_under_the_terrain() {
    let config = test_config(1);
    let heightfield = Heightfield::new(config.heightfield_settings());

    for record in generate_records(&config) {
        for position in record.world_positions() {
            let height = heightfield.column_height(position.x, position.z);
            assert!(position.y < height, "voxel {position:?} above height {height}");
            assert!(f64::from(position.y) < config.effective_max_height());
        }
    }
}

#[test]
fn partial_chunks_are_not_generated() {
    let config = WorldConfig {
        world_dimensions: [100, 40, 70],
        ..test_config(3)
    };
    let mut manager = ChunkManager::new(config, Some(Arc::new(MeshBufferTemplate::new())));

    let total = manager.compute_grid().expect("grid").total_chunks();
    assert_eq!(total, 6 * 2 * 4);

    manager.generate_blocking().expect("generation");
    assert_eq!(manager.state(), GenerationState::Finished);
    assert_eq!(manager.report().processed(), total);
    assert_eq!(manager.report().failed(), 0);
}

#[test]
fn generation_without_template_fails_from_json_config() {
    let config = WorldConfig::from_json_str(r#"{ "world_dimensions": [32, 32, 32], "seed": 3 }"#)
        .expect("config");
    let mut manager = ChunkManager::new(config, None);

    assert!(matches!(manager.generate_blocking(), Err(WorldGenError::MissingRegionTemplate)));
    assert!(manager.regions().is_empty());
}
