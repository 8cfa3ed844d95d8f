//! # World Index
//!
//! Set of occupied world positions used to cull faces across chunk borders.
//! The chunk manager builds one per region from every chunk in that region.

use std::collections::HashSet;

use cgmath::Point3;

use super::block::Block;
use super::chunk::ChunkData;

/// Occupied voxel positions in world coordinates.
///
/// Consulted by [`Chunk::generate_mesh_data`](crate::voxels::chunk::Chunk::generate_mesh_data)
/// for neighbours that lie outside the chunk being meshed.
#[derive(Debug, Default, Clone)]
pub struct WorldIndex {
    positions: HashSet<Point3<i32>>,
}

impl WorldIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from every block of the given records.
    pub fn from_chunk_data<'a>(records: impl IntoIterator<Item = &'a ChunkData>) -> Self {
        let mut index = WorldIndex::new();
        for record in records {
            index.positions.extend(record.world_positions());
        }
        index
    }

    /// Marks a world position as occupied.
    ///
    /// # Returns
    /// `false` if the position was already present.
    pub fn insert(&mut self, position: Point3<i32>) -> bool {
        self.positions.insert(position)
    }

    /// Adds blocks given in chunk-local coordinates.
    pub fn insert_chunk_blocks(&mut self, origin: Point3<i32>, blocks: &[Block]) {
        self.positions.extend(blocks.iter().map(|block| {
            let local = block.position();
            Point3::new(origin.x + local.x, origin.y + local.y, origin.z + local.z)
        }));
    }

    /// Whether a voxel occupies the world position.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.positions.contains(&position)
    }

    /// Number of occupied positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no position is occupied.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
