//! # Chunk Data
//!
//! `ChunkData` is the plain record a worker thread hands back to the chunk
//! manager. It owns nothing but values (coordinates and packed blocks), so
//! moving it across threads never exposes a live `Chunk` to concurrent
//! mutation.

use cgmath::Point3;

use crate::voxels::block::Block;

/// Snapshot of one generated chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkData {
    /// Position of the chunk in the chunk grid.
    pub coord: Point3<i32>,
    /// World position of the chunk's minimum corner.
    pub origin: Point3<i32>,
    /// Unique packed blocks in local coordinates, in generation order.
    pub blocks: Vec<Block>,
    /// Lowest terrain height seen while generating, `None` if every column was skipped.
    pub min_height: Option<i32>,
}

impl ChunkData {
    /// Whether the record carries no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// World positions of every block in the record.
    pub fn world_positions(&self) -> impl Iterator<Item = Point3<i32>> + '_ {
        let origin = self.origin;
        self.blocks.iter().map(move |block| {
            let local = block.position();
            Point3::new(origin.x + local.x, origin.y + local.y, origin.z + local.z)
        })
    }

    /// Whether the chunk is solid and every column reaches strictly above its top face.
    ///
    /// Such a chunk is completely filled and the chunk above it has a block in
    /// every bottom cell, so none of its faces can be seen. `min_height` only
    /// covers the columns that were filled, so a chunk with any air cell is
    /// never buried.
    ///
    /// # Arguments
    /// * `chunk_size` - Edge length the record was generated with
    pub fn is_buried(&self, chunk_size: i32) -> bool {
        let cells = (chunk_size.max(0) as usize).pow(3);
        self.blocks.len() == cells
            && self
                .min_height
                .is_some_and(|min_height| min_height > self.origin.y + chunk_size)
    }
}
