//! The world's chunk grid.

use cgmath::{Point3, Vector3};

/// Chunk layout derived from the world size and chunk size.
///
/// Only whole chunks are generated: a world dimension that is not a multiple of
/// the chunk size is truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldGrid {
    chunk_size: i32,
    number_of_chunks: Vector3<i32>,
}

impl WorldGrid {
    /// Lays out whole chunks over the world.
    ///
    /// # Arguments
    /// * `world_dimensions` - World size in blocks along x, y and z
    /// * `chunk_size` - Edge length of a chunk, raised to at least 1
    pub fn new(world_dimensions: [u32; 3], chunk_size: u32) -> Self {
        let chunk_size = chunk_size.max(1);
        let count = |dimension: u32| (dimension / chunk_size).min(i32::MAX as u32) as i32;
        WorldGrid {
            chunk_size: chunk_size as i32,
            number_of_chunks: Vector3::new(
                count(world_dimensions[0]),
                count(world_dimensions[1]),
                count(world_dimensions[2]),
            ),
        }
    }

    /// Edge length of every chunk in blocks.
    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    /// Chunks along each axis.
    pub fn number_of_chunks(&self) -> Vector3<i32> {
        self.number_of_chunks
    }

    /// Total number of chunks, saturating at `usize::MAX`.
    pub fn total_chunks(&self) -> usize {
        let n = self.number_of_chunks;
        (n.x as usize)
            .saturating_mul(n.y as usize)
            .saturating_mul(n.z as usize)
    }

    /// Whether a chunk coordinate lies inside the grid.
    pub fn contains(&self, coord: Point3<i32>) -> bool {
        (0..self.number_of_chunks.x).contains(&coord.x)
            && (0..self.number_of_chunks.y).contains(&coord.y)
            && (0..self.number_of_chunks.z).contains(&coord.z)
    }

    /// Every chunk coordinate, x fastest, then y, then z.
    pub fn coordinates(&self) -> Vec<Point3<i32>> {
        let n = self.number_of_chunks;
        let mut coordinates = Vec::with_capacity(self.total_chunks());
        for z in 0..n.z {
            for y in 0..n.y {
                for x in 0..n.x {
                    coordinates.push(Point3::new(x, y, z));
                }
            }
        }
        coordinates
    }

    /// World position of a chunk's minimum corner.
    pub fn origin_of(&self, coord: Point3<i32>) -> Point3<i32> {
        Point3::new(
            coord.x * self.chunk_size,
            coord.y * self.chunk_size,
            coord.z * self.chunk_size,
        )
    }
}

/// Deals coordinates out round-robin into `parts` disjoint lists.
pub fn partition_round_robin<T>(items: Vec<T>, parts: usize) -> Vec<Vec<T>> {
    let parts = parts.max(1);
    let mut partitions: Vec<Vec<T>> = (0..parts).map(|_| Vec::new()).collect();
    for (i, item) in items.into_iter().enumerate() {
        partitions[i % parts].push(item);
    }
    partitions
}
