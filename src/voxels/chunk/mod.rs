//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a cube of `size³` voxels that owns
//! its own voxel generation and face-culled mesh generation.
//!
//! ## Storage
//!
//! Chunks keep two views of the same voxels:
//! - `blocks`: the packed blocks in insertion order. Mesh output follows this
//!   order, so equal inputs always produce equal vertex arrays.
//! - `solid_array`: a bit vector with one bit per cell, used for O(1) local
//!   neighbour lookups while culling.
//!
//! Duplicate packed blocks are dropped on insertion, so the block list behaves
//! as a set.

use std::collections::HashSet;

use bitvec::prelude::BitVec;
use cgmath::{Point3, Vector3};

use super::block::{block_side::BlockSide, Block, Color, MAX_LOCAL_COORDINATE};
use super::heightfield::Heightfield;
use super::world_index::WorldIndex;
use crate::meshing::{ChunkMesh, MeshData};

pub mod chunk_data;

pub use chunk_data::ChunkData;

/// The default edge length of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;

/// The largest edge length the block codec can address.
pub const MAX_CHUNK_DIMENSION: i32 = MAX_LOCAL_COORDINATE + 1;

/// A cube of voxels anchored at a world-space origin.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Edge length in blocks.
    size: i32,
    /// World position of the chunk's minimum corner.
    origin: Point3<i32>,
    /// Unique blocks in insertion order.
    blocks: Vec<Block>,
    block_set: HashSet<Block>,
    /// One bit per local cell, indexed `x + size * y + size² * z`.
    solid_array: BitVec,
    mesh: Option<MeshData>,
}

impl Chunk {
    /// Creates an empty chunk.
    ///
    /// # Arguments
    /// * `size` - Edge length in blocks, clamped to `1..=16`
    /// * `origin` - World position of the chunk's minimum corner
    pub fn new(size: i32, origin: Point3<i32>) -> Self {
        let size = size.clamp(1, MAX_CHUNK_DIMENSION);
        let cells = (size * size * size) as usize;
        Chunk {
            size,
            origin,
            blocks: Vec::new(),
            block_set: HashSet::new(),
            solid_array: BitVec::repeat(false, cells),
            mesh: None,
        }
    }

    /// Rebuilds a chunk from a transfer record.
    pub fn from_chunk_data(size: i32, data: &ChunkData) -> Self {
        let mut chunk = Chunk::new(size, data.origin);
        chunk.set_blocks(data.blocks.iter().copied());
        chunk
    }

    /// Edge length in blocks.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// World position of the minimum corner.
    pub fn origin(&self) -> Point3<i32> {
        self.origin
    }

    /// Unique blocks in insertion order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Whether the chunk holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Mesh arrays from the last call to one of the mesh generators.
    pub fn mesh_data(&self) -> Option<&MeshData> {
        self.mesh.as_ref()
    }

    /// Adds a block, returning `false` if the identical block was already present.
    pub fn insert_block(&mut self, block: Block) -> bool {
        if !self.block_set.insert(block) {
            return false;
        }
        if let Some(index) = self.cell_index(block.position()) {
            self.solid_array.set(index, true);
        }
        self.blocks.push(block);
        true
    }

    /// Replaces the voxel set wholesale. Any previously generated mesh is dropped.
    pub fn set_blocks(&mut self, blocks: impl IntoIterator<Item = Block>) {
        self.blocks.clear();
        self.block_set.clear();
        self.solid_array.fill(false);
        self.mesh = None;
        for block in blocks {
            self.insert_block(block);
        }
    }

    /// Whether a local position lies inside the chunk.
    pub fn contains_local(&self, pos: Point3<i32>) -> bool {
        (0..self.size).contains(&pos.x)
            && (0..self.size).contains(&pos.y)
            && (0..self.size).contains(&pos.z)
    }

    /// Checks if the cell at a local position holds a block.
    ///
    /// # Returns
    /// `true` if a block occupies the cell, `false` if it's air or out of bounds.
    pub fn is_block_solid(&self, pos: Point3<i32>) -> bool {
        self.cell_index(pos)
            .map(|index| self.solid_array[index])
            .unwrap_or(false)
    }

    fn cell_index(&self, pos: Point3<i32>) -> Option<usize> {
        if !self.contains_local(pos) {
            return None;
        }
        Some((pos.x + self.size * pos.y + self.size * self.size * pos.z) as usize)
    }

    /// Fills the chunk from the heightfield.
    ///
    /// Every local column is sampled at its world position. Columns whose terrain
    /// top is below the chunk's base are skipped. Otherwise the column is filled
    /// from local y = 0 up to the terrain height (capped at the chunk top), each
    /// block coloured `palette[y % palette.len()]`. An empty palette falls back to
    /// [`Color::DEFAULT`].
    ///
    /// # Returns
    /// The lowest terrain height among the columns that were not skipped, or
    /// `None` if the chunk lies entirely above the terrain.
    pub fn generate_data(&mut self, heightfield: &Heightfield, palette: &[Color]) -> Option<i32> {
        let mut min_height: Option<i32> = None;

        for z in 0..self.size {
            for x in 0..self.size {
                let height = heightfield.column_height(self.origin.x + x, self.origin.z + z);
                if height < self.origin.y {
                    continue;
                }
                min_height = Some(min_height.map_or(height, |current| current.min(height)));

                let fill_top = (height - self.origin.y).min(self.size);
                for y in 0..fill_top {
                    let color = if palette.is_empty() {
                        Color::DEFAULT
                    } else {
                        palette[y as usize % palette.len()]
                    };
                    self.insert_block(Block::pack(x, y, z, color));
                }
            }
        }

        min_height
    }

    /// Generates mesh data, emitting only the faces whose neighbour is air.
    ///
    /// Neighbours inside the chunk are looked up locally. Neighbours outside are
    /// looked up in `world_index` when one is given; without it every boundary
    /// face is treated as exposed.
    pub fn generate_mesh_data(&mut self, world_index: Option<&WorldIndex>) -> &MeshData {
        let mut mesh = MeshData::new();

        for &block in &self.blocks {
            let (position, color) = block.unpack();
            for side in BlockSide::all() {
                let neighbor = position + side.neighbor_offset();
                if !self.is_neighbor_occupied(neighbor, world_index) {
                    mesh.push_face(position, side, color);
                }
            }
        }

        self.mesh.insert(mesh)
    }

    /// Generates mesh data with all six faces of every block, including hidden ones.
    pub fn generate_mesh_data_unculled(&mut self) -> &MeshData {
        let mut mesh = MeshData::new();

        for &block in &self.blocks {
            let (position, color) = block.unpack();
            for side in BlockSide::all() {
                mesh.push_face(position, side, color);
            }
        }

        self.mesh.insert(mesh)
    }

    fn is_neighbor_occupied(&self, local: Point3<i32>, world_index: Option<&WorldIndex>) -> bool {
        if self.contains_local(local) {
            return self.is_block_solid(local);
        }
        match world_index {
            Some(index) => index.contains(self.to_world(local)),
            None => false,
        }
    }

    /// Converts a local position into world space.
    pub fn to_world(&self, local: Point3<i32>) -> Point3<i32> {
        self.origin + Vector3::new(local.x, local.y, local.z)
    }

    /// Hands the generated mesh to a region, consuming the chunk.
    pub fn into_chunk_mesh(self) -> ChunkMesh {
        ChunkMesh {
            origin: self.origin,
            mesh: self.mesh.unwrap_or_default(),
        }
    }

    /// Plain snapshot of the chunk for moving across threads.
    pub fn to_chunk_data(&self, coord: Point3<i32>, min_height: Option<i32>) -> ChunkData {
        ChunkData {
            coord,
            origin: self.origin,
            blocks: self.blocks.clone(),
            min_height,
        }
    }
}
