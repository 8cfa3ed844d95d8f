//! # Voxels
//!
//! Voxel data and its generation:
//!
//! * **Block**: one voxel packed into 24 bits (local position + quantised colour)
//! * **Heightfield**: noise-derived terrain height for a world column
//! * **Chunk**: a cube of blocks with its own generation and culled meshing
//! * **WorldIndex**: occupied world positions for culling across chunk borders
//! * **Tasks**: the unit of work a generation worker runs

pub mod block;
pub mod chunk;
pub mod heightfield;
pub mod tasks;
pub mod world_index;
