//! Mesh generation and assembly for voxel terrain.
//!
//! # Architecture
//! - [`MeshData`]: flat triangle-list buffers (positions, normals, colours)
//! - [`ChunkMesh`]: a chunk's mesh together with the origin it is placed at
//! - [`TriMeshShape`]: static concave collision geometry derived from a mesh
//! - [`Region`]: merges many chunk meshes into one surface to cut draw calls
//!
//! Faces are emitted one quad (two triangles) per exposed block face; no
//! merging of coplanar faces takes place.

mod collision;
mod mesh;
pub mod region;

pub use collision::TriMeshShape;
pub use mesh::*;
pub use region::{
    MeshBufferSurface, MeshBufferTemplate, Region, RegionKey, RegionSurface, RegionTemplate,
    SurfaceState,
};
