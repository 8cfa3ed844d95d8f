//! Mesh data structures for voxel rendering.
//!
//! Meshes are plain triangle lists: every three consecutive entries of the
//! vertex, normal and colour arrays form one triangle. No index buffer is kept,
//! which matches what the renderer and the collision builder consume.

use cgmath::Point3;

use crate::voxels::block::{block_side::{BlockSide, CUBE_CORNERS}, Color};

/// Number of vertices a single block face contributes (two triangles).
pub const VERTICES_PER_FACE: usize = 6;

/// Triangle-list buffers for a chunk or a whole region.
///
/// The three arrays always have the same length, a multiple of 3.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub vertices: Vec<[f32; 3]>,
    /// Per-vertex outward normals.
    pub normals: Vec<[f32; 3]>,
    /// Per-vertex RGBA colours.
    pub colors: Vec<[f32; 4]>,
}

impl MeshData {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the mesh has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of vertices, always a multiple of 3.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of block faces, two triangles each.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_FACE
    }

    /// Appends the two triangles of one block face.
    ///
    /// # Arguments
    /// * `position` - Minimum corner of the block, in the mesh's coordinate space
    /// * `side` - Which face of the block to emit
    /// * `color` - Colour given to all six vertices
    pub fn push_face(&mut self, position: Point3<i32>, side: BlockSide, color: Color) {
        let normal = side.normal();
        let color = color.to_array();
        for index in side.triangle_indices() {
            let [cx, cy, cz] = CUBE_CORNERS[index];
            self.vertices.push([
                position.x as f32 + cx,
                position.y as f32 + cy,
                position.z as f32 + cz,
            ]);
            self.normals.push(normal);
            self.colors.push(color);
        }
    }

    /// Appends another mesh, shifting its vertices by `offset`.
    pub fn append_translated(&mut self, other: &MeshData, offset: Point3<i32>) {
        let [ox, oy, oz] = [offset.x as f32, offset.y as f32, offset.z as f32];
        self.vertices
            .extend(other.vertices.iter().map(|[x, y, z]| [x + ox, y + oy, z + oz]));
        self.normals.extend_from_slice(&other.normals);
        self.colors.extend_from_slice(&other.colors);
    }

    /// Raw bytes of the vertex positions, ready for a vertex buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Normals as raw bytes, laid out like [`MeshData::vertex_bytes`].
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Colours as raw bytes, four `f32` per vertex.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}

/// A chunk's mesh, in chunk-local coordinates, plus the chunk's world origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMesh {
    /// World position of the chunk's minimum corner.
    pub origin: Point3<i32>,
    /// Mesh in chunk-local coordinates.
    pub mesh: MeshData,
}
