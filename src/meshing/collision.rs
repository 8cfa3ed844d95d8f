//! Collision geometry derived from merged meshes.

use super::MeshData;

/// Static, concave triangle-mesh collision shape.
///
/// The shape is an exact copy of the render geometry: `faces` holds the
/// triangle list, three consecutive points per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMeshShape {
    faces: Vec<[f32; 3]>,
}

impl TriMeshShape {
    /// Builds the shape from a mesh's triangle list.
    pub fn from_mesh(mesh: &MeshData) -> Self {
        TriMeshShape {
            faces: mesh.vertices.clone(),
        }
    }

    /// The triangle list, three points per triangle.
    pub fn faces(&self) -> &[[f32; 3]] {
        &self.faces
    }

    /// Iterates the shape three vertices at a time.
    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        self.faces
            .chunks_exact(3)
            .map(|triangle| [triangle[0], triangle[1], triangle[2]])
    }

    /// Number of triangles in the shape.
    pub fn triangle_count(&self) -> usize {
        self.faces.len() / 3
    }

    /// Whether the shape has no triangles and therefore never collides.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}
