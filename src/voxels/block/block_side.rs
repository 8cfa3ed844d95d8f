//! # Block Side Module
//!
//! This module defines the six axis-aligned faces of a voxel block together with
//! the geometry needed to emit them: the neighbour offset used for culling, the
//! outward normal, and the two triangles each face contributes.

use cgmath::Vector3;

/// Corners of the unit cube every face is cut from.
///
/// ```text
///     7-------6
///    /|      /|      y
///   3-------2 |      |
///   | 4-----|-5      o-- x
///   |/      |/      /
///   0-------1      z
/// ```
pub const CUBE_CORNERS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Represents the six possible faces of a voxel block.
///
/// The discriminants define the fixed iteration order used by the mesher:
/// +X, -X, +Y, -Y, +Z, -Z.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The right face (facing positive X)
    RIGHT = 0,

    /// The left face (facing negative X)
    LEFT = 1,

    /// The top face (facing positive Y)
    TOP = 2,

    /// The bottom face (facing negative Y)
    BOTTOM = 3,

    /// The front face (facing positive Z)
    FRONT = 4,

    /// The back face (facing negative Z)
    BACK = 5,
}

impl BlockSide {
    /// Returns all six block faces in mesher order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::RIGHT,
            BlockSide::LEFT,
            BlockSide::TOP,
            BlockSide::BOTTOM,
            BlockSide::FRONT,
            BlockSide::BACK,
        ]
    }

    /// Offset from a block to the neighbour this face touches.
    pub fn neighbor_offset(self) -> Vector3<i32> {
        match self {
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
        }
    }

    /// Outward unit normal of the face.
    pub fn normal(self) -> [f32; 3] {
        let offset = self.neighbor_offset();
        [offset.x as f32, offset.y as f32, offset.z as f32]
    }

    /// Indices into [`CUBE_CORNERS`] for the face's two triangles.
    ///
    /// Triangles wind counter-clockwise when seen from outside the cube.
    pub fn triangle_indices(self) -> [usize; 6] {
        match self {
            BlockSide::RIGHT => [1, 2, 6, 1, 6, 5],
            BlockSide::LEFT => [0, 4, 7, 0, 7, 3],
            BlockSide::TOP => [3, 7, 6, 3, 6, 2],
            BlockSide::BOTTOM => [0, 1, 5, 0, 5, 4],
            BlockSide::FRONT => [4, 5, 6, 4, 6, 7],
            BlockSide::BACK => [0, 2, 1, 0, 3, 2],
        }
    }
}
