//! Regions: groups of chunks rendered and collided as a single body.
//!
//! A region merges the meshes of every chunk in its `(x, z)` bucket into one
//! surface so the renderer issues one draw call per region instead of one per
//! chunk. The surface itself lives outside this crate; the region only talks
//! to it through [`RegionSurface`].

use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use super::{ChunkMesh, MeshData, TriMeshShape};

/// Bucket of chunk-grid columns that share a region.
///
/// Height is not subdivided: every chunk of a column belongs to the same region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionKey {
    /// Region column along x.
    pub x: i32,
    /// Region column along z.
    pub z: i32,
}

impl RegionKey {
    /// Bucket of a chunk-grid coordinate for regions `region_size` chunks wide.
    pub fn for_chunk(chunk_x: i32, chunk_z: i32, region_size: i32) -> Self {
        let region_size = region_size.max(1);
        RegionKey {
            x: chunk_x.div_euclid(region_size),
            z: chunk_z.div_euclid(region_size),
        }
    }
}

/// The render/physics container a region writes its geometry into.
pub trait RegionSurface: Send {
    /// Replaces the displayed surface with the given triangle list.
    fn replace_surface(&mut self, mesh: &MeshData);

    /// Replaces the collision shape.
    fn set_collision_shape(&mut self, shape: &TriMeshShape);
}

/// Creates a fresh surface for each region.
pub trait RegionTemplate: Send + Sync {
    /// Creates the surface that region `key` will present its mesh on.
    fn instantiate(&self, key: RegionKey) -> Box<dyn RegionSurface>;
}

/// A chunk-mesh aggregate and the surface it is presented on.
pub struct Region {
    key: RegionKey,
    surface: Box<dyn RegionSurface>,
    mesh: MeshData,
    collision: Option<TriMeshShape>,
    chunk_count: usize,
}

impl Region {
    /// Creates an empty region. Empty regions are invisible and never collide.
    pub fn new(key: RegionKey, surface: Box<dyn RegionSurface>) -> Self {
        Region {
            key,
            surface,
            mesh: MeshData::new(),
            collision: None,
            chunk_count: 0,
        }
    }

    /// Key this region was created for.
    pub fn key(&self) -> RegionKey {
        self.key
    }

    /// Merged world-space mesh from the last successful build.
    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// Collision shape from the last successful build, `None` while empty.
    pub fn collision_shape(&self) -> Option<&TriMeshShape> {
        self.collision.as_ref()
    }

    /// Number of chunks that contributed geometry to the current mesh.
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Merges chunk meshes into the region's surface.
    ///
    /// Each chunk's vertices are shifted by its origin, concatenated in the given
    /// order, and pushed to the surface together with a collision shape built
    /// from the same triangles. When the chunks carry no geometry at all the
    /// region is left untouched.
    ///
    /// # Returns
    /// `true` if the surface was replaced.
    pub fn build_from_mesh_data(&mut self, chunks: &[ChunkMesh]) -> bool {
        let mut merged = MeshData::new();
        let mut contributing = 0;

        for chunk in chunks.iter().filter(|chunk| !chunk.mesh.is_empty()) {
            merged.append_translated(&chunk.mesh, chunk.origin);
            contributing += 1;
        }

        if merged.is_empty() {
            debug!("Region {:?}: no geometry, keeping previous surface", self.key);
            return false;
        }

        let shape = TriMeshShape::from_mesh(&merged);
        self.surface.replace_surface(&merged);
        self.surface.set_collision_shape(&shape);

        debug!(
            "Region {:?}: {} triangles from {} chunks",
            self.key,
            merged.triangle_count(),
            contributing
        );

        self.mesh = merged;
        self.collision = Some(shape);
        self.chunk_count = contributing;
        true
    }
}

/// Geometry last pushed to a [`MeshBufferSurface`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceState {
    /// Last mesh handed to the surface.
    pub mesh: Option<MeshData>,
    /// Last collision shape handed to the surface.
    pub collision: Option<TriMeshShape>,
    /// How many times the surface was replaced.
    pub replacements: usize,
}

/// In-memory surface that records what it was given.
///
/// Clones share the same state, so a caller can keep a handle while the region
/// owns the boxed surface.
#[derive(Debug, Clone, Default)]
pub struct MeshBufferSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl MeshBufferSurface {
    /// Creates a surface with nothing on it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of what the surface currently holds.
    pub fn state(&self) -> SurfaceState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RegionSurface for MeshBufferSurface {
    fn replace_surface(&mut self, mesh: &MeshData) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.mesh = Some(mesh.clone());
        state.replacements += 1;
    }

    fn set_collision_shape(&mut self, shape: &TriMeshShape) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.collision = Some(shape.clone());
    }
}

/// Template producing [`MeshBufferSurface`]s and remembering each one by region.
#[derive(Debug, Default)]
pub struct MeshBufferTemplate {
    surfaces: Mutex<Vec<(RegionKey, MeshBufferSurface)>>,
}

impl MeshBufferTemplate {
    /// Creates a template that has not instantiated any surface yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles to every surface created so far, in creation order.
    pub fn surfaces(&self) -> Vec<(RegionKey, MeshBufferSurface)> {
        self.surfaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RegionTemplate for MeshBufferTemplate {
    /// Creates the surface that region `key` will present its mesh on.
    fn instantiate(&self, key: RegionKey) -> Box<dyn RegionSurface> {
        let surface = MeshBufferSurface::new();
        self.surfaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((key, surface.clone()));
        Box::new(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxels::block::{block_side::BlockSide, Color};
    use cgmath::Point3;

    fn single_face_mesh(origin: Point3<i32>) -> ChunkMesh {
        let mut mesh = MeshData::new();
        mesh.push_face(Point3::new(0, 0, 0), BlockSide::TOP, Color::DEFAULT);
        ChunkMesh { origin, mesh }
    }

    #[test]
    fn empty_build_keeps_prior_state() {
        let surface = MeshBufferSurface::new();
        let mut region = Region::new(RegionKey { x: 0, z: 0 }, Box::new(surface.clone()));

        assert!(!region.build_from_mesh_data(&[]));
        assert!(!region.build_from_mesh_data(&[ChunkMesh {
            origin: Point3::new(0, 0, 0),
            mesh: MeshData::new(),
        }]));
        assert!(region.mesh().is_empty());
        assert!(region.collision_shape().is_none());
        assert_eq!(surface.state(), SurfaceState::default());

        assert!(region.build_from_mesh_data(&[single_face_mesh(Point3::new(0, 0, 0))]));
        let built = surface.state();
        assert!(!region.build_from_mesh_data(&[]));
        assert_eq!(surface.state(), built);
        assert_eq!(region.mesh().triangle_count(), 2);
    }

    #[test]
    fn merged_mesh_offsets_each_chunk_by_its_origin() {
        let surface = MeshBufferSurface::new();
        let mut region = Region::new(RegionKey { x: 1, z: 0 }, Box::new(surface.clone()));
        let a = single_face_mesh(Point3::new(16, 0, 0));
        let b = single_face_mesh(Point3::new(16, 16, 16));

        assert!(region.build_from_mesh_data(&[a.clone(), b.clone()]));

        let mesh = region.mesh();
        assert_eq!(mesh.triangle_count(), a.mesh.triangle_count() + b.mesh.triangle_count());
        for (merged, local) in mesh.vertices[..6].iter().zip(&a.mesh.vertices) {
            assert_eq!(*merged, [local[0] + 16.0, local[1], local[2]]);
        }
        for (merged, local) in mesh.vertices[6..].iter().zip(&b.mesh.vertices) {
            assert_eq!(*merged, [local[0] + 16.0, local[1] + 16.0, local[2] + 16.0]);
        }

        let state = surface.state();
        assert_eq!(state.mesh.as_ref(), Some(mesh));
        assert_eq!(state.collision.as_ref().map(TriMeshShape::triangle_count), Some(4));
        assert_eq!(region.chunk_count(), 2);
    }

    #[test]
    fn rebuild_replaces_previous_surface() {
        let surface = MeshBufferSurface::new();
        let mut region = Region::new(RegionKey { x: 0, z: 0 }, Box::new(surface.clone()));

        region.build_from_mesh_data(&[
            single_face_mesh(Point3::new(0, 0, 0)),
            single_face_mesh(Point3::new(0, 0, 16)),
        ]);
        region.build_from_mesh_data(&[single_face_mesh(Point3::new(0, 0, 0))]);

        assert_eq!(region.mesh().triangle_count(), 2);
        assert_eq!(surface.state().replacements, 2);
        let shape = region.collision_shape().cloned().unwrap_or_default();
        assert_eq!(shape.faces(), region.mesh().vertices.as_slice());
        assert_eq!(shape.triangles().count(), 2);
    }

    #[test]
    fn region_keys_bucket_by_xz_only() {
        assert_eq!(RegionKey::for_chunk(0, 0, 4), RegionKey { x: 0, z: 0 });
        assert_eq!(RegionKey::for_chunk(3, 7, 4), RegionKey { x: 0, z: 1 });
        assert_eq!(RegionKey::for_chunk(8, 4, 4), RegionKey { x: 2, z: 1 });
        assert_eq!(RegionKey::for_chunk(-1, 0, 4), RegionKey { x: -1, z: 0 });
        assert_eq!(RegionKey::for_chunk(5, 5, 0), RegionKey { x: 5, z: 5 });
    }

    #[test]
    fn template_tracks_every_instantiated_surface() {
        let template = MeshBufferTemplate::new();
        let key = RegionKey { x: 2, z: 3 };
        let mut region = Region::new(key, template.instantiate(key));
        region.build_from_mesh_data(&[single_face_mesh(Point3::new(0, 0, 0))]);

        let surfaces = template.surfaces();
        assert_eq!(surfaces.len(), 1);
        assert_eq!(surfaces[0].0, RegionKey { x: 2, z: 3 });
        assert_eq!(surfaces[0].1.state().replacements, 1);
    }
}
