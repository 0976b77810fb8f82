//! Oriented, marked triangle surface mesh.
//!
//! [`SurfaceMesh`] is the form consumed by the geometry stages: a dense vertex
//! list and a map from winding-independent [`FaceKey`]s to per-face data. Faces
//! are kept in key order so that iteration is deterministic.

use std::collections::BTreeMap;

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, VertexId};
use super::key::{FaceKey, Orientation};
use crate::error::{BridgeError, Result};

/// A vertex of the surface mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceVertex {
    /// World-space position.
    pub position: Point3<f64>,
    /// Integer marker (boundary/material tag).
    pub marker: i32,
    /// Selection flag carried through from the host.
    pub selected: bool,
}

impl SurfaceVertex {
    /// Create an unmarked vertex.
    pub fn new(position: Point3<f64>, selected: bool) -> Self {
        Self {
            position,
            marker: 0,
            selected,
        }
    }
}

/// Per-face data stored under a [`FaceKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceFace {
    /// Winding relative to the key.
    pub orientation: Orientation,
    /// Integer marker (boundary/material tag).
    pub marker: i32,
    /// Selection flag.
    pub selected: bool,
}

impl SurfaceFace {
    /// Create face data with the given orientation and marker.
    pub fn new(orientation: Orientation, marker: i32) -> Self {
        Self {
            orientation,
            marker,
            selected: false,
        }
    }
}

/// A triangle surface mesh keyed by unordered triangles.
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    vertices: Vec<SurfaceVertex>,
    faces: BTreeMap<FaceKey, SurfaceFace>,
}

impl SurfaceMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with room for `num_vertices` vertices.
    pub fn with_capacity(num_vertices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            faces: BTreeMap::new(),
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Add a vertex and return its id.
    pub fn add_vertex(&mut self, vertex: SurfaceVertex) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(vertex);
        id
    }

    /// Insert a face, replacing any data already stored under the same key.
    ///
    /// Returns the previous data for the key, if any.
    pub fn insert_face(&mut self, key: FaceKey, face: SurfaceFace) -> Result<Option<SurfaceFace>> {
        for v in key.vertices() {
            if v.index() >= self.vertices.len() {
                return Err(BridgeError::InvalidVertexIndex {
                    face: self.faces.len(),
                    vertex: v.index(),
                });
            }
        }
        Ok(self.faces.insert(key, face))
    }

    /// Get a vertex by id.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &SurfaceVertex {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by id.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut SurfaceVertex {
        &mut self.vertices[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, id: VertexId) -> &Point3<f64> {
        &self.vertex(id).position
    }

    /// Look up face data by key.
    pub fn face(&self, key: &FaceKey) -> Option<&SurfaceFace> {
        self.faces.get(key)
    }

    /// Look up mutable face data by key.
    pub fn face_mut(&mut self, key: &FaceKey) -> Option<&mut SurfaceFace> {
        self.faces.get_mut(key)
    }

    /// Iterate over all vertex ids.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices with their ids.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &SurfaceVertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all face keys in key order.
    pub fn face_keys(&self) -> impl Iterator<Item = FaceKey> + '_ {
        self.faces.keys().copied()
    }

    /// Iterate over all faces in key order, numbered by position.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceKey, &SurfaceFace)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, (k, f))| (FaceId::new(i), k, f))
    }

    /// The wound vertex triple of every face, in key order.
    ///
    /// Fails with [`BridgeError::UndefinedOrientation`] on the first face whose
    /// orientation is still undetermined.
    pub fn oriented_triangles(&self) -> Result<Vec<[VertexId; 3]>> {
        self.faces()
            .map(|(fid, key, face)| {
                key.oriented(face.orientation)
                    .ok_or(BridgeError::UndefinedOrientation { face: fid.index() })
            })
            .collect()
    }

    /// Area-weighted normal of a wound triangle (length is twice the area).
    pub fn triangle_normal(&self, tri: &[VertexId; 3]) -> Vector3<f64> {
        let p0 = self.position(tri[0]);
        let p1 = self.position(tri[1]);
        let p2 = self.position(tri[2]);
        (p1 - p0).cross(&(p2 - p0))
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::canonicalize;

    fn triangle_mesh() -> SurfaceMesh {
        let mut mesh = SurfaceMesh::new();
        mesh.add_vertex(SurfaceVertex::new(Point3::new(0.0, 0.0, 0.0), true));
        mesh.add_vertex(SurfaceVertex::new(Point3::new(1.0, 0.0, 0.0), true));
        mesh.add_vertex(SurfaceVertex::new(Point3::new(0.0, 1.0, 0.0), false));
        mesh
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut mesh = triangle_mesh();
        let tri = [VertexId::new(2), VertexId::new(0), VertexId::new(1)];
        let (key, o) = canonicalize(tri).unwrap();
        assert!(mesh.insert_face(key, SurfaceFace::new(o, 7)).unwrap().is_none());

        let face = mesh.face(&key).unwrap();
        assert_eq!(face.marker, 7);
        assert_eq!(face.orientation, Orientation::Negative);
        assert_eq!(mesh.num_faces(), 1);
    }

    #[test]
    fn test_reinsert_replaces() {
        let mut mesh = triangle_mesh();
        let tri = [VertexId::new(0), VertexId::new(1), VertexId::new(2)];
        let (key, o) = canonicalize(tri).unwrap();
        mesh.insert_face(key, SurfaceFace::new(o, 1)).unwrap();
        let previous = mesh.insert_face(key, SurfaceFace::new(o.flipped(), 2)).unwrap();
        assert_eq!(previous.map(|f| f.marker), Some(1));
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.face(&key).unwrap().orientation, Orientation::Positive);
    }

    #[test]
    fn test_insert_rejects_missing_vertex() {
        let mut mesh = triangle_mesh();
        let key = FaceKey::new(VertexId::new(0), VertexId::new(1), VertexId::new(5)).unwrap();
        assert!(matches!(
            mesh.insert_face(key, SurfaceFace::default()),
            Err(BridgeError::InvalidVertexIndex { vertex: 5, .. })
        ));
    }

    #[test]
    fn test_oriented_triangles_requires_orientation() {
        let mut mesh = triangle_mesh();
        let key = FaceKey::new(VertexId::new(0), VertexId::new(1), VertexId::new(2)).unwrap();
        mesh.insert_face(key, SurfaceFace::default()).unwrap();
        assert!(matches!(
            mesh.oriented_triangles(),
            Err(BridgeError::UndefinedOrientation { face: 0 })
        ));

        mesh.face_mut(&key).unwrap().orientation = Orientation::Negative;
        let tris = mesh.oriented_triangles().unwrap();
        assert_eq!(tris.len(), 1);
        assert!(mesh.triangle_normal(&tris[0]).z > 0.0);
    }
}
