//! Conversion between host polygon meshes and [`SurfaceMesh`].
//!
//! [`import_mesh`] reads a host mesh object into an oriented, marked triangle
//! mesh; [`export_mesh`] replaces the object's mesh with the contents of a
//! surface mesh. Both run with the object switched to object mode and restore
//! the previous mode on every exit path.
//!
//! # Example
//!
//! ```
//! use surfbridge::prelude::*;
//! use nalgebra::Point3;
//!
//! let positions = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh = PolyMesh::from_pydata("tri", &positions, vec![vec![0, 1, 2]]).unwrap();
//! let mut object = HostObject::from_mesh(mesh);
//!
//! let surface = import_mesh(&mut object, &ImportOptions::default()).unwrap();
//! assert_eq!(surface.num_faces(), 1);
//!
//! export_mesh(&surface, &mut object, &ExportOptions::default()).unwrap();
//! assert_eq!(object.mesh().unwrap().polygons(), &[vec![0, 1, 2]]);
//! ```

mod boundary;

pub use boundary::{
    material_name, repaint_boundaries, to_markers, Boundary, BoundaryList, BoundaryMap, Material,
    MaterialLibrary, UNSET_ID, UNSET_MARKER,
};

use std::collections::BTreeMap;

use nalgebra::Point3;

use crate::error::{BridgeError, Result};
use crate::host::{HostObject, ObjectData, PolyMesh, Transform, MARKER_LAYER};
use crate::mesh::{
    canonicalize, check_orientation, init_orientation, SurfaceFace, SurfaceMesh, SurfaceVertex,
    VertexId,
};

/// Options for [`import_mesh`].
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Fail with [`BridgeError::NoVertexSelection`] when no vertex is selected.
    pub require_selection: bool,

    /// Translate raw face values through the object's boundary table.
    /// When false the raw values are used as markers.
    pub map_boundaries: bool,

    /// Apply rotation and scale of the object before adding its location.
    /// When false only the location offset is added.
    pub apply_transform: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            require_selection: false,
            map_boundaries: false,
            apply_transform: true,
        }
    }
}

impl ImportOptions {
    /// Require at least one selected vertex.
    pub fn with_require_selection(mut self, require: bool) -> Self {
        self.require_selection = require;
        self
    }

    /// Map boundary ids to markers.
    pub fn with_map_boundaries(mut self, map: bool) -> Self {
        self.map_boundaries = map;
        self
    }

    /// Set whether rotation and scale are applied.
    pub fn with_apply_transform(mut self, apply: bool) -> Self {
        self.apply_transform = apply;
        self
    }
}

/// Options for [`export_mesh`].
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Name of the new mesh datablock. Keeps the current name when `None`.
    pub mesh_name: Option<String>,
}

impl ExportOptions {
    /// Name the new mesh.
    pub fn with_mesh_name(mut self, name: impl Into<String>) -> Self {
        self.mesh_name = Some(name.into());
        self
    }
}

/// Read a host mesh object into a surface mesh.
///
/// Vertices are placed in world space and carry the host selection: when every
/// vertex is selected the flags are all true, otherwise only selected and
/// visible vertices are flagged. Face markers come from the `"marker"` layer
/// (zeros if the layer is missing), optionally mapped through the object's
/// boundary table.
///
/// Every polygon must be a triangle. The first polygon that is not stops the
/// import with [`BridgeError::NonTriangularFace`], and two triangles over the
/// same vertices stop it with [`BridgeError::DuplicateFace`]. After all faces
/// are inserted undefined orientations are resolved and consistency is checked.
///
/// The object is left untouched on failure. On success the `"marker"` layer
/// exists afterwards.
pub fn import_mesh(object: &mut HostObject, options: &ImportOptions) -> Result<SurfaceMesh> {
    let mut object = object.object_mode();

    let transform = object.transform;
    let map = options
        .map_boundaries
        .then(|| object.boundaries.boundary_map());
    let host = object.require_mesh()?;

    let selected = host.selected_vertex_indices();
    if options.require_selection && selected.is_empty() {
        return Err(BridgeError::NoVertexSelection);
    }
    let all_selected = selected.len() == host.num_vertices();
    let mut selection = vec![all_selected; host.num_vertices()];
    if !all_selected {
        for i in selected {
            selection[i] = true;
        }
    }

    let raw = host
        .face_int_layer(MARKER_LAYER)
        .map(<[i32]>::to_vec)
        .unwrap_or_else(|| vec![0; host.num_faces()]);
    let markers = to_markers(&raw, map.as_ref())?;

    let mut surface = SurfaceMesh::with_capacity(host.num_vertices());
    for (v, &sel) in host.vertices().iter().zip(&selection) {
        let position = transform.to_world(&v.co, options.apply_transform);
        surface.add_vertex(SurfaceVertex::new(position, sel));
    }

    let mut first_seen = BTreeMap::new();
    for (fi, polygon) in host.polygons().iter().enumerate() {
        let [a, b, c] = polygon[..] else {
            return Err(BridgeError::NonTriangularFace {
                face: fi,
                sides: polygon.len(),
            });
        };
        let tri = [vertex_id(fi, a)?, vertex_id(fi, b)?, vertex_id(fi, c)?];
        let (key, orientation) =
            canonicalize(tri).ok_or(BridgeError::DegenerateFace { face: fi })?;
        if let Some(&previous) = first_seen.get(&key) {
            return Err(BridgeError::DuplicateFace { face: fi, previous });
        }
        first_seen.insert(key, fi);
        let marker = markers.get(fi).copied().unwrap_or(0);
        surface.insert_face(key, SurfaceFace::new(orientation, marker))?;
    }

    init_orientation(&mut surface);
    let report = check_orientation(&surface);
    if !report.is_consistent() {
        log::warn!(
            "{}: {} undefined faces and {} inconsistently wound edges after orientation",
            object.name,
            report.undefined,
            report.inconsistent_edges
        );
    }

    object.marker_layer()?;
    log::info!(
        "imported '{}': {} vertices, {} faces",
        object.name,
        surface.num_vertices(),
        surface.num_faces()
    );
    Ok(surface)
}

fn vertex_id(face: usize, vertex: usize) -> Result<VertexId> {
    VertexId::try_new(vertex).ok_or(BridgeError::InvalidVertexIndex { face, vertex })
}

/// Replace the mesh of a host object with a surface mesh.
///
/// Every face must have a defined orientation; the check runs before anything
/// is replaced, so a failed export leaves the object as it was. The new mesh
/// stores world-space positions, so the object transform is reset. Vertex
/// selection and face markers are carried over. Curvature records are cleared
/// since their layers lived on the replaced mesh.
pub fn export_mesh(
    surface: &SurfaceMesh,
    object: &mut HostObject,
    options: &ExportOptions,
) -> Result<()> {
    let triangles = surface.oriented_triangles()?;

    let mut object = object.object_mode();
    let current_name = object.require_mesh()?.name.clone();
    let name = options.mesh_name.clone().unwrap_or(current_name);

    let positions: Vec<Point3<f64>> = surface.vertices().map(|(_, v)| v.position).collect();
    let polygons: Vec<Vec<usize>> = triangles
        .iter()
        .map(|tri| tri.iter().map(|v| v.index()).collect())
        .collect();

    let mut mesh = PolyMesh::from_pydata(name, &positions, polygons)?;
    for (hv, (_, sv)) in mesh.vertices_mut().iter_mut().zip(surface.vertices()) {
        hv.select = sv.selected;
    }
    let layer = mesh.face_int_layer_or_new(MARKER_LAYER);
    for (value, (_, _, face)) in layer.iter_mut().zip(surface.faces()) {
        *value = face.marker;
    }

    object.data = ObjectData::Mesh(mesh);
    object.transform = Transform::identity();
    object.curvatures.clear();
    object.selected = true;

    log::info!(
        "exported {} vertices and {} faces to '{}'",
        surface.num_vertices(),
        surface.num_faces(),
        object.name
    );
    Ok(())
}
