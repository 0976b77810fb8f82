//! Host-native polygon mesh.
//!
//! [`PolyMesh`] mirrors what a mesh-editing application stores for a mesh
//! object: vertices with selection state, polygons of any arity, and named
//! attribute layers attached to faces or vertices.

use std::collections::{BTreeMap, BTreeSet};

use nalgebra::Point3;

use crate::error::{BridgeError, Result};

/// Name of the per-face integer layer that stores boundary markers.
pub const MARKER_LAYER: &str = "marker";

/// A host vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct HostVertex {
    /// Local coordinates.
    pub co: Point3<f64>,
    /// Selection flag.
    pub select: bool,
    /// Hidden vertices never count as selected.
    pub hide: bool,
}

impl HostVertex {
    /// Create a visible, selected vertex.
    pub fn new(co: Point3<f64>) -> Self {
        Self {
            co,
            select: true,
            hide: false,
        }
    }
}

/// A polygon mesh with named attribute layers.
#[derive(Debug, Clone, Default)]
pub struct PolyMesh {
    /// Mesh datablock name.
    pub name: String,
    vertices: Vec<HostVertex>,
    polygons: Vec<Vec<usize>>,
    face_int_layers: BTreeMap<String, Vec<i32>>,
    vertex_float_layers: BTreeMap<String, Vec<f64>>,
    vertex_color_layers: BTreeMap<String, Vec<[f32; 3]>>,
    material_slots: Vec<String>,
    face_materials: Vec<Option<usize>>,
}

impl PolyMesh {
    /// Create an empty mesh.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a mesh from vertex positions and polygons.
    ///
    /// All vertices start selected. Fails if a polygon references a missing
    /// vertex.
    pub fn from_pydata(
        name: impl Into<String>,
        positions: &[Point3<f64>],
        polygons: Vec<Vec<usize>>,
    ) -> Result<Self> {
        for (fi, polygon) in polygons.iter().enumerate() {
            if let Some(&vi) = polygon.iter().find(|&&vi| vi >= positions.len()) {
                return Err(BridgeError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }

        let face_count = polygons.len();
        Ok(Self {
            name: name.into(),
            vertices: positions.iter().map(|&p| HostVertex::new(p)).collect(),
            polygons,
            face_materials: vec![None; face_count],
            ..Default::default()
        })
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of polygons.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.polygons.len()
    }

    /// All vertices.
    pub fn vertices(&self) -> &[HostVertex] {
        &self.vertices
    }

    /// All vertices, mutably. Topology cannot be changed through this.
    pub fn vertices_mut(&mut self) -> &mut [HostVertex] {
        &mut self.vertices
    }

    /// All polygons as vertex index lists.
    pub fn polygons(&self) -> &[Vec<usize>] {
        &self.polygons
    }

    /// Indices of vertices that are selected and visible.
    pub fn selected_vertex_indices(&self) -> Vec<usize> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.select && !v.hide)
            .map(|(i, _)| i)
            .collect()
    }

    /// Set the selection flag of every vertex.
    pub fn select_all(&mut self, select: bool) {
        for v in &mut self.vertices {
            v.select = select;
        }
    }

    /// Unique undirected edges, smaller index first, in ascending order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = BTreeSet::new();
        for polygon in &self.polygons {
            let n = polygon.len();
            for i in 0..n {
                let (a, b) = (polygon[i], polygon[(i + 1) % n]);
                if a != b {
                    edges.insert((a.min(b), a.max(b)));
                }
            }
        }
        edges.into_iter().collect()
    }

    // ==================== Face layers ====================

    /// A per-face integer layer, if present.
    pub fn face_int_layer(&self, name: &str) -> Option<&[i32]> {
        self.face_int_layers.get(name).map(Vec::as_slice)
    }

    /// A per-face integer layer, created filled with zeros if missing.
    pub fn face_int_layer_or_new(&mut self, name: &str) -> &mut [i32] {
        let len = self.polygons.len();
        let layer = self
            .face_int_layers
            .entry(name.to_string())
            .or_insert_with(|| vec![0; len]);
        layer.resize(len, 0);
        layer
    }

    /// Names of all per-face integer layers.
    pub fn face_int_layer_names(&self) -> impl Iterator<Item = &str> {
        self.face_int_layers.keys().map(String::as_str)
    }

    // ==================== Vertex layers ====================

    /// A per-vertex float layer, if present.
    pub fn vertex_float_layer(&self, name: &str) -> Option<&[f64]> {
        self.vertex_float_layers.get(name).map(Vec::as_slice)
    }

    /// Replace (or create) a per-vertex float layer.
    pub fn set_vertex_float_layer(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        if values.len() != self.vertices.len() {
            return Err(BridgeError::FieldLengthMismatch {
                expected: self.vertices.len(),
                actual: values.len(),
            });
        }
        self.vertex_float_layers.insert(name.to_string(), values);
        Ok(())
    }

    /// Remove a per-vertex float layer, returning its values.
    pub fn remove_vertex_float_layer(&mut self, name: &str) -> Option<Vec<f64>> {
        self.vertex_float_layers.remove(name)
    }

    /// Names of all per-vertex float layers.
    pub fn vertex_float_layer_names(&self) -> impl Iterator<Item = &str> {
        self.vertex_float_layers.keys().map(String::as_str)
    }

    /// A per-vertex colour layer, if present.
    pub fn vertex_colors(&self, name: &str) -> Option<&[[f32; 3]]> {
        self.vertex_color_layers.get(name).map(Vec::as_slice)
    }

    /// Replace (or create) a per-vertex colour layer.
    pub fn set_vertex_colors(&mut self, name: &str, colors: Vec<[f32; 3]>) -> Result<()> {
        if colors.len() != self.vertices.len() {
            return Err(BridgeError::FieldLengthMismatch {
                expected: self.vertices.len(),
                actual: colors.len(),
            });
        }
        self.vertex_color_layers.insert(name.to_string(), colors);
        Ok(())
    }

    /// Names of all per-vertex colour layers.
    pub fn vertex_color_layer_names(&self) -> impl Iterator<Item = &str> {
        self.vertex_color_layers.keys().map(String::as_str)
    }

    // ==================== Materials ====================

    /// Material slot names.
    pub fn material_slots(&self) -> &[String] {
        &self.material_slots
    }

    /// Index of the slot with the given material, appending it if missing.
    pub fn ensure_material_slot(&mut self, material: &str) -> usize {
        if let Some(i) = self.material_slots.iter().position(|m| m == material) {
            return i;
        }
        self.material_slots.push(material.to_string());
        self.material_slots.len() - 1
    }

    /// Material slot of each face.
    pub fn face_materials(&self) -> &[Option<usize>] {
        &self.face_materials
    }

    /// Assign a material slot to a face.
    pub fn set_face_material(&mut self, face: usize, slot: Option<usize>) {
        if self.face_materials.len() < self.polygons.len() {
            self.face_materials.resize(self.polygons.len(), None);
        }
        if let Some(entry) = self.face_materials.get_mut(face) {
            *entry = slot;
        }
    }
}
