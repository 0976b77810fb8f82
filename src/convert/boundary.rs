//! Boundary definitions and the boundary-id to marker mapping.
//!
//! Faces of a host mesh carry a raw integer in their `"marker"` layer: the id
//! of the user-defined boundary they belong to. The surface mesh wants the
//! boundary's *marker* instead. [`BoundaryMap`] translates between the two
//! and always knows the reserved pair [`UNSET_ID`] → [`UNSET_MARKER`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::host::HostObject;

/// Raw value of faces that belong to no boundary.
pub const UNSET_ID: i32 = 0;

/// Marker emitted for faces that belong to no boundary.
pub const UNSET_MARKER: i32 = -1;

/// Name of the material that paints a boundary.
pub fn material_name(boundary_id: i32) -> String {
    format!("{}_mat", boundary_id)
}

/// A user-defined boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Raw value stored in the face marker layer.
    pub boundary_id: i32,
    /// Marker written to the surface mesh.
    pub marker: i32,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Display colour (linear RGB).
    #[serde(default = "default_color")]
    pub color: [f32; 3],
}

fn default_color() -> [f32; 3] {
    [0.5, 0.5, 0.5]
}

impl Boundary {
    /// Create a boundary with the default colour.
    pub fn new(boundary_id: i32, marker: i32, name: impl Into<String>) -> Self {
        Self {
            boundary_id,
            marker,
            name: name.into(),
            color: default_color(),
        }
    }

    /// Set the colour.
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }
}

/// The boundaries defined on one object.
///
/// Serialized as `{"boundaries": [{"boundary_id": 1, "marker": 10, ...}]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryList {
    /// Boundaries in definition order.
    #[serde(default)]
    pub boundaries: Vec<Boundary>,
}

impl BoundaryList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a list from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize the list as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of boundaries.
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// Whether no boundary is defined.
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Look up a boundary by id.
    pub fn get(&self, boundary_id: i32) -> Option<&Boundary> {
        self.boundaries.iter().find(|b| b.boundary_id == boundary_id)
    }

    /// Add a boundary under a fresh id and return that id.
    ///
    /// Ids start at 1; 0 is reserved for unset faces.
    pub fn add(&mut self, marker: i32, name: impl Into<String>) -> i32 {
        let id = self
            .boundaries
            .iter()
            .map(|b| b.boundary_id)
            .max()
            .unwrap_or(UNSET_ID)
            .max(UNSET_ID)
            + 1;
        self.boundaries.push(Boundary::new(id, marker, name));
        id
    }

    /// Insert a boundary, replacing one with the same id.
    pub fn insert(&mut self, boundary: Boundary) {
        match self
            .boundaries
            .iter_mut()
            .find(|b| b.boundary_id == boundary.boundary_id)
        {
            Some(existing) => *existing = boundary,
            None => self.boundaries.push(boundary),
        }
    }

    /// Remove a boundary by id.
    pub fn remove(&mut self, boundary_id: i32) -> Option<Boundary> {
        let index = self
            .boundaries
            .iter()
            .position(|b| b.boundary_id == boundary_id)?;
        Some(self.boundaries.remove(index))
    }

    /// Build the raw-value to marker table.
    pub fn boundary_map(&self) -> BoundaryMap {
        let mut map = BoundaryMap::new();
        for b in &self.boundaries {
            map.insert(b.boundary_id, b.marker);
        }
        map
    }
}

/// Lookup table from raw boundary id to marker.
///
/// The reserved pair `UNSET_ID -> UNSET_MARKER` is present from construction;
/// an explicit entry for `UNSET_ID` overrides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryMap {
    table: BTreeMap<i32, i32>,
}

impl Default for BoundaryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundaryMap {
    /// A table holding only the reserved pair.
    pub fn new() -> Self {
        let mut table = BTreeMap::new();
        table.insert(UNSET_ID, UNSET_MARKER);
        Self { table }
    }

    /// Build a table from `(raw, marker)` pairs on top of the reserved pair.
    pub fn from_pairs<I: IntoIterator<Item = (i32, i32)>>(pairs: I) -> Self {
        let mut map = Self::new();
        for (raw, marker) in pairs {
            map.insert(raw, marker);
        }
        map
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, raw: i32, marker: i32) {
        self.table.insert(raw, marker);
    }

    /// Marker for a raw value.
    pub fn get(&self, raw: i32) -> Option<i32> {
        self.table.get(&raw).copied()
    }

    /// Number of entries, including the reserved pair.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Always false: the reserved pair is present.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Translate raw per-face values into markers.
///
/// With `map` set to `None` the values pass through unchanged. Otherwise every
/// value must have an entry, and the first one that does not fails with
/// [`BridgeError::UnmappedBoundary`].
pub fn to_markers(raw: &[i32], map: Option<&BoundaryMap>) -> Result<Vec<i32>> {
    let Some(map) = map else {
        return Ok(raw.to_vec());
    };

    raw.iter()
        .enumerate()
        .map(|(face, &value)| {
            map.get(value)
                .ok_or(BridgeError::UnmappedBoundary { face, value })
        })
        .collect()
}

/// A material that paints one boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name, `"{id}_mat"`.
    pub name: String,
    /// Boundary this material belongs to.
    pub boundary_id: i32,
    /// Diffuse colour.
    pub color: [f32; 3],
}

/// Boundary materials shared across objects, keyed by boundary id.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: BTreeMap<i32, Material>,
}

impl MaterialLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// The material of a boundary, if created.
    pub fn get(&self, boundary_id: i32) -> Option<&Material> {
        self.materials.get(&boundary_id)
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// The material of a boundary, created or recoloured to match it.
    pub fn ensure(&mut self, boundary: &Boundary) -> &Material {
        let material = self
            .materials
            .entry(boundary.boundary_id)
            .or_insert_with(|| Material {
                name: material_name(boundary.boundary_id),
                boundary_id: boundary.boundary_id,
                color: boundary.color,
            });
        material.color = boundary.color;
        material
    }
}

/// Paint every face with the material of the boundary its marker names.
///
/// Faces whose marker matches no boundary of the object lose their material.
/// Returns the number of painted faces.
pub fn repaint_boundaries(object: &mut HostObject, library: &mut MaterialLibrary) -> Result<usize> {
    let mut object = object.object_mode();

    let markers = object.marker_layer()?.to_vec();
    let boundaries = object.boundaries.boundaries.clone();
    let mesh = object.require_mesh_mut()?;

    let mut slots: BTreeMap<i32, usize> = BTreeMap::new();
    for boundary in &boundaries {
        let material = library.ensure(boundary);
        slots.insert(boundary.boundary_id, mesh.ensure_material_slot(&material.name));
    }

    let mut painted = 0;
    for (face, value) in markers.iter().enumerate() {
        let slot = slots.get(value).copied();
        painted += usize::from(slot.is_some());
        mesh.set_face_material(face, slot);
    }

    log::debug!(
        "painted {} of {} faces with {} boundaries",
        painted,
        markers.len(),
        boundaries.len()
    );
    Ok(painted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ObjectMode, PolyMesh};
    use nalgebra::Point3;

    #[test]
    fn test_reserved_pair_always_present() {
        let map = BoundaryList::new().boundary_map();
        assert_eq!(map.get(UNSET_ID), Some(UNSET_MARKER));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_user_entry_overrides_reserved() {
        let map = BoundaryMap::from_pairs([(0, 5), (2, 7)]);
        assert_eq!(map.get(0), Some(5));
        assert_eq!(map.get(2), Some(7));
    }

    #[test]
    fn test_to_markers_identity_when_disabled() {
        assert_eq!(to_markers(&[3, 0, 9], None).unwrap(), vec![3, 0, 9]);
    }

    #[test]
    fn test_to_markers_maps_values() {
        let map = BoundaryMap::from_pairs([(1, 10), (2, 20)]);
        assert_eq!(to_markers(&[0, 1, 2, 1], Some(&map)).unwrap(), vec![-1, 10, 20, 10]);
    }

    #[test]
    fn test_to_markers_fails_on_first_unmapped() {
        let map = BoundaryMap::from_pairs([(1, 10)]);
        let err = to_markers(&[1, 4, 5], Some(&map)).unwrap_err();
        assert!(matches!(err, BridgeError::UnmappedBoundary { face: 1, value: 4 }));
    }

    #[test]
    fn test_boundary_list_json() {
        let json = r#"{"boundaries": [
            {"boundary_id": 1, "marker": 10, "name": "membrane", "color": [1.0, 0.0, 0.0]},
            {"boundary_id": 2, "marker": 20}
        ]}"#;
        let list = BoundaryList::from_json_str(json).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(2).unwrap().color, [0.5, 0.5, 0.5]);
        assert_eq!(list.boundary_map().get(1), Some(10));

        let again = BoundaryList::from_json_str(&list.to_json_string().unwrap()).unwrap();
        assert_eq!(again, list);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(
            BoundaryList::from_json_str("{\"boundaries\": 3}"),
            Err(BridgeError::Json(_))
        ));
    }

    #[test]
    fn test_add_assigns_fresh_ids() {
        let mut list = BoundaryList::new();
        assert_eq!(list.add(10, "a"), 1);
        assert_eq!(list.add(20, "b"), 2);
        list.remove(1);
        assert_eq!(list.add(30, "c"), 3);
        assert!(list.get(1).is_none());
    }

    #[test]
    fn test_repaint_boundaries() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2], vec![0, 2, 3]];
        let mesh = PolyMesh::from_pydata("m", &positions, faces).unwrap();
        let mut object = HostObject::from_mesh(mesh);
        object.boundaries.insert(Boundary::new(4, 40, "wall").with_color([0.0, 1.0, 0.0]));
        object.marker_layer().unwrap()[1] = 4;
        object.mode = ObjectMode::Edit;

        let mut library = MaterialLibrary::new();
        assert_eq!(repaint_boundaries(&mut object, &mut library).unwrap(), 1);
        assert_eq!(object.mode, ObjectMode::Edit);
        assert_eq!(library.get(4).unwrap().name, "4_mat");

        let mesh = object.mesh().unwrap();
        assert_eq!(mesh.material_slots(), &["4_mat".to_string()]);
        assert_eq!(mesh.face_materials(), &[None, Some(0)]);
    }
}
