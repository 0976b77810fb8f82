//! Per-object registry of computed curvature fields.
//!
//! Each [`CurvatureRecord`] says that the field for one
//! (algorithm, curvature type) pair has been computed and stored on the mesh
//! as a per-vertex float layer named `"{ALGORITHM}{TYPE}"`. Records are
//! unique per pair, and the registry keeps an active index that always points
//! at a valid record (or 0 when empty).
//!
//! Layers are written and read only through [`store_curvature_fields`] and
//! [`curvature_layer`], which validate their length against the mesh.

use serde::{Deserialize, Serialize};

use crate::algo::curvature::{CurvatureAlgorithm, CurvatureFields, CurvatureType};
use crate::error::{BridgeError, Result};
use crate::host::PolyMesh;

/// Name of the vertex layer holding one curvature field, e.g. `"MDSBK1"`.
pub fn layer_name(algorithm: CurvatureAlgorithm, kind: CurvatureType) -> String {
    format!("{}{}", algorithm.tag(), kind.tag())
}

/// Display settings stored with each curvature record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColormapSettings {
    /// Lower truncation bound.
    pub min_curve: f64,
    /// Upper truncation bound.
    pub max_curve: f64,
    /// Smoothing passes applied before colouring.
    pub iterations: usize,
    /// Treat the bounds as percentiles.
    pub percentile: bool,
    /// Fraction of the truncated range at which the colour map is centred.
    pub mixpoint: f64,
    /// Colour map name.
    pub colormap: String,
}

impl Default for ColormapSettings {
    fn default() -> Self {
        Self {
            min_curve: 0.0,
            max_curve: 1000.0,
            iterations: 5,
            percentile: true,
            mixpoint: 0.5,
            colormap: "viridis".to_string(),
        }
    }
}

impl ColormapSettings {
    /// Set the truncation bounds.
    pub fn with_bounds(mut self, min_curve: f64, max_curve: f64) -> Self {
        self.min_curve = min_curve;
        self.max_curve = max_curve;
        self
    }

    /// Set the number of smoothing passes.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set whether the bounds are percentiles.
    pub fn with_percentile(mut self, percentile: bool) -> Self {
        self.percentile = percentile;
        self
    }

    /// Set the mix point, clamped to `[0, 1]`.
    pub fn with_mixpoint(mut self, mixpoint: f64) -> Self {
        self.mixpoint = mixpoint.clamp(0.0, 1.0);
        self
    }

    /// Set the colour map.
    pub fn with_colormap(mut self, colormap: impl Into<String>) -> Self {
        self.colormap = colormap.into();
        self
    }
}

/// A computed and stored curvature field.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvatureRecord {
    /// Algorithm that produced the field.
    pub algorithm: CurvatureAlgorithm,
    /// Curvature quantity.
    pub kind: CurvatureType,
    /// Display settings.
    pub settings: ColormapSettings,
}

impl CurvatureRecord {
    /// Create a record with default display settings.
    pub fn new(algorithm: CurvatureAlgorithm, kind: CurvatureType) -> Self {
        Self {
            algorithm,
            kind,
            settings: ColormapSettings::default(),
        }
    }

    /// Name of the layer holding this record's field.
    pub fn layer_name(&self) -> String {
        layer_name(self.algorithm, self.kind)
    }
}

/// Ordered, deduplicated list of curvature records with an active index.
#[derive(Debug, Clone, Default)]
pub struct CurvatureRegistry {
    records: Vec<CurvatureRecord>,
    active_index: usize,
    /// Algorithm used by the next computation.
    pub algorithm: CurvatureAlgorithm,
    /// Whether plots are displayed.
    pub show_plots: bool,
    /// Whether plots are saved.
    pub save_plots: bool,
}

impl CurvatureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[CurvatureRecord] {
        &self.records
    }

    /// Position of the record for a pair.
    pub fn position(&self, algorithm: CurvatureAlgorithm, kind: CurvatureType) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.algorithm == algorithm && r.kind == kind)
    }

    /// Whether a record for the pair exists.
    pub fn contains(&self, algorithm: CurvatureAlgorithm, kind: CurvatureType) -> bool {
        self.position(algorithm, kind).is_some()
    }

    /// Append a record for the pair.
    ///
    /// Fails with [`BridgeError::DuplicateCurvatureRecord`] if it is already
    /// present; the registry is unchanged in that case.
    pub fn add(&mut self, algorithm: CurvatureAlgorithm, kind: CurvatureType) -> Result<usize> {
        if self.contains(algorithm, kind) {
            return Err(BridgeError::DuplicateCurvatureRecord {
                algorithm: algorithm.tag(),
                kind: kind.tag(),
            });
        }
        self.records.push(CurvatureRecord::new(algorithm, kind));
        Ok(self.records.len() - 1)
    }

    /// Index of the active record.
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Select a record, clamping the index into range.
    pub fn set_active_index(&mut self, index: usize) {
        self.active_index = index;
        self.clamp_active();
    }

    /// The active record, if any.
    pub fn active(&self) -> Option<&CurvatureRecord> {
        self.records.get(self.active_index)
    }

    /// The active record mutably, if any.
    pub fn active_mut(&mut self) -> Option<&mut CurvatureRecord> {
        self.records.get_mut(self.active_index)
    }

    /// Remove the record at `index`.
    ///
    /// The active index moves back by one when the removed record was at or
    /// before it, and is then clamped into `[0, max(0, len - 1)]`.
    pub fn remove(&mut self, index: usize) -> Option<CurvatureRecord> {
        if index >= self.records.len() {
            return None;
        }
        let record = self.records.remove(index);
        if index <= self.active_index {
            self.active_index = self.active_index.saturating_sub(1);
        }
        self.clamp_active();
        Some(record)
    }

    /// Remove the active record.
    pub fn remove_active(&mut self) -> Option<CurvatureRecord> {
        self.remove(self.active_index)
    }

    /// Remove every record, always taking the head of the remaining list.
    ///
    /// Returns the removed records in their original order. The active index
    /// is 0 afterwards.
    pub fn remove_all(&mut self) -> Vec<CurvatureRecord> {
        let mut removed = Vec::with_capacity(self.records.len());
        while !self.records.is_empty() {
            removed.push(self.records.remove(0));
        }
        self.active_index = 0;
        removed
    }

    /// Drop every record without touching any layer.
    pub fn clear(&mut self) {
        self.records.clear();
        self.active_index = 0;
    }

    fn clamp_active(&mut self) {
        self.active_index = self.active_index.min(self.records.len().saturating_sub(1));
    }
}

/// A validated view of one stored curvature field.
#[derive(Debug, Clone, Copy)]
pub struct CurvatureLayer<'a> {
    /// Algorithm that produced the field.
    pub algorithm: CurvatureAlgorithm,
    /// Curvature quantity.
    pub kind: CurvatureType,
    /// One value per vertex.
    pub values: &'a [f64],
}

/// Write the four fields of `fields` as vertex layers.
///
/// All four lengths are checked before any layer is written.
pub fn store_curvature_fields(
    mesh: &mut PolyMesh,
    algorithm: CurvatureAlgorithm,
    fields: &CurvatureFields,
) -> Result<()> {
    for kind in CurvatureType::all() {
        let len = fields.get(kind).len();
        if len != mesh.num_vertices() {
            return Err(BridgeError::FieldLengthMismatch {
                expected: mesh.num_vertices(),
                actual: len,
            });
        }
    }
    for kind in CurvatureType::all() {
        mesh.set_vertex_float_layer(&layer_name(algorithm, kind), fields.get(kind).to_vec())?;
    }
    Ok(())
}

/// Read one stored curvature field.
///
/// Fails with [`BridgeError::MissingCurvatureLayer`] if the layer does not
/// exist or does not have one value per vertex.
pub fn curvature_layer(
    mesh: &PolyMesh,
    algorithm: CurvatureAlgorithm,
    kind: CurvatureType,
) -> Result<CurvatureLayer<'_>> {
    let name = layer_name(algorithm, kind);
    match mesh.vertex_float_layer(&name) {
        Some(values) if values.len() == mesh.num_vertices() => Ok(CurvatureLayer {
            algorithm,
            kind,
            values,
        }),
        _ => Err(BridgeError::MissingCurvatureLayer { name }),
    }
}
