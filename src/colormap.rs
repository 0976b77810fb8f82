//! Colour mapping of per-vertex scalar fields.
//!
//! A [`ColormapStage`] receives a truncated field in a [`PlotRequest`] and
//! turns it into something visible. The built-in [`VertexColorStage`] writes
//! a vertex colour layer on the mesh; displaying or saving plots is left to
//! other stages and is only logged here.

use std::collections::BTreeMap;

use crate::error::{BridgeError, Result};
use crate::host::PolyMesh;

/// Colour used for values that are not finite.
pub const INVALID_COLOR: [f32; 3] = [1.0, 0.0, 1.0];

/// A colour map for mapping scalar values to colours.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    /// Colour map name.
    pub name: String,
    /// Colour samples, evenly spaced from 0 to 1.
    pub colors: Vec<[f32; 3]>,
}

impl ColorMap {
    /// Create a colour map.
    pub fn new(name: impl Into<String>, colors: Vec<[f32; 3]>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Sample the colour map at `t` in `[0, 1]`.
    pub fn sample(&self, t: f32) -> [f32; 3] {
        let t = t.clamp(0.0, 1.0);

        match self.colors.len() {
            0 => return [0.0; 3],
            1 => return self.colors[0],
            _ => {}
        }

        let n = self.colors.len() - 1;
        let idx = ((t * n as f32).floor() as usize).min(n - 1);
        let frac = t * n as f32 - idx as f32;

        let (a, b) = (self.colors[idx], self.colors[idx + 1]);
        [
            a[0] + (b[0] - a[0]) * frac,
            a[1] + (b[1] - a[1]) * frac,
            a[2] + (b[2] - a[2]) * frac,
        ]
    }
}

/// Named colour maps.
#[derive(Debug, Clone, Default)]
pub struct ColorMapRegistry {
    color_maps: BTreeMap<String, ColorMap>,
}

impl ColorMapRegistry {
    /// Create a registry holding the default colour maps.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        self.register(ColorMap::new(
            "viridis",
            vec![
                [0.267, 0.004, 0.329],
                [0.282, 0.140, 0.457],
                [0.253, 0.265, 0.529],
                [0.206, 0.371, 0.553],
                [0.163, 0.471, 0.558],
                [0.127, 0.566, 0.550],
                [0.134, 0.658, 0.517],
                [0.266, 0.749, 0.440],
                [0.477, 0.821, 0.318],
                [0.741, 0.873, 0.150],
                [0.993, 0.906, 0.144],
            ],
        ));

        self.register(ColorMap::new(
            "blues",
            vec![
                [0.969, 0.984, 1.000],
                [0.871, 0.922, 0.969],
                [0.776, 0.859, 0.937],
                [0.620, 0.792, 0.882],
                [0.419, 0.682, 0.839],
                [0.259, 0.573, 0.776],
                [0.129, 0.443, 0.710],
                [0.031, 0.318, 0.612],
                [0.031, 0.188, 0.420],
            ],
        ));

        self.register(ColorMap::new(
            "reds",
            vec![
                [1.000, 0.961, 0.941],
                [0.996, 0.878, 0.824],
                [0.988, 0.733, 0.631],
                [0.988, 0.573, 0.447],
                [0.984, 0.416, 0.290],
                [0.937, 0.231, 0.173],
                [0.796, 0.094, 0.114],
                [0.647, 0.059, 0.082],
                [0.404, 0.000, 0.051],
            ],
        ));

        self.register(ColorMap::new(
            "coolwarm",
            vec![
                [0.230, 0.299, 0.754],
                [0.552, 0.690, 0.996],
                [0.866, 0.866, 0.866],
                [0.956, 0.604, 0.486],
                [0.706, 0.016, 0.150],
            ],
        ));

        self.register(ColorMap::new(
            "rainbow",
            vec![
                [0.5, 0.0, 1.0],
                [0.0, 0.0, 1.0],
                [0.0, 1.0, 1.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
            ],
        ));
    }

    /// Register a colour map, replacing one with the same name.
    pub fn register(&mut self, color_map: ColorMap) {
        self.color_maps.insert(color_map.name.clone(), color_map);
    }

    /// Look up a colour map by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&ColorMap> {
        self.color_maps
            .get(name)
            .or_else(|| self.color_maps.get(&name.to_ascii_lowercase()))
    }

    /// All colour map names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.color_maps.keys().map(String::as_str)
    }
}

/// Everything a colour-map stage needs to render one field.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    /// Values to render, one per vertex, already truncated.
    pub values: Vec<f64>,
    /// Lower end of the display range.
    pub lo: f64,
    /// Upper end of the display range.
    pub hi: f64,
    /// Fraction of the range at which the colour map is centred.
    pub mixpoint: f64,
    /// Colour map name.
    pub colormap: String,
    /// Name of the colour layer to write.
    pub layer: String,
    /// Prefix for plot files.
    pub file_prefix: String,
    /// Display the plot.
    pub show_plot: bool,
    /// Save the plot.
    pub save_plot: bool,
}

impl PlotRequest {
    /// Map a value to a colour-map coordinate in `[0, 1]`.
    ///
    /// `lo` maps to 0, `hi` to 1, and `lo + mixpoint * (hi - lo)` to 0.5,
    /// linearly in between. Returns `None` for non-finite values.
    pub fn normalize(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let span = self.hi - self.lo;
        if span <= 0.0 || !span.is_finite() {
            return Some(0.5);
        }

        let s = ((value - self.lo) / span).clamp(0.0, 1.0);
        let m = self.mixpoint.clamp(0.0, 1.0);
        let t = if s < m {
            0.5 * s / m
        } else if m < 1.0 {
            0.5 + 0.5 * (s - m) / (1.0 - m)
        } else {
            1.0
        };
        Some(t)
    }
}

/// A stage that renders a scalar field.
pub trait ColormapStage {
    /// Render `request` onto `mesh`.
    fn render(&self, mesh: &mut PolyMesh, request: &PlotRequest) -> Result<()>;
}

/// Writes the colour-mapped field as a vertex colour layer.
#[derive(Debug, Clone)]
pub struct VertexColorStage {
    maps: ColorMapRegistry,
}

impl Default for VertexColorStage {
    fn default() -> Self {
        Self::new(ColorMapRegistry::new())
    }
}

impl VertexColorStage {
    /// Create a stage using the given colour maps.
    pub fn new(maps: ColorMapRegistry) -> Self {
        Self { maps }
    }

    /// The colour maps available to this stage.
    pub fn color_maps(&self) -> &ColorMapRegistry {
        &self.maps
    }

    /// Colours for every value of a request.
    pub fn colors(&self, request: &PlotRequest) -> Result<Vec<[f32; 3]>> {
        let map = self
            .maps
            .get(&request.colormap)
            .ok_or_else(|| BridgeError::UnknownColormap {
                name: request.colormap.clone(),
            })?;

        Ok(request
            .values
            .iter()
            .map(|&x| match request.normalize(x) {
                Some(t) => map.sample(t as f32),
                None => INVALID_COLOR,
            })
            .collect())
    }
}

impl ColormapStage for VertexColorStage {
    fn render(&self, mesh: &mut PolyMesh, request: &PlotRequest) -> Result<()> {
        let colors = self.colors(request)?;
        mesh.set_vertex_colors(&request.layer, colors)?;

        if request.show_plot || request.save_plot {
            log::info!(
                "plot '{}' requested (show: {}, save: {}); no plot backend attached",
                request.file_prefix,
                request.show_plot,
                request.save_plot
            );
        }
        log::debug!(
            "coloured {} vertices with '{}' over [{}, {}]",
            request.values.len(),
            request.colormap,
            request.lo,
            request.hi
        );
        Ok(())
    }
}
