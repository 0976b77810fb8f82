//! User-facing commands.
//!
//! Each command works on the selected mesh of a [`Context`]. The `*_with`
//! and result-returning functions are the library entry points; [`execute`]
//! wraps them and turns the outcome into a [`Report`] for display.

use std::fmt;

use crate::algo::classify::{truncate, truncation_bounds};
use crate::algo::curvature::{estimator_for, CurvatureEstimator, CurvatureType};
use crate::algo::smooth::{smooth_field, FieldSmoothOptions, VertexAdjacency};
use crate::colormap::{ColormapStage, PlotRequest, VertexColorStage};
use crate::convert::{export_mesh, import_mesh, repaint_boundaries, ExportOptions, ImportOptions};
use crate::error::{BridgeError, Result};
use crate::host::Context;
use crate::mesh::SurfaceMesh;
use crate::registry::{curvature_layer, store_curvature_fields, CurvatureRecord};

/// Severity of a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    /// The command succeeded.
    Info,
    /// The command succeeded with a caveat.
    Warning,
    /// The command failed.
    Error,
}

/// Human-readable outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Severity.
    pub level: ReportLevel,
    /// Message shown to the user.
    pub message: String,
}

impl Report {
    /// A success report.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Info,
            message: message.into(),
        }
    }

    /// A success report with a caveat.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Warning,
            message: message.into(),
        }
    }

    /// A failure report.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Error,
            message: message.into(),
        }
    }

    /// Whether the command succeeded.
    pub fn is_success(&self) -> bool {
        self.level != ReportLevel::Error
    }
}

impl From<BridgeError> for Report {
    fn from(err: BridgeError) -> Self {
        Report::error(err.to_string())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            ReportLevel::Info => "INFO",
            ReportLevel::Warning => "WARNING",
            ReportLevel::Error => "ERROR",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

/// The commands exposed to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Compute all curvature fields with the object's selected algorithm.
    ComputeCurvatures,
    /// Remove the active curvature record and its layer.
    RemoveCurvature,
    /// Remove every curvature record and layer.
    RemoveAllCurvatures,
    /// Colour the mesh by the active curvature record.
    CurvatureToColormap,
}

/// Run a command on the context and describe the outcome.
pub fn execute(ctx: &mut Context, command: Command) -> Report {
    let result = match command {
        Command::ComputeCurvatures => compute_curvatures(ctx).map(|added| match added {
            0 => Report::warning("curvatures recomputed; no new records"),
            n => Report::info(format!("computed curvatures; {} new records", n)),
        }),
        Command::RemoveCurvature => remove_curvature(ctx)
            .map(|record| Report::info(format!("removed curvature {}", record.layer_name()))),
        Command::RemoveAllCurvatures => remove_all_curvatures(ctx)
            .map(|n| Report::info(format!("removed {} curvature records", n))),
        Command::CurvatureToColormap => curvature_to_colormap(ctx, &VertexColorStage::default())
            .map(|request| Report::info(format!("coloured mesh as '{}'", request.layer))),
    };
    result.unwrap_or_else(|err| {
        log::error!("{:?} failed: {}", command, err);
        Report::from(err)
    })
}

/// Compute curvatures with the algorithm chosen on the selected object.
///
/// Returns the number of records added.
pub fn compute_curvatures(ctx: &mut Context) -> Result<usize> {
    let algorithm = ctx.selected_mesh()?.curvatures.algorithm;
    compute_curvatures_with(ctx, estimator_for(algorithm).as_ref())
}

/// Compute curvatures of the selected object with a specific estimator.
///
/// All four fields are stored as vertex layers and one record per type is
/// added. Records that already exist keep their settings; their layers are
/// overwritten with the new values.
pub fn compute_curvatures_with(
    ctx: &mut Context,
    estimator: &dyn CurvatureEstimator,
) -> Result<usize> {
    let object = ctx.selected_mesh_mut()?;
    let surface = import_mesh(object, &ImportOptions::default())?;
    let fields = estimator.estimate(&surface)?;
    let algorithm = estimator.algorithm();

    let mut object = object.object_mode();
    store_curvature_fields(object.require_mesh_mut()?, algorithm, &fields)?;

    let mut added = 0;
    for kind in CurvatureType::all() {
        match object.curvatures.add(algorithm, kind) {
            Ok(_) => added += 1,
            Err(err) if err.is_duplicate_record() => {
                log::warn!("{}; keeping the existing record", err)
            }
            Err(err) => return Err(err),
        }
    }

    log::info!(
        "computed {} curvatures for '{}' ({} vertices)",
        algorithm,
        object.name,
        fields.len()
    );
    Ok(added)
}

/// Remove the active curvature record and its layer.
pub fn remove_curvature(ctx: &mut Context) -> Result<CurvatureRecord> {
    let object = ctx.selected_mesh_mut()?;
    let name = object
        .curvatures
        .active()
        .map(CurvatureRecord::layer_name)
        .ok_or(BridgeError::NoActiveCurvature)?;

    let mut object = object.object_mode();
    if object.require_mesh_mut()?.remove_vertex_float_layer(&name).is_none() {
        log::debug!("layer '{}' was already gone", name);
    }
    object
        .curvatures
        .remove_active()
        .ok_or(BridgeError::NoActiveCurvature)
}

/// Remove every curvature record and its layer. Returns the number removed.
pub fn remove_all_curvatures(ctx: &mut Context) -> Result<usize> {
    let object = ctx.selected_mesh_mut()?;
    let mut object = object.object_mode();

    let removed = object.curvatures.remove_all();
    let mesh = object.require_mesh_mut()?;
    for record in &removed {
        mesh.remove_vertex_float_layer(&record.layer_name());
    }
    Ok(removed.len())
}

/// Colour the selected object by its active curvature record.
///
/// The record's layer is smoothed, truncated to the record's bounds and
/// handed to `stage`. Returns the request that was rendered.
pub fn curvature_to_colormap<S>(ctx: &mut Context, stage: &S) -> Result<PlotRequest>
where
    S: ColormapStage + ?Sized,
{
    let scene = ctx.scene_name();
    let object = ctx.selected_mesh_mut()?;
    let record = object
        .curvatures
        .active()
        .cloned()
        .ok_or(BridgeError::NoActiveCurvature)?;
    let settings = &record.settings;

    let mut object = object.object_mode();
    let file_prefix = format!(
        "{}_{}_m{}_M{}_I{}_Curvature",
        scene,
        object.name,
        settings.min_curve as i64,
        settings.max_curve as i64,
        settings.iterations
    );
    let (show_plot, save_plot) = (object.curvatures.show_plots, object.curvatures.save_plots);
    let mesh = object.require_mesh_mut()?;

    let layer = curvature_layer(mesh, record.algorithm, record.kind)?;
    let adjacency = VertexAdjacency::from_polygons(mesh.num_vertices(), mesh.polygons());
    let options = FieldSmoothOptions::default().with_iterations(settings.iterations);
    let smoothed = smooth_field(layer.values, &adjacency, &options)?;

    let (lo, hi) = truncation_bounds(
        &smoothed,
        settings.min_curve,
        settings.max_curve,
        settings.percentile,
    )?;
    log::debug!("{}: truncating to [{}, {}]", record.layer_name(), lo, hi);

    let request = PlotRequest {
        values: truncate(&smoothed, lo, hi),
        lo,
        hi,
        mixpoint: settings.mixpoint,
        colormap: settings.colormap.clone(),
        layer: record.layer_name(),
        file_prefix,
        show_plot,
        save_plot,
    };
    stage.render(mesh, &request)?;
    Ok(request)
}

/// Import the selected object.
pub fn import_selected(ctx: &mut Context, options: &ImportOptions) -> Result<SurfaceMesh> {
    import_mesh(ctx.selected_mesh_mut()?, options)
}

/// Write a surface mesh back to the selected object and repaint its
/// boundaries. Returns the number of repainted faces.
pub fn apply_surface_mesh(
    ctx: &mut Context,
    surface: &SurfaceMesh,
    options: &ExportOptions,
) -> Result<usize> {
    ctx.selected_mesh()?;
    let index = ctx.active.ok_or(BridgeError::NoActiveSelection)?;
    let object = ctx
        .objects
        .get_mut(index)
        .ok_or(BridgeError::NoActiveSelection)?;

    export_mesh(surface, object, options)?;
    repaint_boundaries(object, &mut ctx.materials)
}
