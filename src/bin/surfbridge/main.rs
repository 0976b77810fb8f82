//! Surfbridge CLI - surface mesh conversion and curvature tool.
//!
//! Usage: surfbridge <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `surfbridge --help` for available commands. Set `RUST_LOG=debug` for
//! detailed logging.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use surfbridge::algo::curvature::{CurvatureAlgorithm, CurvatureType};
use surfbridge::convert::{BoundaryList, ExportOptions, ImportOptions};
use surfbridge::host::{Context, HostObject, MARKER_LAYER};
use surfbridge::io::{self, ply};
use surfbridge::mesh::check_orientation;
use surfbridge::ops::{self, Command, Report};

#[derive(Parser)]
#[command(name = "surfbridge")]
#[command(author, version, about = "Surface mesh conversion and curvature CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Import, orient and write back a mesh
    Convert {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Boundary table (JSON)
        #[arg(short, long)]
        boundaries: Option<PathBuf>,

        /// Translate face values through the boundary table
        #[arg(long)]
        map_boundaries: bool,

        /// Fail if no vertex is selected
        #[arg(long)]
        require_selection: bool,
    },

    /// Compute curvatures and colour the mesh
    Curvature {
        /// Input mesh file
        input: PathBuf,

        /// Output PLY file
        output: PathBuf,

        /// Curvature algorithm
        #[arg(short, long, value_enum, default_value = "mdsb")]
        algorithm: AlgorithmArg,

        /// Curvature type to colour by
        #[arg(short, long, value_enum, default_value = "k1")]
        kind: KindArg,

        /// Smoothing passes before colouring
        #[arg(short, long, default_value = "5")]
        iterations: usize,

        /// Lower truncation bound
        #[arg(long, default_value = "0")]
        min: f64,

        /// Upper truncation bound
        #[arg(long, default_value = "1000")]
        max: f64,

        /// Treat the bounds as absolute values instead of percentiles
        #[arg(long)]
        absolute: bool,

        /// Fraction of the range at which the colour map is centred
        #[arg(long, default_value = "0.5")]
        mixpoint: f64,

        /// Colour map name
        #[arg(short, long, default_value = "viridis")]
        colormap: String,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum AlgorithmArg {
    /// Meyer, Desbrun, Schröder and Barr discrete operators
    Mdsb,
    /// Osculating quadric fit over the two-ring
    Jets,
}

impl From<AlgorithmArg> for CurvatureAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Mdsb => CurvatureAlgorithm::Mdsb,
            AlgorithmArg::Jets => CurvatureAlgorithm::Jets,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum KindArg {
    /// First principal curvature
    K1,
    /// Second principal curvature
    K2,
    /// Gaussian curvature
    Kg,
    /// Mean curvature
    Kh,
}

impl From<KindArg> for CurvatureType {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::K1 => CurvatureType::K1,
            KindArg::K2 => CurvatureType::K2,
            KindArg::Kg => CurvatureType::Kg,
            KindArg::Kh => CurvatureType::Kh,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Convert {
            input,
            output,
            boundaries,
            map_boundaries,
            require_selection,
        } => {
            let options = ImportOptions::default()
                .with_map_boundaries(map_boundaries)
                .with_require_selection(require_selection);
            cmd_convert(&input, &output, boundaries.as_deref(), &options)?;
        }

        Commands::Curvature {
            input,
            output,
            algorithm,
            kind,
            iterations,
            min,
            max,
            absolute,
            mixpoint,
            colormap,
        } => {
            let settings = surfbridge::registry::ColormapSettings::default()
                .with_bounds(min, max)
                .with_iterations(iterations)
                .with_percentile(!absolute)
                .with_mixpoint(mixpoint)
                .with_colormap(colormap);
            cmd_curvature(&input, &output, algorithm.into(), kind.into(), settings)?;
        }
    }

    Ok(())
}

fn load_context(input: &Path) -> Result<Context, Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    println!("Loaded: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let mut ctx = Context::with_object(HostObject::from_mesh(mesh));
    ctx.file_path = Some(input.to_path_buf());
    Ok(ctx)
}

fn check(report: Report) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", report);
    if report.is_success() {
        Ok(())
    } else {
        Err(report.message.into())
    }
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Edges: {}", mesh.edges().len());
    println!("Selected vertices: {}", mesh.selected_vertex_indices().len());

    let non_triangles = mesh.polygons().iter().filter(|p| p.len() != 3).count();
    if non_triangles == 0 {
        println!("Mesh type: Triangle mesh");
    } else {
        println!("Mesh type: Polygon mesh ({} non-triangular faces)", non_triangles);
    }

    if let Some(markers) = mesh.face_int_layer(MARKER_LAYER) {
        let mut histogram: BTreeMap<i32, usize> = BTreeMap::new();
        for &m in markers {
            *histogram.entry(m).or_default() += 1;
        }
        println!("Markers:");
        for (marker, count) in histogram {
            println!("  {:>6}: {} faces", marker, count);
        }
    }

    for name in mesh.vertex_float_layer_names() {
        println!("Vertex layer: {}", name);
    }

    if non_triangles > 0 {
        return Ok(());
    }

    // Orientation needs a triangle mesh
    let mut object = HostObject::from_mesh(mesh);
    let surface = surfbridge::convert::import_mesh(&mut object, &ImportOptions::default())?;
    let report = check_orientation(&surface);
    println!(
        "Orientation: {} undefined faces, {} inconsistent edges",
        report.undefined, report.inconsistent_edges
    );
    if report.is_closed() {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary edges)", report.boundary_edges);
    }
    if report.non_manifold_edges > 0 {
        println!("Non-manifold edges: {}", report.non_manifold_edges);
    }

    if let Some((min, max)) = surface.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    Ok(())
}

fn cmd_convert(
    input: &Path,
    output: &Path,
    boundaries: Option<&Path>,
    options: &ImportOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = load_context(input)?;
    if let Some(path) = boundaries {
        let list = BoundaryList::load(path)?;
        println!("Boundaries: {} entries from {}", list.len(), path.display());
        if let Some(object) = ctx.active_object_mut() {
            object.boundaries = list;
        }
    }

    let start = Instant::now();
    let surface = ops::import_selected(&mut ctx, options)?;
    let report = check_orientation(&surface);
    println!(
        "Surface: {} vertices, {} faces, {} inconsistent edges",
        surface.num_vertices(),
        surface.num_faces(),
        report.inconsistent_edges
    );

    let painted = ops::apply_surface_mesh(&mut ctx, &surface, &ExportOptions::default())?;
    let elapsed = start.elapsed();
    println!("Painted {} faces with {} materials", painted, ctx.materials.len());

    let object = ctx.selected_mesh()?;
    io::save(object.require_mesh()?, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_curvature(
    input: &Path,
    output: &Path,
    algorithm: CurvatureAlgorithm,
    kind: CurvatureType,
    settings: surfbridge::registry::ColormapSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = load_context(input)?;
    ctx.selected_mesh_mut()?.curvatures.algorithm = algorithm;

    let start = Instant::now();
    check(ops::execute(&mut ctx, Command::ComputeCurvatures))?;

    {
        let curvatures = &mut ctx.selected_mesh_mut()?.curvatures;
        let index = curvatures
            .position(algorithm, kind)
            .ok_or("computed curvature record is missing")?;
        curvatures.set_active_index(index);
        if let Some(record) = curvatures.active_mut() {
            record.settings = settings;
        }
    }

    check(ops::execute(&mut ctx, Command::CurvatureToColormap))?;
    let elapsed = start.elapsed();

    let object = ctx.selected_mesh()?;
    let layer = surfbridge::registry::layer_name(algorithm, kind);
    let options = ply::PlyOptions::default().with_color_layer(layer);
    ply::save_with(object.require_mesh()?, output, &options)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
